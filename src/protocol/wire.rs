// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Wire format traits.
//!
//! This module provides [`FromWire`] and [`ToWire`], a pair of traits similar
//! to the core traits in the [`serde`] library. Rather than representing a
//! generically serializeable type, they represent types that can be converted
//! to and from the application protocol's fixed-offset payload layout.
//!
//! [`serde`]: https://serde.rs

use crate::io;
use crate::io::endian::LeInt;
use crate::io::Read;
use crate::io::Write;

/// A type which can be deserialized from the wire format.
pub trait FromWire: Sized {
    /// Deserializes a `Self` out of `r`.
    fn from_wire<R: Read>(r: R) -> Result<Self, Error>;
}

/// A marshalling error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Indicates that something went wrong in an `io` operation.
    Io(io::Error),

    /// Indicates that some field within the message was outside of its
    /// valid range.
    OutOfRange,
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

debug_from!(Error => io::Error);

/// A type which can be serialized into the wire format.
pub trait ToWire: Sized {
    /// Serializes `self` into `w`.
    fn to_wire<W: Write>(&self, w: W) -> Result<(), Error>;
}

/// A C-like enum with a fixed integer encoding.
///
/// Every variant encodes to a wire value, but not every wire value decodes
/// to a variant: header fields and command codes arrive from the peer, and
/// unknown values must be reported rather than trusted.
pub trait WireEnum: Sized + Copy {
    /// The underlying integer type.
    type Wire;

    /// Converts `self` into its underlying wire representation.
    fn to_wire_value(self) -> Self::Wire;

    /// Attempts to parse a value of `Self` from the underlying wire
    /// representation.
    fn from_wire_value(wire: Self::Wire) -> Option<Self>;
}

impl<E> FromWire for E
where
    E: WireEnum,
    E::Wire: LeInt,
{
    fn from_wire<R: Read>(mut r: R) -> Result<Self, Error> {
        let wire = <Self as WireEnum>::Wire::read_from(&mut r)?;
        Self::from_wire_value(wire).ok_or(Error::OutOfRange)
    }
}

impl<E> ToWire for E
where
    E: WireEnum,
    E::Wire: LeInt,
{
    fn to_wire<W: Write>(&self, mut w: W) -> Result<(), Error> {
        self.to_wire_value().write_to(&mut w)?;
        Ok(())
    }
}

/// Generates a `WireEnum`-implementing enum.
///
/// ```text
/// wire_enum! {
///     /// A status code.
///     pub enum Code: u8 {
///         /// All good.
///         Ok = 0x00,
///         /// Not good.
///         Bad = 0x01,
///     }
/// }
/// ```
macro_rules! wire_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident : $wire:ident {
        $($(#[$meta_variant:meta])* $variant:ident = $value:tt,)*
    }) => {
        $(#[$meta])*
        #[repr($wire)]
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        $vis enum $name {
           $(
               $(#[$meta_variant])*
               $variant = $value,
           )*
        }

        impl $crate::protocol::wire::WireEnum for $name {
            type Wire = $wire;
            fn to_wire_value(self) -> Self::Wire {
                match self {
                    $(
                        Self::$variant => $value,
                    )*
                }
            }
            fn from_wire_value(wire: Self::Wire) -> Option<Self> {
                match wire {
                    $(
                        $value => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }
        }
    }
}
