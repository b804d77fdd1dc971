// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Pluggable hardware functionality.
//!
//! This module provides traits for the few memory-mapped peripherals the
//! application touches: the true random number generator, the CDI register
//! bank, and the status LED.

use enumflags2::bitflags;
use enumflags2::BitFlags;

use crate::Result;

/// The number of 32-bit words in a compartment device identifier.
pub const CDI_WORDS: usize = 8;

/// An error returned by a hardware operation.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates that the peripheral could not produce a value.
    Unavailable,
}

/// A hardware true random number generator.
pub trait Entropy {
    /// Returns one fresh 32-bit entropy word.
    ///
    /// Blocks until the generator reports that a word is ready.
    fn entropy_word(&mut self) -> Result<u32, Error>;
}
impl dyn Entropy {} // Ensure object-safe.

/// Access to the compartment device identifier (CDI).
///
/// The CDI is a secret, unique to the combination of physical device, loaded
/// application, and user-supplied secret. It must never leave the device.
pub trait Cdi {
    /// Returns the eight CDI words.
    fn compartment_id(&self) -> [u32; CDI_WORDS];
}
impl dyn Cdi {} // Ensure object-safe.

/// A color channel of the status LED.
#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LedColor {
    /// The blue channel.
    Blue = 1 << 0,
    /// The green channel.
    Green = 1 << 1,
    /// The red channel.
    Red = 1 << 2,
}

/// The status LED.
pub trait Led {
    /// Lights exactly the channels in `colors`.
    fn set(&mut self, colors: BitFlags<LedColor>);
}
impl dyn Led {} // Ensure object-safe.
