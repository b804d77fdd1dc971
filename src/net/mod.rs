// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Networking interfaces.
//!
//! The device talks to its host over a byte-oriented serial link. This module
//! provides the framing on top of that link (see [`frame`]), the device side
//! of a connection (see [`HostPort`]) and the host side (see [`DevicePort`]).
//!
//! An integration that wishes to run the device over some concrete link only
//! needs to implement [`Link`]; the framing is shared.

use crate::io;

pub mod device;
pub mod frame;
pub mod host;

pub use frame::Header;

#[cfg(doc)]
use device::DevicePort;
#[cfg(doc)]
use host::HostPort;

/// A networking error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Indicates an underlying I/O error.
    Io(io::Error),
    /// Indicates a header byte that could not be decoded.
    BadHeader,
    /// Indicates that the other end of a connection is "disconnected". This
    /// can mean anything from a connection being explicitly terminated, to
    /// the serial device going away.
    Disconnected,
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

debug_from!(Error => io::Error);

/// A blocking, byte-oriented serial link.
pub trait Link {
    /// Reads one byte, blocking until one is available.
    fn read_byte(&mut self) -> Result<u8, Error>;

    /// Writes all of `bytes`.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Fills `buf` completely.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        for b in buf {
            *b = self.read_byte()?;
        }
        Ok(())
    }
}
impl dyn Link {} // Ensure object-safety.

impl<L: Link + ?Sized> Link for &mut L {
    fn read_byte(&mut self) -> Result<u8, Error> {
        L::read_byte(*self)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        L::write_bytes(*self, bytes)
    }
}

/// A simple in-memory [`Link`].
///
/// Bytes pushed with [`InMemLink::push_rx()`] are handed out by
/// [`Link::read_byte()`]; once they run out, the link reports
/// [`Error::Disconnected`]. Everything written is collected for inspection.
#[cfg(feature = "std")]
#[derive(Default, Debug)]
pub struct InMemLink {
    rx: std::collections::VecDeque<u8>,
    tx: Vec<u8>,
}

#[cfg(feature = "std")]
impl InMemLink {
    /// Creates a new, empty link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `bytes` to be read from the link.
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Takes everything written to the link so far.
    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }
}

#[cfg(feature = "std")]
impl Link for InMemLink {
    fn read_byte(&mut self) -> Result<u8, Error> {
        self.rx.pop_front().ok_or(Error::Disconnected)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.tx.extend_from_slice(bytes);
        Ok(())
    }
}
