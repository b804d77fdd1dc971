// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! I/O interfaces, in lieu of [`std::io`].
//!
//! These are used to move protocol payloads in and out of the fixed-size
//! frame buffers the device works with, and to serialize DRBG state words
//! before they are hashed.

pub mod cursor;
pub mod endian;
pub mod read;
pub mod write;

pub use cursor::Cursor;
pub use read::Read;
pub use write::Write;

/// A generic, low-level I/O error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Indicates that some underlying buffer has been completely used up,
    /// either for reading from or writing to.
    ///
    /// Frame buffers are fixed-size, so this usually means a payload was
    /// longer than the frame it was supposed to fit in.
    BufferExhausted,
}
