// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Traits for converting integers to and from byte representations.
//!
//! The device is little-endian: multi-byte protocol fields and the DRBG's
//! 32-bit state words are all laid out least-significant byte first.

use core::mem;

use byteorder::ByteOrder as _;
use byteorder::LE;

use crate::io;
use crate::io::Read;
use crate::io::Write;

/// A little-endian integer, which can be read and written.
///
/// This trait can be used for operating generically over little-endian integer
/// I/O.
pub trait LeInt: Sized + Copy {
    /// Reads a value of type `Self`, in little-endian order.
    fn read_from<R: Read>(r: R) -> Result<Self, io::Error>;

    /// Writes a value of type `Self`, in little-endian order.
    fn write_to<W: Write>(self, w: W) -> Result<(), io::Error>;
}

impl LeInt for u8 {
    #[inline]
    fn read_from<R: Read>(mut r: R) -> Result<Self, io::Error> {
        let mut bytes = [0; 1];
        r.read_bytes(&mut bytes)?;
        Ok(bytes[0])
    }

    #[inline]
    fn write_to<W: Write>(self, mut w: W) -> Result<(), io::Error> {
        w.write_bytes(&[self])
    }
}

macro_rules! le_int {
    ($($int:ty => $read:ident, $write:ident;)*) => {$(
        impl LeInt for $int {
            #[inline]
            fn read_from<R: Read>(mut r: R) -> Result<Self, io::Error> {
                let mut bytes = [0; mem::size_of::<$int>()];
                r.read_bytes(&mut bytes)?;
                Ok(LE::$read(&bytes))
            }

            #[inline]
            fn write_to<W: Write>(self, mut w: W) -> Result<(), io::Error> {
                let mut bytes = [0; mem::size_of::<$int>()];
                LE::$write(&mut bytes, self);
                w.write_bytes(&bytes)
            }
        }
    )*};
}

le_int! {
    u32 => read_u32, write_u32;
}

/// Packs `words` into `out` as consecutive little-endian `u32`s.
///
/// `out` must be exactly four times as long as `words`.
pub fn words_to_le(words: &[u32], out: &mut [u8]) {
    LE::write_u32_into(words, out);
}

/// Unpacks consecutive little-endian `u32`s from `bytes` into `out`.
///
/// `bytes` must be exactly four times as long as `out`.
pub fn le_to_words(bytes: &[u8], out: &mut [u32]) {
    LE::read_u32_into(bytes, out);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn words_round_trip() {
        let words = [0x03020100, 0x07060504];
        let mut bytes = [0; 8];
        words_to_le(&words, &mut bytes);
        assert_eq!(bytes, [0, 1, 2, 3, 4, 5, 6, 7]);

        let mut back = [0; 2];
        le_to_words(&bytes, &mut back);
        assert_eq!(back, words);
    }

    #[test]
    fn le_u32() {
        let mut bytes: &[u8] = &[0x01, 0x00, 0x00, 0x00];
        assert_eq!(u32::read_from(&mut bytes).unwrap(), 1);
    }
}
