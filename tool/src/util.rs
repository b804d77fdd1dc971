// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! I/O utilities.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;

/// Like `?`, but crashes the binary with a nice error message.
///
/// Exits with status 2, which this tool reserves for usage errors.
macro_rules! check {
    ($result:expr, $fmt:literal $(, $args:expr)* $(,)?) => {
        match $result {
            Ok(x) => x,
            Err(e) => {
                eprintln!("error: {}: {:?}", format_args!($fmt, $($args,)*), e);
                std::process::exit(2)
            }
        }
    }
}

/// Decodes `text` as hex, ignoring surrounding whitespace.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(text.trim())
}

/// Reads a hex-encoded file, ignoring surrounding whitespace.
pub fn read_hex_file(path: &Path) -> io::Result<Vec<u8>> {
    let text = fs::read_to_string(path)?;
    decode_hex(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// A byte string that was not of the required length.
#[derive(PartialEq, Eq)]
pub struct WrongLength {
    expected: usize,
    actual: usize,
}

impl fmt::Debug for WrongLength {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "expected {} bytes, got {}",
            self.expected, self.actual
        )
    }
}

/// Copies `bytes` into an array, if it is exactly `N` bytes long.
pub fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], WrongLength> {
    if bytes.len() != N {
        return Err(WrongLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Writes `data` to `path`, or as a hex line to stdout if `path` is missing.
pub fn write_output(path: Option<&Path>, data: &[u8]) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, data),
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{}", hex::encode(data))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_ignores_whitespace() {
        assert_eq!(decode_hex("  00ff10\n").unwrap(), vec![0x00, 0xff, 0x10]);
        assert_eq!(decode_hex("\n").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn hex_rejects_garbage() {
        assert!(decode_hex("0g").is_err());
        assert!(decode_hex("abc").is_err());
    }

    #[test]
    fn fixed_lengths() {
        assert_eq!(fixed::<2>(&[1, 2]), Ok([1, 2]));
        let short = fixed::<32>(&[0; 31]).unwrap_err();
        assert_eq!(format!("{:?}", short), "expected 32 bytes, got 31");
        let long = fixed::<2>(&[1, 2, 3]).unwrap_err();
        assert_eq!(format!("{:?}", long), "expected 2 bytes, got 3");
    }
}
