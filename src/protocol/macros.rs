// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Macros for generating protocol-related tests.

/// Covenience macro for generating a "round trip unit test".
///
/// This macro generates a unit test for a protocol struct that ensures that a
/// given byte slice can be converted back and forth with a given value of a
/// protocol struct, exactly.
///
/// Syntax:
/// ```text
/// round_trip_test! {
///     test_name: {
///         bytes: <contant expression of type &[u8]>,
///         value: <expression of the protocol type>,
///     }
///     // more cases ...
/// }
/// ```
#[cfg(test)]
macro_rules! round_trip_test {
    ($($name:ident: {
        bytes: $bytes:expr,
        value: $value:expr,
    },)+) => {$(
        #[test]
        fn $name() {
            use $crate::protocol::wire::*;
            use $crate::io::*;
            const BUF_LEN: usize = 1 << 8;

            let bytes: &[u8] = $bytes;
            let value = $value;

            fn parse_like<T: FromWire>(
                _: &T,
                r: &mut &[u8],
            ) -> Result<T, $crate::protocol::wire::Error> {
                T::from_wire(r)
            }

            let mut bytes_reader = bytes;
            let deserialized = parse_like(&value, &mut bytes_reader)
                .expect("deserialization failed");
            assert_eq!(bytes_reader.len(), 0,
                "expected bytes to be fully read");
            pretty_assertions::assert_eq!(value, deserialized);

            let mut buf = [0u8; BUF_LEN];
            let mut cursor = Cursor::new(&mut buf);
            value.to_wire(&mut cursor).expect("serialization failed");
            pretty_assertions::assert_eq!(cursor.consumed_bytes(), bytes);
        }
    )+}
}
