// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Transport frames.
//!
//! Every message on the serial link is a *frame*: one header byte followed by
//! a payload of one of four fixed lengths. The header byte packs
//!
//! ```text
//!   bit  7    6..5   4..3       2        1..0
//!      [ 0 | id   | endpoint | status | len ]
//! ```
//!
//! Bit 7 is reserved and must be clear. The status bit is only ever set by
//! the device, to reject a frame; a host frame with the status bit set is
//! malformed.

use crate::net;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The largest payload a frame may carry.
pub const MAX_FRAME_LEN: usize = 128;

wire_enum! {
    /// The length code of a frame.
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum FrameLen: u8 {
        /// A one-byte payload.
        Len1 = 0,
        /// A four-byte payload.
        Len4 = 1,
        /// A 32-byte payload.
        Len32 = 2,
        /// A 128-byte payload.
        Len128 = 3,
    }
}

impl FrameLen {
    /// Returns the number of payload bytes a frame of this length carries.
    pub fn bytes(self) -> usize {
        match self {
            Self::Len1 => 1,
            Self::Len4 => 4,
            Self::Len32 => 32,
            Self::Len128 => MAX_FRAME_LEN,
        }
    }

    /// Returns the smallest frame length that fits `len` payload bytes.
    pub fn fitting(len: usize) -> Option<Self> {
        [Self::Len1, Self::Len4, Self::Len32, Self::Len128]
            .iter()
            .copied()
            .find(|l| l.bytes() >= len)
    }
}

wire_enum! {
    /// The destination of a frame.
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum Endpoint: u8 {
        /// The internal FPGA hardware.
        HardwareIfpga = 0,
        /// The application FPGA hardware.
        HardwareAfpga = 1,
        /// The device firmware.
        Firmware = 2,
        /// The loaded application.
        App = 3,
    }
}

wire_enum! {
    /// The status bit of a frame.
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum FrameStatus: u8 {
        /// The frame carries a regular message.
        Ok = 0,
        /// The device rejected the frame it is replying to.
        NotOk = 1,
    }
}

/// A decoded frame header.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Header {
    /// A two-bit frame id, chosen by the host and echoed by the device.
    pub id: u8,
    /// The endpoint this frame is addressed to.
    pub endpoint: Endpoint,
    /// The status bit.
    pub status: FrameStatus,
    /// The payload length.
    pub len: FrameLen,
}

const RESERVED_BIT: u8 = 1 << 7;
const STATUS_BIT: u8 = 1 << 2;

impl Header {
    /// Creates the header of a request from the host.
    pub fn request(id: u8, endpoint: Endpoint, len: FrameLen) -> Self {
        Self {
            id: id & 0b11,
            endpoint,
            status: FrameStatus::Ok,
            len,
        }
    }

    /// Decodes a header byte sent by the host.
    ///
    /// Fails if the reserved bit or the status bit is set.
    pub fn parse_request(byte: u8) -> Result<Self, net::Error> {
        if byte & (RESERVED_BIT | STATUS_BIT) != 0 {
            return Err(net::Error::BadHeader);
        }
        Self::parse_response(byte)
    }

    /// Decodes a header byte sent by the device.
    ///
    /// Fails if the reserved bit is set.
    pub fn parse_response(byte: u8) -> Result<Self, net::Error> {
        use crate::protocol::wire::WireEnum as _;

        if byte & RESERVED_BIT != 0 {
            return Err(net::Error::BadHeader);
        }
        let endpoint = Endpoint::from_wire_value((byte >> 3) & 0b11)
            .ok_or(net::Error::BadHeader)?;
        let status = FrameStatus::from_wire_value((byte >> 2) & 0b1)
            .ok_or(net::Error::BadHeader)?;
        let len = FrameLen::from_wire_value(byte & 0b11)
            .ok_or(net::Error::BadHeader)?;
        Ok(Self {
            id: (byte >> 5) & 0b11,
            endpoint,
            status,
            len,
        })
    }

    /// Encodes this header as a single byte.
    pub fn to_byte(self) -> u8 {
        use crate::protocol::wire::WireEnum as _;

        (self.id & 0b11) << 5
            | self.endpoint.to_wire_value() << 3
            | self.status.to_wire_value() << 2
            | self.len.to_wire_value()
    }

    /// Constructs the header of a reply to a frame that used this header.
    ///
    /// The id and endpoint are echoed back.
    pub fn reply_with(self, status: FrameStatus, len: FrameLen) -> Self {
        Self {
            status,
            len,
            ..self
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_bits() {
        let h = Header::parse_request(0b0_10_11_0_01).unwrap();
        assert_eq!(
            h,
            Header {
                id: 2,
                endpoint: Endpoint::App,
                status: FrameStatus::Ok,
                len: FrameLen::Len4,
            }
        );
        assert_eq!(h.to_byte(), 0b0_10_11_0_01);
    }

    #[test]
    fn request_rejects_reserved_and_status_bits() {
        assert!(Header::parse_request(0x80).is_err());
        assert!(Header::parse_request(0b0_00_11_1_00).is_err());
        assert!(Header::parse_response(0b0_00_11_1_00).is_ok());
        assert!(Header::parse_response(0x80).is_err());
    }

    #[test]
    fn reply_echoes_id_and_endpoint() {
        let req = Header::request(1, Endpoint::Firmware, FrameLen::Len32);
        let nok = req.reply_with(FrameStatus::NotOk, FrameLen::Len1);
        assert_eq!(nok.to_byte(), 0b0_01_10_1_00);
    }

    #[test]
    fn fitting_len() {
        assert_eq!(FrameLen::fitting(0), Some(FrameLen::Len1));
        assert_eq!(FrameLen::fitting(2), Some(FrameLen::Len4));
        assert_eq!(FrameLen::fitting(33), Some(FrameLen::Len128));
        assert_eq!(FrameLen::fitting(129), None);
    }
}
