// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Device-to-host communication.
//!
//! See [`HostPort`] for detailed information.

use crate::net;
use crate::net::frame::FrameLen;
use crate::net::frame::FrameStatus;
use crate::net::frame::Header;
use crate::net::frame::MAX_FRAME_LEN;
use crate::net::Link;
use crate::protocol::wire::WireEnum as _;
use crate::protocol::CommandType;

/// Represents a physical port that can be used to receive requests from a
/// host.
///
/// A `HostPort` implements the framing below the application protocol: it
/// hands out one well-formed frame at a time, and knows how to shape
/// replies to it.
///
/// ```
/// # use tkrand::net::{*, frame::*, host::*};
/// # use tkrand::protocol::CommandType;
/// let mut link = InMemLink::new();
/// link.push_rx(&[0b0_00_11_0_00, 0x01]);
/// let mut host = SerialHost::new(&mut link);
///
/// let mut buf = [0; MAX_FRAME_LEN];
/// let header = host.receive(&mut buf)?;
/// assert_eq!(header.endpoint, Endpoint::App);
/// assert_eq!(buf[0], 0x01);
///
/// host.reply(header, CommandType::NameVersion, b"tk1 rand\x01\0\0\0")?;
/// drop(host);
/// let sent = link.take_tx();
/// assert_eq!(sent.len(), 1 + 32);
/// assert_eq!(sent[1], 0x02);
/// # Ok::<(), tkrand::net::Error>(())
/// ```
///
/// This trait is object-safe.
pub trait HostPort {
    /// Receives the next well-formed frame from the host.
    ///
    /// Blocks until a frame arrives. Header bytes that fail to decode are
    /// discarded, and the port keeps reading. On success, `buf` holds the
    /// frame payload, zero-padded past the frame length.
    fn receive(
        &mut self,
        buf: &mut [u8; MAX_FRAME_LEN],
    ) -> Result<Header, net::Error>;

    /// Replies to the frame that carried `header`.
    ///
    /// The reply frame has the length dictated by `command` (see
    /// [`CommandType::response_len()`]); its payload is the response code,
    /// then `payload`, then zero padding.
    fn reply(
        &mut self,
        header: Header,
        command: CommandType,
        payload: &[u8],
    ) -> Result<(), net::Error>;

    /// Rejects the frame that carried `header` with a one-byte, zero-filled
    /// frame with the status bit set.
    fn reply_not_ok(&mut self, header: Header) -> Result<(), net::Error>;
}
impl dyn HostPort {} // Ensure object-safety.

/// A [`HostPort`] over a [`Link`].
pub struct SerialHost<L> {
    link: L,
}

impl<L: Link> SerialHost<L> {
    /// Creates a new `SerialHost` over `link`.
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Returns the underlying link.
    pub fn into_inner(self) -> L {
        self.link
    }
}

impl<L: Link> HostPort for SerialHost<L> {
    fn receive(
        &mut self,
        buf: &mut [u8; MAX_FRAME_LEN],
    ) -> Result<Header, net::Error> {
        let header = loop {
            let byte = self.link.read_byte()?;
            match Header::parse_request(byte) {
                Ok(h) => break h,
                Err(_) => {
                    warn!("discarding bad header byte {:#04x}", byte);
                }
            }
        };

        *buf = [0; MAX_FRAME_LEN];
        self.link.read_exact(&mut buf[..header.len.bytes()])?;
        trace!("received {:?}", header);
        Ok(header)
    }

    fn reply(
        &mut self,
        header: Header,
        command: CommandType,
        payload: &[u8],
    ) -> Result<(), net::Error> {
        let len = command.response_len().ok_or(net::Error::BadHeader)?;
        if 1 + payload.len() > len.bytes() {
            return Err(crate::io::Error::BufferExhausted.into());
        }

        let mut frame = [0; 1 + MAX_FRAME_LEN];
        frame[0] = header.reply_with(FrameStatus::Ok, len).to_byte();
        frame[1] = command.to_wire_value();
        frame[2..2 + payload.len()].copy_from_slice(payload);
        self.link.write_bytes(&frame[..1 + len.bytes()])
    }

    fn reply_not_ok(&mut self, header: Header) -> Result<(), net::Error> {
        let header = header.reply_with(FrameStatus::NotOk, FrameLen::Len1);
        self.link.write_bytes(&[header.to_byte(), 0])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::net::frame::Endpoint;
    use crate::net::InMemLink;

    #[test]
    fn skips_bad_header_bytes() {
        let mut link = InMemLink::new();
        link.push_rx(&[0xff, 0b0_00_11_1_00, 0b0_11_11_0_01, 3, 9, 9, 9]);
        let mut host = SerialHost::new(&mut link);

        let mut buf = [0xaa; MAX_FRAME_LEN];
        let header = host.receive(&mut buf).unwrap();
        assert_eq!(header.id, 3);
        assert_eq!(header.len, FrameLen::Len4);
        assert_eq!(&buf[..5], &[3, 9, 9, 9, 0]);
        assert!(buf[4..].iter().all(|&b| b == 0));

        assert_eq!(host.receive(&mut buf), Err(net::Error::Disconnected));
    }

    #[test]
    fn truncated_frame_disconnects() {
        let mut link = InMemLink::new();
        link.push_rx(&[0b0_00_11_0_10, 1, 2]);
        let mut host = SerialHost::new(&mut link);
        let mut buf = [0; MAX_FRAME_LEN];
        assert_eq!(host.receive(&mut buf), Err(net::Error::Disconnected));
    }

    #[test]
    fn reply_is_padded() {
        let mut link = InMemLink::new();
        let header = Header::request(2, Endpoint::App, FrameLen::Len1);
        let mut host = SerialHost::new(&mut link);
        host.reply(header, CommandType::Random, &[0, 7, 7]).unwrap();
        drop(host);

        let sent = link.take_tx();
        assert_eq!(sent.len(), 129);
        assert_eq!(sent[0], 0b0_10_11_0_11);
        assert_eq!(&sent[1..5], &[0x04, 0, 7, 7]);
        assert!(sent[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn reply_rejects_oversized_payload() {
        let mut link = InMemLink::new();
        let header = Header::request(0, Endpoint::App, FrameLen::Len1);
        let mut host = SerialHost::new(&mut link);
        assert!(host
            .reply(header, CommandType::NameVersion, &[0; 32])
            .is_err());
        assert!(host
            .reply(header, CommandType::GetRandom, &[])
            .is_err());
    }

    #[test]
    fn not_ok_reply() {
        let mut link = InMemLink::new();
        let header = Header::request(1, Endpoint::Firmware, FrameLen::Len128);
        SerialHost::new(&mut link).reply_not_ok(header).unwrap();
        assert_eq!(link.take_tx(), vec![0b0_01_10_1_00, 0]);
    }
}
