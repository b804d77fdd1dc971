// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Host-to-device communication.
//!
//! See [`DevicePort`].

use crate::net;
use crate::net::frame::Endpoint;
use crate::net::frame::FrameLen;
use crate::net::frame::Header;
use crate::net::frame::MAX_FRAME_LEN;
use crate::net::Link;
use crate::protocol::wire::WireEnum as _;
use crate::protocol::CommandType;

/// Represents a physical port that can be used to send requests to a device.
///
/// This is the mirror image of [`HostPort`](super::host::HostPort), used by
/// host-side tooling.
pub trait DevicePort {
    /// Sends a request for `command` to the application endpoint.
    ///
    /// The request frame is the smallest one that fits the command code and
    /// `payload`, zero-padded.
    fn send(
        &mut self,
        command: CommandType,
        payload: &[u8],
    ) -> Result<(), net::Error>;

    /// Blocks until the device replies, and copies the reply payload into
    /// `buf`.
    ///
    /// Callers should check [`Header::status`] before interpreting `buf`.
    fn receive_response(
        &mut self,
        buf: &mut [u8; MAX_FRAME_LEN],
    ) -> Result<Header, net::Error>;
}
impl dyn DevicePort {} // Ensure object-safety.

/// A [`DevicePort`] over a [`Link`].
pub struct SerialDevice<L> {
    link: L,
    next_id: u8,
}

impl<L: Link> SerialDevice<L> {
    /// Creates a new `SerialDevice` over `link`.
    pub fn new(link: L) -> Self {
        Self { link, next_id: 0 }
    }
}

impl<L: Link> DevicePort for SerialDevice<L> {
    fn send(
        &mut self,
        command: CommandType,
        payload: &[u8],
    ) -> Result<(), net::Error> {
        let len = FrameLen::fitting(1 + payload.len())
            .ok_or(crate::io::Error::BufferExhausted)?;
        let header = Header::request(self.next_id, Endpoint::App, len);
        self.next_id = (self.next_id + 1) & 0b11;

        let mut frame = [0; 1 + MAX_FRAME_LEN];
        frame[0] = header.to_byte();
        frame[1] = command.to_wire_value();
        frame[2..2 + payload.len()].copy_from_slice(payload);
        self.link.write_bytes(&frame[..1 + len.bytes()])
    }

    fn receive_response(
        &mut self,
        buf: &mut [u8; MAX_FRAME_LEN],
    ) -> Result<Header, net::Error> {
        let header = Header::parse_response(self.link.read_byte()?)?;
        *buf = [0; MAX_FRAME_LEN];
        self.link.read_exact(&mut buf[..header.len.bytes()])?;
        Ok(header)
    }
}
