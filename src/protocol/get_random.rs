// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `GetRandom` request and response.
//!
//! This module provides a command for drawing bytes from the device's
//! random bit generator. Every successful response is folded into the
//! device's attestation digest; see [`GetSig`](super::GetSig).

use arrayvec::ArrayVec;

use crate::io::Read;
use crate::io::Write;
use crate::net::frame::FrameLen;
use crate::protocol::wire;
use crate::protocol::wire::FromWire;
use crate::protocol::wire::ToWire;
use crate::protocol::Command;
use crate::protocol::CommandType;
use crate::protocol::Error;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::protocol::Status;
use crate::protocol::RANDOM_PAYLOAD_MAX;

/// A command for requesting random bytes.
///
/// Corresponds to [`CommandType::GetRandom`].
pub enum GetRandom {}

impl Command for GetRandom {
    type Req = GetRandomRequest;
    type Resp = RandomResponse;
}

/// The [`GetRandom`] request.
///
/// The request must arrive in a four-byte frame; only the byte after the
/// command code is meaningful.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GetRandomRequest {
    /// The number of random bytes requested, between 1 and
    /// [`RANDOM_PAYLOAD_MAX`], inclusive.
    pub count: u8,
}

impl GetRandomRequest {
    /// Returns whether [`GetRandomRequest::count`] is a permitted value.
    pub fn is_in_range(&self) -> bool {
        (1..=RANDOM_PAYLOAD_MAX).contains(&(self.count as usize))
    }
}

impl Request for GetRandomRequest {
    const TYPE: CommandType = CommandType::GetRandom;
    const FRAME_LEN: Option<FrameLen> = Some(FrameLen::Len4);
}

impl FromWire for GetRandomRequest {
    fn from_wire<R: Read>(mut r: R) -> Result<Self, wire::Error> {
        let count = r.read_le()?;
        Ok(Self { count })
    }
}

impl ToWire for GetRandomRequest {
    fn to_wire<W: Write>(&self, mut w: W) -> Result<(), wire::Error> {
        w.write_le(self.count)?;
        Ok(())
    }
}

/// The [`GetRandom`] response.
///
/// Because responses travel in a fixed 128-byte frame, a parsed response
/// holds every byte after the status, including frame padding. Callers that
/// parse responses off the wire should truncate [`RandomResponse::data`] to
/// the count they requested.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RandomResponse {
    /// Whether the request was honored.
    pub status: Status,
    /// The random bytes. Empty unless `status` is [`Status::Ok`].
    pub data: ArrayVec<u8, RANDOM_PAYLOAD_MAX>,
}

impl Response for RandomResponse {
    const TYPE: CommandType = CommandType::Random;

    fn rejected(_: Error) -> Self {
        Self {
            status: Status::Bad,
            data: ArrayVec::new(),
        }
    }
}

impl FromWire for RandomResponse {
    fn from_wire<R: Read>(mut r: R) -> Result<Self, wire::Error> {
        let status = Status::from_wire(&mut r)?;
        let mut data = ArrayVec::new();
        if status == Status::Ok {
            let len = r.remaining_data().min(RANDOM_PAYLOAD_MAX);
            let mut buf = [0; RANDOM_PAYLOAD_MAX];
            r.read_bytes(&mut buf[..len])?;
            data.extend(buf[..len].iter().copied());
        }
        Ok(Self { status, data })
    }
}

impl ToWire for RandomResponse {
    fn to_wire<W: Write>(&self, mut w: W) -> Result<(), wire::Error> {
        self.status.to_wire(&mut w)?;
        w.write_bytes(&self.data)?;
        Ok(())
    }
}
