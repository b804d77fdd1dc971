// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `GetNameVersion` request and response.
//!
//! This module provides a command for identifying the application running
//! on the device. Hosts use it to make sure they are talking to the random
//! generator before asking it for anything else.

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

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A command for requesting the application name and version.
///
/// Corresponds to [`CommandType::GetNameVersion`].
pub enum GetNameVersion {}

impl Command for GetNameVersion {
    type Req = GetNameVersionRequest;
    type Resp = NameVersionResponse;
}

/// The [`GetNameVersion`] request.
///
/// The request has no body; it must arrive in a one-byte frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GetNameVersionRequest;

impl Request for GetNameVersionRequest {
    const TYPE: CommandType = CommandType::GetNameVersion;
    const FRAME_LEN: Option<FrameLen> = Some(FrameLen::Len1);
}

impl FromWire for GetNameVersionRequest {
    fn from_wire<R: Read>(_: R) -> Result<Self, wire::Error> {
        Ok(Self)
    }
}

impl ToWire for GetNameVersionRequest {
    fn to_wire<W: Write>(&self, _: W) -> Result<(), wire::Error> {
        Ok(())
    }
}

/// The [`GetNameVersion`] response.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NameVersionResponse {
    /// The first half of the application name, usually ASCII.
    pub name0: [u8; 4],
    /// The second half of the application name, usually ASCII.
    pub name1: [u8; 4],
    /// The application version.
    pub version: u32,
}

impl Response for NameVersionResponse {
    const TYPE: CommandType = CommandType::NameVersion;

    /// A malformed request is answered with an all-zero body.
    fn rejected(_: Error) -> Self {
        Self::default()
    }
}

impl FromWire for NameVersionResponse {
    fn from_wire<R: Read>(mut r: R) -> Result<Self, wire::Error> {
        let mut name0 = [0; 4];
        r.read_bytes(&mut name0)?;
        let mut name1 = [0; 4];
        r.read_bytes(&mut name1)?;
        let version = r.read_le()?;
        Ok(Self {
            name0,
            name1,
            version,
        })
    }
}

impl ToWire for NameVersionResponse {
    fn to_wire<W: Write>(&self, mut w: W) -> Result<(), wire::Error> {
        w.write_bytes(&self.name0)?;
        w.write_bytes(&self.name1)?;
        w.write_le(self.version)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol;

    round_trip_test! {
        request_round_trip: {
            bytes: &[],
            value: GetNameVersionRequest,
        },
        response_round_trip: {
            bytes: b"tk1 rand\x01\x00\x00\x00",
            value: NameVersionResponse {
                name0: *b"tk1 ",
                name1: *b"rand",
                version: 1,
            },
        },
        rejected_round_trip: {
            bytes: &[0; 12],
            value: NameVersionResponse::rejected(protocol::Error::BadLength),
        },
    }
}
