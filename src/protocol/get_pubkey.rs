// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `GetPubkey` request and response.
//!
//! This module provides a command for fetching the device's Ed25519
//! verification key, which hosts use to check [`GetSig`](super::GetSig)
//! attestations.

use crate::crypto::sig::PublicKey;
use crate::crypto::sig::PUBLIC_KEY_LEN;
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

/// A command for requesting the device public key.
///
/// Corresponds to [`CommandType::GetPubkey`].
pub enum GetPubkey {}

impl Command for GetPubkey {
    type Req = GetPubkeyRequest;
    type Resp = PubkeyResponse;
}

/// The [`GetPubkey`] request.
///
/// The request has no body, and its frame length is not checked.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct GetPubkeyRequest;

impl Request for GetPubkeyRequest {
    const TYPE: CommandType = CommandType::GetPubkey;
    const FRAME_LEN: Option<FrameLen> = None;
}

impl FromWire for GetPubkeyRequest {
    fn from_wire<R: Read>(_: R) -> Result<Self, wire::Error> {
        Ok(Self)
    }
}

impl ToWire for GetPubkeyRequest {
    fn to_wire<W: Write>(&self, _: W) -> Result<(), wire::Error> {
        Ok(())
    }
}

/// The [`GetPubkey`] response.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PubkeyResponse {
    /// The device's Ed25519 verification key.
    pub key: PublicKey,
}

impl Response for PubkeyResponse {
    const TYPE: CommandType = CommandType::Pubkey;

    fn rejected(_: Error) -> Self {
        Self {
            key: [0; PUBLIC_KEY_LEN],
        }
    }
}

impl FromWire for PubkeyResponse {
    fn from_wire<R: Read>(mut r: R) -> Result<Self, wire::Error> {
        let mut key = [0; PUBLIC_KEY_LEN];
        r.read_bytes(&mut key)?;
        Ok(Self { key })
    }
}

impl ToWire for PubkeyResponse {
    fn to_wire<W: Write>(&self, mut w: W) -> Result<(), wire::Error> {
        w.write_bytes(&self.key)?;
        Ok(())
    }
}
