// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `GetSig` request and response.
//!
//! This module provides the attestation command: the device signs the
//! BLAKE2s digest of every random byte it returned since the previous
//! `GetSig`, and returns both the signature and the digest.
//!
//! The device only answers with a signature if at least one
//! [`GetRandom`](super::GetRandom) succeeded since the last attestation;
//! otherwise the response carries a `BAD` status.

use crate::crypto::hash::Digest;
use crate::crypto::hash::DIGEST_LEN;
use crate::crypto::sig::Signature;
use crate::crypto::sig::SIGNATURE_LEN;
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

/// A command for requesting an attestation signature.
///
/// Corresponds to [`CommandType::GetSig`].
pub enum GetSig {}

impl Command for GetSig {
    type Req = GetSigRequest;
    type Resp = SigResponse;
}

/// The [`GetSig`] request.
///
/// The request has no body, and its frame length is not checked.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct GetSigRequest;

impl Request for GetSigRequest {
    const TYPE: CommandType = CommandType::GetSig;
    const FRAME_LEN: Option<FrameLen> = None;
}

impl FromWire for GetSigRequest {
    fn from_wire<R: Read>(_: R) -> Result<Self, wire::Error> {
        Ok(Self)
    }
}

impl ToWire for GetSigRequest {
    fn to_wire<W: Write>(&self, _: W) -> Result<(), wire::Error> {
        Ok(())
    }
}

/// The [`GetSig`] response.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SigResponse {
    /// Whether an attestation was produced.
    pub status: Status,
    /// The Ed25519 signature over `digest`. All zero unless `status` is
    /// [`Status::Ok`].
    pub signature: Signature,
    /// The BLAKE2s-256 digest of the attested random data. All zero unless
    /// `status` is [`Status::Ok`].
    pub digest: Digest,
}

impl Response for SigResponse {
    const TYPE: CommandType = CommandType::Sig;

    fn rejected(_: Error) -> Self {
        Self {
            status: Status::Bad,
            signature: [0; SIGNATURE_LEN],
            digest: [0; DIGEST_LEN],
        }
    }
}

impl FromWire for SigResponse {
    fn from_wire<R: Read>(mut r: R) -> Result<Self, wire::Error> {
        let status = Status::from_wire(&mut r)?;
        let mut signature = [0; SIGNATURE_LEN];
        let mut digest = [0; DIGEST_LEN];
        if status == Status::Ok {
            r.read_bytes(&mut signature)?;
            r.read_bytes(&mut digest)?;
        }
        Ok(Self {
            status,
            signature,
            digest,
        })
    }
}

impl ToWire for SigResponse {
    fn to_wire<W: Write>(&self, mut w: W) -> Result<(), wire::Error> {
        self.status.to_wire(&mut w)?;
        if self.status == Status::Ok {
            w.write_bytes(&self.signature)?;
            w.write_bytes(&self.digest)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol;

    const SIGNED: &[u8] = &[
        0x00, //
        0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, //
        0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, //
        0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, //
        0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, //
        0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, //
        0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, //
        0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, //
        0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, //
        0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, //
        0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, //
        0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, //
        0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, //
    ];

    round_trip_test! {
        signed_round_trip: {
            bytes: SIGNED,
            value: SigResponse {
                status: Status::Ok,
                signature: [0x11; 64],
                digest: [0x22; 32],
            },
        },
        rejected_round_trip: {
            bytes: &[0x01],
            value: SigResponse::rejected(protocol::Error::NothingToAttest),
        },
    }
}
