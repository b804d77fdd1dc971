// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Application protocol messages.
//!
//! An application message (also called a "command") sits inside a single
//! transport frame (see [`net::frame`]) and consists of two parts:
//! - A one-byte *command type*, which also tells requests and responses
//!   apart: requests use odd codes, and each response uses the code after
//!   its request's.
//! - A *body*, which is interpreted according to the command type.
//!
//! Bodies use fixed offsets; multi-byte integers are little-endian. Responses
//! are always sent in a frame whose size is fixed by the response type, so
//! a response body is zero-padded up to that size. See
//! [`CommandType::response_len()`].
//!
//! Requests that fail a precondition are still answered. Each [`Response`]
//! type knows how to represent a rejected request (usually a `BAD` status
//! byte and no further payload; see [`Response::rejected()`]).
//!
//! [`net::frame`]: crate::net::frame

use crate::net::frame::FrameLen;
use crate::protocol::wire::FromWire;
use crate::protocol::wire::ToWire;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[macro_use]
mod macros;

#[macro_use]
pub mod wire;

pub mod get_pubkey;
pub use get_pubkey::GetPubkey;

pub mod get_random;
pub use get_random::GetRandom;

pub mod get_sig;
pub use get_sig::GetSig;

pub mod name_version;
pub use name_version::GetNameVersion;

/// The largest number of random bytes a single [`GetRandom`] request may ask
/// for: a 128-byte frame minus the response code and the status byte.
pub const RANDOM_PAYLOAD_MAX: usize = 128 - (1 + 1);

/// An application command.
///
/// A command is identified by a unique request type and a unique response
/// type, each of which has a corresponding [`CommandType`].
///
/// This trait is not implemented by any of the request or response types, but
/// is intead implemented by uninhabited types that represent pairs of requests
/// and responses, for use in generic programming.
pub trait Command {
    /// The unique request type for this `Command`.
    type Req: Request;
    /// The unique response type for this `Command`.
    type Resp: Response;
}

/// An application request.
///
/// See [`Command`].
pub trait Request: FromWire + ToWire {
    /// The unique [`CommandType`] for this `Request`.
    const TYPE: CommandType;

    /// The frame length a well-formed request must arrive in, if the
    /// device checks it at all.
    const FRAME_LEN: Option<FrameLen>;
}

/// An application response.
///
/// See [`Command`].
pub trait Response: FromWire + ToWire {
    /// The unique [`CommandType`] for this `Response`.
    const TYPE: CommandType;

    /// Builds the response sent when the request was rejected with `err`.
    fn rejected(err: Error) -> Self;
}

/// A reason for rejecting a request.
///
/// None of these are fatal: they are reported to the peer through the
/// response, and the device carries on with the next command.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// The request arrived in a frame of the wrong length.
    BadLength,
    /// A field of the request was outside of its permitted range.
    OutOfRange,
    /// An attestation was requested, but no random data was emitted since
    /// the last one.
    NothingToAttest,
    /// The device failed to carry out a well-formed request, such as when
    /// its entropy source or hash engine reported an error.
    Internal,
}

wire_enum! {
    /// An application command type.
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum CommandType: u8 {
        /// A request for the application name and version.
        ///
        /// See [`GetNameVersion`].
        GetNameVersion = 0x01,
        /// The response to [`CommandType::GetNameVersion`].
        NameVersion = 0x02,
        /// A request for random bytes.
        ///
        /// See [`GetRandom`].
        GetRandom = 0x03,
        /// The response to [`CommandType::GetRandom`].
        Random = 0x04,
        /// A request for the device's public key.
        ///
        /// See [`GetPubkey`].
        GetPubkey = 0x05,
        /// The response to [`CommandType::GetPubkey`].
        Pubkey = 0x06,
        /// A request for a signature over all random data emitted since the
        /// last signature.
        ///
        /// See [`GetSig`].
        GetSig = 0x07,
        /// The response to [`CommandType::GetSig`].
        Sig = 0x08,
        /// The response to any command the device does not recognize.
        UnknownCommand = 0xff,
    }
}

impl CommandType {
    /// Returns whether this command type is sent by the host, rather than by
    /// the device.
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Self::GetNameVersion | Self::GetRandom | Self::GetPubkey | Self::GetSig
        )
    }

    /// Returns the frame length used for a response of this type.
    ///
    /// Returns `None` for request types.
    pub fn response_len(self) -> Option<FrameLen> {
        match self {
            Self::NameVersion => Some(FrameLen::Len32),
            Self::Random | Self::Pubkey | Self::Sig => Some(FrameLen::Len128),
            Self::UnknownCommand => Some(FrameLen::Len1),
            _ => None,
        }
    }
}

wire_enum! {
    /// The status byte leading the body of a response that can fail.
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum Status: u8 {
        /// The request was carried out.
        Ok = 0x00,
        /// The request was rejected.
        Bad = 0x01,
    }
}

/// The response sent for a command type the device does not recognize.
///
/// Its body is empty; the frame carries only the response code.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UnknownCommandResponse;

impl Response for UnknownCommandResponse {
    const TYPE: CommandType = CommandType::UnknownCommand;

    fn rejected(_: Error) -> Self {
        Self
    }
}

impl FromWire for UnknownCommandResponse {
    fn from_wire<R: crate::io::Read>(_: R) -> Result<Self, wire::Error> {
        Ok(Self)
    }
}

impl ToWire for UnknownCommandResponse {
    fn to_wire<W: crate::io::Write>(&self, _: W) -> Result<(), wire::Error> {
        Ok(())
    }
}
