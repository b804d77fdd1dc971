// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The device's "server".
//!
//! The server is the request -> response logic running on the device: it
//! pulls frames off a [`HostPort`], decides whether they are meant for this
//! application, and answers the ones that are. See [`RandomApp`].
//!
//! [`HostPort`]: crate::net::host::HostPort

use crate::attest;
use crate::crypto::hash;
use crate::crypto::sig;
use crate::drbg;
use crate::net;
use crate::protocol::wire;

mod handler;

pub mod random_app;
pub use random_app::Options;
pub use random_app::Outcome;
pub use random_app::RandomApp;
pub use random_app::State;
pub use random_app::NAME_VERSION;

/// An error returned by the server.
///
/// Requests that fail a precondition are *not* errors: they are answered
/// with a rejection and the server carries on. These are the failures that
/// keep the server from answering at all.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates an error originating from a network connection.
    Network(net::Error),

    /// Represents a failure during marshalling.
    Wire(wire::Error),

    /// Indicates that the device identity could not be derived.
    Identity(sig::Error),

    /// Indicates that the random bit generator could not be seeded.
    Drbg(drbg::Error),

    /// Indicates that the attestation digest could not be started.
    Attest(attest::Error),
}

impl From<net::Error> for Error {
    fn from(e: net::Error) -> Error {
        Error::Network(e)
    }
}

impl From<wire::Error> for Error {
    fn from(e: wire::Error) -> Error {
        Error::Wire(e)
    }
}

impl From<sig::Error> for Error {
    fn from(e: sig::Error) -> Error {
        Error::Identity(e)
    }
}

impl From<drbg::Error> for Error {
    fn from(e: drbg::Error) -> Error {
        Error::Drbg(e)
    }
}

impl From<hash::Error> for Error {
    fn from(e: hash::Error) -> Error {
        Error::Attest(attest::Error::Hash(e))
    }
}

// Server errors are reported to the integration as-is; this unwraps the
// logged errors coming out of lower layers.
impl<E: Into<Error>> From<crate::Error<E>> for Error {
    fn from(e: crate::Error<E>) -> Error {
        e.into_inner().into()
    }
}
