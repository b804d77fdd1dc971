// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `tkrand` is the application logic of a random-number generator running on
//! a USB security token, with attestation of everything it hands out.
//!
//! The device does three things:
//! - At boot, it derives a per-device Ed25519 identity from the hardware
//!   "compartment device identifier" (CDI); see [`identity`].
//! - On request, it produces random bytes from a hash-based deterministic
//!   random bit generator seeded and periodically refreshed by the hardware
//!   TRNG; see [`drbg`].
//! - On request, it signs a running BLAKE2s digest of all random bytes it
//!   emitted since the previous signature; see [`attest`].
//!
//! The request/response "business logic" lives in [`server`]. Everything the
//! device needs from the outside world (entropy, the CDI register, the status
//! LED, the serial link, and the hash and signature primitives) is plugged in
//! through the traits in [`hardware`], [`net`] and [`crypto`], so that the
//! whole device can run on a host against deterministic fakes.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

#[cfg(feature = "log")]
extern crate log as __raw_log;

#[macro_use]
mod debug;
pub use debug::Error;

/// A [`Result`] whose error is a wrapped [`Error`].
///
/// [`Result`]: core::result::Result
pub type Result<T, E> = core::result::Result<T, Error<E>>;

#[macro_use]
pub mod protocol;

pub mod attest;
pub mod crypto;
pub mod drbg;
pub mod hardware;
pub mod identity;
pub mod io;
pub mod net;
pub mod server;
