// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Pluggable cryptograpy traits.
//!
//! The device needs a BLAKE2s hash and an Ed25519 signer. This module
//! provides object-safe traits that abstract over those operations, so that
//! an integration can back them with whatever its platform offers.
//!
//! It is recommended to not import the traits in this module directly, since
//! a lot of them have the same name. Instead, use imports like
//! `use tkrand::crypto::hash;` and partially-qualified names like
//! `hash::Engine`.
//!
//! Software implementations are provided in [`blake2`] (always available)
//! and under the [`ring` module], based on the [`ring`] crate. The presence
//! of the latter is controlled by the `ring` feature flag; some operations
//! require `std` as well.
//!
//! [`ring` module]: ring/index.html

pub mod blake2;
pub mod hash;
pub mod sig;

#[cfg(feature = "ring")]
pub mod ring;
