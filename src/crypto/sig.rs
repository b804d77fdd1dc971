// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Ed25519 signature traits.
//!
//! The device holds exactly one signing key, derived from a 32-byte seed
//! (see [`SignerBuilder`]); hosts check its signatures with a [`Verify`].

use crate::Result;

/// The number of bytes in an Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// The number of bytes in an Ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// The number of bytes in an Ed25519 private seed.
pub const SEED_LEN: usize = 32;

/// An Ed25519 public key.
pub type PublicKey = [u8; PUBLIC_KEY_LEN];

/// An Ed25519 signature.
pub type Signature = [u8; SIGNATURE_LEN];

/// An Ed25519 private seed.
pub type Seed = [u8; SEED_LEN];

/// An error returned by a signature operation.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates that a key could not be constructed from the given bytes.
    BadKey,

    /// Indicates that a signature did not verify.
    BadSignature,

    /// Indicates an unspecified, internal error.
    Unspecified,
}

/// A signing engine, already primed with a keypair.
///
/// There is no way to extract the private half of the keypair back out of a
/// `Sign` value.
pub trait Sign {
    /// Uses this signer to create a signature value for `message`.
    fn sign(
        &mut self,
        message: &[u8],
        signature: &mut Signature,
    ) -> Result<(), Error>;
}
impl dyn Sign {} // Ensure object-safe.

/// A [`Sign`] that can also report its public key.
pub trait Keypair: Sign {
    /// Returns the public half of this keypair.
    fn public_key(&self) -> PublicKey;
}

/// A signature-verification engine, already primed with a public key.
pub trait Verify {
    /// Checks `signature` against `message`.
    ///
    /// Returns `Ok(())` only if the signature is valid.
    fn verify(
        &mut self,
        signature: &Signature,
        message: &[u8],
    ) -> Result<(), Error>;
}
impl dyn Verify {} // Ensure object-safe.

/// Creates [`Keypair`]s from private seeds.
pub trait SignerBuilder {
    /// The keypair type built by this builder.
    type Keypair: Keypair;

    /// Deterministically expands `seed` into a keypair.
    fn from_seed(&self, seed: &Seed) -> Result<Self::Keypair, Error>;
}

/// Creates [`Verify`]s from public keys.
pub trait VerifierBuilder {
    /// The verifier type built by this builder.
    type Verifier: Verify;

    /// Creates a verifier for `key`.
    fn from_public_key(&self, key: &PublicKey)
        -> Result<Self::Verifier, Error>;
}
