// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Attestation of emitted randomness.
//!
//! Every random byte the device hands out is also written into a running
//! BLAKE2s digest. When the host asks for an attestation, the digest is
//! finalized (to be signed by the device identity) and a fresh one is
//! started, so each attestation covers exactly the bytes emitted since the
//! previous one.

use crate::crypto::hash;
use crate::crypto::hash::Digest;
use crate::Result;

/// An error returned by an [`Accumulator`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates that nothing was absorbed since the last digest.
    NothingPending,
    /// Indicates a failure of the hash engine.
    Hash(hash::Error),
}

impl From<hash::Error> for Error {
    fn from(e: hash::Error) -> Self {
        Self::Hash(e)
    }
}

debug_from!(Error => hash::Error);

/// A running digest over emitted random data, plus a flag recording whether
/// anything was absorbed into it.
pub struct Accumulator<H> {
    engine: H,
    pending: bool,
}

impl<H: hash::Engine> Accumulator<H> {
    /// Creates an empty accumulator, starting a digest on `engine`.
    pub fn new(mut engine: H) -> Result<Self, hash::Error> {
        engine.start_raw()?;
        Ok(Self {
            engine,
            pending: false,
        })
    }

    /// Returns whether data was absorbed since the last digest was taken.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Adds emitted data to the running digest.
    pub fn absorb(&mut self, data: &[u8]) -> Result<(), hash::Error> {
        self.engine.write_raw(data)?;
        self.pending = true;
        Ok(())
    }

    /// Finalizes the running digest and starts a new, empty one.
    ///
    /// Fails if nothing was absorbed since the last call. The pending flag
    /// is cleared either way.
    pub fn take_digest(&mut self) -> Result<Digest, Error> {
        let pending = core::mem::replace(&mut self.pending, false);
        check!(pending, Error::NothingPending);

        let mut digest = [0; hash::DIGEST_LEN];
        self.engine.finish_raw(&mut digest)?;
        self.engine.start_raw()?;
        Ok(digest)
    }
}
