// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of [`hash::Engine`] based on the `blake2` crate.
//!
//! Unlike the [`ring`](super::ring) module, this one is always available,
//! since the device itself needs a BLAKE2s implementation.

use blake2::Blake2s256;
use blake2::Digest as _;

use crate::crypto::hash;
use crate::crypto::hash::Digest;
use crate::Result;

/// A software BLAKE2s-256 [`hash::Engine`].
#[derive(Default, Clone)]
pub struct Engine {
    state: Option<Blake2s256>,
}

impl Engine {
    /// Creates a new, idle `Engine`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl hash::Engine for Engine {
    fn start_raw(&mut self) -> Result<(), hash::Error> {
        self.state = Some(Blake2s256::new());
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), hash::Error> {
        match &mut self.state {
            Some(state) => {
                state.update(data);
                Ok(())
            }
            None => fail!(hash::Error::Idle),
        }
    }

    fn finish_raw(&mut self, out: &mut Digest) -> Result<(), hash::Error> {
        match self.state.take() {
            Some(state) => {
                out.copy_from_slice(&state.finalize());
                Ok(())
            }
            None => fail!(hash::Error::Idle),
        }
    }
}
