// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A [`hardware::Entropy`] source based on `ring`.
//!
//! Requires the `std` feature flag to be enabled.

use ring::rand::SecureRandom as _;
use ring::rand::SystemRandom;

use crate::hardware;
use crate::Result;

/// A [`hardware::Entropy`] backed by OS-supplied entropy.
///
/// This stands in for the hardware TRNG when the device runs on a host.
pub struct Trng {
    inner: SystemRandom,
}

impl Trng {
    /// Creates a new entropy source.
    pub fn new() -> Self {
        Self {
            inner: SystemRandom::new(),
        }
    }
}

impl Default for Trng {
    fn default() -> Self {
        Self::new()
    }
}

impl hardware::Entropy for Trng {
    fn entropy_word(&mut self) -> Result<u32, hardware::Error> {
        let mut word = [0; 4];
        match self.inner.fill(&mut word) {
            Ok(()) => Ok(u32::from_le_bytes(word)),
            Err(_) => fail!(hardware::Error::Unavailable),
        }
    }
}
