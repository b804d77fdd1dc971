// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Hash-based deterministic random bit generator.
//!
//! The generator keeps a 512-bit state, made of sixteen 32-bit words:
//!
//! ```text
//!   words 0..8    the previous output digest (initially the CDI)
//!   words 8..16   TRNG entropy, refreshed every `RESEED_INTERVAL` rounds
//! ```
//!
//! plus a 64-bit round counter, seeded from the TRNG. Each round hashes the
//! serialized state with BLAKE2s-256, hands out the first half of the digest,
//! and then updates the state:
//! - the digest replaces words `0..8`;
//! - the counter is incremented, and its high and low halves are *added* to
//!   words 14 and 15 respectively;
//! - every [`RESEED_INTERVAL`] rounds, words `8..16` are overwritten with
//!   fresh TRNG output.
//!
//! State words are serialized little-endian before hashing.

use crate::crypto::hash;
use crate::crypto::hash::Digest;
use crate::crypto::hash::EngineExt as _;
use crate::hardware;
use crate::hardware::Entropy;
use crate::hardware::CDI_WORDS;
use crate::io::endian;
use crate::Result;

use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

/// The number of 32-bit words in the generator state.
pub const STATE_WORDS: usize = 16;

/// The number of rounds between two reseeds.
pub const RESEED_INTERVAL: u32 = 1000;

/// The number of output bytes produced per round.
pub const BLOCK_LEN: usize = 16;

/// An error returned by the generator.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates that output was requested before [`Drbg::init()`]
    /// succeeded.
    NotInitialized,
    /// Indicates a request for zero bytes.
    InvalidRequest,
    /// Indicates a failure of the hash engine.
    Hash(hash::Error),
    /// Indicates a failure of the entropy source.
    Entropy(hardware::Error),
}

impl From<hash::Error> for Error {
    fn from(e: hash::Error) -> Self {
        Self::Hash(e)
    }
}

impl From<hardware::Error> for Error {
    fn from(e: hardware::Error) -> Self {
        Self::Entropy(e)
    }
}

debug_from!(Error => hash::Error, hardware::Error);

/// The secret part of the generator.
///
/// Wiped when dropped, including when [`Drbg::init()`] replaces it.
#[derive(Zeroize, ZeroizeOnDrop)]
struct State {
    words: [u32; STATE_WORDS],
    digest: Digest,
    ctr_lsb: u32,
    ctr_msb: u32,
    reseed_ctr: u32,
}

impl State {
    /// Hashes the serialized state into `self.digest`.
    fn mix(&mut self, hash: &mut dyn hash::Engine) -> Result<(), Error> {
        let mut bytes = [0; STATE_WORDS * 4];
        endian::words_to_le(&self.words, &mut bytes);
        let result = hash.contiguous_hash(&bytes, &mut self.digest);
        bytes.zeroize();
        result?;
        Ok(())
    }

    /// Advances the state by one round.
    fn update(&mut self, trng: &mut dyn Entropy) -> Result<(), Error> {
        endian::le_to_words(&self.digest, &mut self.words[..8]);

        self.ctr_lsb = self.ctr_lsb.wrapping_add(1);
        if self.ctr_lsb == 0 {
            self.ctr_msb = self.ctr_msb.wrapping_add(1);
        }
        self.words[14] = self.words[14].wrapping_add(self.ctr_msb);
        self.words[15] = self.words[15].wrapping_add(self.ctr_lsb);

        self.reseed_ctr += 1;
        if self.reseed_ctr == RESEED_INTERVAL {
            trace!("reseeding generator");
            for word in &mut self.words[8..] {
                *word = trng.entropy_word()?;
            }
            self.reseed_ctr = 0;
        }
        Ok(())
    }
}

/// A deterministic random bit generator.
///
/// A `Drbg` starts out uninitialized, and refuses to produce output until
/// [`Drbg::init()`] has been called.
#[derive(Default)]
pub struct Drbg {
    state: Option<State>,
}

impl Drbg {
    /// Creates a new, uninitialized generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether [`Drbg::init()`] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Seeds the generator from the CDI and ten TRNG words.
    ///
    /// Words are drawn from `trng` in this order: eight entropy words for
    /// the state, then the low and then the high half of the counter.
    /// The seeded state is mixed and advanced once before any output is
    /// produced.
    ///
    /// Calling this again reseeds the generator from scratch. If drawing
    /// entropy fails, the generator is left uninitialized.
    pub fn init(
        &mut self,
        cdi: &[u32; CDI_WORDS],
        trng: &mut dyn Entropy,
        hash: &mut dyn hash::Engine,
    ) -> Result<(), Error> {
        self.state = None;

        let mut state = State {
            words: [0; STATE_WORDS],
            digest: [0; hash::DIGEST_LEN],
            ctr_lsb: 0,
            ctr_msb: 0,
            reseed_ctr: 0,
        };
        for (i, &cdi_word) in cdi.iter().enumerate() {
            state.words[i] = cdi_word;
            state.words[i + 8] = trng.entropy_word()?;
        }
        state.ctr_lsb = trng.entropy_word()?;
        state.ctr_msb = trng.entropy_word()?;
        state.mix(hash)?;
        state.update(trng)?;

        self.state = Some(state);
        info!("generator initialized");
        Ok(())
    }

    /// Fills `out` with random bytes.
    ///
    /// Output is produced [`BLOCK_LEN`] bytes per round; a trailing partial
    /// block is truncated, but still costs a full round.
    pub fn generate(
        &mut self,
        out: &mut [u8],
        trng: &mut dyn Entropy,
        hash: &mut dyn hash::Engine,
    ) -> Result<(), Error> {
        let state = match &mut self.state {
            Some(state) => state,
            None => return fail!(Error::NotInitialized),
        };
        check!(!out.is_empty(), Error::InvalidRequest);

        for block in out.chunks_mut(BLOCK_LEN) {
            state.mix(hash)?;
            block.copy_from_slice(&state.digest[..block.len()]);
            state.update(trng)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::blake2;
    use crate::hardware::fake;

    const CDI: [u32; CDI_WORDS] = [
        0x03020100, 0x07060504, 0x0b0a0908, 0x0f0e0d0c, //
        0x13121110, 0x17161514, 0x1b1a1918, 0x1f1e1d1c, //
    ];

    fn seeded(start: u32) -> (Drbg, fake::Entropy, blake2::Engine) {
        let mut trng = fake::Entropy::counting_from(start);
        let mut hash = blake2::Engine::new();
        let mut drbg = Drbg::new();
        drbg.init(&CDI, &mut trng, &mut hash).unwrap();
        (drbg, trng, hash)
    }

    fn blake2s_words(words: &[u32; STATE_WORDS]) -> Digest {
        let mut bytes = [0; STATE_WORDS * 4];
        endian::words_to_le(words, &mut bytes);
        let mut digest = Digest::default();
        blake2::Engine::new()
            .contiguous_hash(&bytes, &mut digest)
            .unwrap();
        digest
    }

    #[test]
    fn uninitialized() {
        let mut trng = fake::Entropy::counting_from(0);
        let mut hash = blake2::Engine::new();
        let mut drbg = Drbg::new();
        assert!(!drbg.is_initialized());

        let mut out = [0; 16];
        let err = drbg.generate(&mut out, &mut trng, &mut hash).unwrap_err();
        assert_eq!(err.into_inner(), Error::NotInitialized);
        assert_eq!(trng.drawn(), 0);
    }

    #[test]
    fn empty_request() {
        let (mut drbg, mut trng, mut hash) = seeded(0);
        let err = drbg.generate(&mut [], &mut trng, &mut hash).unwrap_err();
        assert_eq!(err.into_inner(), Error::InvalidRequest);
    }

    #[test]
    fn init_draws_ten_words() {
        let (drbg, trng, _) = seeded(100);
        assert!(drbg.is_initialized());
        assert_eq!(trng.drawn(), 10);
    }

    #[test]
    fn broken_entropy_leaves_uninitialized() {
        let mut hash = blake2::Engine::new();
        let mut drbg = Drbg::new();
        let err = drbg
            .init(&CDI, &mut fake::BrokenEntropy, &mut hash)
            .unwrap_err();
        assert_eq!(
            err.into_inner(),
            Error::Entropy(hardware::Error::Unavailable)
        );
        assert!(!drbg.is_initialized());
    }

    #[test]
    fn first_block_matches_model() {
        let start = 0x1000;
        let (mut drbg, mut trng, mut hash) = seeded(start);

        let mut words = [0; STATE_WORDS];
        for i in 0..8 {
            words[i] = CDI[i];
            words[i + 8] = start + i as u32;
        }
        let ctr_lsb = start + 8;
        let ctr_msb = start + 9;

        let first = blake2s_words(&words);
        endian::le_to_words(&first, &mut words[..8]);
        words[14] = words[14].wrapping_add(ctr_msb);
        words[15] = words[15].wrapping_add(ctr_lsb + 1);
        let expected = blake2s_words(&words);

        let mut out = [0; 20];
        drbg.generate(&mut out, &mut trng, &mut hash).unwrap();
        assert_eq!(&out[..16], &expected[..16]);
    }

    #[test]
    fn deterministic_given_inputs() {
        let (mut a, mut trng_a, mut hash) = seeded(7);
        let (mut b, mut trng_b, _) = seeded(7);
        let (mut c, mut trng_c, _) = seeded(8);

        let mut out_a = [0; 100];
        let mut out_b = [0; 100];
        let mut out_c = [0; 100];
        a.generate(&mut out_a, &mut trng_a, &mut hash).unwrap();
        b.generate(&mut out_b, &mut trng_b, &mut hash).unwrap();
        c.generate(&mut out_c, &mut trng_c, &mut hash).unwrap();
        assert_eq!(&out_a[..], &out_b[..]);
        assert_ne!(&out_a[..], &out_c[..]);
    }

    #[test]
    fn partial_block_costs_full_round() {
        let (mut a, mut trng_a, mut hash) = seeded(0);
        let (mut b, mut trng_b, _) = seeded(0);

        let mut short = [0; 5];
        let mut full = [0; 16];
        a.generate(&mut short, &mut trng_a, &mut hash).unwrap();
        b.generate(&mut full, &mut trng_b, &mut hash).unwrap();
        assert_eq!(&short[..], &full[..5]);

        a.generate(&mut short, &mut trng_a, &mut hash).unwrap();
        b.generate(&mut full, &mut trng_b, &mut hash).unwrap();
        assert_eq!(&short[..], &full[..5]);
    }

    #[test]
    fn no_repeated_blocks() {
        let (mut drbg, mut trng, mut hash) = seeded(0);
        let mut out = vec![0; 64 * BLOCK_LEN];
        drbg.generate(&mut out, &mut trng, &mut hash).unwrap();

        let mut blocks = out.chunks(BLOCK_LEN).collect::<Vec<_>>();
        blocks.sort();
        blocks.dedup();
        assert_eq!(blocks.len(), 64);
    }

    #[test]
    fn reseeds_every_interval() {
        let (mut drbg, mut trng, mut hash) = seeded(0);

        // `init()` already advanced the state once.
        let rounds_left = RESEED_INTERVAL as usize - 1;
        let mut out = vec![0; (rounds_left - 1) * BLOCK_LEN];
        drbg.generate(&mut out, &mut trng, &mut hash).unwrap();
        assert_eq!(trng.drawn(), 10);

        let next_word = trng.peek();
        drbg.generate(&mut [0; 1], &mut trng, &mut hash).unwrap();
        assert_eq!(trng.drawn(), 18);

        let state = drbg.state.as_ref().unwrap();
        assert_eq!(state.reseed_ctr, 0);
        let reseeded = (0..8).map(|i| next_word + i).collect::<Vec<_>>();
        assert_eq!(&state.words[8..], &reseeded[..]);

        let mut out = vec![0; RESEED_INTERVAL as usize * BLOCK_LEN];
        drbg.generate(&mut out, &mut trng, &mut hash).unwrap();
        assert_eq!(trng.drawn(), 26);
    }

    #[test]
    fn state_wipes_itself() {
        let (drbg, _, _) = seeded(0x55);
        let mut state = drbg.state.unwrap();
        assert!(state.words.iter().any(|&w| w != 0));
        assert!(state.digest.iter().any(|&b| b != 0));

        state.zeroize();
        assert_eq!(state.words, [0; STATE_WORDS]);
        assert_eq!(state.digest, [0; hash::DIGEST_LEN]);
        assert_eq!(state.ctr_lsb, 0);
        assert_eq!(state.ctr_msb, 0);
        assert_eq!(state.reseed_ctr, 0);
    }

    #[test]
    fn reinit_replaces_state() {
        let (mut drbg, mut trng, mut hash) = seeded(0);
        let mut before = [0; 32];
        drbg.generate(&mut before, &mut trng, &mut hash).unwrap();

        let err = drbg
            .init(&CDI, &mut fake::BrokenEntropy, &mut hash)
            .unwrap_err();
        assert_eq!(
            err.into_inner(),
            Error::Entropy(hardware::Error::Unavailable)
        );
        assert!(!drbg.is_initialized());

        drbg.init(&CDI, &mut trng, &mut hash).unwrap();
        let mut after = [0; 32];
        drbg.generate(&mut after, &mut trng, &mut hash).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn counter_carries_into_high_half() {
        let mut trng = fake::Entropy::counting_from(0);
        let mut state = State {
            words: [0; STATE_WORDS],
            digest: [0; hash::DIGEST_LEN],
            ctr_lsb: u32::MAX,
            ctr_msb: 5,
            reseed_ctr: 0,
        };
        state.words[15] = 9;
        state.update(&mut trng).unwrap();

        assert_eq!((state.ctr_msb, state.ctr_lsb), (6, 0));
        assert_eq!(state.words[14], 6);
        assert_eq!(state.words[15], 9);
    }

    #[test]
    fn counter_mixing_is_additive() {
        let mut trng = fake::Entropy::counting_from(0);
        let mut state = State {
            words: [u32::MAX; STATE_WORDS],
            digest: [0xff; hash::DIGEST_LEN],
            ctr_lsb: 1,
            ctr_msb: 2,
            reseed_ctr: 0,
        };
        state.update(&mut trng).unwrap();

        assert_eq!(state.words[14], 1);
        assert_eq!(state.words[15], 1);
        assert_eq!(state.words[13], u32::MAX);
        assert_eq!(trng.drawn(), 0);
    }
}
