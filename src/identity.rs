// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Device identity.
//!
//! The device's Ed25519 keypair is derived from the compartment device
//! identifier, serialized little-endian and used directly as the Ed25519
//! seed. The same CDI therefore always yields the same keypair, and the
//! keypair changes whenever the device, the loaded application, or the
//! user-supplied secret changes.
//!
//! The serialized seed is wiped once the keypair has been built.

use crate::crypto::hash::Digest;
use crate::crypto::sig;
use crate::crypto::sig::PublicKey;
use crate::crypto::sig::Signature;
use crate::crypto::sig::SignerBuilder;
use crate::hardware::CDI_WORDS;
use crate::io::endian;
use crate::Result;

use zeroize::Zeroizing;

/// The device's signing identity.
///
/// The private half of the keypair stays inside `K`; only the public key and
/// signatures can be extracted.
pub struct DeviceIdentity<K> {
    keypair: K,
    public_key: PublicKey,
}

impl<K: sig::Keypair> DeviceIdentity<K> {
    /// Derives the identity for `cdi`.
    pub fn derive<B>(
        builder: &B,
        cdi: &[u32; CDI_WORDS],
    ) -> Result<Self, sig::Error>
    where
        B: SignerBuilder<Keypair = K>,
    {
        let mut seed = Zeroizing::new([0; sig::SEED_LEN]);
        endian::words_to_le(cdi, &mut *seed);
        let keypair = builder.from_seed(&seed)?;
        let public_key = keypair.public_key();
        Ok(Self {
            keypair,
            public_key,
        })
    }

    /// Returns the public verification key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Signs an attestation digest.
    pub fn sign(&mut self, digest: &Digest) -> Result<Signature, sig::Error> {
        let mut signature = [0; sig::SIGNATURE_LEN];
        self.keypair.sign(digest, &mut signature)?;
        Ok(signature)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::ring::ed25519;
    use crate::crypto::sig::Verify as _;
    use testutil::data::ed25519 as vectors;

    fn cdi_from_seed(seed: &[u8; 32]) -> [u32; CDI_WORDS] {
        let mut cdi = [0; CDI_WORDS];
        endian::le_to_words(seed, &mut cdi);
        cdi
    }

    #[test]
    fn cdi_is_the_seed() {
        let cdi = cdi_from_seed(&vectors::SEED);
        let id = DeviceIdentity::derive(&ed25519::Builder::new(), &cdi).unwrap();
        assert_eq!(id.public_key(), &vectors::PUBLIC_KEY);
    }

    #[test]
    fn derivation_is_deterministic() {
        let builder = ed25519::Builder::new();
        let a = DeviceIdentity::derive(&builder, &[1; CDI_WORDS]).unwrap();
        let b = DeviceIdentity::derive(&builder, &[1; CDI_WORDS]).unwrap();
        let c = DeviceIdentity::derive(&builder, &[2; CDI_WORDS]).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_ne!(a.public_key(), c.public_key());
    }

    struct RejectingBuilder;

    impl SignerBuilder for RejectingBuilder {
        type Keypair = ed25519::Keypair;

        fn from_seed(
            &self,
            seed: &sig::Seed,
        ) -> Result<Self::Keypair, sig::Error> {
            assert_eq!(seed, &[0x44; sig::SEED_LEN]);
            fail!(sig::Error::BadKey)
        }
    }

    #[test]
    fn rejected_seed() {
        let cdi = [0x44444444; CDI_WORDS];
        let err = match DeviceIdentity::derive(&RejectingBuilder, &cdi) {
            Ok(_) => panic!("derivation should fail"),
            Err(e) => e,
        };
        assert_eq!(err.into_inner(), sig::Error::BadKey);
    }

    #[test]
    fn signs_digests() {
        let builder = ed25519::Builder::new();
        let mut id = DeviceIdentity::derive(&builder, &[3; CDI_WORDS]).unwrap();
        let digest = [0x5a; 32];
        let signature = id.sign(&digest).unwrap();
        assert_eq!(signature, id.sign(&digest).unwrap());

        let mut verifier = ed25519::Verifier::new(id.public_key());
        verifier.verify(&signature, &digest).unwrap();
    }
}
