// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Implementations of [`crypto::sig`] based on `ring`'s Ed25519.
//!
//! [`crypto::sig`]: ../../sig/index.html

use ring::signature;
use ring::signature::KeyPair as _;

use crate::crypto::sig;
use crate::crypto::sig::PublicKey;
use crate::crypto::sig::Seed;
use crate::crypto::sig::Signature;
use crate::Result;

/// A `ring`-based [`sig::SignerBuilder`].
#[derive(Default)]
pub struct Builder {
    _priv: (),
}

impl Builder {
    /// Creates a new `Builder`.
    pub fn new() -> Self {
        Self { _priv: () }
    }
}

impl sig::SignerBuilder for Builder {
    type Keypair = Keypair;

    fn from_seed(&self, seed: &Seed) -> Result<Keypair, sig::Error> {
        let keypair = match signature::Ed25519KeyPair::from_seed_unchecked(seed)
        {
            Ok(k) => k,
            Err(_) => return fail!(sig::Error::BadKey),
        };
        let mut public = [0; sig::PUBLIC_KEY_LEN];
        public.copy_from_slice(keypair.public_key().as_ref());
        Ok(Keypair { keypair, public })
    }
}

impl sig::VerifierBuilder for Builder {
    type Verifier = Verifier;

    fn from_public_key(&self, key: &PublicKey) -> Result<Verifier, sig::Error> {
        Ok(Verifier { key: *key })
    }
}

/// A `ring`-based [`sig::Keypair`].
pub struct Keypair {
    keypair: signature::Ed25519KeyPair,
    public: PublicKey,
}

impl sig::Sign for Keypair {
    fn sign(
        &mut self,
        message: &[u8],
        out: &mut Signature,
    ) -> Result<(), sig::Error> {
        out.copy_from_slice(self.keypair.sign(message).as_ref());
        Ok(())
    }
}

impl sig::Keypair for Keypair {
    fn public_key(&self) -> PublicKey {
        self.public
    }
}

/// A `ring`-based [`sig::Verify`].
pub struct Verifier {
    key: PublicKey,
}

impl Verifier {
    /// Creates a new `Verifier` for `key`.
    pub fn new(key: &PublicKey) -> Self {
        Self { key: *key }
    }
}

impl sig::Verify for Verifier {
    fn verify(
        &mut self,
        sig: &Signature,
        message: &[u8],
    ) -> Result<(), sig::Error> {
        let key = signature::UnparsedPublicKey::new(&signature::ED25519, &self.key);
        match key.verify(message, sig) {
            Ok(()) => Ok(()),
            Err(_) => fail!(sig::Error::BadSignature),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::sig::Keypair as _;
    use crate::crypto::sig::Sign as _;
    use crate::crypto::sig::SignerBuilder as _;
    use crate::crypto::sig::Verify as _;
    use testutil::data::ed25519;

    #[test]
    fn rfc8032_vector() {
        let mut keypair = Builder::new().from_seed(&ed25519::SEED).unwrap();
        assert_eq!(keypair.public_key(), ed25519::PUBLIC_KEY);

        let mut sig = [0; sig::SIGNATURE_LEN];
        keypair.sign(ed25519::MESSAGE, &mut sig).unwrap();
        assert_eq!(&sig[..], &ed25519::SIGNATURE[..]);

        let mut verifier = Verifier::new(&ed25519::PUBLIC_KEY);
        verifier.verify(&sig, ed25519::MESSAGE).unwrap();
    }

    #[test]
    fn tampered_message() {
        let mut keypair = Builder::new().from_seed(&[7; 32]).unwrap();
        let mut sig = [0; sig::SIGNATURE_LEN];
        keypair.sign(b"random bytes", &mut sig).unwrap();

        let mut verifier = Verifier::new(&keypair.public_key());
        verifier.verify(&sig, b"random bytes").unwrap();
        assert_eq!(
            verifier.verify(&sig, b"random bytez").unwrap_err().into_inner(),
            sig::Error::BadSignature
        );
    }
}
