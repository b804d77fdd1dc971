// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Offline verification of attestations.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tkrand::crypto::blake2;
use tkrand::crypto::hash;
use tkrand::crypto::hash::Digest;
use tkrand::crypto::hash::EngineExt as _;
use tkrand::crypto::ring::ed25519;
use tkrand::crypto::sig::PublicKey;
use tkrand::crypto::sig::Signature;
use tkrand::crypto::sig::Verify as _;

use crate::util;

/// Verifies a signature over saved random data.
#[derive(structopt::StructOpt)]
pub struct Verify {
    /// The random data; hex-encoded unless `--binary` is passed.
    #[structopt(parse(from_os_str))]
    data_file: PathBuf,
    /// A hex-encoded, 64-byte Ed25519 signature.
    #[structopt(parse(from_os_str))]
    sig_file: PathBuf,
    /// A hex-encoded, 32-byte Ed25519 public key.
    #[structopt(parse(from_os_str))]
    pubkey_file: PathBuf,
    /// Read the random data as raw bytes.
    #[structopt(short = "b", long = "binary")]
    binary: bool,
}

/// Why an attestation failed to verify.
#[derive(Debug, PartialEq, Eq)]
pub enum Failure {
    /// The digest did not match the data.
    DigestMismatch,
    /// The signature did not match the digest.
    BadSignature,
    /// The data could not be hashed.
    Hash(hash::Error),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DigestMismatch => write!(f, "digest does not match data"),
            Self::BadSignature => write!(f, "signature verification failed"),
            Self::Hash(e) => write!(f, "could not hash data: {:?}", e),
        }
    }
}

/// Computes the digest an attestation over `data` signs.
pub fn digest_of(data: &[u8]) -> Result<Digest, Failure> {
    let mut digest = [0; hash::DIGEST_LEN];
    blake2::Engine::new()
        .contiguous_hash(data, &mut digest)
        .map_err(|e| Failure::Hash(e.into_inner()))?;
    Ok(digest)
}

/// Checks that `signature` is `pubkey`'s signature over `digest`.
pub fn check_signature(
    digest: &Digest,
    signature: &Signature,
    pubkey: &PublicKey,
) -> Result<(), Failure> {
    ed25519::Verifier::new(pubkey)
        .verify(signature, digest)
        .map_err(|_| Failure::BadSignature)
}

/// Checks that `digest` covers exactly `data`, and that `signature` is
/// `pubkey`'s signature over it.
pub fn check_attestation(
    data: &[u8],
    digest: &Digest,
    signature: &Signature,
    pubkey: &PublicKey,
) -> Result<(), Failure> {
    if &digest_of(data)? != digest {
        return Err(Failure::DigestMismatch);
    }
    check_signature(digest, signature, pubkey)
}

impl Verify {
    /// Runs the subcommand, returning the process exit status.
    pub fn run(self) -> i32 {
        let data = if self.binary {
            check!(fs::read(&self.data_file), "reading {:?}", self.data_file)
        } else {
            check!(
                util::read_hex_file(&self.data_file),
                "reading {:?}",
                self.data_file
            )
        };
        let signature = check!(
            util::read_hex_file(&self.sig_file),
            "reading {:?}",
            self.sig_file
        );
        let signature: Signature =
            check!(util::fixed(&signature), "reading signature");
        let pubkey = check!(
            util::read_hex_file(&self.pubkey_file),
            "reading {:?}",
            self.pubkey_file
        );
        let pubkey: PublicKey =
            check!(util::fixed(&pubkey), "reading public key");

        eprintln!("Verifying signature ...");
        let result = digest_of(&data)
            .and_then(|digest| check_signature(&digest, &signature, &pubkey));
        match result {
            Ok(()) => {
                eprintln!("Signature verified.");
                0
            }
            Err(e) => {
                eprintln!("error verifying: {}", e);
                1
            }
        }
    }
}
