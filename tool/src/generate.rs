// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The `generate` subcommand.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use tkrand::crypto::hash::Digest;
use tkrand::crypto::sig::PublicKey;
use tkrand::crypto::sig::Signature;
use tkrand::net::device::DevicePort;

use crate::client::Client;
use crate::client::Error;
use crate::sim;
use crate::sim::SimDevice;
use crate::util;
use crate::verify;

/// Fetches random data from a simulated device.
#[derive(structopt::StructOpt)]
pub struct Generate {
    /// The number of random bytes to fetch.
    bytes: usize,
    /// Fetch the public key and attestation, print them, and verify them.
    #[structopt(short = "s", long = "signature")]
    signature: bool,
    /// Print the attestation as JSON instead of text.
    #[structopt(long, requires = "signature")]
    json: bool,
    /// Write the data to this file as raw bytes, instead of to stdout as hex.
    #[structopt(short = "f", long = "file", parse(from_os_str))]
    file: Option<PathBuf>,
    /// A hex-encoded, 32-byte compartment identifier for the device.
    #[structopt(long, conflicts_with = "uss-file")]
    cdi: Option<String>,
    /// A file whose contents are mixed into the device's identity.
    #[structopt(long = "uss-file", parse(from_os_str))]
    uss_file: Option<PathBuf>,
}

/// An attestation, as printed by `generate --signature --json`.
#[derive(Serialize, Debug, PartialEq, Eq)]
struct Attestation {
    public_key: String,
    signature: String,
    digest: String,
}

impl Attestation {
    fn new(
        public_key: &PublicKey,
        signature: &Signature,
        digest: &Digest,
    ) -> Self {
        Self {
            public_key: hex::encode(public_key),
            signature: hex::encode(&signature[..]),
            digest: hex::encode(digest),
        }
    }
}

/// The result of one `generate` session.
struct Session {
    data: Vec<u8>,
    signature: Signature,
    digest: Digest,
    public_key: Option<PublicKey>,
}

/// Fetches `bytes` of random data, and then always takes the attestation
/// so the device starts the next session with an empty digest.
fn run_session<P: DevicePort>(
    client: &mut Client<P>,
    bytes: usize,
    want_pubkey: bool,
) -> Result<Session, Error> {
    client.check_app()?;
    let data = client.get_random(bytes)?;
    let (signature, digest) = client.get_sig()?;
    let public_key = if want_pubkey {
        Some(client.get_pubkey()?)
    } else {
        None
    };
    Ok(Session {
        data,
        signature,
        digest,
        public_key,
    })
}

impl Generate {
    /// Runs the subcommand, returning the process exit status.
    pub fn run(self) -> i32 {
        if self.bytes == 0 {
            eprintln!("error: must generate at least one byte");
            return 2;
        }

        let cdi = match (&self.cdi, &self.uss_file) {
            (Some(cdi), _) => {
                let bytes = check!(util::decode_hex(cdi), "parsing --cdi");
                let bytes: [u8; 32] =
                    check!(util::fixed(&bytes), "parsing --cdi");
                sim::cdi_from_bytes(&bytes)
            }
            (None, uss_file) => {
                let uss = uss_file
                    .as_ref()
                    .map(|path| check!(fs::read(path), "reading {:?}", path));
                check!(sim::derive_cdi(uss.as_deref()), "deriving CDI")
            }
        };

        let (device, port) = check!(SimDevice::spawn(cdi), "booting device");
        let mut client = Client::new(port);
        let session = run_session(&mut client, self.bytes, self.signature);
        drop(client);
        if let Err(e) = device.join() {
            log::warn!("device stopped with an error: {:?}", e);
        }
        let session = match session {
            Ok(session) => session,
            Err(e) => {
                eprintln!("error generating random data: {}", e);
                return 1;
            }
        };

        let written = util::write_output(self.file.as_deref(), &session.data);
        if let Err(e) = written {
            eprintln!("error writing random data: {}", e);
            return 1;
        }
        if let Some(path) = &self.file {
            eprintln!("Wrote {} bytes to {:?}", session.data.len(), path);
        }

        let public_key = match session.public_key {
            Some(key) => key,
            None => return 0,
        };
        let attestation =
            Attestation::new(&public_key, &session.signature, &session.digest);
        if self.json {
            let json = check!(
                serde_json::to_string_pretty(&attestation),
                "encoding attestation"
            );
            println!("{}", json);
        } else {
            println!("Public key: {}", attestation.public_key);
            println!("Signature: {}", attestation.signature);
            println!("Hash: {}", attestation.digest);
        }

        eprintln!("Verifying signature ...");
        match verify::check_attestation(
            &session.data,
            &session.digest,
            &session.signature,
            &public_key,
        ) {
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

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn session_verifies() {
        let (device, port) = SimDevice::spawn([5; 8]).unwrap();
        let mut client = Client::new(port);

        let first = run_session(&mut client, 200, true).unwrap();
        assert_eq!(first.data.len(), 200);
        let key = first.public_key.unwrap();
        verify::check_attestation(
            &first.data,
            &first.digest,
            &first.signature,
            &key,
        )
        .unwrap();

        let second = run_session(&mut client, 10, false).unwrap();
        assert!(second.public_key.is_none());
        assert_ne!(first.digest, second.digest);
        verify::check_attestation(
            &second.data,
            &second.digest,
            &second.signature,
            &key,
        )
        .unwrap();

        drop(client);
        device.join().unwrap();
    }

    #[test]
    fn attestation_json() {
        let attestation = Attestation::new(&[0xab; 32], &[0x01; 64], &[0; 32]);
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&attestation).unwrap())
                .unwrap();
        assert_eq!(json["public_key"], "ab".repeat(32));
        assert_eq!(json["signature"], "01".repeat(64));
        assert_eq!(json["digest"], "00".repeat(32));
    }
}
