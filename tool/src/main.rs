// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `tkrand` is a command-line client for the random-generator application.
//!
//! It fetches random data (and optionally an attestation over it) from a
//! device, and verifies previously-saved attestations offline.

#![deny(missing_docs)]
#![deny(warnings)]
#![deny(unused)]
#![deny(unsafe_code)]

use structopt::StructOpt as _;

#[macro_use]
mod util;

mod client;
mod generate;
mod sim;
mod verify;

/// A client for the tkrand random-number generator.
#[allow(missing_docs)]
#[derive(structopt::StructOpt)]
#[structopt(author)]
enum CliCommand {
    /// Generate random data, optionally with a signature over it.
    Generate(generate::Generate),
    /// Verify a signature over saved random data.
    Verify(verify::Verify),
}

fn main() {
    env_logger::init();
    let code = match CliCommand::from_args() {
        CliCommand::Generate(g) => g.run(),
        CliCommand::Verify(v) => v.run(),
    };
    std::process::exit(code)
}
