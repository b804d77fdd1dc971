// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! An in-process simulated device.
//!
//! The device runs [`RandomApp`] on its own thread, with OS entropy standing
//! in for the TRNG, and talks to the client over a pair of byte channels.

use std::sync::mpsc;
use std::thread;
use std::thread::JoinHandle;

use enumflags2::BitFlags;

use tkrand::crypto::blake2;
use tkrand::crypto::hash;
use tkrand::crypto::hash::EngineExt as _;
use tkrand::crypto::ring::ed25519;
use tkrand::crypto::ring::trng::Trng;
use tkrand::hardware;
use tkrand::hardware::LedColor;
use tkrand::hardware::CDI_WORDS;
use tkrand::io::endian;
use tkrand::net;
use tkrand::net::device::SerialDevice;
use tkrand::net::host::SerialHost;
use tkrand::net::Link;
use tkrand::server;
use tkrand::server::Options;
use tkrand::server::RandomApp;
use tkrand::server::NAME_VERSION;

/// The unique device secret every simulated device shares.
const SIM_UDS: &[u8] = b"tkrand simulated device secret";

/// One end of a bidirectional in-process byte pipe.
pub struct ChannelLink {
    rx: mpsc::Receiver<u8>,
    tx: mpsc::Sender<u8>,
}

impl ChannelLink {
    /// Creates a connected pair of links.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel();
        let (b_tx, a_rx) = mpsc::channel();
        (
            Self { rx: a_rx, tx: a_tx },
            Self { rx: b_rx, tx: b_tx },
        )
    }
}

impl Link for ChannelLink {
    fn read_byte(&mut self) -> Result<u8, net::Error> {
        self.rx.recv().map_err(|_| net::Error::Disconnected)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), net::Error> {
        for &b in bytes {
            self.tx.send(b).map_err(|_| net::Error::Disconnected)?;
        }
        Ok(())
    }
}

struct SimCdi([u32; CDI_WORDS]);

impl hardware::Cdi for SimCdi {
    fn compartment_id(&self) -> [u32; CDI_WORDS] {
        self.0
    }
}

struct LogLed;

impl hardware::Led for LogLed {
    fn set(&mut self, colors: BitFlags<LedColor>) {
        log::debug!("led: {:?}", colors);
    }
}

/// Derives the simulated CDI, mixing in a user-supplied secret if given.
pub fn derive_cdi(
    uss: Option<&[u8]>,
) -> Result<[u32; CDI_WORDS], tkrand::Error<hash::Error>> {
    let mut engine = blake2::Engine::new();
    let mut hasher = engine.new_hash()?;
    hasher.write(SIM_UDS)?;
    if let Some(uss) = uss {
        hasher.write(uss)?;
    }
    let mut digest = [0; hash::DIGEST_LEN];
    hasher.finish(&mut digest)?;

    let mut cdi = [0; CDI_WORDS];
    endian::le_to_words(&digest, &mut cdi);
    Ok(cdi)
}

/// Converts a CDI given on the command line into words.
pub fn cdi_from_bytes(bytes: &[u8; CDI_WORDS * 4]) -> [u32; CDI_WORDS] {
    let mut cdi = [0; CDI_WORDS];
    endian::le_to_words(bytes, &mut cdi);
    cdi
}

/// A running simulated device.
pub struct SimDevice {
    thread: JoinHandle<Result<(), server::Error>>,
}

impl SimDevice {
    /// Boots a device with the given CDI and returns it, along with a port
    /// for talking to it.
    pub fn spawn(
        cdi: [u32; CDI_WORDS],
    ) -> Result<(Self, SerialDevice<ChannelLink>), server::Error> {
        let mut app = RandomApp::boot(Options {
            cdi: &SimCdi(cdi),
            keys: &ed25519::Builder::new(),
            led: &mut LogLed,
            trng: Trng::new(),
            drbg_hash: blake2::Engine::new(),
            attest_hash: blake2::Engine::new(),
            name_version: NAME_VERSION,
        })?;

        let (host_end, device_end) = ChannelLink::pair();
        let thread = thread::spawn(move || {
            let mut port = SerialHost::new(device_end);
            app.serve(&mut port)
        });
        Ok((Self { thread }, SerialDevice::new(host_end)))
    }

    /// Waits for the device to shut down.
    ///
    /// The device stops once every port talking to it has been dropped.
    pub fn join(self) -> Result<(), server::Error> {
        match self.thread.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
