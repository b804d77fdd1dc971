// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The random-generator application.
//!
//! This module provides [`RandomApp`], which serves random bytes and
//! attestations over them to a host.

use arrayvec::ArrayVec;
use zeroize::Zeroizing;

use crate::attest;
use crate::attest::Accumulator;
use crate::crypto::hash;
use crate::crypto::sig;
use crate::drbg::Drbg;
use crate::hardware;
use crate::hardware::LedColor;
use crate::identity::DeviceIdentity;
use crate::net;
use crate::net::frame::Endpoint;
use crate::net::frame::MAX_FRAME_LEN;
use crate::net::host::HostPort;
use crate::protocol;
use crate::protocol::get_pubkey::PubkeyResponse;
use crate::protocol::get_random::GetRandomRequest;
use crate::protocol::get_random::RandomResponse;
use crate::protocol::get_sig::SigResponse;
use crate::protocol::name_version::NameVersionResponse;
use crate::protocol::CommandType;
use crate::protocol::Status;
use crate::protocol::RANDOM_PAYLOAD_MAX;
use crate::server::Error;

use crate::server::handler::prelude::*;

/// The name and version this application reports.
pub const NAME_VERSION: NameVersionResponse = NameVersionResponse {
    name0: *b"tk1 ",
    name1: *b"rand",
    version: 1,
};

/// Options struct for booting a [`RandomApp`].
pub struct Options<'a, Cdi, Keys, Trng, Led, Hash> {
    /// A handle to the CDI register bank. It is read exactly once, during
    /// [`RandomApp::boot()`].
    pub cdi: &'a Cdi,
    /// A builder for the device's signing keypair.
    pub keys: &'a Keys,

    /// The status LED. It is lit once boot completes.
    pub led: &'a mut Led,

    /// The hardware entropy source.
    pub trng: Trng,
    /// A hash engine dedicated to the random bit generator.
    pub drbg_hash: Hash,
    /// A hash engine dedicated to the attestation digest.
    pub attest_hash: Hash,

    /// The name and version to report; usually [`NAME_VERSION`].
    pub name_version: NameVersionResponse,
}

/// The attestation state of a [`RandomApp`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum State {
    /// No random data was handed out since the last attestation.
    Idle,
    /// Random data was handed out, and is waiting to be attested.
    Pending,
}

/// What [`RandomApp::process_request()`] did with a frame.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Outcome {
    /// The frame was handled, and a response of the given type was sent.
    Replied(CommandType),
    /// The frame was addressed to the firmware, and was rejected with a
    /// not-OK frame.
    RejectedFirmware,
    /// The frame was addressed to some other endpoint, and was dropped
    /// without a reply.
    Ignored,
}

/// The random-generator application server.
///
/// This type implements the request -> response "business logic" of the
/// device. It owns all of the device's mutable state: the random bit
/// generator, the attestation digest, and the signing identity.
pub struct RandomApp<Keypair, Trng, Hash> {
    identity: DeviceIdentity<Keypair>,
    drbg: Drbg,
    drbg_hash: Hash,
    trng: Trng,
    attest: Accumulator<Hash>,
    name_version: NameVersionResponse,
}

impl<Keypair, Trng, Hash> RandomApp<Keypair, Trng, Hash>
where
    Keypair: sig::Keypair,
    Trng: hardware::Entropy,
    Hash: hash::Engine,
{
    /// Boots the application.
    ///
    /// Reads the CDI, derives the device identity from it, seeds the random
    /// bit generator, and starts an empty attestation digest. The returned
    /// server is [`State::Idle`].
    pub fn boot<Cdi, Keys, Led>(
        opts: Options<'_, Cdi, Keys, Trng, Led, Hash>,
    ) -> Result<Self, Error>
    where
        Cdi: hardware::Cdi,
        Keys: sig::SignerBuilder<Keypair = Keypair>,
        Led: hardware::Led,
    {
        let Options {
            cdi,
            keys,
            led,
            mut trng,
            mut drbg_hash,
            attest_hash,
            name_version,
        } = opts;

        let cdi = Zeroizing::new(cdi.compartment_id());
        let identity = DeviceIdentity::derive(keys, &cdi)?;

        let mut drbg = Drbg::new();
        drbg.init(&cdi, &mut trng, &mut drbg_hash)?;

        let attest = Accumulator::new(attest_hash)?;

        led.set(LedColor::Red | LedColor::Blue);
        info!("booted");
        Ok(Self {
            identity,
            drbg,
            drbg_hash,
            trng,
            attest,
            name_version,
        })
    }

    /// Returns whether there is random data waiting to be attested.
    pub fn state(&self) -> State {
        if self.attest.is_pending() {
            State::Pending
        } else {
            State::Idle
        }
    }

    /// Returns the device's public key.
    pub fn public_key(&self) -> &sig::PublicKey {
        self.identity.public_key()
    }

    /// Process a single incoming request.
    ///
    /// Blocks until `port` delivers a frame, then routes it: frames for the
    /// firmware are rejected, frames for other endpoints are dropped, and
    /// frames for this application are answered.
    #[cfg_attr(test, inline(never))]
    pub fn process_request(
        &mut self,
        port: &mut dyn HostPort,
    ) -> Result<Outcome, Error> {
        let mut frame = [0; MAX_FRAME_LEN];
        let header = port.receive(&mut frame)?;

        match header.endpoint {
            Endpoint::App => {}
            Endpoint::Firmware => {
                warn!("rejecting frame for the firmware");
                port.reply_not_ok(header)?;
                return Ok(Outcome::RejectedFirmware);
            }
            other => {
                info!("ignoring frame for {:?}", other);
                return Ok(Outcome::Ignored);
            }
        }
        trace!("command {:#04x}", frame[0]);

        let sent = Handler::<&mut Self>::new()
            .handle::<protocol::GetNameVersion, _>(|zelf, _| {
                Ok(zelf.name_version)
            })
            .handle::<protocol::GetRandom, _>(|zelf, req| zelf.get_random(req))
            .handle::<protocol::GetPubkey, _>(|zelf, _| {
                Ok(PubkeyResponse {
                    key: *zelf.identity.public_key(),
                })
            })
            .handle::<protocol::GetSig, _>(|zelf, _| zelf.get_sig())
            .run(self, port, header, &frame)?;
        Ok(Outcome::Replied(sent))
    }

    /// Processes requests until `port` disconnects.
    pub fn serve(&mut self, port: &mut dyn HostPort) -> Result<(), Error> {
        loop {
            match self.process_request(port) {
                Ok(_) => {}
                Err(Error::Network(net::Error::Disconnected)) => {
                    info!("host disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn get_random(
        &mut self,
        req: GetRandomRequest,
    ) -> Result<RandomResponse, protocol::Error> {
        if !req.is_in_range() {
            return Err(protocol::Error::OutOfRange);
        }

        let mut buf = [0; RANDOM_PAYLOAD_MAX];
        let out = &mut buf[..req.count as usize];
        if let Err(e) =
            self.drbg.generate(out, &mut self.trng, &mut self.drbg_hash)
        {
            error!("generator failed: {:?}", e);
            return Err(protocol::Error::Internal);
        }
        if let Err(e) = self.attest.absorb(out) {
            error!("attestation digest failed: {:?}", e);
            return Err(protocol::Error::Internal);
        }
        trace!("random out: {:02x?}", out);

        let mut data = ArrayVec::new();
        data.extend(out.iter().copied());
        Ok(RandomResponse {
            status: Status::Ok,
            data,
        })
    }

    fn get_sig(&mut self) -> Result<SigResponse, protocol::Error> {
        let digest = match self.attest.take_digest() {
            Ok(digest) => digest,
            Err(e) if e.into_inner() == attest::Error::NothingPending => {
                return Err(protocol::Error::NothingToAttest);
            }
            Err(e) => {
                error!("attestation digest failed: {:?}", e);
                return Err(protocol::Error::Internal);
            }
        };
        let signature = match self.identity.sign(&digest) {
            Ok(signature) => signature,
            Err(e) => {
                error!("signing failed: {:?}", e);
                return Err(protocol::Error::Internal);
            }
        };

        Ok(SigResponse {
            status: Status::Ok,
            signature,
            digest,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::blake2;
    use crate::crypto::hash::EngineExt as _;
    use crate::crypto::ring::ed25519;
    use crate::crypto::sig::Verify as _;
    use crate::hardware::fake;
    use crate::net::frame::FrameLen;
    use crate::net::frame::FrameStatus;
    use crate::net::frame::Header;
    use crate::net::host::SerialHost;
    use crate::net::InMemLink;
    use crate::protocol::wire::FromWire as _;

    type App = RandomApp<ed25519::Keypair, fake::Entropy, blake2::Engine>;

    const CDI: [u32; 8] = [0xa5a5a5a5; 8];

    fn boot() -> App {
        boot_with_led(&mut fake::Led::default())
    }

    fn boot_with_led(led: &mut fake::Led) -> App {
        RandomApp::boot(Options {
            cdi: &fake::Cdi(CDI),
            keys: &ed25519::Builder::new(),
            led,
            trng: fake::Entropy::counting_from(0x1234),
            drbg_hash: blake2::Engine::new(),
            attest_hash: blake2::Engine::new(),
            name_version: NAME_VERSION,
        })
        .unwrap()
    }

    /// Sends one frame to `app`, and returns what came back.
    fn transact(
        app: &mut App,
        endpoint: Endpoint,
        len: FrameLen,
        payload: &[u8],
    ) -> (Outcome, Vec<u8>) {
        let mut frame = vec![Header::request(1, endpoint, len).to_byte()];
        frame.extend_from_slice(payload);
        frame.resize(1 + len.bytes(), 0);

        let mut link = InMemLink::new();
        link.push_rx(&frame);
        let mut port = SerialHost::new(&mut link);
        let outcome = app.process_request(&mut port).unwrap();
        drop(port);
        (outcome, link.take_tx())
    }

    fn get_random(app: &mut App, count: u8) -> RandomResponse {
        let (outcome, tx) =
            transact(app, Endpoint::App, FrameLen::Len4, &[0x03, count]);
        assert_eq!(outcome, Outcome::Replied(CommandType::Random));
        assert_eq!(tx.len(), 1 + 128);
        assert_eq!(tx[1], 0x04);

        let mut resp = RandomResponse::from_wire(&tx[2..]).unwrap();
        if resp.status == Status::Ok {
            resp.data.truncate(count as usize);
        }
        resp
    }

    fn get_sig(app: &mut App) -> SigResponse {
        let (outcome, tx) = transact(app, Endpoint::App, FrameLen::Len1, &[0x07]);
        assert_eq!(outcome, Outcome::Replied(CommandType::Sig));
        assert_eq!(tx.len(), 1 + 128);
        assert_eq!(tx[1], 0x08);
        SigResponse::from_wire(&tx[2..]).unwrap()
    }

    fn get_pubkey(app: &mut App) -> sig::PublicKey {
        let (_, tx) = transact(app, Endpoint::App, FrameLen::Len1, &[0x05]);
        assert_eq!(tx[1], 0x06);
        PubkeyResponse::from_wire(&tx[2..]).unwrap().key
    }

    #[test]
    fn boot_sets_led() {
        let mut led = fake::Led::default();
        let app = boot_with_led(&mut led);
        assert_eq!(led.colors, LedColor::Red | LedColor::Blue);
        assert_eq!(app.state(), State::Idle);
    }

    #[test]
    fn name_version() {
        let mut app = boot();
        let (_, tx) = transact(&mut app, Endpoint::App, FrameLen::Len1, &[0x01]);
        assert_eq!(tx.len(), 1 + 32);
        assert_eq!(&tx[1..14], b"\x02tk1 rand\x01\0\0\0");

        let (_, tx) = transact(&mut app, Endpoint::App, FrameLen::Len4, &[0x01]);
        assert_eq!(tx[1], 0x02);
        assert!(tx[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn random_counts() {
        let mut app = boot();
        for &count in &[1, 16, 17, 100, 126] {
            let resp = get_random(&mut app, count);
            assert_eq!(resp.status, Status::Ok);
            assert_eq!(resp.data.len(), count as usize);
        }
        assert_eq!(app.state(), State::Pending);
    }

    #[test]
    fn random_out_of_range() {
        let mut app = boot();
        for &count in &[0, 127, 255] {
            let resp = get_random(&mut app, count);
            assert_eq!(resp.status, Status::Bad);
            assert!(resp.data.is_empty());
        }
        assert_eq!(app.state(), State::Idle);
    }

    #[test]
    fn random_wrong_frame_len() {
        let mut app = boot();
        let (_, tx) =
            transact(&mut app, Endpoint::App, FrameLen::Len32, &[0x03, 10]);
        assert_eq!(&tx[1..3], &[0x04, 0x01]);
        assert_eq!(app.state(), State::Idle);
    }

    #[test]
    fn attest_end_to_end() {
        let mut app = boot();
        let r1 = get_random(&mut app, 10);
        let r2 = get_random(&mut app, 20);
        assert_eq!(r1.status, Status::Ok);
        assert_eq!(r2.status, Status::Ok);
        assert_ne!(&r1.data[..], &r2.data[..10]);

        let sig = get_sig(&mut app);
        assert_eq!(sig.status, Status::Ok);
        assert_eq!(app.state(), State::Idle);

        let mut concat = r1.data.to_vec();
        concat.extend_from_slice(&r2.data);
        let mut expected = [0; hash::DIGEST_LEN];
        blake2::Engine::new()
            .contiguous_hash(&concat, &mut expected)
            .unwrap();
        assert_eq!(sig.digest, expected);

        let key = get_pubkey(&mut app);
        assert_eq!(&key, app.public_key());
        ed25519::Verifier::new(&key)
            .verify(&sig.signature, &sig.digest)
            .unwrap();
    }

    #[test]
    fn second_sig_is_rejected() {
        let mut app = boot();
        let key = get_pubkey(&mut app);
        assert_eq!(get_sig(&mut app).status, Status::Bad);
        assert_eq!(get_pubkey(&mut app), key);

        get_random(&mut app, 5);
        assert_eq!(get_sig(&mut app).status, Status::Ok);
        let again = get_sig(&mut app);
        assert_eq!(again.status, Status::Bad);
        assert_eq!(again.signature, [0; 64]);
        assert_eq!(app.state(), State::Idle);
        assert_eq!(get_pubkey(&mut app), key);
        assert_eq!(app.public_key(), &key);
    }

    #[test]
    fn attestations_do_not_overlap() {
        let mut app = boot();
        get_random(&mut app, 8);
        get_sig(&mut app);

        let r = get_random(&mut app, 8);
        let sig = get_sig(&mut app);
        let mut expected = [0; hash::DIGEST_LEN];
        blake2::Engine::new()
            .contiguous_hash(&r.data, &mut expected)
            .unwrap();
        assert_eq!(sig.digest, expected);
    }

    #[test]
    fn identity_is_stable_across_boots() {
        let mut a = boot();
        let mut b = boot();
        assert_eq!(get_pubkey(&mut a), get_pubkey(&mut b));
    }

    #[test]
    fn unknown_command() {
        let mut app = boot();
        get_random(&mut app, 3);
        let (outcome, tx) =
            transact(&mut app, Endpoint::App, FrameLen::Len1, &[0x42]);
        assert_eq!(outcome, Outcome::Replied(CommandType::UnknownCommand));
        assert_eq!(tx, vec![0b0_01_11_0_00, 0xff]);
        assert_eq!(app.state(), State::Pending);

        let (_, tx) = transact(&mut app, Endpoint::App, FrameLen::Len1, &[0x04]);
        assert_eq!(tx[1], 0xff);
    }

    #[test]
    fn routing() {
        let mut app = boot();
        let (outcome, tx) =
            transact(&mut app, Endpoint::Firmware, FrameLen::Len4, &[0x03, 4]);
        assert_eq!(outcome, Outcome::RejectedFirmware);
        let header = Header::parse_response(tx[0]).unwrap();
        assert_eq!(header.status, FrameStatus::NotOk);
        assert_eq!(tx, vec![0b0_01_10_1_00, 0]);

        for &endpoint in &[Endpoint::HardwareIfpga, Endpoint::HardwareAfpga] {
            let (outcome, tx) =
                transact(&mut app, endpoint, FrameLen::Len4, &[0x03, 4]);
            assert_eq!(outcome, Outcome::Ignored);
            assert!(tx.is_empty());
        }
        assert_eq!(app.state(), State::Idle);
    }

    #[test]
    fn serve_until_disconnect() {
        let mut app = boot();
        let mut link = InMemLink::new();
        link.push_rx(&[0b0_00_11_0_01, 0x03, 4, 0, 0]);
        link.push_rx(&[0x80]);
        link.push_rx(&[0b0_01_11_0_00, 0x07]);
        let mut port = SerialHost::new(&mut link);
        app.serve(&mut port).unwrap();
        drop(port);

        let tx = link.take_tx();
        assert_eq!(tx.len(), 2 * (1 + 128));
        assert_eq!(&tx[1..3], &[0x04, 0x00]);
        assert_eq!(&tx[130..132], &[0x08, 0x00]);
        assert_eq!(app.state(), State::Idle);
    }
}
