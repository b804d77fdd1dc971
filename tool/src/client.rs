// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A typed client for the random-generator protocol.

use std::fmt;

use tkrand::crypto::hash::Digest;
use tkrand::crypto::sig::PublicKey;
use tkrand::crypto::sig::Signature;
use tkrand::io::Cursor;
use tkrand::net;
use tkrand::net::device::DevicePort;
use tkrand::net::frame::FrameStatus;
use tkrand::net::frame::MAX_FRAME_LEN;
use tkrand::protocol::get_pubkey::GetPubkeyRequest;
use tkrand::protocol::get_pubkey::PubkeyResponse;
use tkrand::protocol::get_random::GetRandomRequest;
use tkrand::protocol::get_random::RandomResponse;
use tkrand::protocol::get_sig::GetSigRequest;
use tkrand::protocol::get_sig::SigResponse;
use tkrand::protocol::name_version::GetNameVersionRequest;
use tkrand::protocol::name_version::NameVersionResponse;
use tkrand::protocol::wire;
use tkrand::protocol::wire::WireEnum as _;
use tkrand::protocol::CommandType;
use tkrand::protocol::Request;
use tkrand::protocol::Response;
use tkrand::protocol::Status;
use tkrand::protocol::RANDOM_PAYLOAD_MAX;
use tkrand::server::NAME_VERSION;

/// An error from talking to the device.
#[derive(Debug)]
pub enum Error {
    /// The connection failed.
    Net(net::Error),
    /// A message could not be encoded or decoded.
    Wire(wire::Error),
    /// The device answered with a not-OK frame.
    NotOk,
    /// The device answered with an unexpected response code.
    UnexpectedResponse(u8),
    /// The device answered, but refused the request.
    Rejected(CommandType),
    /// The device is running some other application.
    WrongApp(NameVersionResponse),
}

impl From<net::Error> for Error {
    fn from(e: net::Error) -> Self {
        Self::Net(e)
    }
}

impl From<wire::Error> for Error {
    fn from(e: wire::Error) -> Self {
        Self::Wire(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Net(e) => write!(f, "connection failed: {:?}", e),
            Self::Wire(e) => write!(f, "malformed message: {:?}", e),
            Self::NotOk => write!(f, "device answered with a not-OK frame"),
            Self::UnexpectedResponse(code) => {
                write!(f, "unexpected response code {:#04x}", code)
            }
            Self::Rejected(cmd) => write!(f, "device rejected {:?}", cmd),
            Self::WrongApp(nv) => write!(
                f,
                "device is running {:?} {:?}, not the random generator",
                String::from_utf8_lossy(&nv.name0),
                String::from_utf8_lossy(&nv.name1),
            ),
        }
    }
}

/// A client for a device running the random-generator application.
pub struct Client<P> {
    port: P,
}

impl<P: DevicePort> Client<P> {
    /// Creates a client talking over `port`.
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Sends `req` and waits for a response of type `Resp`.
    fn transact<Req, Resp>(&mut self, req: &Req) -> Result<Resp, Error>
    where
        Req: Request,
        Resp: Response,
    {
        let mut buf = [0; MAX_FRAME_LEN];
        let mut cursor = Cursor::new(&mut buf);
        req.to_wire(&mut cursor)?;
        self.port.send(Req::TYPE, cursor.consumed_bytes())?;

        let mut frame = [0; MAX_FRAME_LEN];
        let header = self.port.receive_response(&mut frame)?;
        if header.status == FrameStatus::NotOk {
            return Err(Error::NotOk);
        }
        if frame[0] != Resp::TYPE.to_wire_value() {
            return Err(Error::UnexpectedResponse(frame[0]));
        }
        let mut body = &frame[1..header.len.bytes()];
        Ok(Resp::from_wire(&mut body)?)
    }

    /// Checks that the device is running the random generator.
    ///
    /// The version is not compared.
    pub fn check_app(&mut self) -> Result<(), Error> {
        let nv: NameVersionResponse = self.transact(&GetNameVersionRequest)?;
        if nv.name0 != NAME_VERSION.name0 || nv.name1 != NAME_VERSION.name1 {
            return Err(Error::WrongApp(nv));
        }
        log::info!("device runs {:?} version {}", nv, nv.version);
        Ok(())
    }

    /// Fetches `count` random bytes, in as many requests as it takes.
    pub fn get_random(&mut self, count: usize) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            let chunk = (count - out.len()).min(RANDOM_PAYLOAD_MAX);
            let req = GetRandomRequest { count: chunk as u8 };
            let resp: RandomResponse = self.transact(&req)?;
            if resp.status != Status::Ok || resp.data.len() < chunk {
                return Err(Error::Rejected(CommandType::GetRandom));
            }
            out.extend_from_slice(&resp.data[..chunk]);
        }
        Ok(out)
    }

    /// Fetches the device's public key.
    pub fn get_pubkey(&mut self) -> Result<PublicKey, Error> {
        let resp: PubkeyResponse = self.transact(&GetPubkeyRequest)?;
        Ok(resp.key)
    }

    /// Fetches the signature and digest over everything emitted since the
    /// last call.
    pub fn get_sig(&mut self) -> Result<(Signature, Digest), Error> {
        let resp: SigResponse = self.transact(&GetSigRequest)?;
        if resp.status != Status::Ok {
            return Err(Error::Rejected(CommandType::GetSig));
        }
        Ok((resp.signature, resp.digest))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimDevice;
    use tkrand::crypto::blake2;
    use tkrand::crypto::hash::EngineExt as _;
    use tkrand::crypto::ring::ed25519;
    use tkrand::crypto::sig::Verify as _;

    #[test]
    fn generate_and_attest() {
        let (device, port) = SimDevice::spawn([0x42; 8]).unwrap();
        let mut client = Client::new(port);
        client.check_app().unwrap();

        let data = client.get_random(300).unwrap();
        assert_eq!(data.len(), 300);
        let (signature, digest) = client.get_sig().unwrap();
        let pubkey = client.get_pubkey().unwrap();

        let mut expected = [0; 32];
        blake2::Engine::new()
            .contiguous_hash(&data, &mut expected)
            .unwrap();
        assert_eq!(digest, expected);
        ed25519::Verifier::new(&pubkey)
            .verify(&signature, &digest)
            .unwrap();

        assert!(matches!(
            client.get_sig(),
            Err(Error::Rejected(CommandType::GetSig))
        ));

        drop(client);
        device.join().unwrap();
    }

    #[test]
    fn zero_bytes_sends_nothing() {
        let (device, port) = SimDevice::spawn([0x42; 8]).unwrap();
        let mut client = Client::new(port);
        assert!(client.get_random(0).unwrap().is_empty());
        assert!(client.get_sig().is_err());

        drop(client);
        device.join().unwrap();
    }

    #[test]
    fn identity_follows_cdi() {
        let pubkey = |cdi| {
            let (device, port) = SimDevice::spawn(cdi).unwrap();
            let key = Client::new(port).get_pubkey().unwrap();
            device.join().unwrap();
            key
        };
        assert_eq!(pubkey([1; 8]), pubkey([1; 8]));
        assert_ne!(pubkey([1; 8]), pubkey([2; 8]));
    }
}
