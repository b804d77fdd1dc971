// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A framework for building servers in "handler" style.
//!
//! We'd like the server implementation code to only handle the runtime
//! representations of commands, with minimal boilerplate, so that
//! implementing new commands and understanding how the server is implemented
//! is simple.
//!
//! This module provides a fully `no_std` framework for writing such handlers,
//! using the `Handler` type. A sample use looks something like this:
//! ```text
//! let server = ...;  // Your "server context" type.
//! Handler::<Server>::new()
//!   .handle::<MyCommand, _>(|server, req| {
//!     // Do stuff...
//!     Ok(response)
//!   })
//!   // ...
//!   .run(server, port, header, &frame)
//! ```
//! This defines a request handler; nothing happens until `run()` is called.
//! When called, `run()` performs the following steps:
//! - It decodes the command code in the first byte of the frame.
//! - It selects a `.handle<MyCommand, _>()` call, such that
//!   `MyCommand::Req::TYPE` matches that command code.
//! - It checks the frame length against `MyCommand::Req::FRAME_LEN`, parses
//!   the rest of the frame as a `MyCommand::Req`, and passes it and the
//!   server context into the closure.
//! - The closure executes, which returns
//!   `Result<MyCommand::Resp, protocol::Error>`.
//! - The response is sent to the port. If the request was rejected at any
//!   point, the response is built with [`Response::rejected()`] instead.
//! - If no handler is chosen, an "unknown command" response is sent.
//!
//! This module is not part of `tkrand`'s API.
//!
//! ## How it works
//!
//! Suppose we have types `A, B, C: Command` which we want to handle, so
//! we write the following code:
//! ```text
//! Handler::<Server>::new()
//!   .handle::<A, _>(...)
//!   .handle::<B, _>(...)
//!   .handle::<C, _>(...)
//! ```
//! `.handle()` is a combinator, implemented by both `Handler` and its return
//! type. The resulting type of this expression is something like
//! `Cons<Cons<Cons<Handler<Server>, A, ?0>, B, ?1> C, ?2>`,
//! where the `?n` types denote anonymous closure types. When we go ahead and
//! call `.run()`, the command code is fed to the outermost `Cons`. If it
//! doesn't match `C::Req::TYPE`, it recurses into the inner `Cons`'s
//! `run_with_command()`.
//!
//! If execution ever reaches the inner `Handler<Server>`, which acts as the
//! "nil" for this linked list, we reply with "unknown command": this is our
//! `_` case.

use core::marker::PhantomData;

use crate::io::Cursor;
use crate::net::frame::Header;
use crate::net::frame::MAX_FRAME_LEN;
use crate::net::host::HostPort;
use crate::protocol;
use crate::protocol::wire::FromWire;
use crate::protocol::wire::WireEnum as _;
use crate::protocol::CommandType;
use crate::protocol::Request as _;
use crate::protocol::Response;
use crate::protocol::UnknownCommandResponse;
use crate::server::Error;

/// A `*`-importable prelude that pulls in only the names that are necessary
/// to make `Handler` work.
pub mod prelude {
    pub use super::Handler;
    pub use super::HandlerMethods;
}

/// A request handler builder.
///
/// See the module documentation for more information.
///
/// Note: the type parameter on this type is only necessary to make type
/// inference work out. It can be left off, but rustc will complain about
/// missing type annotations.
pub struct Handler<Server> {
    _ph: PhantomData<fn(Server)>,
}

impl<Server> Handler<Server> {
    /// Creates a new, default `Handler`.
    pub fn new() -> Self {
        Self { _ph: PhantomData }
    }
}

/// A handler for a specific command type.
///
/// The name "handler cons" comes from the fact that the type that
/// `run()` is eventually called on looks like a linked list of
/// `HandlerMethods` implementations.
pub struct Cons<Prev, Command, F> {
    prev: Prev,
    handler: F,
    _ph: PhantomData<Command>,
}

mod sealed {
    /// A public-in-private trait, for ensuring outside users cannot
    /// accidentally implement `HandlerMethods`.
    pub trait Sealed {}
}

// Helpers for naming a command's request and response types.
#[doc(hidden)]
pub type ReqOf<C> = <C as protocol::Command>::Req;
#[doc(hidden)]
pub type RespOf<C> = <C as protocol::Command>::Resp;

/// The core trait that makes handler building possible.
pub trait HandlerMethods<Server>: Sized + sealed::Sealed {
    /// Attaches a new handler function to a `Handler`.
    ///
    /// This function should be called as `.handle::<Command, _>(...)` to make
    /// type inference work; the second type paramter can't be named, since
    /// it will be a closure type.
    fn handle<C, F>(self, handler: F) -> Cons<Self, C, F>
    where
        C: protocol::Command,
        F: FnOnce(Server, ReqOf<C>) -> Result<RespOf<C>, protocol::Error>,
    {
        Cons {
            prev: self,
            handler,
            _ph: PhantomData,
        }
    }

    /// The "real" run function.
    #[doc(hidden)]
    fn run_with_command(
        self,
        server: Server,
        port: &mut dyn HostPort,
        header: Header,
        command: Option<CommandType>,
        body: &[u8],
    ) -> Result<CommandType, Error>;

    /// Executes a `Handler` on a received frame.
    ///
    /// `frame` holds the frame payload that arrived with `header`; its first
    /// byte is the command code. Returns the type of the response that was
    /// sent.
    ///
    /// See the module-level documentation for more information.
    #[inline]
    fn run(
        self,
        server: Server,
        port: &mut dyn HostPort,
        header: Header,
        frame: &[u8; MAX_FRAME_LEN],
    ) -> Result<CommandType, Error> {
        let command = CommandType::from_wire_value(frame[0]);
        let body = &frame[1..header.len.bytes()];
        self.run_with_command(server, port, header, command, body)
    }
}

/// Serializes `resp` and sends it to `port`.
fn send<R: Response>(
    port: &mut dyn HostPort,
    header: Header,
    resp: &R,
) -> Result<CommandType, Error> {
    let mut buf = [0; MAX_FRAME_LEN];
    let mut cursor = Cursor::new(&mut buf);
    resp.to_wire(&mut cursor)?;
    port.reply(header, R::TYPE, cursor.consumed_bytes())?;
    Ok(R::TYPE)
}

impl<Server, Prev, Command, F> HandlerMethods<Server> for Cons<Prev, Command, F>
where
    Prev: HandlerMethods<Server>,
    Command: protocol::Command,
    F: FnOnce(Server, ReqOf<Command>) -> Result<RespOf<Command>, protocol::Error>,
{
    #[inline]
    fn run_with_command(
        self,
        server: Server,
        port: &mut dyn HostPort,
        header: Header,
        command: Option<CommandType>,
        mut body: &[u8],
    ) -> Result<CommandType, Error> {
        if command != Some(ReqOf::<Command>::TYPE) {
            // Recurse into the next handler case.
            return self
                .prev
                .run_with_command(server, port, header, command, body);
        }

        let result = match ReqOf::<Command>::FRAME_LEN {
            Some(len) if len != header.len => Err(protocol::Error::BadLength),
            _ => <ReqOf<Command> as FromWire>::from_wire(&mut body)
                .map_err(|_| protocol::Error::BadLength),
        }
        .and_then(|req| (self.handler)(server, req));

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                info!("rejecting {:?}: {:?}", ReqOf::<Command>::TYPE, e);
                RespOf::<Command>::rejected(e)
            }
        };
        send(port, header, &resp)
    }
}

impl<Server> HandlerMethods<Server> for Handler<Server> {
    #[inline]
    fn run_with_command(
        self,
        _: Server,
        port: &mut dyn HostPort,
        header: Header,
        command: Option<CommandType>,
        _: &[u8],
    ) -> Result<CommandType, Error> {
        warn!("unknown command: {:?}", command);
        send(port, header, &UnknownCommandResponse)
    }
}

impl<P, C, F> sealed::Sealed for Cons<P, C, F> {}
impl<S> sealed::Sealed for Handler<S> {}
