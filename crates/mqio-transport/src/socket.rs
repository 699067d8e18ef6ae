//! The socket facade.
//!
//! `MessageSocket` is the operation surface an application-level wrapper
//! calls. It owns one endpoint handle at a time, the handle's reactor
//! registration, the monotonic shutdown state and the bind/connect-once
//! endpoint record, and it builds the one-shot operation objects for the
//! asynchronous paths.

use crate::context::Context;
use crate::driver::{NativeDescriptor, Progress, SocketKind, TransportEndpoint};
use crate::op::{ReceiveOp, SendOp};
use crate::options::{GetSocketOption, SetSocketOption};
use crate::reactor::{OpDirection, Reactor, ReactorOp, Registration};
use crate::readiness;
use bytes::{Bytes, BytesMut};
use mqio_core::{Error, MessageFlags, Result, Shutdown, ShutdownState};
use std::sync::Arc;
use tracing::debug;

/// The open state of a socket: handle, descriptor and registration travel
/// together and are torn down together.
struct OpenEndpoint {
    handle: Arc<dyn TransportEndpoint>,
    descriptor: NativeDescriptor,
    registration: Registration,
}

/// A message-oriented transport endpoint integrated with a reactor.
///
/// The socket is constructed unopened; `open` creates the transport
/// handle and registers its pollable descriptor with the reactor. Every
/// lifecycle rule of the adapter lives here:
/// - a socket binds or connects at most once in its lifetime,
/// - shutdown state only ever becomes more restrictive,
/// - dropping (or `close`/`destroy`) deregisters first, synchronously
///   canceling queued operations, then releases the handle.
///
/// Moving the value is an ordinary Rust move. [`MessageSocket::take`]
/// additionally covers assignment-style transfers between two live
/// sockets, re-homing the reactor registration.
pub struct MessageSocket {
    context: Context,
    reactor: Arc<dyn Reactor>,
    open: Option<OpenEndpoint>,
    shutdown: ShutdownState,
    endpoint: Option<String>,
}

impl MessageSocket {
    /// Construct an unopened socket bound to a context and a reactor.
    pub fn new(context: Context, reactor: Arc<dyn Reactor>) -> Self {
        Self {
            context,
            reactor,
            open: None,
            shutdown: ShutdownState::NotShutDown,
            endpoint: None,
        }
    }

    /// Whether the socket currently owns an open handle.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The shared transport context this socket was constructed with.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Create the transport handle and register it with the reactor.
    ///
    /// Fails with [`Error::AlreadyOpen`] on a socket that is already open,
    /// and with the driver's error if handle creation fails. If descriptor
    /// registration fails the handle is released before the error returns:
    /// no partially opened state is ever observable.
    pub fn open(&mut self, kind: SocketKind) -> Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }

        let handle = self.context.open_endpoint(kind)?;
        let descriptor = readiness::pollable_descriptor(handle.as_ref())?;
        let registration = Registration::vacant();
        // `handle` is still locally owned here: an Err return drops it and
        // the library closes the endpoint, rolling the open back.
        self.reactor
            .register_descriptor(descriptor, &registration)
            .map_err(Error::Io)?;
        debug!(descriptor, "opening message socket");

        self.open = Some(OpenEndpoint {
            handle,
            descriptor,
            registration,
        });
        Ok(())
    }

    /// Close the open handle, canceling queued operations first.
    ///
    /// # Panics
    ///
    /// Panics if the socket is not open; closing an unopened socket is a
    /// lifecycle bug. Use [`MessageSocket::destroy`] for the tolerant
    /// variant.
    pub fn close(&mut self) {
        assert!(self.is_open(), "close() called on an unopened socket");
        self.teardown();
    }

    /// Tear the socket down if it is open; no-op otherwise.
    ///
    /// Deregisters from the reactor, synchronously canceling every queued
    /// operation, then releases the handle. Also runs on drop.
    pub fn destroy(&mut self) {
        if self.is_open() {
            self.teardown();
        }
    }

    /// Request cancellation of every operation queued on this socket.
    ///
    /// Each queued operation completes with [`Error::Canceled`] exactly
    /// once before this returns. Fails with [`Error::NotOpen`] on an
    /// unopened socket.
    pub fn cancel(&self) -> Result<()> {
        let open = self.open.as_ref().ok_or(Error::NotOpen)?;
        debug!(descriptor = open.descriptor, "canceling queued operations");
        self.reactor.cancel_ops(open.descriptor, &open.registration);
        Ok(())
    }

    /// Disable a direction of traffic.
    ///
    /// Shutdown state is monotonic: requesting a direction that would
    /// relax the current state fails with [`Error::InvalidShutdown`].
    /// The handle stays open and operations already past their readiness
    /// check are not interrupted.
    pub fn shutdown(&mut self, direction: Shutdown) -> Result<()> {
        if !self.is_open() {
            return Err(Error::NotOpen);
        }
        if !self.shutdown.permits(direction) {
            return Err(Error::InvalidShutdown);
        }
        self.shutdown = direction.into();
        Ok(())
    }

    /// The recorded shutdown state.
    pub fn shutdown_state(&self) -> ShutdownState {
        self.shutdown
    }

    /// Accept incoming connections on `endpoint`.
    ///
    /// A socket records at most one endpoint in its lifetime: a second
    /// bind or connect fails with [`Error::AlreadyConnected`]. A driver
    /// failure leaves the endpoint state unchanged and surfaces unchanged.
    pub fn bind(&mut self, endpoint: &str) -> Result<()> {
        self.record_endpoint(endpoint, |handle, endpoint| handle.bind(endpoint))
    }

    /// Connect to a remote `endpoint`. Same single-endpoint contract as
    /// [`MessageSocket::bind`].
    pub fn connect(&mut self, endpoint: &str) -> Result<()> {
        self.record_endpoint(endpoint, |handle, endpoint| handle.connect(endpoint))
    }

    /// The endpoint recorded by the first successful bind or connect.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// The pollable OS-level descriptor of the open handle.
    pub fn native_handle(&self) -> Result<NativeDescriptor> {
        let open = self.open.as_ref().ok_or(Error::NotOpen)?;
        Ok(open.descriptor)
    }

    /// Send one frame synchronously.
    ///
    /// With [`MessageFlags::NO_WAIT`] a full transport reports
    /// [`Error::WouldBlock`]; without it the call may block the calling
    /// thread, mirroring a traditional blocking socket. The multipart flag
    /// selects the library's "more frames follow" mode.
    pub fn send(&self, frame: &[u8], flags: MessageFlags) -> Result<usize> {
        let open = self.open.as_ref().ok_or(Error::NotOpen)?;
        match open.handle.try_send(frame, flags)? {
            Progress::Ready(sent) => Ok(sent),
            Progress::WouldBlock => Err(Error::WouldBlock),
        }
    }

    /// Receive one frame synchronously into `frame`. Blocking and
    /// multipart behavior mirror [`MessageSocket::send`].
    pub fn receive(&self, frame: &mut [u8], flags: MessageFlags) -> Result<usize> {
        let open = self.open.as_ref().ok_or(Error::NotOpen)?;
        match open.handle.try_receive(frame, flags)? {
            Progress::Ready(received) => Ok(received),
            Progress::WouldBlock => Err(Error::WouldBlock),
        }
    }

    /// Queue an asynchronous send of `frame`.
    ///
    /// The handler fires exactly once with the bytes transferred or a
    /// terminal error, never with would-block, which only drives the
    /// internal retry loop. Failures (including a socket that is not
    /// open) are delivered through the handler, never returned.
    pub fn async_send<F>(&self, frame: Bytes, flags: MessageFlags, handler: F)
    where
        F: FnOnce(Result<usize>) + Send + 'static,
    {
        self.start_send(frame, flags, false, handler);
    }

    /// [`MessageSocket::async_send`] with an explicit continuation hint:
    /// set `is_continuation` when the operation is issued from a prior
    /// operation's completion, so the reactor can schedule it fairly.
    pub fn start_send<F>(&self, frame: Bytes, flags: MessageFlags, is_continuation: bool, handler: F)
    where
        F: FnOnce(Result<usize>) + Send + 'static,
    {
        let op: Box<dyn ReactorOp> = match self.open.as_ref() {
            Some(open) => Box::new(SendOp::new(
                Arc::clone(&open.handle),
                frame,
                flags,
                handler,
            )),
            None => Box::new(SendOp::resolved(Err(Error::NotOpen), handler)),
        };
        self.start_op(OpDirection::Write, op, is_continuation);
    }

    /// Queue an asynchronous receive into `buffer` (its length is the
    /// capacity offered to the transport).
    ///
    /// The handler fires exactly once with the outcome and the buffer,
    /// returning ownership to the caller.
    pub fn async_receive<F>(&self, buffer: BytesMut, flags: MessageFlags, handler: F)
    where
        F: FnOnce(Result<usize>, BytesMut) + Send + 'static,
    {
        self.start_receive(buffer, flags, false, handler);
    }

    /// [`MessageSocket::async_receive`] with an explicit continuation
    /// hint; see [`MessageSocket::start_send`].
    pub fn start_receive<F>(
        &self,
        buffer: BytesMut,
        flags: MessageFlags,
        is_continuation: bool,
        handler: F,
    ) where
        F: FnOnce(Result<usize>, BytesMut) + Send + 'static,
    {
        let op: Box<dyn ReactorOp> = match self.open.as_ref() {
            Some(open) => Box::new(ReceiveOp::new(
                Arc::clone(&open.handle),
                buffer,
                flags,
                handler,
            )),
            None => Box::new(ReceiveOp::resolved(Err(Error::NotOpen), buffer, handler)),
        };
        self.start_op(OpDirection::Read, op, is_continuation);
    }

    /// Set a socket-scoped option on the open handle.
    pub fn set_option<O: SetSocketOption>(&self, option: &O) -> Result<()> {
        let open = self.open.as_ref().ok_or(Error::NotOpen)?;
        open.handle
            .set_option(option.identifier(), option.payload())
            .map_err(Error::from)
    }

    /// Retrieve a socket-scoped option from the open handle, writing the
    /// value back into the descriptor.
    pub fn get_option<O: GetSocketOption>(&self, option: &mut O) -> Result<()> {
        let open = self.open.as_ref().ok_or(Error::NotOpen)?;
        let mut scratch = vec![0u8; option.capacity()];
        let len = open
            .handle
            .get_option(option.identifier(), &mut scratch)?;
        option.store(&scratch[..len])?;
        Ok(())
    }

    /// Transfer this socket's entire state into a fresh value, leaving
    /// `self` unopened.
    ///
    /// The handle, endpoint record and shutdown state move to the new
    /// socket and the reactor registration is re-homed onto it. `self`
    /// stays usable: re-opening it starts a new lifetime.
    pub fn take(&mut self) -> MessageSocket {
        let open = self.open.take().map(|src| {
            let registration = Registration::vacant();
            self.reactor
                .move_descriptor(src.descriptor, &registration, &src.registration);
            OpenEndpoint {
                handle: src.handle,
                descriptor: src.descriptor,
                registration,
            }
        });

        MessageSocket {
            context: self.context.clone(),
            reactor: Arc::clone(&self.reactor),
            open,
            shutdown: std::mem::take(&mut self.shutdown),
            endpoint: self.endpoint.take(),
        }
    }

    fn record_endpoint(
        &mut self,
        endpoint: &str,
        attach: impl FnOnce(&dyn TransportEndpoint, &str) -> crate::driver::DriverResult<()>,
    ) -> Result<()> {
        if self.endpoint.is_some() {
            return Err(Error::AlreadyConnected);
        }
        let open = self.open.as_ref().ok_or(Error::NotOpen)?;
        attach(open.handle.as_ref(), endpoint)?;
        self.endpoint = Some(endpoint.to_owned());
        Ok(())
    }

    fn start_op(&self, direction: OpDirection, op: Box<dyn ReactorOp>, is_continuation: bool) {
        match self.open.as_ref() {
            Some(open) if !op.is_noop() => self.reactor.start_op(
                direction,
                open.descriptor,
                &open.registration,
                op,
                is_continuation,
                true,
            ),
            _ => self.reactor.post_immediate_completion(op, is_continuation),
        }
    }

    fn teardown(&mut self) {
        let open = self
            .open
            .take()
            .expect("teardown requires an open socket");
        self.reactor
            .deregister_descriptor(open.descriptor, &open.registration, true);
        debug!(descriptor = open.descriptor, "closing message socket");
        // Dropping the last handle reference releases the endpoint in the
        // library. Queued operations were completed by the deregistration,
        // so their handle clones are gone by now.
        drop(open.handle);
    }
}

impl Drop for MessageSocket {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for MessageSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSocket")
            .field("open", &self.is_open())
            .field("endpoint", &self.endpoint)
            .field("shutdown", &self.shutdown)
            .finish()
    }
}
