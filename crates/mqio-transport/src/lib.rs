//! # mqio Transport
//!
//! Reactor integration for message-oriented transport endpoints.
//!
//! This crate adapts opaque, message-framed endpoint handles from an
//! external transport library into asynchronous I/O resources driven by a
//! reactor-style event loop. It provides:
//! - The collaborator interfaces to the transport library and the reactor
//! - The shared, reference-counted transport context
//! - The socket facade with its open/bind/shutdown lifecycle contract
//! - One-shot send/receive operation objects with would-block retry
//! - The typed option protocol for context- and socket-scoped options
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Application wrapper                      │
//! └───────────────┬──────────────────────────────────────────────┘
//!                 │ open / bind / send / async_receive / ...
//! ┌───────────────▼──────────────────────────────────────────────┐
//! │                 MessageSocket (socket facade)                │
//! │   context clone · endpoint handle · registration · shutdown  │
//! └───────┬──────────────────────────────────────┬───────────────┘
//!         │ try_send / try_receive               │ start_op / cancel_ops
//! ┌───────▼───────────────┐          ┌───────────▼───────────────┐
//! │   TransportDriver /   │          │   Reactor (external)      │
//! │ TransportEndpoint     │          │ per-descriptor op queues  │
//! │   (external library)  │◀─────────│ readiness → Op::perform   │
//! └───────────────────────┘  retries └───────────────────────────┘
//! ```
//!
//! The reactor and the transport library are collaborators, not parts of
//! this crate: both are consumed through the traits in [`reactor`] and
//! [`driver`]. The adapter's job is bridging their incompatible models:
//! the library's synchronous would-block API against the reactor's
//! readiness callbacks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod driver;
pub mod op;
pub mod options;
pub mod readiness;
pub mod reactor;
pub mod socket;

pub use context::Context;
pub use driver::{
    DriverResult, NativeDescriptor, Progress, SocketKind, TransportDriver, TransportEndpoint,
};
pub use mqio_core::{DriverError, Error, MessageFlags, Result, Shutdown, ShutdownState};
pub use op::{ReceiveOp, SendOp};
pub use options::{
    GetContextOption, GetSocketOption, SetContextOption, SetSocketOption,
};
pub use reactor::{OpDirection, Perform, Reactor, ReactorOp, Registration};
pub use socket::MessageSocket;
