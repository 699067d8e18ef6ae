//! # mqio Core
//!
//! Core types shared by the mqio reactor-integration layer.
//!
//! This crate provides:
//! - The error taxonomy for socket and context operations
//! - Message flags (multipart framing, blocking control)
//! - The monotonic shutdown-state ordering
//!
//! It deliberately contains no I/O: everything that touches a descriptor or
//! the transport library lives in `mqio-transport`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod flags;
pub mod shutdown;

pub use error::{DriverError, Error, Result};
pub use flags::MessageFlags;
pub use shutdown::{Shutdown, ShutdownState};
