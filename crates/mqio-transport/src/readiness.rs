//! Native readiness extraction.
//!
//! Message transport handles do not follow byte-stream socket semantics,
//! but the libraries expose an OS-level descriptor whose readiness means
//! "the handle may now make progress". That descriptor is what gets
//! registered with the reactor.
//!
//! Two caveats shape everything built on top of it:
//! - The descriptor is edge-triggered advisory state. Readiness on it does
//!   NOT mean a frame can be transferred; it means "re-try the handle's
//!   own non-blocking call". Operations must re-verify by performing the
//!   call and treating would-block as "keep waiting".
//! - The descriptor is stable for the handle's lifetime, so it is
//!   registered once at open and deregistered at close.

use crate::driver::{NativeDescriptor, TransportEndpoint};
use mqio_core::Result;

/// Derive the pollable OS-level descriptor for an opened handle.
///
/// Fails with the driver's error if the handle exposes no descriptor
/// (for example, when the handle has not been opened by the library yet).
pub fn pollable_descriptor(endpoint: &dyn TransportEndpoint) -> Result<NativeDescriptor> {
    let descriptor = endpoint.native_descriptor()?;
    Ok(descriptor)
}
