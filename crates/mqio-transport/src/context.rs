//! The shared transport context.
//!
//! All sockets in a process share one driver-level context. The adapter
//! wraps it in a reference-counted holder constructed explicitly at
//! startup and cloned into every socket; no hidden global state. The only
//! mutation after construction is the teardown, which is idempotent and
//! serialized by the holder's own lock.

use crate::driver::{DriverResult, SocketKind, TransportDriver, TransportEndpoint};
use crate::options::{GetContextOption, SetContextOption};
use mqio_core::{Error, Result};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Shared handle to the process-wide transport context.
///
/// Cloning is cheap and shares the same underlying driver context. The
/// driver context is released when the last clone drops, or eagerly via
/// [`Context::shutdown`]. Sockets hold a clone for their whole lifetime,
/// so the context cannot disappear underneath an open socket unless
/// `shutdown` is called explicitly, after which creating endpoints is a
/// programmer error and panics.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    driver: Mutex<Option<Box<dyn TransportDriver>>>,
}

impl Context {
    /// Wrap a transport driver in a shared context.
    pub fn new(driver: impl TransportDriver + 'static) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                driver: Mutex::new(Some(Box::new(driver))),
            }),
        }
    }

    /// Create a new endpoint handle of the given kind.
    ///
    /// # Panics
    ///
    /// Panics if the context has been shut down. Sockets must not outlive
    /// the context; using one afterwards is a lifecycle bug, not a
    /// recoverable condition.
    pub fn open_endpoint(&self, kind: SocketKind) -> DriverResult<Arc<dyn TransportEndpoint>> {
        let guard = self.lock();
        let driver = guard
            .as_ref()
            .expect("transport context used after shutdown");
        driver.open_endpoint(kind)
    }

    /// Tear the driver context down now instead of at last drop.
    ///
    /// Idempotent: later calls (and the final drop) are no-ops. Existing
    /// endpoint handles keep their own references into the library and
    /// stay usable; only context-level operations become unreachable.
    pub fn shutdown(&self) {
        let mut guard = self.lock();
        if guard.take().is_some() {
            debug!("transport context shut down");
        }
    }

    /// Whether [`Context::shutdown`] has been called on any clone.
    pub fn is_shut_down(&self) -> bool {
        self.lock().is_none()
    }

    /// Set a context-scoped option.
    ///
    /// Fails with [`Error::ContextShutDown`] after teardown; driver
    /// failures surface unchanged.
    pub fn set_option<O: SetContextOption>(&self, option: &O) -> Result<()> {
        let guard = self.lock();
        let driver = guard.as_ref().ok_or(Error::ContextShutDown)?;
        driver
            .set_context_option(option.identifier(), option.value())
            .map_err(Error::from)
    }

    /// Retrieve a context-scoped option, writing the value back into the
    /// descriptor.
    ///
    /// Fails with [`Error::ContextShutDown`] after teardown; driver
    /// failures surface unchanged.
    pub fn get_option<O: GetContextOption>(&self, option: &mut O) -> Result<()> {
        let guard = self.lock();
        let driver = guard.as_ref().ok_or(Error::ContextShutDown)?;
        let value = driver.get_context_option(option.identifier())?;
        option.store(value);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Box<dyn TransportDriver>>> {
        self.inner
            .driver
            .lock()
            .expect("transport context lock poisoned")
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
