//! In-memory transport driver.
//!
//! `LoopbackDriver` implements the driver traits against plain queues so
//! the suites can script every behavior the adapter has to cope with:
//! would-block on both directions, blocking sends and receives, native
//! failures with specific codes, refused descriptors, and the multipart
//! receive cursor.

use mqio_core::{DriverError, MessageFlags};
use mqio_transport::options::ids;
use mqio_transport::{
    DriverResult, NativeDescriptor, Progress, SocketKind, TransportDriver, TransportEndpoint,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// One message frame with its multipart marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame payload.
    pub data: Vec<u8>,
    /// Whether more frames of the same message follow.
    pub more: bool,
}

#[derive(Default)]
struct EndpointState {
    inbox: std::collections::VecDeque<Frame>,
    sent: Vec<Frame>,
    send_capacity: Option<usize>,
    fail_next_send: Option<DriverError>,
    fail_next_receive: Option<DriverError>,
    fail_attach: Option<DriverError>,
    refuse_descriptor: bool,
    attached: Vec<String>,
    options: HashMap<u32, Vec<u8>>,
    last_receive_had_more: bool,
}

/// A scriptable in-memory endpoint.
pub struct LoopbackEndpoint {
    descriptor: NativeDescriptor,
    kind: SocketKind,
    state: Mutex<EndpointState>,
    readable: Condvar,
    writable: Condvar,
}

impl LoopbackEndpoint {
    fn new(descriptor: NativeDescriptor, kind: SocketKind) -> Self {
        Self {
            descriptor,
            kind,
            state: Mutex::new(EndpointState::default()),
            readable: Condvar::new(),
            writable: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EndpointState> {
        self.state.lock().expect("loopback endpoint lock poisoned")
    }

    /// The kind the endpoint was opened with.
    pub fn kind(&self) -> SocketKind {
        self.kind
    }

    /// Make a frame available for receiving.
    pub fn push_frame(&self, data: &[u8], more: bool) {
        self.lock().inbox.push_back(Frame {
            data: data.to_vec(),
            more,
        });
        self.readable.notify_all();
    }

    /// Frames sent so far, in order.
    pub fn sent(&self) -> Vec<Frame> {
        self.lock().sent.clone()
    }

    /// Discard recorded sends, freeing capacity for blocked senders.
    pub fn drain_sent(&self) -> Vec<Frame> {
        let drained = std::mem::take(&mut self.lock().sent);
        self.writable.notify_all();
        drained
    }

    /// Bound the number of un-drained sends; further sends would block.
    pub fn set_send_capacity(&self, frames: usize) {
        self.lock().send_capacity = Some(frames);
    }

    /// Fail the next send with a native error.
    pub fn fail_next_send(&self, code: i32, message: &str) {
        self.lock().fail_next_send = Some(DriverError::new(code, message));
    }

    /// Fail the next receive with a native error.
    pub fn fail_next_receive(&self, code: i32, message: &str) {
        self.lock().fail_next_receive = Some(DriverError::new(code, message));
    }

    /// Fail the next bind or connect with a native error.
    pub fn fail_attach(&self, code: i32, message: &str) {
        self.lock().fail_attach = Some(DriverError::new(code, message));
    }

    /// Make `native_descriptor` report that no descriptor is available.
    pub fn refuse_descriptor(&self) {
        self.lock().refuse_descriptor = true;
    }

    /// Endpoints this handle bound or connected to, in order.
    pub fn attached(&self) -> Vec<String> {
        self.lock().attached.clone()
    }

    /// A stored option payload, if any.
    pub fn option(&self, identifier: u32) -> Option<Vec<u8>> {
        self.lock().options.get(&identifier).cloned()
    }
}

impl TransportEndpoint for LoopbackEndpoint {
    fn try_send(&self, frame: &[u8], flags: MessageFlags) -> DriverResult<Progress> {
        let mut state = self.lock();
        if let Some(err) = state.fail_next_send.take() {
            return Err(err);
        }
        loop {
            let full = state
                .send_capacity
                .is_some_and(|capacity| state.sent.len() >= capacity);
            if !full {
                state.sent.push(Frame {
                    data: frame.to_vec(),
                    more: flags.is_more(),
                });
                return Ok(Progress::Ready(frame.len()));
            }
            if flags.is_no_wait() {
                return Ok(Progress::WouldBlock);
            }
            state = self
                .writable
                .wait(state)
                .expect("loopback endpoint lock poisoned");
        }
    }

    fn try_receive(&self, frame: &mut [u8], flags: MessageFlags) -> DriverResult<Progress> {
        let mut state = self.lock();
        if let Some(err) = state.fail_next_receive.take() {
            return Err(err);
        }
        loop {
            if let Some(queued) = state.inbox.pop_front() {
                let copied = queued.data.len().min(frame.len());
                frame[..copied].copy_from_slice(&queued.data[..copied]);
                state.last_receive_had_more = queued.more;
                return Ok(Progress::Ready(copied));
            }
            if flags.is_no_wait() {
                return Ok(Progress::WouldBlock);
            }
            state = self
                .readable
                .wait(state)
                .expect("loopback endpoint lock poisoned");
        }
    }

    fn bind(&self, endpoint: &str) -> DriverResult<()> {
        self.attach(endpoint)
    }

    fn connect(&self, endpoint: &str) -> DriverResult<()> {
        self.attach(endpoint)
    }

    fn native_descriptor(&self) -> DriverResult<NativeDescriptor> {
        if self.lock().refuse_descriptor {
            return Err(DriverError::new(19, "endpoint exposes no descriptor"));
        }
        Ok(self.descriptor)
    }

    fn set_option(&self, identifier: u32, payload: &[u8]) -> DriverResult<()> {
        self.lock().options.insert(identifier, payload.to_vec());
        Ok(())
    }

    fn get_option(&self, identifier: u32, payload: &mut [u8]) -> DriverResult<usize> {
        let state = self.lock();
        if identifier == ids::RECEIVE_MORE {
            let value = i32::from(state.last_receive_had_more).to_ne_bytes();
            payload[..value.len()].copy_from_slice(&value);
            return Ok(value.len());
        }
        let stored = state
            .options
            .get(&identifier)
            .ok_or_else(|| DriverError::new(22, format!("unknown option {identifier}")))?;
        if stored.len() > payload.len() {
            return Err(DriverError::new(22, "option payload does not fit"));
        }
        payload[..stored.len()].copy_from_slice(stored);
        Ok(stored.len())
    }
}

impl LoopbackEndpoint {
    fn attach(&self, endpoint: &str) -> DriverResult<()> {
        let mut state = self.lock();
        if let Some(err) = state.fail_attach.take() {
            return Err(err);
        }
        state.attached.push(endpoint.to_owned());
        Ok(())
    }
}

#[derive(Default)]
struct DriverState {
    endpoints: Mutex<Vec<Arc<LoopbackEndpoint>>>,
    context_options: Mutex<HashMap<u32, i32>>,
    fail_next_open: Mutex<Option<DriverError>>,
    refuse_next_descriptor: std::sync::atomic::AtomicBool,
}

/// The in-memory transport driver. Clones share one state so tests keep a
/// handle to everything the adapter opened.
#[derive(Clone, Default)]
pub struct LoopbackDriver {
    next_descriptor: Arc<AtomicI32>,
    state: Arc<DriverState>,
}

impl LoopbackDriver {
    /// Create a driver with no endpoints.
    pub fn new() -> Self {
        Self {
            next_descriptor: Arc::new(AtomicI32::new(1000)),
            ..Self::default()
        }
    }

    /// The `index`-th endpoint opened through this driver.
    pub fn endpoint(&self, index: usize) -> Arc<LoopbackEndpoint> {
        Arc::clone(&self.state.endpoints.lock().expect("driver lock poisoned")[index])
    }

    /// Number of endpoints opened so far.
    pub fn endpoints_opened(&self) -> usize {
        self.state.endpoints.lock().expect("driver lock poisoned").len()
    }

    /// Fail the next `open_endpoint` with a native error.
    pub fn fail_next_open(&self, code: i32, message: &str) {
        *self
            .state
            .fail_next_open
            .lock()
            .expect("driver lock poisoned") = Some(DriverError::new(code, message));
    }

    /// Make the next opened endpoint refuse descriptor extraction.
    pub fn refuse_next_descriptor(&self) {
        self.state
            .refuse_next_descriptor
            .store(true, Ordering::Relaxed);
    }

    /// A context option value stored through the adapter.
    pub fn context_option(&self, identifier: u32) -> Option<i32> {
        self.state
            .context_options
            .lock()
            .expect("driver lock poisoned")
            .get(&identifier)
            .copied()
    }
}

impl TransportDriver for LoopbackDriver {
    fn open_endpoint(&self, kind: SocketKind) -> DriverResult<Arc<dyn TransportEndpoint>> {
        if let Some(err) = self
            .state
            .fail_next_open
            .lock()
            .expect("driver lock poisoned")
            .take()
        {
            return Err(err);
        }
        let descriptor = self.next_descriptor.fetch_add(1, Ordering::Relaxed);
        let endpoint = Arc::new(LoopbackEndpoint::new(descriptor, kind));
        if self
            .state
            .refuse_next_descriptor
            .swap(false, Ordering::Relaxed)
        {
            endpoint.refuse_descriptor();
        }
        self.state
            .endpoints
            .lock()
            .expect("driver lock poisoned")
            .push(Arc::clone(&endpoint));
        Ok(endpoint)
    }

    fn set_context_option(&self, identifier: u32, value: i32) -> DriverResult<()> {
        self.state
            .context_options
            .lock()
            .expect("driver lock poisoned")
            .insert(identifier, value);
        Ok(())
    }

    fn get_context_option(&self, identifier: u32) -> DriverResult<i32> {
        self.state
            .context_options
            .lock()
            .expect("driver lock poisoned")
            .get(&identifier)
            .copied()
            .ok_or_else(|| DriverError::new(22, format!("unknown context option {identifier}")))
    }
}
