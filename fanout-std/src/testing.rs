//! Testing utilities for fanout.
//!
//! - [`RecordingHost`]: a host with a single delegate slot for any contract
//! - [`CallLog`]: a shared, ordered log that test listeners write into

use crate::{host::DelegateHost, proxy::DispatchProxy};
use fanout_core::{BoxError, Contract};
use std::sync::{
    Arc, Mutex, RwLock,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

// ============================================================================
// Recording Host
// ============================================================================

/// A host that stores whatever proxy it is handed and counts installs.
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(RecordingHost::<dyn TableDelegate>::new());
/// registry.add_listener(&host, &listener)?;
///
/// host.delegate().unwrap().did_select(3);
/// assert_eq!(host.install_count(), 1);
/// ```
pub struct RecordingHost<C: ?Sized + Contract> {
    slot: RwLock<Option<Arc<DispatchProxy<C>>>>,
    installs: AtomicUsize,
    rejecting: AtomicBool,
}

impl<C: ?Sized + Contract> RecordingHost<C> {
    /// Create a host with an empty slot.
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            installs: AtomicUsize::new(0),
            rejecting: AtomicBool::new(false),
        }
    }

    /// Create a host whose slot refuses every proxy.
    pub fn rejecting() -> Self {
        let host = Self::new();
        host.set_rejecting(true);
        host
    }

    /// Make the slot accept or refuse future installs.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// The currently installed proxy.
    pub fn delegate(&self) -> Option<Arc<DispatchProxy<C>>> {
        self.slot.read().unwrap().clone()
    }

    /// Number of successful installs.
    pub fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

impl<C: ?Sized + Contract> Default for RecordingHost<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized + Contract> DelegateHost<C> for RecordingHost<C> {
    fn install_delegate(&self, proxy: Arc<DispatchProxy<C>>) -> Result<(), BoxError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err("delegate slot is read-only".into());
        }
        *self.slot.write().unwrap() = Some(proxy);
        self.installs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Call Log
// ============================================================================

/// An ordered record of calls, shared between listeners and the test body.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let first = Recorder::new("first", log.clone());
/// let second = Recorder::new("second", log.clone());
///
/// // ... dispatch ...
///
/// assert_eq!(log.entries(), ["first:did_select(3)", "second:did_select(3)"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    /// Get a clone of all entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Get the number of entries.
    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Count entries that start with `prefix`.
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
