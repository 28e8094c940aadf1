//! Listener sets: the ordered, copy-on-write membership of one host key.
//!
//! Dispatch takes a snapshot by cloning the current `Arc<[ListenerEntry]>`
//! under a read lock. Mutations build a fresh slice under the write lock, so
//! an in-flight pass never observes a half-applied change.

use fanout_core::{Contract, HostKey, ListenerId, MethodId, MethodSet};
use std::{
    any::Any,
    sync::{
        Arc, PoisonError, RwLock, Weak,
        atomic::{AtomicBool, Ordering},
    },
};

/// A handle for toggling a listener entry's enabled state at runtime.
#[derive(Debug, Clone)]
pub(crate) struct EnabledHandle(Arc<AtomicBool>);

impl EnabledHandle {
    pub(crate) fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the state, returning whether it changed.
    pub(crate) fn set(&self, enabled: bool) -> bool {
        self.0.swap(enabled, Ordering::AcqRel) != enabled
    }
}

impl Default for EnabledHandle {
    fn default() -> Self {
        Self::new(true)
    }
}

/// One registered listener for one host key.
pub(crate) struct ListenerEntry<C: ?Sized + Contract> {
    listener: Weak<C>,
    id: ListenerId,
    seq: u64,
    capabilities: MethodSet,
    enabled: EnabledHandle,
}

impl<C: ?Sized + Contract> ListenerEntry<C> {
    fn new(listener: &Arc<C>, seq: u64) -> Self {
        Self {
            listener: Arc::downgrade(listener),
            id: ListenerId::of(listener),
            seq,
            capabilities: listener.capabilities(),
            enabled: EnabledHandle::default(),
        }
    }

    fn is_alive(&self) -> bool {
        self.listener.strong_count() > 0
    }

    fn info(&self) -> ListenerInfo {
        ListenerInfo {
            id: self.id,
            seq: self.seq,
            enabled: self.enabled.is_enabled(),
            alive: self.is_alive(),
            capabilities: self.capabilities,
        }
    }
}

impl<C: ?Sized + Contract> Clone for ListenerEntry<C> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener.clone(),
            id: self.id,
            seq: self.seq,
            capabilities: self.capabilities,
            enabled: self.enabled.clone(),
        }
    }
}

/// A point-in-time description of one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerInfo {
    /// Listener identity.
    pub id: ListenerId,
    /// Registration sequence number; lower registered earlier.
    pub seq: u64,
    /// Whether the entry currently receives calls.
    pub enabled: bool,
    /// Whether the listener object still exists.
    pub alive: bool,
    /// Methods the listener reported at registration.
    pub capabilities: MethodSet,
}

/// Outcome of inserting a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new entry was appended.
    Added,
    /// The listener was already registered; it kept its position and was re-enabled.
    Refreshed,
}

/// The ordered listener entries of one host key.
pub(crate) struct ListenerSet<C: ?Sized + Contract> {
    key: HostKey,
    host: Weak<dyn Any + Send + Sync>,
    entries: RwLock<Arc<[ListenerEntry<C>]>>,
}

impl<C: ?Sized + Contract> ListenerSet<C> {
    pub(crate) fn new(key: HostKey, host: Weak<dyn Any + Send + Sync>) -> Self {
        Self {
            key,
            host,
            entries: RwLock::new(Arc::from(Vec::new())),
        }
    }

    pub(crate) fn key(&self) -> HostKey {
        self.key
    }

    fn snapshot(&self) -> Arc<[ListenerEntry<C>]> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve the listeners that should receive `method`, in registration order.
    ///
    /// Enabled flags and liveness are read once here; later toggles do not
    /// affect the returned list.
    pub(crate) fn resolve(&self, method: MethodId) -> Vec<(ListenerId, Arc<C>)> {
        self.snapshot()
            .iter()
            .filter(|e| e.capabilities.contains(method) && e.enabled.is_enabled())
            .filter_map(|e| e.listener.upgrade().map(|l| (e.id, l)))
            .collect()
    }

    fn update<R>(&self, f: impl FnOnce(&mut Vec<ListenerEntry<C>>) -> R) -> R {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut entries = guard.to_vec();
        let result = f(&mut entries);
        *guard = Arc::from(entries);
        result
    }

    pub(crate) fn insert(&self, listener: &Arc<C>, seq: u64, prune: bool) -> Insertion {
        let id = ListenerId::of(listener);
        self.update(|entries| {
            if prune {
                entries.retain(ListenerEntry::is_alive);
            }
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                if entries[pos].is_alive() {
                    entries[pos].enabled.set(true);
                    return Insertion::Refreshed;
                }
                // A dead listener left its address behind for this one.
                entries.remove(pos);
            }
            entries.push(ListenerEntry::new(listener, seq));
            Insertion::Added
        })
    }
}

/// Contract-erased operations the registry performs across all keys.
pub(crate) trait ErasedSet: Send + Sync {
    fn host_alive(&self) -> bool;
    fn len(&self) -> usize;
    fn contains(&self, id: ListenerId) -> bool;
    fn is_enabled(&self, id: ListenerId) -> Option<bool>;
    fn set_enabled(&self, id: ListenerId, enabled: bool) -> usize;
    fn remove_all(&self, id: ListenerId) -> usize;
    fn clear(&self) -> usize;
    fn prune(&self) -> usize;
    fn infos(&self) -> Vec<ListenerInfo>;
}

impl<C: ?Sized + Contract> ErasedSet for ListenerSet<C> {
    fn host_alive(&self) -> bool {
        self.host.strong_count() > 0
    }

    fn len(&self) -> usize {
        self.snapshot().len()
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.snapshot().iter().any(|e| e.id == id && e.is_alive())
    }

    fn is_enabled(&self, id: ListenerId) -> Option<bool> {
        self.snapshot()
            .iter()
            .find(|e| e.id == id && e.is_alive())
            .map(|e| e.enabled.is_enabled())
    }

    fn set_enabled(&self, id: ListenerId, enabled: bool) -> usize {
        // Flags are shared handles, so no copy of the slice is needed. The
        // read guard keeps toggles ordered against structural mutation.
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut touched = 0;
        for entry in guard.iter().filter(|e| e.id == id) {
            entry.enabled.set(enabled);
            // A dead entry at a reused address is flipped but not counted.
            if entry.is_alive() {
                touched += 1;
            }
        }
        touched
    }

    fn remove_all(&self, id: ListenerId) -> usize {
        if !self.snapshot().iter().any(|e| e.id == id) {
            return 0;
        }
        self.update(|entries| {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            before - entries.len()
        })
    }

    fn clear(&self) -> usize {
        self.update(|entries| std::mem::take(entries).len())
    }

    fn prune(&self) -> usize {
        if self.snapshot().iter().all(ListenerEntry::is_alive) {
            return 0;
        }
        self.update(|entries| {
            let before = entries.len();
            entries.retain(ListenerEntry::is_alive);
            before - entries.len()
        })
    }

    fn infos(&self) -> Vec<ListenerInfo> {
        self.snapshot().iter().map(ListenerEntry::info).collect()
    }
}
