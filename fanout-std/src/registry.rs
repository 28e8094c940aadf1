//! # Registry
//!
//! The table of (host, contract) keys and their listener sets.
//!
//! The registry holds only weak references to hosts and listeners. A dropped
//! listener stops receiving calls immediately and its entry is reclaimed on
//! the next mutation of its set (or by [`Registry::prune`]). A dropped host's
//! key is replaced if a new host is configured at the same address.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = Registry::new();
//! let table = Arc::new(TableView::default());
//! let logger: Arc<dyn TableDelegate> = Arc::new(SelectionLogger);
//!
//! registry.add_listener(&table, &logger)?;
//! table.select(3); // SelectionLogger::did_select(3)
//!
//! registry.set_enabled(&logger, false);
//! table.select(4); // nobody is called
//! ```

use crate::{
    config::{Diagnostics, RegistryBuilder},
    host::{DelegateHost, HostInstaller, SlotInstaller},
    proxy::DispatchProxy,
    set::{ErasedSet, Insertion, ListenerInfo, ListenerSet},
};
use fanout_core::{ConfigurationError, Contract, HostId, HostKey, ListenerId};
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{
        Arc, Mutex, PoisonError, RwLock, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

/// One configured key: its listener set and the proxy installed for it.
struct Binding {
    set: Arc<dyn ErasedSet>,
    proxy: Arc<dyn Any + Send + Sync>,
}

impl Binding {
    fn proxy<C: ?Sized + Contract>(&self) -> Option<Arc<DispatchProxy<C>>> {
        self.proxy.clone().downcast::<DispatchProxy<C>>().ok()
    }
}

/// Result of a [`Registry::prune`] sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Entries of dropped listeners that were removed.
    pub listeners: usize,
    /// Keys of dropped hosts that were removed.
    pub hosts: usize,
}

/// A thread-safe registry of multicast delegate bindings.
pub struct Registry {
    bindings: RwLock<HashMap<HostKey, Binding>>,
    configure_lock: Mutex<()>,
    sequence: AtomicU64,
    diagnostics: Arc<Diagnostics>,
    prune_on_mutation: bool,
}

impl Registry {
    /// Create a registry with default settings.
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Start configuring a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn from_parts(diagnostics: Diagnostics, prune_on_mutation: bool) -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            configure_lock: Mutex::new(()),
            sequence: AtomicU64::new(0),
            diagnostics: Arc::new(diagnostics),
            prune_on_mutation,
        }
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Install a dispatch proxy into `host`'s slot for contract `C`.
    ///
    /// Idempotent: once a key is configured, later calls return the installed
    /// proxy without invoking the installer again. Fails when `installer` is
    /// `None` or rejects the proxy; a failed call leaves nothing behind.
    ///
    /// The installer runs while configuration is serialized and must not call
    /// back into `configure` or `add_listener`.
    pub fn configure<C, H>(
        &self,
        host: &Arc<H>,
        installer: Option<&dyn SlotInstaller<C>>,
    ) -> Result<Arc<DispatchProxy<C>>, ConfigurationError>
    where
        C: ?Sized + Contract,
        H: Send + Sync + 'static,
    {
        let key = HostKey::of::<C, H>(host);
        let Some(installer) = installer else {
            return Err(ConfigurationError::MissingInstaller { key });
        };

        let _serial = self
            .configure_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(proxy) = self.live_proxy::<C>(key) {
            return Ok(proxy);
        }

        let weak_host = Arc::downgrade(host) as Weak<dyn Any + Send + Sync>;
        let set = Arc::new(ListenerSet::<C>::new(key, weak_host));
        let proxy = Arc::new(DispatchProxy::new(set.clone(), self.diagnostics.clone()));

        installer
            .install(proxy.clone())
            .map_err(|source| ConfigurationError::InstallRejected { key, source })?;

        let mut bindings = self.write_bindings();
        if self.prune_on_mutation {
            bindings.retain(|_, b| b.set.host_alive());
        }
        // Replaces any binding left behind by a dead host at this address.
        bindings.insert(
            key,
            Binding {
                set,
                proxy: proxy.clone(),
            },
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(%key, "installed dispatch proxy");

        Ok(proxy)
    }

    // ------------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------------

    /// Register `listener` for `host`'s delegate slot.
    ///
    /// Configures the key on first use, with `host` itself as installer. A
    /// listener already registered for this key keeps its position and is
    /// re-enabled.
    pub fn add_listener<C, H>(
        &self,
        host: &Arc<H>,
        listener: &Arc<C>,
    ) -> Result<Insertion, ConfigurationError>
    where
        C: ?Sized + Contract,
        H: DelegateHost<C>,
    {
        let installer: &dyn SlotInstaller<C> = &HostInstaller(&**host);
        self.register(host, listener, Some(installer))
    }

    /// Register `listener` for a key set up earlier with [`configure`](Self::configure).
    ///
    /// For hosts whose slot is reached only through an explicit
    /// [`SlotInstaller`]. Fails with [`ConfigurationError::MissingInstaller`]
    /// when the key is not configured.
    pub fn add_configured_listener<C, H>(
        &self,
        host: &Arc<H>,
        listener: &Arc<C>,
    ) -> Result<Insertion, ConfigurationError>
    where
        C: ?Sized + Contract,
        H: Send + Sync + 'static,
    {
        self.register(host, listener, None)
    }

    fn register<C, H>(
        &self,
        host: &Arc<H>,
        listener: &Arc<C>,
        installer: Option<&dyn SlotInstaller<C>>,
    ) -> Result<Insertion, ConfigurationError>
    where
        C: ?Sized + Contract,
        H: Send + Sync + 'static,
    {
        let key = HostKey::of::<C, H>(host);
        loop {
            if let Some(insertion) = self.insert_bound(key, listener) {
                #[cfg(feature = "tracing")]
                tracing::debug!(%key, listener = %ListenerId::of(listener), ?insertion, "listener added");

                return Ok(insertion);
            }
            // Unconfigured, or removed by `remove_host` since the last attempt.
            self.configure(host, installer)?;
        }
    }

    /// Insert into the set bound to `key`. The bindings guard is held across
    /// the insert so `remove_host` either runs first or clears the new entry.
    fn insert_bound<C: ?Sized + Contract>(
        &self,
        key: HostKey,
        listener: &Arc<C>,
    ) -> Option<Insertion> {
        let bindings = self.read_bindings();
        let proxy = bindings
            .get(&key)
            .filter(|b| b.set.host_alive())
            .and_then(Binding::proxy::<C>)?;
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        Some(proxy.set().insert(listener, seq, self.prune_on_mutation))
    }

    /// Deregister `listener` from `host`'s slot. Returns whether it was registered.
    pub fn remove_listener<C, H>(&self, host: &Arc<H>, listener: &Arc<C>) -> bool
    where
        C: ?Sized + Contract,
        H: ?Sized,
    {
        self.remove_all_listeners(host, listener) > 0
    }

    /// Remove every entry of `listener` for `host`'s slot, returning how many
    /// were removed. Removing an unknown listener is a no-op.
    pub fn remove_all_listeners<C, H>(&self, host: &Arc<H>, listener: &Arc<C>) -> usize
    where
        C: ?Sized + Contract,
        H: ?Sized,
    {
        let key = HostKey::of::<C, H>(host);
        let Some(set) = self.live_set(key) else {
            return 0;
        };
        let id = ListenerId::of(listener);
        let removed = set.remove_all(id);
        if self.prune_on_mutation {
            set.prune();
        }

        #[cfg(feature = "tracing")]
        {
            if removed > 0 {
                tracing::debug!(%key, listener = %id, removed, "listener removed");
            }
        }

        removed
    }

    /// Enable or disable `listener` everywhere it is registered, across all
    /// hosts and contracts. Returns the number of live entries affected.
    pub fn set_enabled<L: ?Sized>(&self, listener: &Arc<L>, enabled: bool) -> usize {
        let id = ListenerId::of(listener);
        let touched: usize = self
            .read_bindings()
            .values()
            .filter(|b| b.set.host_alive())
            .map(|b| b.set.set_enabled(id, enabled))
            .sum();

        #[cfg(feature = "tracing")]
        tracing::debug!(listener = %id, enabled, touched, "listener toggled");

        touched
    }

    /// Remove every listener of `host`'s slot for contract `C`, keeping the
    /// proxy installed. Returns the number of entries removed.
    pub fn clear<C, H>(&self, host: &Arc<H>) -> usize
    where
        C: ?Sized + Contract,
        H: ?Sized,
    {
        self.live_set(HostKey::of::<C, H>(host))
            .map_or(0, |set| set.clear())
    }

    /// Forget every key of `host`, across all contracts. Returns the number
    /// of keys removed. Installed proxies stay in place but become idle.
    pub fn remove_host<H: ?Sized>(&self, host: &Arc<H>) -> usize {
        let id = HostId::of(host);
        let mut bindings = self.write_bindings();
        let keys: Vec<HostKey> = bindings.keys().filter(|k| k.host() == id).copied().collect();
        for key in &keys {
            if let Some(binding) = bindings.remove(key) {
                binding.set.clear();
            }
        }
        let removed = keys.len();

        #[cfg(feature = "tracing")]
        tracing::debug!(host = %id, removed, "host removed");

        removed
    }

    /// Drop entries of dropped listeners and keys of dropped hosts.
    pub fn prune(&self) -> PruneReport {
        let mut bindings = self.write_bindings();
        let before = bindings.len();
        bindings.retain(|_, b| b.set.host_alive());
        let report = PruneReport {
            hosts: before - bindings.len(),
            listeners: bindings.values().map(|b| b.set.prune()).sum(),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(hosts = report.hosts, listeners = report.listeners, "pruned");

        report
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// The proxy installed for `host` under contract `C`, if configured.
    pub fn proxy<C, H>(&self, host: &Arc<H>) -> Option<Arc<DispatchProxy<C>>>
    where
        C: ?Sized + Contract,
        H: ?Sized,
    {
        self.live_proxy::<C>(HostKey::of::<C, H>(host))
    }

    /// Check whether `host` has a proxy installed for contract `C`.
    pub fn is_configured<C, H>(&self, host: &Arc<H>) -> bool
    where
        C: ?Sized + Contract,
        H: ?Sized,
    {
        self.live_set(HostKey::of::<C, H>(host)).is_some()
    }

    /// Number of listener entries for `host` under contract `C`.
    pub fn listener_count<C, H>(&self, host: &Arc<H>) -> usize
    where
        C: ?Sized + Contract,
        H: ?Sized,
    {
        self.live_set(HostKey::of::<C, H>(host))
            .map_or(0, |set| set.len())
    }

    /// Check whether `listener` is registered for `host`'s slot.
    pub fn contains<C, H>(&self, host: &Arc<H>, listener: &Arc<C>) -> bool
    where
        C: ?Sized + Contract,
        H: ?Sized,
    {
        self.live_set(HostKey::of::<C, H>(host))
            .is_some_and(|set| set.contains(ListenerId::of(listener)))
    }

    /// Enabled state of `listener` for `host`'s slot, or `None` if not registered.
    pub fn is_enabled<C, H>(&self, host: &Arc<H>, listener: &Arc<C>) -> Option<bool>
    where
        C: ?Sized + Contract,
        H: ?Sized,
    {
        self.live_set(HostKey::of::<C, H>(host))
            .and_then(|set| set.is_enabled(ListenerId::of(listener)))
    }

    /// Describe the listener entries for `host` under contract `C`, in order.
    pub fn listeners<C, H>(&self, host: &Arc<H>) -> Vec<ListenerInfo>
    where
        C: ?Sized + Contract,
        H: ?Sized,
    {
        self.live_set(HostKey::of::<C, H>(host))
            .map(|set| set.infos())
            .unwrap_or_default()
    }

    /// Number of configured keys, live or not yet pruned.
    pub fn key_count(&self) -> usize {
        self.read_bindings().len()
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn read_bindings(&self) -> std::sync::RwLockReadGuard<'_, HashMap<HostKey, Binding>> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_bindings(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<HostKey, Binding>> {
        self.bindings.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_set(&self, key: HostKey) -> Option<Arc<dyn ErasedSet>> {
        self.read_bindings()
            .get(&key)
            .filter(|b| b.set.host_alive())
            .map(|b| b.set.clone())
    }

    fn live_proxy<C: ?Sized + Contract>(&self, key: HostKey) -> Option<Arc<DispatchProxy<C>>> {
        self.read_bindings()
            .get(&key)
            .filter(|b| b.set.host_alive())
            .and_then(Binding::proxy::<C>)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("keys", &self.key_count())
            .field("prune_on_mutation", &self.prune_on_mutation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{Counter, Table},
        testing::{CallLog, RecordingHost},
    };
    use fanout_core::BoxError;

    type Host = RecordingHost<dyn Table>;

    fn listener(name: &'static str, log: &CallLog) -> Arc<dyn Table> {
        Arc::new(Counter::named(name, log))
    }

    #[test]
    fn test_configure_without_installer_fails() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());

        let err = registry.configure::<dyn Table, _>(&host, None).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingInstaller { .. }));
        assert_eq!(err.key(), HostKey::of::<dyn Table, _>(&host));
        assert!(!registry.is_configured::<dyn Table, _>(&host));
        assert_eq!(registry.key_count(), 0);
    }

    #[test]
    fn test_rejected_install_leaves_no_state() {
        let registry = Registry::new();
        let host = Arc::new(Host::rejecting());
        let log = CallLog::new();
        let a = listener("a", &log);

        let err = registry.add_listener(&host, &a).unwrap_err();
        assert!(matches!(err, ConfigurationError::InstallRejected { .. }));
        assert!(!registry.is_configured::<dyn Table, _>(&host));
        assert_eq!(registry.listener_count::<dyn Table, _>(&host), 0);

        host.set_rejecting(false);
        assert_eq!(registry.add_listener(&host, &a).unwrap(), Insertion::Added);
        assert_eq!(host.install_count(), 1);
    }

    #[test]
    fn test_configure_is_idempotent() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let install = |proxy: Arc<DispatchProxy<dyn Table>>| -> Result<(), BoxError> {
            host.install_delegate(proxy)
        };

        let first = registry.configure::<dyn Table, _>(&host, Some(&install)).unwrap();
        let second = registry.configure::<dyn Table, _>(&host, Some(&install)).unwrap();
        let log = CallLog::new();
        registry.add_listener(&host, &listener("a", &log)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(host.install_count(), 1);
        assert_eq!(registry.key_count(), 1);
        assert!(Arc::ptr_eq(
            &registry.proxy::<dyn Table, _>(&host).unwrap(),
            &host.delegate().unwrap()
        ));
    }

    #[test]
    fn test_double_add_keeps_one_entry() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);

        assert_eq!(registry.add_listener(&host, &a).unwrap(), Insertion::Added);
        assert_eq!(registry.add_listener(&host, &a).unwrap(), Insertion::Refreshed);
        assert_eq!(registry.listener_count::<dyn Table, _>(&host), 1);

        host.delegate().unwrap().did_select(1);
        assert_eq!(log.count(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        let b = listener("b", &log);

        assert!(!registry.remove_listener(&host, &a));
        assert_eq!(registry.remove_all_listeners(&host, &a), 0);

        registry.add_listener(&host, &a).unwrap();
        registry.add_listener(&host, &b).unwrap();
        assert!(registry.remove_listener(&host, &a));
        assert!(!registry.remove_listener(&host, &a));
        assert!(!registry.contains(&host, &a));
        assert!(registry.contains(&host, &b));

        host.delegate().unwrap().did_select(2);
        assert_eq!(log.entries(), ["b:did_select(2)"]);
    }

    #[test]
    fn test_remove_all_listeners() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);

        registry.add_listener(&host, &a).unwrap();
        registry.add_listener(&host, &a).unwrap();
        assert_eq!(registry.remove_all_listeners(&host, &a), 1);
        assert_eq!(registry.listener_count::<dyn Table, _>(&host), 0);
        assert!(registry.is_configured::<dyn Table, _>(&host));
    }

    #[test]
    fn test_set_enabled_spans_hosts() {
        let registry = Registry::new();
        let left = Arc::new(Host::new());
        let right = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        let b = listener("b", &log);
        registry.add_listener(&left, &a).unwrap();
        registry.add_listener(&left, &b).unwrap();
        registry.add_listener(&right, &a).unwrap();

        assert_eq!(registry.set_enabled(&a, false), 2);
        assert_eq!(registry.is_enabled(&left, &a), Some(false));
        assert_eq!(registry.is_enabled(&right, &a), Some(false));
        assert_eq!(registry.is_enabled(&right, &b), None);

        left.delegate().unwrap().did_select(1);
        right.delegate().unwrap().did_select(1);
        assert_eq!(log.entries(), ["b:did_select(1)"]);

        registry.set_enabled(&a, true);
        log.clear();
        left.delegate().unwrap().did_select(2);
        assert_eq!(log.entries(), ["a:did_select(2)", "b:did_select(2)"]);
    }

    #[test]
    fn test_set_enabled_unknown_listener() {
        let registry = Registry::new();
        let stranger = listener("stranger", &CallLog::new());
        assert_eq!(registry.set_enabled(&stranger, false), 0);
    }

    #[test]
    fn test_add_reenables_disabled_listener() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        let b = listener("b", &log);
        registry.add_listener(&host, &a).unwrap();
        registry.add_listener(&host, &b).unwrap();
        registry.set_enabled(&a, false);

        registry.add_listener(&host, &a).unwrap();
        let infos = registry.listeners::<dyn Table, _>(&host);
        assert_eq!(infos[0].id, ListenerId::of(&a));
        assert!(infos[0].enabled);
        assert!(infos[0].seq < infos[1].seq);
    }

    #[test]
    fn test_dropped_listener_is_skipped_and_reclaimed() {
        let registry = Registry::builder().prune_on_mutation(false).build();
        let host = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        let b = listener("b", &log);
        registry.add_listener(&host, &a).unwrap();
        registry.add_listener(&host, &b).unwrap();
        drop(a);

        host.delegate().unwrap().did_select(3);
        assert_eq!(log.entries(), ["b:did_select(3)"]);
        assert_eq!(registry.listener_count::<dyn Table, _>(&host), 2);

        let report = registry.prune();
        assert_eq!(report, PruneReport { listeners: 1, hosts: 0 });
        assert_eq!(registry.listener_count::<dyn Table, _>(&host), 1);
    }

    #[test]
    fn test_mutation_prunes_dead_listeners() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        registry.add_listener(&host, &a).unwrap();
        drop(a);

        let b = listener("b", &log);
        registry.add_listener(&host, &b).unwrap();
        let infos = registry.listeners::<dyn Table, _>(&host);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, ListenerId::of(&b));
    }

    #[test]
    fn test_dropped_host_is_pruned() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        registry.add_listener(&host, &a).unwrap();
        drop(host);

        assert_eq!(registry.key_count(), 1);
        assert_eq!(registry.set_enabled(&a, false), 1);
        assert_eq!(registry.prune().hosts, 1);
        assert_eq!(registry.key_count(), 0);
    }

    #[test]
    fn test_remove_host() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let other = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        registry.add_listener(&host, &a).unwrap();
        registry.add_listener(&other, &a).unwrap();

        assert_eq!(registry.remove_host(&host), 1);
        assert_eq!(registry.remove_host(&host), 0);
        assert!(!registry.is_configured::<dyn Table, _>(&host));
        assert!(registry.is_configured::<dyn Table, _>(&other));

        // The orphaned proxy stays installed but is idle.
        host.delegate().unwrap().did_select(1);
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_clear_keeps_proxy() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        let b = listener("b", &log);
        registry.add_listener(&host, &a).unwrap();
        registry.add_listener(&host, &b).unwrap();

        assert_eq!(registry.clear::<dyn Table, _>(&host), 2);
        assert!(registry.is_configured::<dyn Table, _>(&host));
        assert_eq!(registry.clear::<dyn Table, _>(&host), 0);
    }

    /// A host that only exposes its slot to an explicit installer.
    #[derive(Default)]
    struct BareSlot {
        delegate: RwLock<Option<Arc<dyn Table>>>,
    }

    impl BareSlot {
        fn select(&self, row: usize) {
            let delegate = self.delegate.read().unwrap().clone();
            if let Some(delegate) = delegate {
                delegate.did_select(row);
            }
        }
    }

    #[test]
    fn test_configured_listener_without_delegate_host() {
        let registry = Registry::new();
        let host = Arc::new(BareSlot::default());
        let log = CallLog::new();
        let a = listener("a", &log);

        let err = registry.add_configured_listener(&host, &a).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingInstaller { .. }));
        assert_eq!(registry.key_count(), 0);

        let slot = host.clone();
        let install = move |proxy: Arc<DispatchProxy<dyn Table>>| -> Result<(), BoxError> {
            *slot.delegate.write().unwrap() = Some(proxy);
            Ok(())
        };
        registry.configure::<dyn Table, _>(&host, Some(&install)).unwrap();

        assert_eq!(registry.add_configured_listener(&host, &a).unwrap(), Insertion::Added);
        assert_eq!(registry.add_configured_listener(&host, &a).unwrap(), Insertion::Refreshed);
        host.select(2);
        assert_eq!(log.entries(), ["a:did_select(2)"]);

        assert_eq!(registry.set_enabled(&a, false), 1);
        host.select(3);
        assert_eq!(log.count(), 1);
    }

    #[test]
    fn test_configured_listener_after_remove_host() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        registry.add_listener(&host, &a).unwrap();
        registry.remove_host(&host);

        // The removed key is not revived behind the registry's back.
        let err = registry.add_configured_listener(&host, &a).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingInstaller { .. }));
        host.delegate().unwrap().did_select(1);
        assert_eq!(log.count(), 0);

        // A full add installs a fresh, tracked proxy.
        registry.add_listener(&host, &a).unwrap();
        assert_eq!(host.install_count(), 2);
        assert_eq!(registry.set_enabled(&a, false), 1);
        host.delegate().unwrap().did_select(2);
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_set_enabled_ignores_dropped_hosts() {
        let registry = Registry::new();
        let host = Arc::new(Host::new());
        let gone = Arc::new(Host::new());
        let log = CallLog::new();
        let a = listener("a", &log);
        registry.add_listener(&host, &a).unwrap();
        registry.add_listener(&gone, &a).unwrap();
        drop(gone);

        assert_eq!(registry.key_count(), 2);
        assert_eq!(registry.set_enabled(&a, false), 1);
        assert_eq!(registry.set_enabled(&a, true), 1);
    }
}
