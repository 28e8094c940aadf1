//! The process-wide registry.
//!
//! Most applications need a single table of delegate bindings. These free
//! functions forward to a lazily built [`Registry`] with default settings.
//! Build a separate [`Registry`] when isolation or custom diagnostics are
//! needed.

use crate::{
    host::{DelegateHost, SlotInstaller},
    proxy::DispatchProxy,
    registry::{PruneReport, Registry},
    set::Insertion,
};
use fanout_core::{ConfigurationError, Contract};
use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    static ref SHARED: Registry = Registry::new();
}

/// The process-wide registry.
pub fn shared() -> &'static Registry {
    &SHARED
}

/// [`Registry::configure`] on the process-wide registry.
pub fn configure<C, H>(
    host: &Arc<H>,
    installer: Option<&dyn SlotInstaller<C>>,
) -> Result<Arc<DispatchProxy<C>>, ConfigurationError>
where
    C: ?Sized + Contract,
    H: Send + Sync + 'static,
{
    shared().configure(host, installer)
}

/// [`Registry::add_listener`] on the process-wide registry.
pub fn add_listener<C, H>(host: &Arc<H>, listener: &Arc<C>) -> Result<Insertion, ConfigurationError>
where
    C: ?Sized + Contract,
    H: DelegateHost<C>,
{
    shared().add_listener(host, listener)
}

/// [`Registry::add_configured_listener`] on the process-wide registry.
pub fn add_configured_listener<C, H>(
    host: &Arc<H>,
    listener: &Arc<C>,
) -> Result<Insertion, ConfigurationError>
where
    C: ?Sized + Contract,
    H: Send + Sync + 'static,
{
    shared().add_configured_listener(host, listener)
}

/// [`Registry::remove_listener`] on the process-wide registry.
pub fn remove_listener<C, H>(host: &Arc<H>, listener: &Arc<C>) -> bool
where
    C: ?Sized + Contract,
    H: ?Sized,
{
    shared().remove_listener(host, listener)
}

/// [`Registry::remove_all_listeners`] on the process-wide registry.
pub fn remove_all_listeners<C, H>(host: &Arc<H>, listener: &Arc<C>) -> usize
where
    C: ?Sized + Contract,
    H: ?Sized,
{
    shared().remove_all_listeners(host, listener)
}

/// [`Registry::set_enabled`] on the process-wide registry.
pub fn set_enabled<L: ?Sized>(listener: &Arc<L>, enabled: bool) -> usize {
    shared().set_enabled(listener, enabled)
}

/// [`Registry::remove_host`] on the process-wide registry.
pub fn remove_host<H: ?Sized>(host: &Arc<H>) -> usize {
    shared().remove_host(host)
}

/// [`Registry::prune`] on the process-wide registry.
pub fn prune() -> PruneReport {
    shared().prune()
}
