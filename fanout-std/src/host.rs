//! Host integration: putting a dispatch proxy into a delegate slot.
//!
//! fanout does not know how a host stores its delegate. The host side hands
//! that knowledge over either by implementing [`DelegateHost`] (used by
//! `add_listener`, which configures lazily) or by passing an explicit
//! [`SlotInstaller`] to `configure`.

use crate::proxy::DispatchProxy;
use fanout_core::{BoxError, Contract};
use std::sync::Arc;

/// A host object that owns a single delegate slot for contract `C`.
///
/// # Example
///
/// ```rust,ignore
/// impl DelegateHost<dyn TableDelegate> for TableView {
///     fn install_delegate(
///         &self,
///         proxy: Arc<DispatchProxy<dyn TableDelegate>>,
///     ) -> Result<(), BoxError> {
///         let delegate: Arc<dyn TableDelegate> = proxy;
///         *self.delegate.write().unwrap() = Some(delegate);
///         Ok(())
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` has no delegate slot for `{C}`",
    label = "missing `DelegateHost` implementation",
    note = "Implement `DelegateHost<{C}>` to let the registry install its dispatch proxy."
)]
pub trait DelegateHost<C: ?Sized + Contract>: Send + Sync + 'static {
    /// Store `proxy` as this host's delegate.
    fn install_delegate(&self, proxy: Arc<DispatchProxy<C>>) -> Result<(), BoxError>;
}

/// The mechanism that places a proxy into a host's slot.
pub trait SlotInstaller<C: ?Sized + Contract> {
    /// Install `proxy`. An error aborts configuration.
    fn install(&self, proxy: Arc<DispatchProxy<C>>) -> Result<(), BoxError>;
}

impl<C, F> SlotInstaller<C> for F
where
    C: ?Sized + Contract,
    F: Fn(Arc<DispatchProxy<C>>) -> Result<(), BoxError>,
{
    fn install(&self, proxy: Arc<DispatchProxy<C>>) -> Result<(), BoxError> {
        self(proxy)
    }
}

/// Adapts a [`DelegateHost`] into a [`SlotInstaller`].
#[derive(Debug, Clone, Copy)]
pub struct HostInstaller<'a, H: ?Sized>(pub &'a H);

impl<C, H> SlotInstaller<C> for HostInstaller<'_, H>
where
    C: ?Sized + Contract,
    H: ?Sized + DelegateHost<C>,
{
    fn install(&self, proxy: Arc<DispatchProxy<C>>) -> Result<(), BoxError> {
        self.0.install_delegate(proxy)
    }
}
