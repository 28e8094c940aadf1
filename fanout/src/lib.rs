//! # fanout - Multicast Delegates
//!
//! Many host objects expose a single delegate slot: one listener per host,
//! per contract. `fanout` lets any number of listeners share that slot. The
//! [`Registry`] installs a [`DispatchProxy`] into the host once, then keeps an
//! ordered, de-duplicated set of weakly held listeners behind it.
//!
//! - **Notifications** (`()` or `Result<(), E>` methods) reach every enabled,
//!   live listener that responds to the method, in registration order.
//! - **Queries** (`Option<T>` or `Result<Option<T>, E>` methods) return the
//!   first `Some` answer.
//!
//! The registry never keeps hosts or listeners alive. A dropped listener is
//! skipped and pruned; a dropped host's bindings are pruned.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fanout::prelude::*;
//! use std::sync::{Arc, RwLock};
//!
//! #[fanout::delegate]
//! pub trait TableDelegate {
//!     fn did_select(&self, _row: usize) {}
//! }
//!
//! #[derive(Default)]
//! struct TableView {
//!     delegate: RwLock<Option<Arc<dyn TableDelegate>>>,
//! }
//!
//! impl DelegateHost<dyn TableDelegate> for TableView {
//!     fn install_delegate(&self, proxy: Arc<DispatchProxy<dyn TableDelegate>>) -> Result<(), BoxError> {
//!         *self.delegate.write().unwrap() = Some(proxy);
//!         Ok(())
//!     }
//! }
//!
//! let table = Arc::new(TableView::default());
//! let listener: Arc<dyn TableDelegate> = Arc::new(Logger);
//! fanout::add_listener(&table, &listener)?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use fanout_core::{
    // Errors
    BoxError,
    ConfigurationError,
    // Contracts
    Contract,
    // Identity
    ContractId,
    HostId,
    HostKey,
    InvocationFailure,
    ListenerId,
    ListenerInvocationError,
    MethodId,
    MethodSet,
};

pub use fanout_std::{
    // Host integration
    DelegateHost,
    // Dispatch
    Delivery,
    DispatchProxy,
    HostInstaller,
    // Registry
    Insertion,
    ListenerInfo,
    PruneReport,
    Registry,
    RegistryBuilder,
    SlotInstaller,
};

// Process-wide registry
pub use fanout_std::shared::{
    add_configured_listener, add_listener, configure, prune, remove_all_listeners, remove_host,
    remove_listener, set_enabled, shared,
};

/// Testing utilities.
pub mod testing {
    pub use fanout_std::testing::{CallLog, RecordingHost};
}

/// Prelude module - common imports for fanout.
///
/// # Usage
///
/// ```rust,ignore
/// use fanout::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Contract, DelegateHost, DispatchProxy, Insertion, MethodId, MethodSet, Registry,
        SlotInstaller,
    };
}

#[cfg(feature = "macros")]
pub use fanout_macros::delegate;
