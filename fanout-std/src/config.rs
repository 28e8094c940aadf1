//! Registry configuration.
//!
//! Use [`RegistryBuilder`] to tune how a [`Registry`] isolates and reports
//! listener failures, then call `.build()`.
//!
//! ```ignore
//! let registry = Registry::builder()
//!     .isolate_panics(true)
//!     .on_listener_error(|err| eprintln!("{err}"))
//!     .build();
//! ```
//!
//! [`Registry`]: crate::Registry

use crate::registry::Registry;
use fanout_core::ListenerInvocationError;
use std::fmt;

type ErrorObserver = Box<dyn Fn(&ListenerInvocationError) + Send + Sync>;

/// Builder for constructing a [`Registry`].
pub struct RegistryBuilder {
    isolate_panics: bool,
    prune_on_mutation: bool,
    observer: Option<ErrorObserver>,
}

impl RegistryBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            isolate_panics: true,
            prune_on_mutation: true,
            observer: None,
        }
    }

    /// Catch listener panics and treat them as failed invocations (default `true`).
    ///
    /// When disabled, a panicking listener unwinds through the proxy into the host.
    pub fn isolate_panics(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }

    /// Drop entries of dropped listeners whenever a listener set is mutated
    /// (default `true`). When disabled, only [`Registry::prune`] reclaims them.
    pub fn prune_on_mutation(mut self, prune: bool) -> Self {
        self.prune_on_mutation = prune;
        self
    }

    /// Observe every recovered listener failure.
    ///
    /// The observer runs on the dispatching thread, after the failure is logged.
    pub fn on_listener_error<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ListenerInvocationError) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Build the registry.
    pub fn build(self) -> Registry {
        Registry::from_parts(
            Diagnostics {
                isolate_panics: self.isolate_panics,
                observer: self.observer,
            },
            self.prune_on_mutation,
        )
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("isolate_panics", &self.isolate_panics)
            .field("prune_on_mutation", &self.prune_on_mutation)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Failure handling shared by a registry and all of its proxies.
pub(crate) struct Diagnostics {
    isolate_panics: bool,
    observer: Option<ErrorObserver>,
}

impl Diagnostics {
    pub(crate) fn isolate_panics(&self) -> bool {
        self.isolate_panics
    }

    pub(crate) fn report(&self, error: ListenerInvocationError) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            key = %error.key,
            listener = %error.listener,
            method = %error.method,
            error = %error.failure,
            "listener invocation failed"
        );

        if let Some(observer) = &self.observer {
            observer(&error);
        }
    }
}
