//! Error types for fanout.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`ConfigurationError`] - Installing a dispatch proxy into a host failed
//! - [`ListenerInvocationError`] - A single listener failed during forwarding
//!
//! Only configuration errors ever reach a caller. Invocation errors are
//! recovered inside the dispatch proxy and handed to diagnostics.

use crate::{
    contract::MethodId,
    identity::{HostKey, ListenerId},
};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while installing a dispatch proxy into a host's delegate slot.
///
/// A failed `configure` leaves no state behind.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// No slot installer was supplied.
    #[error("no slot installer supplied for {key}")]
    MissingInstaller {
        /// The key that was being configured.
        key: HostKey,
    },

    /// The installer refused the proxy.
    #[error("host rejected the dispatch proxy for {key}")]
    InstallRejected {
        /// The key that was being configured.
        key: HostKey,
        /// Error reported by the installer.
        #[source]
        source: BoxError,
    },
}

impl ConfigurationError {
    /// The key the failed configuration targeted.
    pub fn key(&self) -> HostKey {
        match self {
            ConfigurationError::MissingInstaller { key }
            | ConfigurationError::InstallRejected { key, .. } => *key,
        }
    }
}

/// A listener failed while a call was being forwarded to it.
#[derive(Error, Debug)]
#[error("listener {listener} failed in `{method}` for {key}: {failure}")]
pub struct ListenerInvocationError {
    /// The (host, contract) pair the call was dispatched for.
    pub key: HostKey,
    /// The listener that failed.
    pub listener: ListenerId,
    /// The contract method being forwarded.
    pub method: MethodId,
    /// What went wrong.
    #[source]
    pub failure: InvocationFailure,
}

/// How a listener invocation failed.
#[derive(Error, Debug)]
pub enum InvocationFailure {
    /// The listener panicked.
    #[error("listener panicked: {0}")]
    Panicked(String),

    /// The listener returned an error.
    #[error(transparent)]
    Failed(BoxError),
}

impl InvocationFailure {
    /// Build a failure from a caught panic payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        InvocationFailure::Panicked(message)
    }

    /// Check whether the failure was a panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, InvocationFailure::Panicked(_))
    }
}

impl From<BoxError> for InvocationFailure {
    fn from(err: BoxError) -> Self {
        InvocationFailure::Failed(err)
    }
}
