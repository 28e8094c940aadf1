//! # fanout-core
//!
//! Core types for the fanout multicast delegate framework.
//!
//! A host exposes a single delegate slot. fanout installs a dispatch proxy
//! into that slot and forwards every call to an ordered set of listeners.
//! This crate holds the pieces every layer shares and has no runtime
//! machinery of its own:
//!
//! - [`Contract`]: a delegate trait seen as a set of forwardable methods,
//!   with per-listener capability reporting ([`MethodSet`], [`MethodId`])
//! - Identity: [`HostId`], [`ListenerId`], [`ContractId`], [`HostKey`]
//! - Errors: [`ConfigurationError`], [`InvocationFailure`],
//!   [`ListenerInvocationError`]
//!
//! The registry and the dispatch proxy live in `fanout-std`.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod contract;
mod error;
mod identity;

// Re-exports
pub use contract::{Contract, MethodId, MethodSet};
pub use error::{
    BoxError, ConfigurationError, InvocationFailure, ListenerInvocationError,
};
pub use identity::{ContractId, HostId, HostKey, ListenerId};
