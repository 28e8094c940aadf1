//! # fanout-std
//!
//! Runtime machinery for the fanout multicast delegate framework.
//!
//! This crate provides:
//! - **Registry**: [`Registry`] and its [`RegistryBuilder`], the table of
//!   (host, contract) keys and their ordered listener sets
//! - **Dispatch**: [`DispatchProxy`], the object installed into a host's
//!   delegate slot
//! - **Host integration**: [`DelegateHost`], [`SlotInstaller`]
//! - **Process-wide registry**: [`shared`] and free functions over it
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use fanout_core;

// Modules
mod config;
mod host;
mod proxy;
mod registry;
mod set;
pub mod shared;
pub mod testing;

#[cfg(test)]
mod fixtures;

pub use config::RegistryBuilder;
pub use host::{DelegateHost, HostInstaller, SlotInstaller};
pub use proxy::{Delivery, DispatchProxy};
pub use registry::{PruneReport, Registry};
pub use set::{Insertion, ListenerInfo};
pub use shared::shared;
