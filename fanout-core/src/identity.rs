//! Identity types for hosts, listeners and contracts.
//!
//! Hosts and listeners are identified by the address of the allocation behind
//! their `Arc`. Addresses are only meaningful while the allocation is alive;
//! the registry pairs every id with a `Weak` so a reused address is never
//! mistaken for the object that used to live there.

use crate::contract::Contract;
use std::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, Weak},
};

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            /// Identity of the object behind `arc`.
            pub fn of<T: ?Sized>(arc: &Arc<T>) -> Self {
                Self(Arc::as_ptr(arc).cast::<()>() as usize)
            }

            /// Identity of the object behind `weak`, whether or not it is alive.
            pub fn of_weak<T: ?Sized>(weak: &Weak<T>) -> Self {
                Self(Weak::as_ptr(weak).cast::<()>() as usize)
            }

            /// Raw address.
            pub fn addr(&self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }
    };
}

object_id!(
    /// Identity of a host object.
    HostId
);

object_id!(
    /// Identity of a listener object.
    ///
    /// Computed from the data pointer, so the same object registered under
    /// two different contracts has a single `ListenerId`.
    ListenerId
);

/// Identity of a contract type.
#[derive(Debug, Clone, Copy)]
pub struct ContractId {
    type_id: TypeId,
    name: &'static str,
}

impl ContractId {
    /// Identity of contract `C`.
    pub fn of<C: ?Sized + Contract>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: C::NAME,
        }
    }

    /// Contract name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ContractId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ContractId {}

impl Hash for ContractId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A (host, contract) pair: the unit that owns one listener set and one proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostKey {
    host: HostId,
    contract: ContractId,
}

impl HostKey {
    /// Key for `host` under contract `C`.
    pub fn of<C: ?Sized + Contract, H: ?Sized>(host: &Arc<H>) -> Self {
        Self::new(HostId::of(host), ContractId::of::<C>())
    }

    /// Build a key from its parts.
    pub fn new(host: HostId, contract: ContractId) -> Self {
        Self { host, contract }
    }

    /// Host part.
    pub fn host(&self) -> HostId {
        self.host
    }

    /// Contract part.
    pub fn contract(&self) -> ContractId {
        self.contract
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.contract, self.host)
    }
}
