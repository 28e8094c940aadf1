//! # Capability Contracts
//!
//! A contract is the set of callback methods a host's delegate slot can
//! receive. Contracts are ordinary Rust traits; the trait-object type of the
//! delegate trait (`dyn TableDelegate`) implements [`Contract`] and acts as
//! the contract's identity.
//!
//! Listeners may implement only part of a contract. Each listener reports the
//! methods it answers through [`Contract::capabilities`], which the registry
//! reads once at registration time and caches alongside the entry.

use std::fmt;

/// A capability contract: a named set of forwardable methods.
///
/// Implemented for the trait-object type of a delegate trait, usually by the
/// `#[fanout::delegate]` attribute.
///
/// # Example
///
/// ```rust,ignore
/// trait TableDelegate: Send + Sync {
///     fn did_select(&self, _row: usize) {}
///     fn responds_to(&self) -> MethodSet { MethodSet::all() }
/// }
///
/// impl Contract for dyn TableDelegate {
///     const NAME: &'static str = "TableDelegate";
///     const METHODS: &'static [&'static str] = &["did_select"];
///
///     fn capabilities(&self) -> MethodSet {
///         self.responds_to()
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a delegate `Contract`",
    label = "missing `Contract` implementation",
    note = "Annotate the delegate trait with `#[fanout::delegate]` or implement `Contract` for `dyn YourTrait`."
)]
pub trait Contract: Send + Sync + 'static {
    /// Human-readable contract name, used in diagnostics.
    const NAME: &'static str;

    /// Method names in declaration order. Index `i` matches `MethodId` index `i`.
    const METHODS: &'static [&'static str];

    /// The methods this listener actually answers.
    fn capabilities(&self) -> MethodSet;
}

/// Identifier of one method within a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId {
    index: u8,
    name: &'static str,
}

impl MethodId {
    /// Create a method identifier. `index` must be below [`MethodSet::CAPACITY`].
    pub const fn new(index: u8, name: &'static str) -> Self {
        assert!(
            (index as u32) < MethodSet::CAPACITY,
            "a contract supports at most 64 methods"
        );
        Self { index, name }
    }

    /// Position of the method in its contract.
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// Method name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    const fn bit(&self) -> u64 {
        1u64 << self.index
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A set of contract methods, one bit per [`MethodId`] index.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodSet(u64);

impl MethodSet {
    /// Maximum number of methods a contract may declare.
    pub const CAPACITY: u32 = u64::BITS;

    /// Every method, including ones a contract may add later.
    pub const fn all() -> Self {
        Self(u64::MAX)
    }

    /// No methods. Listeners reporting this are accepted but never called.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Return a copy of this set that also contains `method`.
    pub const fn with(self, method: MethodId) -> Self {
        Self(self.0 | method.bit())
    }

    /// Return a copy of this set without `method`.
    pub const fn without(self, method: MethodId) -> Self {
        Self(self.0 & !method.bit())
    }

    /// Check whether `method` is in the set.
    pub const fn contains(&self, method: MethodId) -> bool {
        self.0 & method.bit() != 0
    }

    /// Check whether the set is empty.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Raw bit representation.
    pub const fn bits(&self) -> u64 {
        self.0
    }
}

impl Default for MethodSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<MethodId> for MethodSet {
    fn from_iter<I: IntoIterator<Item = MethodId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), MethodSet::with)
    }
}

impl<const N: usize> From<[MethodId; N]> for MethodSet {
    fn from(methods: [MethodId; N]) -> Self {
        methods.into_iter().collect()
    }
}

impl fmt::Debug for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == u64::MAX {
            f.write_str("MethodSet(all)")
        } else {
            write!(f, "MethodSet({:#b})", self.0)
        }
    }
}
