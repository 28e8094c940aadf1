//! # Dispatch Proxy
//!
//! The object that occupies a host's delegate slot. It implements the
//! contract (through `#[fanout::delegate]` or a hand-written impl) by calling
//! one of the four forwarding primitives below.
//!
//! | Contract method returns | Primitive            | Fan-out                        |
//! |-------------------------|----------------------|--------------------------------|
//! | `()`                    | [`notify`]           | every eligible listener        |
//! | `Result<(), E>`         | [`notify_fallible`]  | every eligible listener        |
//! | `Option<T>`             | [`query`]            | until the first `Some`         |
//! | `Result<Option<T>, E>`  | [`query_fallible`]   | until the first `Ok(Some(_))`  |
//!
//! A listener that panics or returns `Err` is reported to diagnostics and
//! treated as having no answer. The host never sees the failure.
//!
//! [`notify`]: DispatchProxy::notify
//! [`notify_fallible`]: DispatchProxy::notify_fallible
//! [`query`]: DispatchProxy::query
//! [`query_fallible`]: DispatchProxy::query_fallible

use crate::{config::Diagnostics, set::ListenerSet};
use fanout_core::{
    BoxError, Contract, HostKey, InvocationFailure, ListenerId, ListenerInvocationError, MethodId,
};
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// Summary of one notification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Listeners the call was forwarded to.
    pub invoked: usize,
    /// Listeners among them that failed.
    pub failed: usize,
}

/// The multicast stand-in installed into a host's delegate slot.
pub struct DispatchProxy<C: ?Sized + Contract> {
    set: Arc<ListenerSet<C>>,
    diagnostics: Arc<Diagnostics>,
}

impl<C: ?Sized + Contract> DispatchProxy<C> {
    pub(crate) fn new(set: Arc<ListenerSet<C>>, diagnostics: Arc<Diagnostics>) -> Self {
        Self { set, diagnostics }
    }

    pub(crate) fn set(&self) -> &Arc<ListenerSet<C>> {
        &self.set
    }

    /// The (host, contract) pair this proxy forwards for.
    pub fn key(&self) -> HostKey {
        self.set.key()
    }

    /// Forward a notification to every enabled listener that implements `method`.
    pub fn notify<F>(&self, method: MethodId, call: F) -> Delivery
    where
        F: Fn(&C),
    {
        self.fan_out(method, |listener| {
            call(listener);
            Ok(())
        })
    }

    /// Forward a fallible notification. Listener errors are reported, never returned.
    pub fn notify_fallible<F, E>(&self, method: MethodId, call: F) -> Result<(), E>
    where
        F: Fn(&C) -> Result<(), E>,
        E: Into<BoxError>,
    {
        self.fan_out(method, |listener| call(listener).map_err(Into::into));
        Ok(())
    }

    /// Ask listeners in registration order until one answers with `Some`.
    ///
    /// Listeners after the one that answered are not called.
    pub fn query<T, F>(&self, method: MethodId, call: F) -> Option<T>
    where
        F: Fn(&C) -> Option<T>,
    {
        self.first_answer(method, |listener| Ok(call(listener)))
    }

    /// Like [`query`](Self::query), for contract methods that can fail.
    ///
    /// An `Err` from a listener counts as no answer; the proxy itself always
    /// returns `Ok`.
    pub fn query_fallible<T, E, F>(&self, method: MethodId, call: F) -> Result<Option<T>, E>
    where
        F: Fn(&C) -> Result<Option<T>, E>,
        E: Into<BoxError>,
    {
        Ok(self.first_answer(method, |listener| call(listener).map_err(Into::into)))
    }

    fn fan_out<F>(&self, method: MethodId, call: F) -> Delivery
    where
        F: Fn(&C) -> Result<(), BoxError>,
    {
        let listeners = self.set.resolve(method);
        let mut delivery = Delivery::default();

        #[cfg(feature = "tracing")]
        tracing::trace!(key = %self.key(), %method, listeners = listeners.len(), "notify");

        for (id, listener) in &listeners {
            delivery.invoked += 1;
            if let Err(failure) = self.invoke(|| call(&**listener)) {
                delivery.failed += 1;
                self.report(*id, method, failure);
            }
        }
        delivery
    }

    fn first_answer<T, F>(&self, method: MethodId, call: F) -> Option<T>
    where
        F: Fn(&C) -> Result<Option<T>, BoxError>,
    {
        let listeners = self.set.resolve(method);

        #[cfg(feature = "tracing")]
        tracing::trace!(key = %self.key(), %method, listeners = listeners.len(), "query");

        for (id, listener) in &listeners {
            match self.invoke(|| call(&**listener)) {
                Ok(Some(answer)) => return Some(answer),
                Ok(None) => continue,
                Err(failure) => self.report(*id, method, failure),
            }
        }
        None
    }

    fn invoke<R>(
        &self,
        call: impl FnOnce() -> Result<R, BoxError>,
    ) -> Result<R, InvocationFailure> {
        let result = if self.diagnostics.isolate_panics() {
            panic::catch_unwind(AssertUnwindSafe(call)).map_err(InvocationFailure::from_panic)?
        } else {
            call()
        };
        result.map_err(InvocationFailure::Failed)
    }

    fn report(&self, listener: ListenerId, method: MethodId, failure: InvocationFailure) {
        self.diagnostics.report(ListenerInvocationError {
            key: self.key(),
            listener,
            method,
            failure,
        });
    }
}

impl<C: ?Sized + Contract> fmt::Debug for DispatchProxy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchProxy")
            .field("key", &format_args!("{}", self.key()))
            .finish_non_exhaustive()
    }
}
