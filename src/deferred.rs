//! A value that is either available now or will be once a future settles.

use crate::{Error, Value};
use futures::future::{self, BoxFuture, FutureExt, TryFutureExt};
use std::fmt;
use std::future::IntoFuture;

/// Either an immediate value or a future that settles to one.
///
/// Synchronous generators always produce `Ready`; asynchronous ones may
/// produce `Pending`. Composite generators combine both cases with [`map`],
/// [`and_then`] and [`all`] so they never need to know which they hold.
///
/// [`map`]: Deferred::map
/// [`and_then`]: Deferred::and_then
/// [`all`]: Deferred::all
pub enum Deferred<T> {
    Ready(T),
    Pending(BoxFuture<'static, Result<T, Error>>),
}

/// The result of one draw from a generator.
pub type Draw = Deferred<Value>;

impl<T: Send + 'static> Deferred<T> {
    /// Wraps a future.
    pub fn pending<F>(fut: F) -> Self
    where
        F: std::future::Future<Output = Result<T, Error>> + Send + 'static,
    {
        Self::Pending(fut.boxed())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns the value if it is available now.
    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(t) => Some(t),
            Self::Pending(_) => None,
        }
    }

    /// Transforms the value now, or once the future settles.
    pub fn map<U, F>(self, f: F) -> Deferred<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            Self::Ready(t) => Deferred::Ready(f(t)),
            Self::Pending(fut) => Deferred::Pending(fut.map_ok(f).boxed()),
        }
    }

    /// Like [`Deferred::map`], but `f` can fail.
    ///
    /// For a ready value `f` runs immediately and its error is returned
    /// directly; for a pending one the error becomes the future's output.
    pub fn and_then<U, F>(self, f: F) -> Result<Deferred<U>, Error>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U, Error> + Send + 'static,
    {
        match self {
            Self::Ready(t) => f(t).map(Deferred::Ready),
            Self::Pending(fut) => Ok(Deferred::Pending(
                fut.and_then(|t| future::ready(f(t))).boxed(),
            )),
        }
    }

    /// Waits for every item, keeping input order.
    ///
    /// Stays `Ready` when all items are ready. Otherwise the combined future
    /// fails with the first error any item produces.
    pub fn all(items: Vec<Deferred<T>>) -> Deferred<Vec<T>> {
        if items.iter().all(Deferred::is_ready) {
            return Deferred::Ready(items.into_iter().filter_map(Deferred::into_ready).collect());
        }
        let futures = items.into_iter().map(IntoFuture::into_future);
        Deferred::Pending(future::try_join_all(futures).boxed())
    }

    /// Blocks the current thread until the value is available.
    ///
    /// Futures that need a specific runtime (e.g. tokio timers) must instead
    /// be awaited on that runtime.
    pub fn wait(self) -> Result<T, Error> {
        match self {
            Self::Ready(t) => Ok(t),
            Self::Pending(fut) => futures::executor::block_on(fut),
        }
    }
}

impl<T: Send + 'static> IntoFuture for Deferred<T> {
    type Output = Result<T, Error>;
    type IntoFuture = BoxFuture<'static, Result<T, Error>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(t) => future::ready(Ok(t)).boxed(),
            Self::Pending(fut) => fut,
        }
    }
}

impl<T> From<T> for Deferred<T> {
    fn from(t: T) -> Self {
        Self::Ready(t)
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(t) => f.debug_tuple("Ready").field(t).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn later(v: i64) -> Deferred<i64> {
        Deferred::pending(async move { Ok(v) })
    }

    #[test]
    fn map_ready_and_pending() {
        let ready = Deferred::Ready(2).map(|x| x * 10);
        assert_eq!(ready.into_ready(), Some(20));

        let pending = later(3).map(|x| x * 10);
        assert!(!pending.is_ready());
        assert_eq!(pending.wait().unwrap(), 30);
    }

    #[test]
    fn and_then_errors() {
        let e = Deferred::Ready(1)
            .and_then(|_| Err::<i64, _>(Error::custom("sync")))
            .unwrap_err();
        assert_eq!(e.to_string(), "sync");

        let pending = later(1)
            .and_then(|_| Err::<i64, _>(Error::custom("async")))
            .unwrap();
        let e = pending.wait().unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Custom);
        assert_eq!(e.to_string(), "async");
    }

    #[test]
    fn all_ready_stays_ready() {
        let joined = Deferred::all(vec![Deferred::Ready(1), Deferred::Ready(2)]);
        assert_eq!(joined.into_ready(), Some(vec![1, 2]));
    }

    #[test]
    fn all_mixed_keeps_order() {
        let joined = Deferred::all(vec![later(1), Deferred::Ready(2), later(3)]);
        assert!(!joined.is_ready());
        assert_eq!(joined.wait().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn all_fails_on_first_error() {
        let failing = Deferred::pending(async { Err::<i64, _>(Error::custom("nope")) });
        let joined = Deferred::all(vec![later(1), failing]);
        assert_eq!(joined.wait().unwrap_err().to_string(), "nope");
    }
}
