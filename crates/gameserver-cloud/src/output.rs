//! Deferred values
//!
//! An [`Output`] is a read-only, single-assignment value that may only become
//! available after the resource it was derived from has been provisioned
//! (a cloud-assigned IP address, a resource id). Outputs are composed with
//! [`Output::map`], [`Output::zip`] and friends; the composition remembers
//! which resources it depends on so the graph builder can order creation.
//!
//! `None` means "unknown": either the value was never assigned, or the
//! resource that should have assigned it failed.

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use tokio::sync::oneshot;

/// Bounds every value carried by an [`Output`] must satisfy
pub trait OutputValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> OutputValue for T {}

/// A deferred value that resolves once its dependencies settle
pub struct Output<T: OutputValue> {
    value: Shared<BoxFuture<'static, Option<T>>>,
    dependencies: BTreeSet<String>,
}

impl<T: OutputValue> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            dependencies: self.dependencies.clone(),
        }
    }
}

impl<T: OutputValue> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl<T: OutputValue> Output<T> {
    fn from_future<F>(value: F, dependencies: BTreeSet<String>) -> Self
    where
        F: Future<Output = Option<T>> + Send + 'static,
    {
        Self {
            value: value.boxed().shared(),
            dependencies,
        }
    }

    /// A value that is known at declaration time
    pub fn known(value: T) -> Self {
        Self::from_future(future::ready(Some(value)), BTreeSet::new())
    }

    /// A value that will never be known
    pub fn unknown() -> Self {
        Self::from_future(future::ready(None), BTreeSet::new())
    }

    /// A value assigned later through the returned [`Resolver`].
    ///
    /// `dependency` is the name of the graph node that owns the write side.
    pub(crate) fn deferred(dependency: impl Into<String>) -> (Resolver<T>, Self) {
        let (sender, receiver) = oneshot::channel::<Option<T>>();
        let value = async move { receiver.await.ok().flatten() };
        let output = Self::from_future(value, BTreeSet::from([dependency.into()]));
        (Resolver { sender }, output)
    }

    /// Names of the graph nodes this value waits on
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.contains(name)
    }

    /// Adds an ordering dependency without changing the value
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.insert(name.into());
        self
    }

    /// Transforms the value once it is available
    pub fn map<U, F>(&self, f: F) -> Output<U>
    where
        U: OutputValue,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let value = self.value.clone();
        Output::from_future(async move { value.await.map(f) }, self.dependencies.clone())
    }

    /// Like [`Output::map`], but the projection may itself be absent
    pub fn and_then<U, F>(&self, f: F) -> Output<U>
    where
        U: OutputValue,
        F: FnOnce(T) -> Option<U> + Send + 'static,
    {
        let value = self.value.clone();
        Output::from_future(
            async move { value.await.and_then(f) },
            self.dependencies.clone(),
        )
    }

    /// Chains a computation that produces another deferred value.
    ///
    /// Dependencies of the inner output are only discovered at resolution
    /// time; callers that need ordering must pass them in explicitly.
    pub fn apply<U, F>(&self, f: F) -> Output<U>
    where
        U: OutputValue,
        F: FnOnce(T) -> Output<U> + Send + 'static,
    {
        let value = self.value.clone();
        Output::from_future(
            async move {
                match value.await {
                    Some(v) => f(v).value.await,
                    None => None,
                }
            },
            self.dependencies.clone(),
        )
    }

    /// Combines two values; unknown if either side is unknown
    pub fn zip<U: OutputValue>(&self, other: &Output<U>) -> Output<(T, U)> {
        let left = self.value.clone();
        let right = other.value.clone();
        let dependencies = self
            .dependencies
            .union(&other.dependencies)
            .cloned()
            .collect();
        Output::from_future(
            async move {
                let (left, right) = future::join(left, right).await;
                Some((left?, right?))
            },
            dependencies,
        )
    }

    /// Waits for the value
    pub async fn resolve(&self) -> Option<T> {
        self.value.clone().await
    }

    /// Returns the value if it is already available, without waiting
    pub fn peek(&self) -> Option<T> {
        self.value.clone().now_or_never().flatten()
    }
}

/// Write side of a deferred [`Output`]; consumed on use
pub(crate) struct Resolver<T> {
    sender: oneshot::Sender<Option<T>>,
}

impl<T> Resolver<T> {
    pub(crate) fn resolve(self, value: Option<T>) {
        // Receivers may all be gone already; nothing is waiting then.
        let _ = self.sender.send(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown() {
        assert_eq!(Output::known(42).resolve().await, Some(42));
        assert_eq!(Output::<u32>::unknown().resolve().await, None);
    }

    #[tokio::test]
    async fn test_map_and_then() {
        let host = Output::known("vm.example.com".to_string());
        let url = host.map(|h| format!("http://{}:25565", h));
        assert_eq!(
            url.resolve().await.as_deref(),
            Some("http://vm.example.com:25565")
        );

        let empty = Output::known(String::new()).and_then(|h| (!h.is_empty()).then_some(h));
        assert_eq!(empty.resolve().await, None);
    }

    #[tokio::test]
    async fn test_deferred_resolves_after_assignment() {
        let (resolver, output) = Output::<String>::deferred("public-ip");
        let doubled = output.map(|s| s.repeat(2));
        assert!(output.peek().is_none());
        assert!(doubled.depends_on("public-ip"));

        resolver.resolve(Some("ab".to_string()));
        assert_eq!(doubled.resolve().await.as_deref(), Some("abab"));
        assert_eq!(output.peek().as_deref(), Some("ab"));
    }

    #[tokio::test]
    async fn test_dropped_resolver_yields_unknown() {
        let (resolver, output) = Output::<u8>::deferred("vm");
        drop(resolver);
        assert_eq!(output.resolve().await, None);
    }

    #[tokio::test]
    async fn test_zip_merges_dependencies() {
        let (a_resolver, a) = Output::<u8>::deferred("a");
        let (b_resolver, b) = Output::<u8>::deferred("b");
        let both = a.zip(&b);
        assert!(both.depends_on("a") && both.depends_on("b"));

        a_resolver.resolve(Some(1));
        b_resolver.resolve(None);
        assert_eq!(both.resolve().await, None);
    }

    #[tokio::test]
    async fn test_apply_flattens() {
        let (resolver, id) = Output::<String>::deferred("vm");
        let looked_up = id.apply(|id| Output::known(format!("{}/ip", id)));
        resolver.resolve(Some("/vm/1".to_string()));
        assert_eq!(looked_up.resolve().await.as_deref(), Some("/vm/1/ip"));
        assert!(looked_up.depends_on("vm"));
    }

    #[test]
    fn test_peek_known_value() {
        assert_eq!(Output::known("x").peek(), Some("x"));
        assert_eq!(Output::known(1).with_dependency("rg").dependencies().len(), 1);
    }
}
