//! The process-wide table of generator kinds, seeded with the builtins.

use crate::builtin::Builtin;
use crate::{Draw, Error, Options};
use fxhash::FxHashMap;
use log::debug;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// A stateful, infinite producer of values for one [`crate::GeneratorNode`].
pub trait ValueSource: Send {
    /// Advances the source by one step and returns the value produced.
    fn draw(&mut self) -> Result<Draw, Error>;

    /// Whether [`ValueSource::draw`] may return [`crate::Deferred::Pending`].
    ///
    /// Asked once when the node is built, before any draw.
    fn is_async(&self) -> bool {
        false
    }
}

/// A named way of turning `(options, arguments)` into a [`ValueSource`].
///
/// Implement this to add a kind, then register it with [`register`] or
/// [`register_named`]. Closures can be registered with [`kind_fn`].
pub trait GeneratorKind: Send + Sync {
    /// The name used by [`register_named`].
    fn name(&self) -> &str;

    /// Builds a new source. `args` are the raw argument strings of the
    /// expression, which may themselves be expressions.
    fn build(&self, options: &Options, args: &[String]) -> Result<Box<dyn ValueSource>, Error>;
}

impl<K: GeneratorKind + ?Sized> GeneratorKind for Box<K> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn build(&self, options: &Options, args: &[String]) -> Result<Box<dyn ValueSource>, Error> {
        (**self).build(options, args)
    }
}

impl<K: GeneratorKind + ?Sized> GeneratorKind for Arc<K> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn build(&self, options: &Options, args: &[String]) -> Result<Box<dyn ValueSource>, Error> {
        (**self).build(options, args)
    }
}

/// A [`GeneratorKind`] backed by a closure. See [`kind_fn`].
pub struct FnKind<F> {
    name: String,
    f: F,
}

/// Wraps a closure as a named kind.
pub fn kind_fn<F>(name: impl Into<String>, f: F) -> FnKind<F>
where
    F: Fn(&Options, &[String]) -> Result<Box<dyn ValueSource>, Error> + Send + Sync,
{
    FnKind {
        name: name.into(),
        f,
    }
}

impl<F> GeneratorKind for FnKind<F>
where
    F: Fn(&Options, &[String]) -> Result<Box<dyn ValueSource>, Error> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, options: &Options, args: &[String]) -> Result<Box<dyn ValueSource>, Error> {
        (self.f)(options, args)
    }
}

/// A [`ValueSource`] backed by a closure. See [`source_fn`] and [`deferred_source_fn`].
pub struct FnSource<F> {
    f: F,
    asynchronous: bool,
}

/// Wraps a closure that always returns [`crate::Deferred::Ready`].
pub fn source_fn<F>(f: F) -> FnSource<F>
where
    F: FnMut() -> Result<Draw, Error> + Send,
{
    FnSource {
        f,
        asynchronous: false,
    }
}

/// Wraps a closure that may return [`crate::Deferred::Pending`].
pub fn deferred_source_fn<F>(f: F) -> FnSource<F>
where
    F: FnMut() -> Result<Draw, Error> + Send,
{
    FnSource {
        f,
        asynchronous: true,
    }
}

impl<F> ValueSource for FnSource<F>
where
    F: FnMut() -> Result<Draw, Error> + Send,
{
    fn draw(&mut self) -> Result<Draw, Error> {
        (self.f)()
    }

    fn is_async(&self) -> bool {
        self.asynchronous
    }
}

#[derive(Clone)]
struct Registry {
    kinds: FxHashMap<String, Arc<dyn GeneratorKind>>,
}

impl Registry {
    fn with_builtins() -> Self {
        let mut kinds: FxHashMap<String, Arc<dyn GeneratorKind>> = FxHashMap::default();
        for builtin in Builtin::all() {
            kinds.insert(builtin.as_str().to_string(), Arc::new(builtin));
        }
        Self { kinds }
    }
}

static REGISTRY: LazyLock<RwLock<Registry>> =
    LazyLock::new(|| RwLock::new(Registry::with_builtins()));

fn insert(name: String, kind: Arc<dyn GeneratorKind>) {
    debug!("registering generator kind {:?}", name);
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    registry.kinds.insert(name, kind);
}

/// Registers `kind` under `name`, replacing any kind (builtins included)
/// already registered with that name.
pub fn register(name: impl Into<String>, kind: impl GeneratorKind + 'static) {
    insert(name.into(), Arc::new(kind));
}

/// Registers `kind` under its own [`GeneratorKind::name`].
pub fn register_named(kind: impl GeneratorKind + 'static) {
    insert(kind.name().to_string(), Arc::new(kind));
}

/// Registers every `(name, kind)` pair. Use `Box<dyn GeneratorKind>` to mix
/// kinds of different types.
pub fn register_all<I, S, K>(kinds: I)
where
    I: IntoIterator<Item = (S, K)>,
    S: Into<String>,
    K: GeneratorKind + 'static,
{
    for (name, kind) in kinds {
        register(name, kind);
    }
}

/// Returns the kind registered under `name`.
///
/// The registry lock is released before returning, so the kind can build
/// nested nodes (which look up kinds themselves).
pub fn lookup(name: &str) -> Option<Arc<dyn GeneratorKind>> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    registry.kinds.get(name).cloned()
}

/// Names of every registered kind, sorted.
pub fn kinds() -> Vec<String> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    let mut names: Vec<String> = registry.kinds.keys().cloned().collect();
    names.sort_unstable();
    names
}
