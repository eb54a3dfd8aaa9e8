use crate::error::{Error, ErrorRepr};
use crate::expr::{parse, Invocation};
use crate::registry::{self, ValueSource};
use crate::{Deferred, Draw, Options, Value};
use log::debug;
use std::fmt;
use std::str::FromStr;

/// A generator built from one expression.
///
/// ```
/// use conjure::{GeneratorNode, Options};
///
/// let mut node = GeneratorNode::new("repeat:3:(int:3-3)", &Options::default()).unwrap();
/// assert_eq!(node.kind(), "repeat");
/// assert_eq!(node.resolve().unwrap().wait().unwrap().to_string(), "333");
/// ```
pub struct GeneratorNode {
    kind: String,
    arguments: Vec<String>,
    source: Box<dyn ValueSource>,
    asynchronous: bool,
}

impl GeneratorNode {
    /// Parses `expression`, looks up its kind and builds its source.
    ///
    /// Nested expressions in the arguments are built too, so every
    /// construction error surfaces here rather than on the first draw.
    pub fn new(expression: &str, options: &Options) -> Result<Self, Error> {
        let Invocation { kind, arguments } = parse(expression)?;
        let generator = registry::lookup(&kind)
            .ok_or_else(|| Error(ErrorRepr::GeneratorNotFound(kind.clone())))?;
        let source = generator.build(options, &arguments)?;
        let asynchronous = source.is_async();
        debug!(
            "built {:?} generator for {:?} (async: {})",
            kind, expression, asynchronous
        );
        Ok(Self {
            kind,
            arguments,
            source,
            asynchronous,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Whether [`GeneratorNode::resolve`] may return [`Deferred::Pending`].
    pub fn is_async(&self) -> bool {
        self.asynchronous
    }

    /// Draws the next value.
    pub fn resolve(&mut self) -> Result<Draw, Error> {
        self.source.draw()
    }

    /// Draws the next value and hands it to `f`, now if the value is ready
    /// or once it settles.
    pub fn resolve_with<T, F>(&mut self, f: F) -> Result<Deferred<T>, Error>
    where
        T: Send + 'static,
        F: FnOnce(Value) -> Result<T, Error> + Send + 'static,
    {
        self.resolve()?.and_then(f)
    }
}

/// Builds a node with default options.
impl FromStr for GeneratorNode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s, &Options::default())
    }
}

impl fmt::Debug for GeneratorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorNode")
            .field("kind", &self.kind)
            .field("arguments", &self.arguments)
            .field("asynchronous", &self.asynchronous)
            .finish_non_exhaustive()
    }
}
