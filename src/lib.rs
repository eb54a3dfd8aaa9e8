#![doc = include_str!("../README.md")]

mod builtin;
mod deferred;
mod driver;
mod error;
mod expr;
mod node;
mod options;
mod range;
pub mod registry;
mod value;

pub use builtin::Builtin;
pub use deferred::{Deferred, Draw};
pub use driver::iterate;
pub use error::{BoxError, Error, ErrorKind};
pub use expr::{parse, Invocation};
pub use node::GeneratorNode;
pub use options::{Alphabet, Letters, Options};
pub use range::{CharRange, NumberRange, Range};
pub use registry::{register, register_all, register_named, GeneratorKind, ValueSource};
pub use value::Value;
