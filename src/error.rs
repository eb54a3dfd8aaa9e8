use std::fmt;

/// A boxed error raised by user code (callbacks or user-registered kinds).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The type of error that can occur when building or resolving a generator.
#[derive(Debug)]
pub struct Error(pub(crate) ErrorRepr);

/// Broad category of an [`Error`], for callers that need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The expression has unbalanced parentheses.
    MalformedExpression,
    /// The expression names a kind that is not registered.
    GeneratorNotFound,
    /// `entry` could not find its collection in the options.
    CollectionNotFound,
    /// Malformed JSON, either a `literal` argument or an options document.
    Parse,
    /// A range argument is not a valid `lo-hi` range for the kind.
    InvalidRange,
    /// A kind argument could not be interpreted.
    InvalidArgument,
    /// Bad input at the driver boundary.
    Argument,
    /// An error raised by user code.
    Custom,
}

#[derive(Debug)]
pub(crate) enum ErrorRepr {
    Malformed(String, peg::error::ParseError<peg::str::LineCol>),
    GeneratorNotFound(String),
    CollectionNotFound(String),
    Json(serde_json::Error),
    InvalidRange(String),
    InvalidArgument { kind: String, reason: String },
    Argument(&'static str),
    Custom(BoxError),
}

impl Error {
    /// Wraps an error raised by user code.
    ///
    /// An [`Error`] passed in is returned as is rather than nested.
    pub fn custom(e: impl Into<BoxError>) -> Self {
        match e.into().downcast::<Error>() {
            Ok(inner) => *inner,
            Err(other) => Error(ErrorRepr::Custom(other)),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match &self.0 {
            ErrorRepr::Malformed(..) => ErrorKind::MalformedExpression,
            ErrorRepr::GeneratorNotFound(_) => ErrorKind::GeneratorNotFound,
            ErrorRepr::CollectionNotFound(_) => ErrorKind::CollectionNotFound,
            ErrorRepr::Json(_) => ErrorKind::Parse,
            ErrorRepr::InvalidRange(_) => ErrorKind::InvalidRange,
            ErrorRepr::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            ErrorRepr::Argument(_) => ErrorKind::Argument,
            ErrorRepr::Custom(_) => ErrorKind::Custom,
        }
    }

    pub(crate) fn invalid_argument(kind: &str, reason: impl Into<String>) -> Self {
        Error(ErrorRepr::InvalidArgument {
            kind: kind.to_string(),
            reason: reason.into(),
        })
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            ErrorRepr::Malformed(_, e) => Some(e),
            ErrorRepr::Json(e) => Some(e),
            ErrorRepr::Custom(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            ErrorRepr::Malformed(expr, e) => write!(f, "Malformed expression {:?}: {}", expr, e),
            ErrorRepr::GeneratorNotFound(kind) => write!(f, "Generator \"{}\" not found", kind),
            ErrorRepr::CollectionNotFound(prop) => {
                write!(f, "Collection \"{}\" not found in options", prop)
            }
            ErrorRepr::Json(e) => write!(f, "Invalid JSON: {}", e),
            ErrorRepr::InvalidRange(s) => write!(f, "Invalid range: {:?}", s),
            ErrorRepr::InvalidArgument { kind, reason } => {
                write!(f, "Invalid argument for \"{}\": {}", kind, reason)
            }
            ErrorRepr::Argument(e) => f.write_str(e),
            ErrorRepr::Custom(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error(ErrorRepr::Json(e))
    }
}
