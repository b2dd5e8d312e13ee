//! Errors raised below the HTTP layer: configuration, content stores and
//! the object bytes flowing through them.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Boxed source error carried by [`Error`].
pub type BoxedError = Box<dyn StdError + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong, independent of the message.
///
/// The HTTP layer picks the status code from this alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected configuration.
    Config,
    /// NATS or another remote dependency failed.
    External,
    NotFound,
    /// The object name is taken.
    Conflict,
    /// The content store is still initializing.
    Unavailable,
    /// Object bytes could not be read or written.
    Io,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::External => "external_service",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unavailable => "unavailable",
            Self::Io => "io",
            Self::Internal => "internal_service",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Prefixes `message` with the component that failed.
    fn scoped(kind: ErrorKind, component: &str, message: impl fmt::Display) -> Self {
        Self::new(kind, format!("{component}: {message}"))
    }

    pub fn with_source(self, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn io(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    /// Failure of a remote dependency such as `"nats"`.
    pub fn external(service: &str, message: impl fmt::Display) -> Self {
        Self::scoped(ErrorKind::External, service, message)
    }

    /// Broken invariant inside `component`.
    pub fn internal(component: &str, message: impl fmt::Display) -> Self {
        Self::scoped(ErrorKind::Internal, component, message)
    }
}

impl From<filecast_nats::Error> for Error {
    fn from(err: filecast_nats::Error) -> Self {
        use filecast_nats::Error as NatsError;

        let error = match &err {
            NatsError::ObjectNotFound { name, .. } => {
                Error::not_found(format!("object '{name}' not found"))
            }
            NatsError::ObjectExists { name, .. } => {
                Error::conflict(format!("object '{name}' already exists"))
            }
            NatsError::Io(_) => Error::io(err.to_string()),
            NatsError::InvalidConfig { .. } => Error::config(err.to_string()),
            _ => Error::external("nats", err.to_string()),
        };

        error.with_source(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(err.to_string()).with_source(err)
    }
}
