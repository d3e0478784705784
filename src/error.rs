//! Unified error type.

use std::fmt;

/// Boxed error raised by user middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by allium's fallible operations.
///
/// Fatal startup conditions ([`Config`](Error::Config), [`Io`](Error::Io))
/// are returned to the caller, which decides whether to terminate the
/// process. Per-request failures ([`ResponseMissing`](Error::ResponseMissing),
/// [`Handler`](Error::Handler)) propagate out of the middleware chain to the
/// transport glue, which turns them into a 500-class response.
#[derive(Debug)]
pub enum Error {
    /// Rejected startup configuration (e.g. an invalid `LOG_LEVEL`).
    Config(String),
    /// The listening endpoint could not be acquired.
    Io(std::io::Error),
    /// A post-processing middleware ran with no response in the context.
    ///
    /// Signals a misordered or missing downstream handler — a programming
    /// error in the chain, not a recoverable runtime condition.
    ResponseMissing(&'static str),
    /// Failure raised by a user-registered middleware.
    Handler(BoxError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::ResponseMissing(what) => {
                write!(f, "response is not set in the context: {what}")
            }
            Self::Handler(e) => write!(f, "handler: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Handler(e) => Some(e.as_ref()),
            Self::Config(_) | Self::ResponseMissing(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Lets user middleware bubble arbitrary failures with `?`.
impl From<BoxError> for Error {
    fn from(e: BoxError) -> Self {
        Self::Handler(e)
    }
}
