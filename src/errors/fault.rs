//! Handler error type covering both expected and unexpected failures.

use crate::errors::HttpError;

/// Boxed error for failures that have no HTTP meaning of their own.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Anything a route can fail with.
///
/// `Http` is an operational fault the route chose deliberately. `Unexpected`
/// is everything else; the responder logs it and answers with a generic 500.
#[derive(Debug)]
pub enum Fault {
    Http(HttpError),
    Unexpected(BoxError),
}

impl Fault {
    pub fn unexpected(err: impl Into<BoxError>) -> Self {
        Fault::Unexpected(err.into())
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, Fault::Unexpected(_))
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::Http(e) => write!(f, "{e}"),
            Fault::Unexpected(e) => write!(f, "unexpected error: {e}"),
        }
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Fault::Http(e) => Some(e),
            Fault::Unexpected(e) => Some(e.as_ref()),
        }
    }
}

impl From<HttpError> for Fault {
    fn from(e: HttpError) -> Self {
        Fault::Http(e)
    }
}

impl From<std::io::Error> for Fault {
    fn from(e: std::io::Error) -> Self {
        Fault::Unexpected(Box::new(e))
    }
}

impl From<serde_json::Error> for Fault {
    fn from(e: serde_json::Error) -> Self {
        Fault::Unexpected(Box::new(e))
    }
}
