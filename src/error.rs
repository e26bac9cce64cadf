use hickory_resolver::ResolveError;
use std::{error, fmt, io};

/// Errors that abort a run
#[derive(Debug)]
pub enum Error {
    /// Opening or writing the output destination failed
    Io(io::Error),
    /// The resolver failed for a reason other than a missing domain or missing A records
    Resolve(ResolveError),
    /// The report could not be serialized to JSON
    Json(serde_json::Error),
    /// The requested output format is neither `txt` nor `json`
    UnknownFormat(String),
    /// A blocking query was attempted from within an async runtime
    AsyncContext,
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Resolve(e) => write!(f, "DNS resolution failed: {e}"),
            Error::Json(e) => write!(f, "JSON serialization failed: {e}"),
            Error::UnknownFormat(format) => write!(
                f,
                "unknown output format {format:?}, expected \"txt\" or \"json\""
            ),
            Error::AsyncContext => {
                f.write_str("cannot block on a DNS query from within an async runtime")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Resolve(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::UnknownFormat(_) | Error::AsyncContext => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        Error::Resolve(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
