// Library error type

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input outside the accepted domain (unknown status label, malformed date, zero tick interval).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A power sequence was requested outside a Tokio runtime.
    #[error("no tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

pub type Result<T> = std::result::Result<T, Error>;
