use std::io::Error as IoError;
use std::net::AddrParseError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to serve health endpoint: {0:#}")]
    Io(#[from] IoError),
    #[error("invalid HEALTHPULSE_BIND address {value:?}: {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: AddrParseError,
    },
}
