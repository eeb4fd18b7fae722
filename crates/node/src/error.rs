//! A bunch of wrap errors.

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors enum mapping global custom errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Address already in use or not bindable: {0}")]
    AddressInUse(std::net::SocketAddr),
    #[error("Invalid bind address: {0}:{1}")]
    InvalidBindAddress(String, u16),
    #[error("Config file io error: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("Bad config file: {0}")]
    ConfigFormat(#[from] serde_yaml::Error),
    #[error("Failed to build http client: {0}")]
    HttpClientBuild(String),
    #[error("Ring error: {0}")]
    Ring(#[from] chordal_core::error::Error),
}
