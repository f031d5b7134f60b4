//! Error types.

use thiserror::Error;

/// Invalid configuration values, caught before connecting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("server host must not be empty")]
    EmptyHost,
    #[error("server port must not be 0")]
    InvalidPort,
    #[error("invalid nickname {0:?}")]
    InvalidNickname(String),
    #[error("invalid channel name {0:?}")]
    InvalidChannel(String),
}

/// Inbound data that cannot be split into protocol lines.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("line too long ({actual} bytes, limit {limit})")]
    LineTooLong { actual: usize, limit: usize },
}

/// Failures while establishing the connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TLS server name {0:?}")]
    InvalidServerName(String),
    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: std::io::Error,
    },
}
