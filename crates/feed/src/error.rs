//! Error types for the feed crate

use thiserror::Error;

/// Transport-level errors. Any of these terminates the transport's run loop.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Timed out connecting to {0}")]
    Timeout(String),

    #[error("Connection closed by peer: {0}")]
    Closed(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("Message sink closed")]
    SinkClosed,
}

/// Errors decoding a raw feed payload. The offending message is skipped.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid decimal {value:?} in {field}")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("Unknown side {0:?}")]
    UnknownSide(String),

    #[error("Negative size {0:?}")]
    NegativeSize(String),
}
