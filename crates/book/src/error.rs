//! Error types for the book crate

use l2book_feed::TransportError;
use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Ingest queue errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Ingest queue disconnected")]
    Disconnected,
}

/// Errors constructing or tearing down an order book
#[derive(Error, Debug)]
pub enum BookError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("No snapshot received within {0:?}")]
    InitTimeout(Duration),

    #[error("Worker {0} stopped before the book was initialized")]
    WorkerStopped(&'static str),

    #[error("Worker {0} panicked")]
    WorkerPanicked(&'static str),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
