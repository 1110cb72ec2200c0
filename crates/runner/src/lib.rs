//! l2book Runner
//!
//! Process wiring around an [`l2book::OrderBook`]:
//!
//! - **Args**: config path and optional replay file from the command line
//! - **Report**: periodic top-of-book log line and event draining
//!
//! Usage:
//!
//! ```text
//! l2book-runner [config.json] [--replay payloads.jsonl]
//! ```

pub mod args;
pub mod report;

pub use args::RunnerArgs;
pub use report::{TopOfBook, log_events};
