#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Environment-driven configuration for debrix.
//!
//! Layout: `defaults.rs` (variable names and defaults), `error.rs`
//! (`ConfigError`), `model.rs` (`DebridConfig`), `loader.rs` (parsing and
//! validation of raw values).

mod defaults;
pub mod error;
mod loader;
pub mod model;

pub use defaults::{
    DEFAULT_API_URL, DEFAULT_CHUNK_SIZE, DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_MS, ENV_API_KEY,
    ENV_API_URL, ENV_CHUNK_SIZE, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_PREFIX, ENV_TIMEOUT_MS,
    ENV_TRACKERS,
};
pub use error::{ConfigError, ConfigResult};
pub use model::DebridConfig;
