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
#![allow(clippy::redundant_pub_crate)]

//! Command-line front end for checking and resolving torrents through a debrid provider.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: `check` and `resolve` handlers
//! - `client.rs`: error type and the wired application context
//! - `output.rs`: renderers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
