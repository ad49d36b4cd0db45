#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic)]

//! EasyDebrid HTTP adapter for the debrix provider trait.
//!
//! Layout:
//! - `client.rs`: request plumbing and the `DebridProvider` implementation
//! - `wire.rs`: JSON payloads exchanged with the API

mod client;
mod wire;

pub use client::{ClientError, DEFAULT_API_URL, EasyDebridClient};
