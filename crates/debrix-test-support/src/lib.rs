#![forbid(unsafe_code)]

//! Shared test helpers: a scripted in-memory provider and fixture builders.
//! Layout: fixtures.rs (sample values), mocks.rs (fake provider).

pub mod fixtures;
pub mod mocks;

pub use fixtures::{archive, file, info_hash, transfer, video};
pub use mocks::{Failure, ProviderCall, ScriptedProvider};
