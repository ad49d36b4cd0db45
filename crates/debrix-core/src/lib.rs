#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Debrid resolution core: decides whether a torrent is streamable right now,
//! still downloading, archive-only, or failed, using as few provider calls as
//! possible.
//!
//! Layout: `model/` (domain types), `service/` (provider and collaborator
//! traits), `error.rs` (failure classification), `select.rs` (file choice),
//! `batch.rs` (chunked availability), `resolve.rs` (transfer state machine),
//! `orchestrator.rs` (facade), `magnet.rs`, `files.rs`, `title.rs` (helpers).

pub mod batch;
pub mod error;
pub mod files;
pub mod magnet;
pub mod model;
pub mod orchestrator;
pub mod resolve;
pub mod select;
pub mod service;
pub mod title;

pub use batch::AvailabilityBatcher;
pub use error::{DebridError, DebridResult, ErrorKind, ProviderError, ProviderResult, classify};
pub use files::{ExtensionClassifier, FileClassifier};
pub use model::{
    ApiCredential, Availability, AvailabilityResult, ContentRequest, DEFAULT_CHUNK_SIZE,
    DEFAULT_REQUEST_TIMEOUT, FailureReason, FolderEntry, FolderEntryKind, RequesterContext,
    ResolutionOutcome, ResolvedFile, ResolverSettings, StatusGroup, StreamCandidate, StreamEntry,
    Transfer, TransferStatus, UnknownStatus,
};
pub use orchestrator::DebridOrchestrator;
pub use resolve::TransferResolver;
pub use select::{FileSelection, select_file};
pub use service::{DebridProvider, MagnetSource, TrackerMagnetSource};
