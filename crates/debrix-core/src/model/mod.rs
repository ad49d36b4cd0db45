//! Debrid domain types shared across the workspace.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default bound applied to every outbound provider call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Default number of content identifiers per availability lookup.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Provider access token. Opaque to the core and never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for transport layers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("ApiCredential(***)")
    }
}

/// Who is asking for the content; passed through for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterContext {
    /// Client address, when known.
    pub ip: Option<IpAddr>,
    /// Whether the request originates from a browser.
    #[serde(default)]
    pub is_browser: bool,
}

/// One unit of resolution work.
#[derive(Debug, Clone)]
pub struct ContentRequest {
    /// Torrent info hash (case-insensitive).
    pub info_hash: String,
    /// File index within the torrent when a specific episode/file is wanted.
    pub file_index: Option<u32>,
    /// Filename matched against provider paths when `file_index` is set.
    pub target_filename: Option<String>,
    /// Account token forwarded to the provider.
    pub credential: ApiCredential,
    /// Requester details.
    pub requester: RequesterContext,
}

impl ContentRequest {
    /// Request the largest video in `info_hash`.
    #[must_use]
    pub fn new(info_hash: impl Into<String>, credential: ApiCredential) -> Self {
        Self {
            info_hash: info_hash.into(),
            file_index: None,
            target_filename: None,
            credential,
            requester: RequesterContext::default(),
        }
    }

    /// Target a specific file by index and name.
    #[must_use]
    pub fn with_file(mut self, file_index: u32, target_filename: impl Into<String>) -> Self {
        self.file_index = Some(file_index);
        self.target_filename = Some(target_filename.into());
        self
    }

    /// Attach requester details.
    #[must_use]
    pub fn with_requester(mut self, requester: RequesterContext) -> Self {
        self.requester = requester;
        self
    }
}

/// Remote transfer status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Transfer completed.
    Finished,
    /// Transfer completed and is seeding.
    Seeding,
    /// Waiting to start.
    Waiting,
    /// Queued behind other transfers.
    Queued,
    /// Actively downloading.
    Running,
    /// Removed by the provider or user.
    Deleted,
    /// Failed with an error.
    Error,
    /// Gave up after stalling.
    Timeout,
}

/// Disjoint partition of [`TransferStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusGroup {
    /// Content is cached and can be linked.
    Ready,
    /// Content is still being fetched.
    Downloading,
    /// Transfer is unusable.
    Failed,
}

impl TransferStatus {
    /// Every status the provider can report.
    pub const ALL: [Self; 8] = [
        Self::Finished,
        Self::Seeding,
        Self::Waiting,
        Self::Queued,
        Self::Running,
        Self::Deleted,
        Self::Error,
        Self::Timeout,
    ];

    /// Group this status belongs to.
    #[must_use]
    pub const fn group(self) -> StatusGroup {
        match self {
            Self::Finished | Self::Seeding => StatusGroup::Ready,
            Self::Waiting | Self::Queued | Self::Running => StatusGroup::Downloading,
            Self::Deleted | Self::Error | Self::Timeout => StatusGroup::Failed,
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finished => "finished",
            Self::Seeding => "seeding",
            Self::Waiting => "waiting",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Deleted => "deleted",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }
}

impl Display for TransferStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Raised when a provider reports a status outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transfer status")]
pub struct UnknownStatus {
    /// Raw status string.
    pub value: String,
}

impl FromStr for TransferStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus {
                value: value.to_string(),
            })
    }
}

/// Provider-side job fetching a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Provider identifier.
    pub id: String,
    /// Magnet URI (or other source) the transfer was created from.
    pub source_uri: String,
    /// Current status.
    pub status: TransferStatus,
    /// Provider file reference, when the payload is a single file.
    pub file_ref: Option<String>,
    /// Provider folder reference, when the payload is a directory.
    pub folder_ref: Option<String>,
}

impl Transfer {
    /// Whether this transfer was created for `info_hash`.
    ///
    /// Magnet sources are compared by their decoded hash; other sources fall
    /// back to a case-insensitive substring check. An empty hash never matches.
    #[must_use]
    pub fn matches(&self, info_hash: &str) -> bool {
        let wanted = info_hash.trim().to_ascii_lowercase();
        if wanted.is_empty() {
            return false;
        }
        match crate::magnet::decode(&self.source_uri) {
            Some(decoded) => decoded == wanted,
            None => self.source_uri.to_ascii_lowercase().contains(&wanted),
        }
    }
}

/// File the provider can serve directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFile {
    /// Path inside the torrent.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Direct HTTP(S) link.
    pub direct_link: Url,
}

/// Entry returned by a provider folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Provider identifier.
    pub id: String,
    /// Display name, relative to the listed folder.
    pub name: String,
    /// File or folder.
    pub kind: FolderEntryKind,
    /// Unix timestamp (seconds).
    pub created_at: i64,
    /// Download or stream link for files.
    pub link: Option<Url>,
}

/// Folder entry discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderEntryKind {
    /// Regular file.
    File,
    /// Nested folder.
    Folder,
}

/// Why a resolution ended in [`ResolutionOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    /// The transfer is ready but no usable file could be linked.
    NoCachedEntry,
    /// The single recreate attempt did not produce a ready transfer.
    RetryExhausted,
    /// No transfer could be located even after creating one.
    TransferNotFound,
    /// A provider call failed; the message is kept for diagnostics.
    Provider {
        /// Operation that failed.
        operation: String,
        /// Original error text.
        message: String,
    },
}

impl Display for FailureReason {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCachedEntry => formatter.write_str("no cached entry"),
            Self::RetryExhausted => formatter.write_str("download retry exhausted"),
            Self::TransferNotFound => formatter.write_str("transfer not found"),
            Self::Provider { operation, message } => write!(formatter, "{operation}: {message}"),
        }
    }
}

/// Terminal result of a resolve call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Playable link.
    DirectLink {
        /// Resolved URL.
        url: Url,
    },
    /// Provider is still fetching; poll again later.
    Downloading,
    /// Only archives are available.
    ArchiveOnly,
    /// The account lacks the required entitlement.
    AccessDenied,
    /// Resolution failed.
    Failed(FailureReason),
}

impl ResolutionOutcome {
    /// Event-level discriminator.
    #[must_use]
    pub const fn kind(&self) -> debrix_events::OutcomeKind {
        use debrix_events::OutcomeKind;
        match self {
            Self::DirectLink { .. } => OutcomeKind::DirectLink,
            Self::Downloading => OutcomeKind::Downloading,
            Self::ArchiveOnly => OutcomeKind::ArchiveOnly,
            Self::AccessDenied => OutcomeKind::AccessDenied,
            Self::Failed(_) => OutcomeKind::Failed,
        }
    }
}

/// Candidate stream presented to the availability batcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCandidate {
    /// Torrent info hash.
    pub info_hash: String,
    /// File index advertised by the stream source.
    pub file_index: Option<u32>,
    /// Descriptive title; the last line usually names the file.
    #[serde(default)]
    pub title: String,
}

/// Per-candidate data derived during an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEntry {
    /// Display filename recovered from the title.
    pub filename: String,
    /// File index hint; only kept when the title looks like a single-file entry.
    pub file_index: Option<u32>,
    /// `{info_hash}/{filename}/{file_index}` path segment for playback URLs.
    pub resolve_path: String,
}

/// Availability of one info hash.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Availability {
    /// `Some(true)` if any entry is cached, `None` if unknown and none cached.
    pub cached: Option<bool>,
    /// Cached flag per entry, in presentation order.
    pub per_file_cached: Vec<Option<bool>>,
    /// Entries aligned with `per_file_cached`.
    pub entries: Vec<StreamEntry>,
}

impl Availability {
    fn push(&mut self, entry: StreamEntry, cached: Option<bool>) {
        self.entries.push(entry);
        self.per_file_cached.push(cached);
        self.cached = aggregate_cached(&self.per_file_cached);
    }
}

fn aggregate_cached(flags: &[Option<bool>]) -> Option<bool> {
    if flags.contains(&Some(true)) {
        Some(true)
    } else if flags.contains(&None) {
        None
    } else {
        Some(false)
    }
}

/// Availability keyed by info hash.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityResult(BTreeMap<String, Availability>);

impl AvailabilityResult {
    /// Build a result from ordered `(info_hash, entry, cached)` rows.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, StreamEntry, Option<bool>)>,
    {
        let mut map: BTreeMap<String, Availability> = BTreeMap::new();
        for (info_hash, entry, cached) in rows {
            map.entry(info_hash).or_default().push(entry, cached);
        }
        Self(map)
    }

    /// Key union of two results; entries of `later` are appended after `self`'s.
    #[must_use]
    pub fn merge(mut self, later: Self) -> Self {
        for (info_hash, availability) in later.0 {
            let slot = self.0.entry(info_hash).or_default();
            for (entry, cached) in availability
                .entries
                .into_iter()
                .zip(availability.per_file_cached)
            {
                slot.push(entry, cached);
            }
        }
        self
    }

    /// Availability for `info_hash`.
    #[must_use]
    pub fn get(&self, info_hash: &str) -> Option<&Availability> {
        self.0.get(info_hash)
    }

    /// Number of distinct info hashes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no info hash was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in info-hash order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Availability)> {
        self.0.iter()
    }
}

/// Tunables for the batcher and resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Bound applied to each provider call.
    pub request_timeout: Duration,
    /// Maximum identifiers per availability lookup.
    pub chunk_size: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
