//! Sample values for provider responses.

use debrix_core::{ResolvedFile, Transfer, TransferStatus, magnet};

/// Deterministic 40-character info hash derived from `seed`.
#[must_use]
pub fn info_hash(seed: u32) -> String {
    format!("{seed:040x}")
}

/// Provider file with a CDN link derived from its path.
///
/// # Panics
///
/// Panics if `path` cannot be embedded in a URL.
#[must_use]
pub fn file(path: &str, size: u64) -> ResolvedFile {
    let link = format!("https://cdn.example/dl/{}", path.replace(' ', "_"));
    ResolvedFile {
        path: path.to_string(),
        size,
        direct_link: link.parse().expect("fixture url"),
    }
}

/// Video file of `megabytes` MB.
#[must_use]
pub fn video(path: &str, megabytes: u64) -> ResolvedFile {
    file(path, megabytes * 1_024 * 1_024)
}

/// Archive file.
#[must_use]
pub fn archive(path: &str) -> ResolvedFile {
    file(path, 1_024)
}

/// Transfer for `hash` in `status`.
#[must_use]
pub fn transfer(id: &str, hash: &str, status: TransferStatus) -> Transfer {
    Transfer {
        id: id.to_string(),
        source_uri: magnet::encode(hash),
        status,
        file_ref: Some(format!("file-{id}")),
        folder_ref: Some(format!("folder-{id}")),
    }
}
