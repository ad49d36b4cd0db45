//! Provider and collaborator traits implemented by adapters (e.g. the EasyDebrid client).

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ErrorKind, ProviderError, ProviderResult, classify};
use crate::magnet;
use crate::model::{ApiCredential, FolderEntry, ResolvedFile, Transfer};

/// Remote debrid provider API.
#[async_trait]
pub trait DebridProvider: Send + Sync {
    /// Cached indicator per magnet URI, in request order.
    async fn lookup_availability(
        &self,
        credential: &ApiCredential,
        magnets: &[String],
    ) -> ProviderResult<Vec<bool>>;

    /// Direct links for every file of a cached magnet; empty when not cached.
    async fn generate_direct_link(
        &self,
        credential: &ApiCredential,
        magnet: &str,
    ) -> ProviderResult<Vec<ResolvedFile>>;

    /// Transfers known to the account.
    async fn list_transfers(&self, credential: &ApiCredential) -> ProviderResult<Vec<Transfer>>;

    /// Ask the provider to start fetching a magnet.
    async fn create_transfer(&self, credential: &ApiCredential, magnet: &str)
    -> ProviderResult<()>;

    /// Contents of a provider folder.
    async fn list_folder(
        &self,
        credential: &ApiCredential,
        folder_id: &str,
        path_filter: Option<&str>,
        ip: Option<IpAddr>,
    ) -> ProviderResult<Vec<FolderEntry>>;
}

/// Source of full magnet links used when creating transfers.
#[async_trait]
pub trait MagnetSource: Send + Sync {
    /// Magnet URI for `info_hash`.
    async fn magnet_link(&self, info_hash: &str) -> ProviderResult<String>;
}

/// Builds magnets from the info hash plus a fixed tracker list.
#[derive(Debug, Clone, Default)]
pub struct TrackerMagnetSource {
    trackers: Vec<String>,
}

impl TrackerMagnetSource {
    /// Use the given announce URLs.
    #[must_use]
    pub const fn new(trackers: Vec<String>) -> Self {
        Self { trackers }
    }
}

#[async_trait]
impl MagnetSource for TrackerMagnetSource {
    async fn magnet_link(&self, info_hash: &str) -> ProviderResult<String> {
        if !magnet::is_info_hash(info_hash) {
            return Err(ProviderError::Collaborator {
                operation: "magnet_link",
                message: format!("invalid info hash '{info_hash}'"),
            });
        }
        Ok(magnet::encode_with_trackers(info_hash, &self.trackers))
    }
}

/// Run a provider call under `limit` and classify any failure.
pub(crate) async fn guarded<T, F>(
    operation: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, ErrorKind>
where
    F: Future<Output = ProviderResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(classify(err)),
        Err(_) => Err(classify(ProviderError::Timeout {
            operation,
            after: limit,
        })),
    }
}
