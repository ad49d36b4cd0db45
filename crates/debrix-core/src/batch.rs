//! Chunked availability lookups with per-chunk failure isolation.

use std::sync::Arc;

use debrix_events::{DebridEvent, EventBus};
use futures_util::future::try_join_all;
use tracing::{debug, warn};

use crate::error::{DebridError, DebridResult, ErrorKind};
use crate::magnet;
use crate::model::{ApiCredential, AvailabilityResult, ResolverSettings, StreamCandidate};
use crate::service::{DebridProvider, guarded};
use crate::title::stream_entry;

const OPERATION: &str = "lookup_availability";

/// Annotates candidate streams with provider cache status.
#[derive(Clone)]
pub struct AvailabilityBatcher {
    provider: Arc<dyn DebridProvider>,
    events: EventBus,
    settings: ResolverSettings,
}

struct ChunkReport {
    result: AvailabilityResult,
    failed: bool,
}

impl AvailabilityBatcher {
    /// Construct a batcher over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn DebridProvider>, events: EventBus, settings: ResolverSettings) -> Self {
        Self {
            provider,
            events,
            settings,
        }
    }

    /// Look up every candidate, `chunk_size` identifiers per provider call.
    ///
    /// All chunks run concurrently. A rejected credential aborts the whole
    /// check; any other chunk failure marks that chunk's entries as unknown.
    ///
    /// # Errors
    ///
    /// Returns [`DebridError::AuthRejected`] when the provider rejects `credential`.
    pub async fn check_availability(
        &self,
        candidates: &[StreamCandidate],
        credential: &ApiCredential,
    ) -> DebridResult<AvailabilityResult> {
        let chunk_size = self.settings.chunk_size.max(1);
        let reports = try_join_all(
            candidates
                .chunks(chunk_size)
                .enumerate()
                .map(|(index, chunk)| self.check_chunk(index, chunk, credential)),
        )
        .await?;

        let chunks = reports.len();
        let failed_chunks = reports.iter().filter(|report| report.failed).count();
        let merged = reports
            .into_iter()
            .fold(AvailabilityResult::default(), |all, report| {
                all.merge(report.result)
            });

        debug!(
            requested = candidates.len(),
            chunks, failed_chunks, "availability check complete"
        );
        self.events.publish(DebridEvent::AvailabilityChecked {
            requested: candidates.len(),
            chunks,
            failed_chunks,
        });
        Ok(merged)
    }

    async fn check_chunk(
        &self,
        index: usize,
        chunk: &[StreamCandidate],
        credential: &ApiCredential,
    ) -> DebridResult<ChunkReport> {
        let magnets: Vec<String> = chunk
            .iter()
            .map(|candidate| magnet::encode(&candidate.info_hash))
            .collect();

        let lookup = guarded(
            OPERATION,
            self.settings.request_timeout,
            self.provider.lookup_availability(credential, &magnets),
        )
        .await;

        let (flags, failed) = match lookup {
            Ok(flags) => (flags, false),
            Err(ErrorKind::AuthError) => {
                return Err(DebridError::AuthRejected {
                    operation: OPERATION,
                });
            }
            Err(kind) => {
                let message = match &kind {
                    ErrorKind::SoftProviderError(err) | ErrorKind::Unclassified(err) => {
                        err.diagnostic()
                    }
                    ErrorKind::AccessDenied | ErrorKind::AuthError => "access denied".to_string(),
                };
                warn!(
                    chunk = index,
                    items = chunk.len(),
                    error = %message,
                    "availability lookup failed; marking chunk unknown"
                );
                self.events.publish(DebridEvent::ChunkFailed {
                    chunk_index: index,
                    items: chunk.len(),
                    kind: kind.class(),
                    message,
                });
                (Vec::new(), true)
            }
        };

        let rows = chunk.iter().enumerate().map(|(position, candidate)| {
            let cached = if failed {
                None
            } else {
                flags.get(position).copied()
            };
            (candidate.info_hash.clone(), stream_entry(candidate), cached)
        });

        Ok(ChunkReport {
            result: AvailabilityResult::from_rows(rows),
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProviderError, ProviderResult};
    use crate::model::{FolderEntry, ResolvedFile, Transfer};
    use async_trait::async_trait;
    use std::net::IpAddr;
    use tokio::sync::Mutex;

    /// Marks a hash cached when it ends with an even digit; chunk calls
    /// containing `poison` fail with `failure`.
    struct ParityProvider {
        poison: Option<String>,
        failure: fn() -> ProviderError,
        calls: Mutex<Vec<usize>>,
    }

    impl ParityProvider {
        fn healthy() -> Self {
            Self {
                poison: None,
                failure: network_error,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    fn network_error() -> ProviderError {
        ProviderError::Transport {
            operation: OPERATION,
            source: Box::new(std::io::Error::other("connection reset")),
        }
    }

    fn auth_error() -> ProviderError {
        ProviderError::Api {
            operation: OPERATION,
            status: Some(401),
            message: "Not logged in.".into(),
        }
    }

    #[async_trait]
    impl DebridProvider for ParityProvider {
        async fn lookup_availability(
            &self,
            _credential: &ApiCredential,
            magnets: &[String],
        ) -> ProviderResult<Vec<bool>> {
            self.calls.lock().await.push(magnets.len());
            if let Some(poison) = &self.poison
                && magnets.iter().any(|m| m.ends_with(poison.as_str()))
            {
                return Err((self.failure)());
            }
            Ok(magnets
                .iter()
                .map(|m| m.ends_with(['0', '2', '4', '6', '8']))
                .collect())
        }

        async fn generate_direct_link(
            &self,
            _credential: &ApiCredential,
            _magnet: &str,
        ) -> ProviderResult<Vec<ResolvedFile>> {
            Ok(Vec::new())
        }

        async fn list_transfers(&self, _credential: &ApiCredential) -> ProviderResult<Vec<Transfer>> {
            Ok(Vec::new())
        }

        async fn create_transfer(
            &self,
            _credential: &ApiCredential,
            _magnet: &str,
        ) -> ProviderResult<()> {
            Ok(())
        }

        async fn list_folder(
            &self,
            _credential: &ApiCredential,
            _folder_id: &str,
            _path_filter: Option<&str>,
            _ip: Option<IpAddr>,
        ) -> ProviderResult<Vec<FolderEntry>> {
            Ok(Vec::new())
        }
    }

    fn candidates(count: usize) -> Vec<StreamCandidate> {
        (0..count)
            .map(|i| StreamCandidate {
                info_hash: format!("{i:040}"),
                file_index: None,
                title: format!("Release {i}\nfile{i}.mkv"),
            })
            .collect()
    }

    fn batcher(provider: Arc<ParityProvider>, chunk_size: usize) -> AvailabilityBatcher {
        AvailabilityBatcher::new(
            provider,
            EventBus::new(),
            ResolverSettings {
                chunk_size,
                ..ResolverSettings::default()
            },
        )
    }

    #[tokio::test]
    async fn chunked_and_unchunked_results_agree() -> anyhow::Result<()> {
        let items = candidates(37);
        let credential = ApiCredential::new("token");

        let chunked = batcher(Arc::new(ParityProvider::healthy()), 5)
            .check_availability(&items, &credential)
            .await?;
        let single = batcher(Arc::new(ParityProvider::healthy()), 1_000)
            .check_availability(&items, &credential)
            .await?;

        assert_eq!(chunked, single);
        assert_eq!(chunked.len(), 37);
        Ok(())
    }

    #[tokio::test]
    async fn chunk_sizes_follow_the_limit() -> anyhow::Result<()> {
        let provider = Arc::new(ParityProvider::healthy());
        batcher(Arc::clone(&provider), 100)
            .check_availability(&candidates(250), &ApiCredential::new("token"))
            .await?;

        let mut calls = provider.calls.lock().await.clone();
        calls.sort_unstable();
        assert_eq!(calls, vec![50, 100, 100]);
        Ok(())
    }

    #[tokio::test]
    async fn failing_chunk_is_marked_unknown() -> anyhow::Result<()> {
        let items = candidates(30);
        let provider = Arc::new(ParityProvider {
            poison: Some(items[12].info_hash.clone()),
            ..ParityProvider::healthy()
        });
        let events = EventBus::new();
        let batcher = AvailabilityBatcher::new(
            provider,
            events.clone(),
            ResolverSettings {
                chunk_size: 10,
                ..ResolverSettings::default()
            },
        );

        let result = batcher
            .check_availability(&items, &ApiCredential::new("token"))
            .await?;

        for (i, item) in items.iter().enumerate() {
            let cached = result.get(&item.info_hash).and_then(|a| a.cached);
            if (10..20).contains(&i) {
                assert_eq!(cached, None, "item {i} should be unknown");
            } else {
                assert_eq!(cached, Some(i % 2 == 0), "item {i} keeps real status");
            }
        }
        assert!(
            events
                .recent()
                .iter()
                .any(|e| matches!(e.event, DebridEvent::ChunkFailed { chunk_index: 1, items: 10, .. }))
        );
        Ok(())
    }

    #[tokio::test]
    async fn auth_failure_aborts_the_check() {
        let items = candidates(20);
        let provider = Arc::new(ParityProvider {
            poison: Some(items[15].info_hash.clone()),
            failure: auth_error,
            calls: Mutex::new(Vec::new()),
        });

        let result = batcher(provider, 10)
            .check_availability(&items, &ApiCredential::new("bad"))
            .await;
        assert!(matches!(
            result,
            Err(DebridError::AuthRejected { operation: OPERATION })
        ));
    }

    #[tokio::test]
    async fn short_provider_answer_leaves_tail_unknown() -> anyhow::Result<()> {
        struct ShortProvider;

        #[async_trait]
        impl DebridProvider for ShortProvider {
            async fn lookup_availability(
                &self,
                _credential: &ApiCredential,
                _magnets: &[String],
            ) -> ProviderResult<Vec<bool>> {
                Ok(vec![true])
            }

            async fn generate_direct_link(
                &self,
                _credential: &ApiCredential,
                _magnet: &str,
            ) -> ProviderResult<Vec<ResolvedFile>> {
                Ok(Vec::new())
            }

            async fn list_transfers(
                &self,
                _credential: &ApiCredential,
            ) -> ProviderResult<Vec<Transfer>> {
                Ok(Vec::new())
            }

            async fn create_transfer(
                &self,
                _credential: &ApiCredential,
                _magnet: &str,
            ) -> ProviderResult<()> {
                Ok(())
            }

            async fn list_folder(
                &self,
                _credential: &ApiCredential,
                _folder_id: &str,
                _path_filter: Option<&str>,
                _ip: Option<IpAddr>,
            ) -> ProviderResult<Vec<FolderEntry>> {
                Ok(Vec::new())
            }
        }

        let items = candidates(2);
        let result = AvailabilityBatcher::new(
            Arc::new(ShortProvider),
            EventBus::new(),
            ResolverSettings::default(),
        )
        .check_availability(&items, &ApiCredential::new("token"))
        .await?;

        assert_eq!(result.get(&items[0].info_hash).and_then(|a| a.cached), Some(true));
        assert_eq!(result.get(&items[1].info_hash).and_then(|a| a.cached), None);
        Ok(())
    }
}
