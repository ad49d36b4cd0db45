//! Transfer resolution state machine.
//!
//! `SpeculativeDirect` → `FindOrCreate` → `StatusBranch` → (`Retry`, at most once).
//! Provider failures are classified where each call is made; the machine only
//! ever sees `ErrorKind`s.

use std::sync::Arc;

use debrix_events::{DebridEvent, EventBus, OutcomeKind};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::{DebridError, DebridResult, ErrorKind};
use crate::files::FileClassifier;
use crate::magnet;
use crate::model::{
    ApiCredential, ContentRequest, FailureReason, ResolutionOutcome, ResolverSettings,
    StatusGroup, Transfer,
};
use crate::select::{FileSelection, select_file};
use crate::service::{DebridProvider, MagnetSource, guarded};

/// Resolves one content request to a playable outcome.
#[derive(Clone)]
pub struct TransferResolver {
    provider: Arc<dyn DebridProvider>,
    magnets: Arc<dyn MagnetSource>,
    classifier: Arc<dyn FileClassifier>,
    events: EventBus,
    settings: ResolverSettings,
}

enum Step {
    SpeculativeDirect,
    FindOrCreate,
    StatusBranch(Transfer),
    Retry(Transfer),
}

enum DirectAttempt {
    Resolved(ResolutionOutcome),
    NoMatch,
}

struct Attempt<'a> {
    id: Uuid,
    request: &'a ContentRequest,
    magnet: String,
}

impl Attempt<'_> {
    fn credential(&self) -> &ApiCredential {
        &self.request.credential
    }

    fn info_hash(&self) -> &str {
        &self.request.info_hash
    }
}

impl TransferResolver {
    /// Construct a resolver from its collaborators.
    #[must_use]
    pub fn new(
        provider: Arc<dyn DebridProvider>,
        magnets: Arc<dyn MagnetSource>,
        classifier: Arc<dyn FileClassifier>,
        events: EventBus,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            provider,
            magnets,
            classifier,
            events,
            settings,
        }
    }

    /// Resolve `request` to a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DebridError::AuthRejected`] when the provider rejects the
    /// credential; every other condition is reported through the outcome.
    pub async fn resolve(&self, request: &ContentRequest) -> DebridResult<ResolutionOutcome> {
        let attempt = Attempt {
            id: Uuid::new_v4(),
            request,
            magnet: magnet::encode(&request.info_hash),
        };
        let span = info_span!(
            "resolve",
            resolution_id = %attempt.id,
            info_hash = %request.info_hash,
            file_index = ?request.file_index,
        );

        async {
            info!(
                ip = ?request.requester.ip,
                browser = request.requester.is_browser,
                "unrestricting content"
            );

            let outcome = match self.run(&attempt).await {
                Ok(outcome) => outcome,
                Err(ErrorKind::AccessDenied) => {
                    info!("access denied by provider");
                    ResolutionOutcome::AccessDenied
                }
                Err(ErrorKind::AuthError) => {
                    warn!("provider rejected credential");
                    self.publish_outcome(&attempt, OutcomeKind::AuthRejected);
                    return Err(DebridError::AuthRejected {
                        operation: "resolve",
                    });
                }
                Err(ErrorKind::SoftProviderError(err) | ErrorKind::Unclassified(err)) => {
                    let message = err.diagnostic();
                    warn!(operation = err.operation(), error = %message, "resolution failed");
                    ResolutionOutcome::Failed(FailureReason::Provider {
                        operation: err.operation().to_string(),
                        message,
                    })
                }
            };

            self.publish_outcome(&attempt, outcome.kind());
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    /// Info hash of the transfer owning a provider file or folder reference.
    ///
    /// Non-auth provider failures are logged and reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DebridError::AuthRejected`] when the provider rejects `credential`.
    pub async fn find_info_hash_for_item(
        &self,
        credential: &ApiCredential,
        item_id: &str,
    ) -> DebridResult<Option<String>> {
        let transfers = match self.list_transfers(credential).await {
            Ok(transfers) => transfers,
            Err(ErrorKind::AuthError) => {
                return Err(DebridError::AuthRejected {
                    operation: "list_transfers",
                });
            }
            Err(kind) => {
                warn!(item_id, kind = ?kind.class(), "transfer lookup failed");
                return Ok(None);
            }
        };

        Ok(transfers
            .iter()
            .find(|transfer| {
                transfer.file_ref.as_deref() == Some(item_id)
                    || transfer.folder_ref.as_deref() == Some(item_id)
            })
            .and_then(|transfer| magnet::decode(&transfer.source_uri)))
    }

    async fn run(&self, attempt: &Attempt<'_>) -> Result<ResolutionOutcome, ErrorKind> {
        let mut step = Step::SpeculativeDirect;
        loop {
            step = match step {
                Step::SpeculativeDirect => match self.direct_link(attempt).await {
                    Ok(DirectAttempt::Resolved(outcome)) => return Ok(outcome),
                    Ok(DirectAttempt::NoMatch) => Step::FindOrCreate,
                    Err(ErrorKind::SoftProviderError(err) | ErrorKind::Unclassified(err)) => {
                        debug!(error = %err.diagnostic(), "speculative direct link unavailable");
                        Step::FindOrCreate
                    }
                    Err(kind) => return Err(kind),
                },
                Step::FindOrCreate => match self.find_or_create(attempt).await? {
                    Some(transfer) => Step::StatusBranch(transfer),
                    None => {
                        return Ok(ResolutionOutcome::Failed(FailureReason::TransferNotFound));
                    }
                },
                Step::StatusBranch(transfer) => match transfer.status.group() {
                    StatusGroup::Ready => return self.ready_link(attempt).await,
                    StatusGroup::Downloading => {
                        info!(transfer_id = %transfer.id, status = %transfer.status, "content downloading");
                        return Ok(ResolutionOutcome::Downloading);
                    }
                    StatusGroup::Failed => Step::Retry(transfer),
                },
                Step::Retry(failed) => return self.retry(attempt, &failed).await,
            };
        }
    }

    async fn direct_link(&self, attempt: &Attempt<'_>) -> Result<DirectAttempt, ErrorKind> {
        let files = guarded(
            "generate_direct_link",
            self.settings.request_timeout,
            self.provider
                .generate_direct_link(attempt.credential(), &attempt.magnet),
        )
        .await?;

        if files.is_empty() {
            return Ok(DirectAttempt::NoMatch);
        }

        let request = attempt.request;
        match select_file(
            &files,
            request.file_index,
            request.target_filename.as_deref(),
            self.classifier.as_ref(),
        ) {
            FileSelection::Selected(file) => {
                info!(path = %file.path, size = file.size, link = %file.direct_link, "resolved direct link");
                Ok(DirectAttempt::Resolved(ResolutionOutcome::DirectLink {
                    url: file.direct_link.clone(),
                }))
            }
            FileSelection::ArchiveOnly => {
                info!("only archives available");
                Ok(DirectAttempt::Resolved(ResolutionOutcome::ArchiveOnly))
            }
            FileSelection::NoMatch => Ok(DirectAttempt::NoMatch),
        }
    }

    async fn ready_link(&self, attempt: &Attempt<'_>) -> Result<ResolutionOutcome, ErrorKind> {
        match self.direct_link(attempt).await? {
            DirectAttempt::Resolved(outcome) => Ok(outcome),
            DirectAttempt::NoMatch => Ok(ResolutionOutcome::Failed(FailureReason::NoCachedEntry)),
        }
    }

    async fn retry(
        &self,
        attempt: &Attempt<'_>,
        failed: &Transfer,
    ) -> Result<ResolutionOutcome, ErrorKind> {
        info!(transfer_id = %failed.id, status = %failed.status, "retrying failed transfer");
        self.events.publish(DebridEvent::RetryScheduled {
            resolution_id: attempt.id,
            info_hash: attempt.info_hash().to_string(),
            previous_status: failed.status.to_string(),
        });

        self.create(attempt).await?;
        match self.find(attempt).await? {
            Some(transfer) if transfer.status.group() == StatusGroup::Ready => {
                self.ready_link(attempt).await
            }
            other => {
                debug!(status = ?other.map(|t| t.status), "retry did not produce a ready transfer");
                Ok(ResolutionOutcome::Failed(FailureReason::RetryExhausted))
            }
        }
    }

    async fn find_or_create(&self, attempt: &Attempt<'_>) -> Result<Option<Transfer>, ErrorKind> {
        if let Some(transfer) = self.find(attempt).await? {
            return Ok(Some(transfer));
        }
        self.create(attempt).await?;
        self.find(attempt).await
    }

    async fn find(&self, attempt: &Attempt<'_>) -> Result<Option<Transfer>, ErrorKind> {
        let transfers = self.list_transfers(attempt.credential()).await?;
        Ok(pick_transfer(transfers, attempt.info_hash()))
    }

    async fn create(&self, attempt: &Attempt<'_>) -> Result<(), ErrorKind> {
        let magnet = guarded(
            "magnet_link",
            self.settings.request_timeout,
            self.magnets.magnet_link(attempt.info_hash()),
        )
        .await?;
        guarded(
            "create_transfer",
            self.settings.request_timeout,
            self.provider.create_transfer(attempt.credential(), &magnet),
        )
        .await?;

        info!("transfer created");
        self.events.publish(DebridEvent::TransferCreated {
            resolution_id: attempt.id,
            info_hash: attempt.info_hash().to_string(),
        });
        Ok(())
    }

    async fn list_transfers(&self, credential: &ApiCredential) -> Result<Vec<Transfer>, ErrorKind> {
        guarded(
            "list_transfers",
            self.settings.request_timeout,
            self.provider.list_transfers(credential),
        )
        .await
    }

    fn publish_outcome(&self, attempt: &Attempt<'_>, outcome: OutcomeKind) {
        self.events.publish(DebridEvent::Resolved {
            resolution_id: attempt.id,
            info_hash: attempt.info_hash().to_string(),
            file_index: attempt.request.file_index,
            outcome,
        });
    }
}

/// First non-failed transfer for `info_hash`, else the first matching one.
fn pick_transfer(transfers: Vec<Transfer>, info_hash: &str) -> Option<Transfer> {
    let mut matching = transfers
        .into_iter()
        .filter(|transfer| transfer.matches(info_hash))
        .peekable();
    let first = matching.peek().cloned();
    matching
        .find(|transfer| transfer.status.group() != StatusGroup::Failed)
        .or(first)
}
