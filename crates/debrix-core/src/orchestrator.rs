//! Facade bundling the availability batcher and transfer resolver over one provider.

use std::sync::Arc;

use debrix_events::EventBus;

use crate::batch::AvailabilityBatcher;
use crate::error::DebridResult;
use crate::files::{ExtensionClassifier, FileClassifier};
use crate::model::{
    ApiCredential, AvailabilityResult, ContentRequest, ResolutionOutcome, ResolverSettings,
    StreamCandidate,
};
use crate::resolve::TransferResolver;
use crate::service::{DebridProvider, MagnetSource};

/// Entry point used by delivery layers (CLI, HTTP addon routes).
#[derive(Clone)]
pub struct DebridOrchestrator {
    batcher: AvailabilityBatcher,
    resolver: TransferResolver,
    events: EventBus,
}

impl DebridOrchestrator {
    /// Wire the orchestrator with the default extension classifier.
    #[must_use]
    pub fn new(
        provider: Arc<dyn DebridProvider>,
        magnets: Arc<dyn MagnetSource>,
        events: EventBus,
        settings: ResolverSettings,
    ) -> Self {
        Self::with_classifier(provider, magnets, Arc::new(ExtensionClassifier), events, settings)
    }

    /// Wire the orchestrator with a custom filename classifier.
    #[must_use]
    pub fn with_classifier(
        provider: Arc<dyn DebridProvider>,
        magnets: Arc<dyn MagnetSource>,
        classifier: Arc<dyn FileClassifier>,
        events: EventBus,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            batcher: AvailabilityBatcher::new(Arc::clone(&provider), events.clone(), settings),
            resolver: TransferResolver::new(provider, magnets, classifier, events.clone(), settings),
            events,
        }
    }

    /// See [`AvailabilityBatcher::check_availability`].
    ///
    /// # Errors
    ///
    /// Returns an error when the provider rejects `credential`.
    pub async fn check_availability(
        &self,
        candidates: &[StreamCandidate],
        credential: &ApiCredential,
    ) -> DebridResult<AvailabilityResult> {
        self.batcher.check_availability(candidates, credential).await
    }

    /// See [`TransferResolver::resolve`].
    ///
    /// # Errors
    ///
    /// Returns an error when the provider rejects the request credential.
    pub async fn resolve(&self, request: &ContentRequest) -> DebridResult<ResolutionOutcome> {
        self.resolver.resolve(request).await
    }

    /// See [`TransferResolver::find_info_hash_for_item`].
    ///
    /// # Errors
    ///
    /// Returns an error when the provider rejects `credential`.
    pub async fn find_info_hash_for_item(
        &self,
        credential: &ApiCredential,
        item_id: &str,
    ) -> DebridResult<Option<String>> {
        self.resolver
            .find_info_hash_for_item(credential, item_id)
            .await
    }

    /// Bus receiving batcher and resolver events.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }
}
