//! Scripted provider recording availability, link and transfer calls.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use debrix_core::{
    ApiCredential, DebridProvider, FolderEntry, ProviderError, ProviderResult, ResolvedFile,
    Transfer, TransferStatus, magnet,
};

/// Scripted failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Credential rejected.
    NotLoggedIn,
    /// Entitlement missing.
    NotPremium,
    /// Connection-level failure.
    Network,
    /// Never answers.
    Hang,
}

impl Failure {
    async fn into_error(self, operation: &'static str) -> ProviderError {
        match self {
            Self::NotLoggedIn => api(operation, 401, "Not logged in."),
            Self::NotPremium => api(operation, 403, "Account not premium."),
            Self::Network => ProviderError::Transport {
                operation,
                source: Box::new(std::io::Error::other("connection reset by peer")),
            },
            Self::Hang => {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                api(operation, 504, "gateway timeout")
            }
        }
    }
}

fn api(operation: &'static str, status: u16, message: &str) -> ProviderError {
    ProviderError::Api {
        operation,
        status: Some(status),
        message: message.to_string(),
    }
}

/// Call observed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// Availability lookup with the chunk length.
    Lookup(usize),
    /// Direct-link generation for a magnet.
    DirectLink(String),
    /// Transfer listing.
    ListTransfers,
    /// Transfer creation for a magnet.
    CreateTransfer(String),
}

#[derive(Default)]
struct Script {
    cached: HashMap<String, bool>,
    lookup_failures: Vec<(String, Failure)>,
    direct_links: VecDeque<Result<Vec<ResolvedFile>, Failure>>,
    transfers: Vec<Transfer>,
    list_failure: Option<Failure>,
    create_failure: Option<Failure>,
    created_statuses: VecDeque<TransferStatus>,
    calls: Vec<ProviderCall>,
}

/// In-memory provider answering from a script.
///
/// Direct-link answers are consumed in order; once exhausted the provider
/// reports no cached files. Each `create_transfer` appends a transfer with the
/// next scripted status, or nothing once the statuses run out.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<Script>,
}

impl ScriptedProvider {
    /// Empty script: nothing cached, no transfers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&mut self) -> &mut Script {
        self.script.get_mut().expect("script mutex poisoned")
    }

    /// Mark `hash` as cached (or not) for availability lookups.
    #[must_use]
    pub fn with_cached(mut self, hash: &str, cached: bool) -> Self {
        self.script().cached.insert(hash.to_string(), cached);
        self
    }

    /// Fail any lookup chunk containing `hash`.
    #[must_use]
    pub fn with_lookup_failure(mut self, hash: &str, failure: Failure) -> Self {
        self.script()
            .lookup_failures
            .push((hash.to_string(), failure));
        self
    }

    /// Queue a direct-link answer.
    #[must_use]
    pub fn with_direct_links(mut self, files: Vec<ResolvedFile>) -> Self {
        self.script().direct_links.push_back(Ok(files));
        self
    }

    /// Queue a direct-link failure.
    #[must_use]
    pub fn with_direct_failure(mut self, failure: Failure) -> Self {
        self.script().direct_links.push_back(Err(failure));
        self
    }

    /// Seed an existing transfer.
    #[must_use]
    pub fn with_transfer(mut self, transfer: Transfer) -> Self {
        self.script().transfers.push(transfer);
        self
    }

    /// Fail every transfer listing.
    #[must_use]
    pub fn with_list_failure(mut self, failure: Failure) -> Self {
        self.script().list_failure = Some(failure);
        self
    }

    /// Fail every transfer creation.
    #[must_use]
    pub fn with_create_failure(mut self, failure: Failure) -> Self {
        self.script().create_failure = Some(failure);
        self
    }

    /// Status given to the next created transfer.
    #[must_use]
    pub fn with_created_status(mut self, status: TransferStatus) -> Self {
        self.script().created_statuses.push_back(status);
        self
    }

    /// Calls observed so far.
    ///
    /// # Panics
    ///
    /// Panics if the script mutex has been poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    /// Number of `create_transfer` calls observed.
    #[must_use]
    pub fn created(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ProviderCall::CreateTransfer(_)))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("script mutex poisoned")
    }
}

#[async_trait]
impl DebridProvider for ScriptedProvider {
    async fn lookup_availability(
        &self,
        _credential: &ApiCredential,
        magnets: &[String],
    ) -> ProviderResult<Vec<bool>> {
        let (failure, flags) = {
            let mut script = self.lock();
            script.calls.push(ProviderCall::Lookup(magnets.len()));
            let hashes: Vec<Option<String>> = magnets.iter().map(|uri| magnet::decode(uri)).collect();
            let failure = script.lookup_failures.iter().find_map(|(hash, failure)| {
                hashes
                    .iter()
                    .flatten()
                    .any(|candidate| candidate == hash)
                    .then_some(*failure)
            });
            let flags: Vec<bool> = hashes
                .iter()
                .map(|hash| {
                    hash.as_ref()
                        .and_then(|hash| script.cached.get(hash).copied())
                        .unwrap_or(false)
                })
                .collect();
            (failure, flags)
        };

        match failure {
            Some(failure) => Err(failure.into_error("lookup_availability").await),
            None => Ok(flags),
        }
    }

    async fn generate_direct_link(
        &self,
        _credential: &ApiCredential,
        magnet: &str,
    ) -> ProviderResult<Vec<ResolvedFile>> {
        let next = {
            let mut script = self.lock();
            script
                .calls
                .push(ProviderCall::DirectLink(magnet.to_string()));
            script.direct_links.pop_front()
        };
        match next {
            Some(Ok(files)) => Ok(files),
            Some(Err(failure)) => Err(failure.into_error("generate_direct_link").await),
            None => Ok(Vec::new()),
        }
    }

    async fn list_transfers(&self, _credential: &ApiCredential) -> ProviderResult<Vec<Transfer>> {
        let (failure, transfers) = {
            let mut script = self.lock();
            script.calls.push(ProviderCall::ListTransfers);
            (script.list_failure, script.transfers.clone())
        };
        match failure {
            Some(failure) => Err(failure.into_error("list_transfers").await),
            None => Ok(transfers),
        }
    }

    async fn create_transfer(
        &self,
        _credential: &ApiCredential,
        magnet: &str,
    ) -> ProviderResult<()> {
        let failure = {
            let mut script = self.lock();
            script
                .calls
                .push(ProviderCall::CreateTransfer(magnet.to_string()));
            if script.create_failure.is_none()
                && let Some(status) = script.created_statuses.pop_front()
            {
                let id = format!("created-{}", script.transfers.len() + 1);
                script.transfers.push(Transfer {
                    id,
                    source_uri: magnet.to_string(),
                    status,
                    file_ref: None,
                    folder_ref: None,
                });
            }
            script.create_failure
        };
        match failure {
            Some(failure) => Err(failure.into_error("create_transfer").await),
            None => Ok(()),
        }
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
