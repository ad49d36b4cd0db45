//! HTTP client for the EasyDebrid API.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use debrix_core::{
    ApiCredential, DebridProvider, FolderEntry, ProviderError, ProviderResult, ResolvedFile,
    Transfer,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::wire::{
    ErrorBody, FolderListing, GenerateResponse, LookupRequest, LookupResponse, TransferList,
    UrlRequest,
};

/// Public API root used when none is configured.
pub const DEFAULT_API_URL: &str = "https://easydebrid.com/api/v1";

const PATH_LOOKUP: &str = "link/lookup";
const PATH_GENERATE: &str = "link/generate";
const PATH_TRANSFER_LIST: &str = "transfer/list";
const PATH_TRANSFER_CREATE: &str = "transfer/create";
const PATH_FOLDER_LIST: &str = "folder/list";

/// Failures while constructing the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API root cannot serve as a base URL.
    #[error("api url cannot be used as a base")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
    },
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Build {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
}

/// EasyDebrid API client; cheap to clone.
#[derive(Debug, Clone)]
pub struct EasyDebridClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl EasyDebridClient {
    /// Build a client rooted at `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` cannot be a base or the HTTP client fails to build.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("debrix/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Build { source })?;
        Self::with_client(http, base_url, timeout)
    }

    /// Wrap an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` cannot be a base.
    pub fn with_client(
        http: Client,
        mut base_url: Url,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// API root requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> ProviderResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ProviderError::Transport {
                operation,
                source: Box::new(err),
            })
    }

    async fn execute(
        &self,
        operation: &'static str,
        credential: &ApiCredential,
        request: RequestBuilder,
    ) -> ProviderResult<Vec<u8>> {
        let response = request
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|err| self.transport(operation, err))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport(operation, err))?;
        debug!(operation, status = status.as_u16(), bytes = body.len(), "provider response");

        if let Some(message) = error_message(status, &body) {
            return Err(ProviderError::Api {
                operation,
                status: Some(status.as_u16()),
                message,
            });
        }
        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        credential: &ApiCredential,
        request: RequestBuilder,
    ) -> ProviderResult<T> {
        let body = self.execute(operation, credential, request).await?;
        serde_json::from_slice(&body).map_err(|err| ProviderError::Decode {
            operation,
            message: err.to_string(),
        })
    }

    fn transport(&self, operation: &'static str, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout {
                operation,
                after: self.timeout,
            }
        } else {
            ProviderError::Transport {
                operation,
                source: Box::new(err),
            }
        }
    }
}

/// Message of a failed response: non-2xx statuses always fail, and a 2xx body
/// carrying an `error` field fails too.
fn error_message(status: StatusCode, body: &[u8]) -> Option<String> {
    let reported = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|payload| payload.error)
        .filter(|message| !message.trim().is_empty());

    if status.is_success() {
        return reported;
    }
    Some(reported.unwrap_or_else(|| {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
            format!("request failed with status {status}")
        } else {
            text
        }
    }))
}

#[async_trait]
impl DebridProvider for EasyDebridClient {
    async fn lookup_availability(
        &self,
        credential: &ApiCredential,
        magnets: &[String],
    ) -> ProviderResult<Vec<bool>> {
        const OPERATION: &str = "lookup_availability";
        let url = self.endpoint(OPERATION, PATH_LOOKUP)?;
        let response: LookupResponse = self
            .fetch(
                OPERATION,
                credential,
                self.http.post(url).json(&LookupRequest { urls: magnets }),
            )
            .await?;
        Ok(response.cached)
    }

    async fn generate_direct_link(
        &self,
        credential: &ApiCredential,
        magnet: &str,
    ) -> ProviderResult<Vec<ResolvedFile>> {
        const OPERATION: &str = "generate_direct_link";
        let url = self.endpoint(OPERATION, PATH_GENERATE)?;
        let response: GenerateResponse = self
            .fetch(
                OPERATION,
                credential,
                self.http.post(url).json(&UrlRequest { url: magnet }),
            )
            .await?;
        Ok(response.files.into_iter().map(ResolvedFile::from).collect())
    }

    async fn list_transfers(&self, credential: &ApiCredential) -> ProviderResult<Vec<Transfer>> {
        const OPERATION: &str = "list_transfers";
        let url = self.endpoint(OPERATION, PATH_TRANSFER_LIST)?;
        let response: TransferList = self
            .fetch(OPERATION, credential, self.http.get(url))
            .await?;
        Ok(response
            .transfers
            .into_iter()
            .filter_map(|item| match item.into_transfer() {
                Ok(transfer) => Some(transfer),
                Err(message) => {
                    warn!(operation = OPERATION, error = %message, "skipping transfer");
                    None
                }
            })
            .collect())
    }

    async fn create_transfer(
        &self,
        credential: &ApiCredential,
        magnet: &str,
    ) -> ProviderResult<()> {
        const OPERATION: &str = "create_transfer";
        let url = self.endpoint(OPERATION, PATH_TRANSFER_CREATE)?;
        self.execute(
            OPERATION,
            credential,
            self.http.post(url).json(&UrlRequest { url: magnet }),
        )
        .await?;
        Ok(())
    }

    async fn list_folder(
        &self,
        credential: &ApiCredential,
        folder_id: &str,
        path_filter: Option<&str>,
        ip: Option<IpAddr>,
    ) -> ProviderResult<Vec<FolderEntry>> {
        const OPERATION: &str = "list_folder";
        let mut url = self.endpoint(OPERATION, PATH_FOLDER_LIST)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("folder_id", folder_id);
            if let Some(path) = path_filter {
                query.append_pair("path", path);
            }
            if let Some(ip) = ip {
                query.append_pair("ip", &ip.to_string());
            }
        }
        let listing: FolderListing = self
            .fetch(OPERATION, credential, self.http.get(url))
            .await?;
        listing
            .content
            .into_iter()
            .map(|item| {
                item.into_entry()
                    .map_err(|message| ProviderError::Decode { operation: OPERATION, message })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use debrix_core::{ErrorKind, FolderEntryKind, TransferStatus, classify};
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    const TOKEN: &str = "secret-token";

    fn client(server: &MockServer) -> Result<EasyDebridClient> {
        let base: Url = format!("{}/api/v1", server.base_url()).parse()?;
        Ok(EasyDebridClient::new(base, Duration::from_secs(5))?)
    }

    fn credential() -> ApiCredential {
        ApiCredential::new(TOKEN)
    }

    #[test]
    fn base_url_gains_trailing_slash() -> Result<()> {
        let client = EasyDebridClient::new(DEFAULT_API_URL.parse()?, Duration::from_secs(1))?;
        assert_eq!(client.base_url().as_str(), "https://easydebrid.com/api/v1/");
        Ok(())
    }

    #[test]
    fn opaque_base_url_is_rejected() -> Result<()> {
        let result = EasyDebridClient::new("mailto:ops@example.com".parse()?, Duration::from_secs(1));
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn lookup_posts_magnets_with_bearer_token() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/link/lookup")
                .header("authorization", format!("Bearer {TOKEN}"))
                .json_body(json!({ "urls": ["magnet:?xt=urn:btih:aa", "magnet:?xt=urn:btih:bb"] }));
            then.status(200).json_body(json!({ "cached": [true, false] }));
        });

        let flags = client(&server)?
            .lookup_availability(
                &credential(),
                &[
                    "magnet:?xt=urn:btih:aa".to_string(),
                    "magnet:?xt=urn:btih:bb".to_string(),
                ],
            )
            .await?;

        mock.assert();
        assert_eq!(flags, vec![true, false]);
        Ok(())
    }

    #[tokio::test]
    async fn generate_maps_files() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/link/generate")
                .json_body(json!({ "url": "magnet:?xt=urn:btih:aa" }));
            then.status(200).json_body(json!({
                "files": [
                    { "filename": "Movie.mkv", "size": 1_048_576, "url": "https://cdn.example/m" }
                ]
            }));
        });

        let files = client(&server)?
            .generate_direct_link(&credential(), "magnet:?xt=urn:btih:aa")
            .await?;

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "Movie.mkv");
        assert_eq!(files[0].size, 1_048_576);
        assert_eq!(files[0].direct_link.as_str(), "https://cdn.example/m");
        Ok(())
    }

    #[tokio::test]
    async fn not_logged_in_is_classified_as_auth() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/transfer/list");
            then.status(401).json_body(json!({ "error": "Not logged in." }));
        });

        let err = client(&server)?
            .list_transfers(&credential())
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected failure"))?;

        assert!(matches!(
            err,
            ProviderError::Api {
                status: Some(401),
                ..
            }
        ));
        assert!(matches!(classify(err), ErrorKind::AuthError));
        Ok(())
    }

    #[tokio::test]
    async fn error_field_in_success_body_fails() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/link/generate");
            then.status(200)
                .json_body(json!({ "error": "Account not premium." }));
        });

        let err = client(&server)?
            .generate_direct_link(&credential(), "magnet:?xt=urn:btih:aa")
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected failure"))?;

        assert!(matches!(classify(err), ErrorKind::AccessDenied));
        Ok(())
    }

    #[tokio::test]
    async fn transfers_are_decoded() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/transfer/list");
            then.status(200).json_body(json!({
                "transfers": [
                    { "id": 3, "src": "magnet:?xt=urn:btih:AA", "status": "running", "file_id": 10, "folder_id": 11 }
                ]
            }));
        });

        let transfers = client(&server)?.list_transfers(&credential()).await?;

        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].id, "3");
        assert_eq!(transfers[0].status, TransferStatus::Running);
        assert!(transfers[0].matches("aa"));
        assert_eq!(transfers[0].folder_ref.as_deref(), Some("11"));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_status_skips_only_that_transfer() -> Result<()> {
        let hash = "0123456789abcdef0123456789abcdef01234567";
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/transfer/list");
            then.status(200).json_body(json!({
                "transfers": [
                    { "id": "1", "src": format!("magnet:?xt=urn:btih:{}", "f".repeat(40)), "status": "paused" },
                    { "id": "2", "src": format!("magnet:?xt=urn:btih:{hash}"), "status": "running" }
                ]
            }));
        });

        let transfers = client(&server)?.list_transfers(&credential()).await?;

        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].id, "2");
        assert_eq!(transfers[0].status, TransferStatus::Running);
        assert!(transfers[0].matches(hash));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_transfer_list_is_a_decode_failure() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/transfer/list");
            then.status(200).json_body(json!({ "transfers": [{ "id": "1" }] }));
        });

        let err = client(&server)?
            .list_transfers(&credential())
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected failure"))?;

        assert!(matches!(err, ProviderError::Decode { .. }));
        assert!(matches!(classify(err), ErrorKind::SoftProviderError(_)));
        Ok(())
    }

    #[tokio::test]
    async fn create_ignores_response_body() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/transfer/create")
                .json_body(json!({ "url": "magnet:?xt=urn:btih:aa&tr=udp%3A%2F%2Ft" }));
            then.status(200).body("ok");
        });

        client(&server)?
            .create_transfer(&credential(), "magnet:?xt=urn:btih:aa&tr=udp%3A%2F%2Ft")
            .await?;

        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn folder_listing_sends_filters() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/folder/list")
                .query_param("folder_id", "f1")
                .query_param("ip", "203.0.113.9");
            then.status(200).json_body(json!({
                "content": [
                    { "id": "a", "name": "Season 1", "type": "folder", "created_at": 1 },
                    { "id": "b", "name": "E01.mkv", "type": "file", "created_at": 2, "link": "https://cdn.example/b" }
                ]
            }));
        });

        let entries = client(&server)?
            .list_folder(&credential(), "f1", None, Some("203.0.113.9".parse()?))
            .await?;

        mock.assert();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, FolderEntryKind::Folder);
        assert!(entries[0].link.is_none());
        assert_eq!(entries[1].link.as_ref().map(Url::as_str), Some("https://cdn.example/b"));
        Ok(())
    }

    #[tokio::test]
    async fn server_error_without_body_reports_status() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/transfer/list");
            then.status(502);
        });

        let err = client(&server)?
            .list_transfers(&credential())
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected failure"))?;

        match err {
            ProviderError::Api { status, message, .. } => {
                assert_eq!(status, Some(502));
                assert!(message.contains("502"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }
}
