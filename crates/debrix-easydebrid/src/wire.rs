//! JSON payloads of the EasyDebrid v1 API.

use debrix_core::{FolderEntry, FolderEntryKind, ResolvedFile, Transfer, TransferStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

#[derive(Debug, Serialize)]
pub(crate) struct LookupRequest<'a> {
    pub(crate) urls: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupResponse {
    #[serde(default)]
    pub(crate) cached: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UrlRequest<'a> {
    pub(crate) url: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub(crate) files: Vec<GeneratedFile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedFile {
    #[serde(alias = "filename")]
    pub(crate) path: String,
    #[serde(default)]
    pub(crate) size: u64,
    pub(crate) url: Url,
}

impl From<GeneratedFile> for ResolvedFile {
    fn from(file: GeneratedFile) -> Self {
        Self {
            path: file.path,
            size: file.size,
            direct_link: file.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransferList {
    #[serde(default)]
    pub(crate) transfers: Vec<TransferItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransferItem {
    pub(crate) id: Value,
    #[serde(default)]
    pub(crate) src: String,
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) file_id: Value,
    #[serde(default)]
    pub(crate) folder_id: Value,
}

impl TransferItem {
    /// Convert into the core model; unknown statuses are rejected with their raw value.
    pub(crate) fn into_transfer(self) -> Result<Transfer, String> {
        let status: TransferStatus = self
            .status
            .parse()
            .map_err(|_| format!("unknown transfer status '{}'", self.status))?;
        Ok(Transfer {
            id: identifier(&self.id).unwrap_or_default(),
            source_uri: self.src,
            status,
            file_ref: identifier(&self.file_id),
            folder_ref: identifier(&self.folder_id),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderListing {
    #[serde(default)]
    pub(crate) content: Vec<FolderItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderItem {
    pub(crate) id: Value,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) kind: String,
    #[serde(default)]
    pub(crate) created_at: i64,
    #[serde(default)]
    pub(crate) link: Option<String>,
    #[serde(default)]
    pub(crate) stream_link: Option<String>,
}

impl FolderItem {
    pub(crate) fn into_entry(self) -> Result<FolderEntry, String> {
        let kind = match self.kind.as_str() {
            "file" => FolderEntryKind::File,
            "folder" => FolderEntryKind::Folder,
            other => return Err(format!("unknown folder entry type '{other}'")),
        };
        let link = self
            .link
            .filter(|raw| !raw.is_empty())
            .or(self.stream_link.filter(|raw| !raw.is_empty()))
            .map(|raw| {
                raw.parse::<Url>()
                    .map_err(|err| format!("invalid link for '{}': {err}", self.name))
            })
            .transpose()?;
        Ok(FolderEntry {
            id: identifier(&self.id).unwrap_or_default(),
            name: self.name,
            kind,
            created_at: self.created_at,
            link,
        })
    }
}

/// Error payload; the API has used both keys.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(alias = "message")]
    pub(crate) error: Option<String>,
}

/// Identifiers arrive as strings or numbers.
fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_identifiers_are_stringified() -> Result<(), Box<dyn std::error::Error>> {
        let item: TransferItem = serde_json::from_value(json!({
            "id": 42,
            "src": "magnet:?xt=urn:btih:abc",
            "status": "Seeding",
            "file_id": 7,
            "folder_id": "dir-9"
        }))?;
        let transfer = item.into_transfer()?;
        assert_eq!(transfer.id, "42");
        assert_eq!(transfer.status, TransferStatus::Seeding);
        assert_eq!(transfer.file_ref.as_deref(), Some("7"));
        assert_eq!(transfer.folder_ref.as_deref(), Some("dir-9"));
        Ok(())
    }

    #[test]
    fn unknown_status_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let item: TransferItem = serde_json::from_value(json!({
            "id": "1",
            "src": "",
            "status": "paused"
        }))?;
        let err = item.into_transfer().err().unwrap_or_default();
        assert!(err.contains("paused"), "{err}");
        Ok(())
    }

    #[test]
    fn empty_link_falls_back_to_stream_link() -> Result<(), Box<dyn std::error::Error>> {
        let item: FolderItem = serde_json::from_value(json!({
            "id": "f1",
            "name": "Episode 1.mkv",
            "type": "file",
            "created_at": 1_700_000_000,
            "link": "",
            "stream_link": "https://stream.example/f1"
        }))?;
        let entry = item.into_entry()?;
        assert_eq!(entry.kind, FolderEntryKind::File);
        assert_eq!(
            entry.link.as_ref().map(Url::as_str),
            Some("https://stream.example/f1")
        );
        Ok(())
    }
}
