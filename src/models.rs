use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server assigned file identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Metadata of one stored object, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "ID")]
    pub id: FileId,
    /// full storage name, usually `<user folder>/<file name>`
    #[serde(rename = "FileName")]
    pub name: String,
    #[serde(rename = "FileURL", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "FileSize")]
    pub size: u64,
    #[serde(rename = "ContentType")]
    pub content_type: String,
    #[serde(rename = "UploadedAt")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "UserID")]
    pub user_id: String,
    /// set once a share link was generated for the file
    #[serde(rename = "ExpiresAt", default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Last path segment of the storage name.
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }

    /// Size in MiB with two decimals, e.g. `2.00 MB`.
    pub fn display_size(&self) -> String {
        display_size(self.size)
    }
}

pub fn display_name(name: &str) -> &str {
    match name.rsplit_once('/') {
        Some((_, last)) => last,
        None => name,
    }
}

pub fn display_size(size: u64) -> String {
    format!("{:.2} MB", size as f64 / 1024.0 / 1024.0)
}

/// Body of a listing or search response.
#[derive(Debug, Deserialize)]
pub(crate) struct FilesResponse {
    pub files: Vec<FileRecord>,
}

/// Public link generated for a file. Every share request produces a new
/// one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareLink {
    pub public_url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub email: String,
    /// `None` when the server could not count the files
    pub total_files: Option<u64>,
    pub storage_used: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailResponse {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TotalFilesResponse {
    pub total_files: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StorageUsedResponse {
    pub storage_used: u64,
}

/// Confirmation returned by the upload endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub upload_url: Option<String>,
}

/// Acknowledgement of a delete or rename. Only the message is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    const LISTING: &str = r#"{"files":[{"ID":"1","FileName":"a/b/report.pdf","FileSize":2097152,"ContentType":"application/pdf","UploadedAt":"2024-01-01T00:00:00Z","UserID":"u1","ExpiresAt":null}]}"#;

    #[test]
    fn listing_record() {
        let response: FilesResponse = serde_json::from_str(LISTING).unwrap();
        assert_eq!(response.files.len(), 1);

        let file = &response.files[0];
        assert_eq!(file.id.as_str(), "1");
        assert_eq!(file.display_name(), "report.pdf");
        assert_eq!(file.display_size(), "2.00 MB");
        assert_eq!(file.user_id, "u1");
        assert!(file.expires_at.is_none());
        assert!(file.url.is_none());
        assert_eq!(file.uploaded_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn names() {
        assert_eq!(display_name("plain.txt"), "plain.txt");
        assert_eq!(display_name("user/dir/"), "");
        assert_eq!(display_name("user/notes.md"), "notes.md");
    }

    #[test]
    fn sizes() {
        assert_eq!(display_size(0), "0.00 MB");
        assert_eq!(display_size(1024 * 1024), "1.00 MB");
        assert_eq!(display_size(1536 * 1024), "1.50 MB");
    }

    #[test]
    fn go_timestamps() {
        // the backend emits fractional seconds and zone offsets
        let body = r#"{"ID":"7","FileName":"u/x.png","FileURL":"http://s3/u/x.png","FileSize":1,"ContentType":"image/png","UploadedAt":"2024-08-31T13:45:01.123456+05:30","UserID":"u","ExpiresAt":"2024-09-01T13:45:01Z"}"#;
        let file: FileRecord = serde_json::from_str(body).unwrap();
        assert_eq!(file.url.as_deref(), Some("http://s3/u/x.png"));
        assert!(file.expires_at.is_some());
        assert_eq!(file.uploaded_at.format("%H:%M").to_string(), "08:15");
    }
}
