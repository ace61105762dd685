use std::path::Path;

use bytes::Bytes;
use reqwest::{multipart, Method};
use url::Url;

use crate::client::{Body, Client};
use crate::error::{Error, Result};
use crate::models::{FileId, ShareLink, UploadReceipt};

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSource {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadSource {
    /// Content type is guessed from the file name.
    pub fn new<S: Into<String>, D: Into<Bytes>>(file_name: S, data: D) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Self {
            file_name,
            content_type,
            data: data.into(),
        }
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::Validation(format!("'{}' does not name a file", path.display()))
            })?
            .to_string();
        let data = tokio::fs::read(path).await?;

        Ok(Self::new(file_name, data))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Uploads a file as the `file` field of a multipart form.
///
/// Any failure, including a confirmation that does not decode, is
/// reported as [`Error::Upload`].
pub async fn upload(client: &Client, source: UploadSource) -> Result<UploadReceipt> {
    let UploadSource {
        file_name,
        content_type,
        data,
    } = source;
    info!("uploading file: {} ({} bytes)", file_name, data.len());

    let upload = async {
        let len = data.len() as u64;
        let part = multipart::Part::stream_with_length(data, len)
            .file_name(file_name.clone())
            .mime_str(&content_type)
            .map_err(|e| {
                Error::Validation(format!("invalid content type '{}': {}", content_type, e))
            })?;
        let form = multipart::Form::new().part("file", part);

        client
            .request::<UploadReceipt>(Method::POST, &["upload"], &[], Body::Multipart(form))
            .await
    };

    let receipt = upload.await.map_err(|e| Error::Upload(Box::new(e)))?;
    info!("uploaded {}", receipt.filename.as_deref().unwrap_or(&file_name));

    Ok(receipt)
}

pub async fn upload_path<P: AsRef<Path>>(client: &Client, path: P) -> Result<UploadReceipt> {
    let source = UploadSource::from_path(path)
        .await
        .map_err(|e| Error::Upload(Box::new(e)))?;

    upload(client, source).await
}

/// Deletes a file. An unknown id is only detected by the backend.
pub async fn delete_file(client: &Client, id: &FileId) -> Result<()> {
    info!("deleting file {}", id);
    client
        .execute(Method::DELETE, &["files", id.as_str()], Body::Empty)
        .await
        .map_err(|e| Error::Delete(Box::new(e)))
}

/// Trims a new file name, rejecting names that are empty once trimmed.
pub fn validate_new_name(new_name: &str) -> Result<&str> {
    let name = new_name.trim();
    if name.is_empty() {
        return Err(Error::Validation("file name cannot be empty".into()));
    }

    Ok(name)
}

pub async fn rename_file(client: &Client, id: &FileId, new_name: &str) -> Result<()> {
    let name = validate_new_name(new_name)?;
    info!("renaming file {} to {}", id, name);

    client
        .execute(
            Method::PUT,
            &["files", id.as_str()],
            Body::Json(serde_json::json!({ "file_name": name })),
        )
        .await
}

/// Requests a fresh share link. Links are never reused, two calls for the
/// same file may return different links.
pub async fn share_file(client: &Client, id: &FileId) -> Result<ShareLink> {
    let link: ShareLink = client
        .request(Method::GET, &["share", id.as_str()], &[], Body::Empty)
        .await?;
    check_share_link(&link)?;
    debug!("share link for {} expires at {}", id, link.expires_at);

    Ok(link)
}

pub(crate) fn check_share_link(link: &ShareLink) -> Result<()> {
    match Url::parse(&link.public_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(Error::MalformedResponse(format!(
            "share link '{}' is not an http url",
            link.public_url
        ))),
    }
}
