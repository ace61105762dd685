//! In-memory [`FileService`] used by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use crate::actions::UploadSource;
use crate::error::{ApiError, Error, Result};
use crate::filter::SearchFilter;
use crate::models::{FileId, FileRecord, ShareLink, UploadReceipt, UserSummary};
use crate::query::{FilePage, Page};
use crate::service::FileService;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Option<SearchFilter>, Option<Page>),
    Summary,
    Upload(String),
    Delete(FileId),
    Rename(FileId, String),
    Share(FileId),
}

pub fn record(id: &str, name: &str) -> FileRecord {
    FileRecord {
        id: FileId::new(id),
        name: format!("u1/{}", name),
        url: None,
        size: 1024,
        content_type: "application/pdf".into(),
        uploaded_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        user_id: "u1".into(),
        expires_at: None,
    }
}

fn failure() -> Error {
    Error::Api(ApiError::status(
        reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        "boom",
    ))
}

#[derive(Default)]
pub struct MockService {
    pub files: Mutex<Vec<FileRecord>>,
    pub calls: Mutex<Vec<Call>>,
    pub fail_list: AtomicBool,
    pub fail_summary: AtomicBool,
    pub fail_total: AtomicBool,
    pub fail_upload: AtomicBool,
    pub fail_delete: AtomicBool,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    shares: AtomicUsize,
}

impl MockService {
    pub fn with_files(files: Vec<FileRecord>) -> Self {
        let service = Self::default();
        *service.files.lock().unwrap() = files;
        service
    }

    /// Holds the next listing call until the returned sender fires. Later
    /// calls answer right away unless gated too.
    pub fn gate_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List(..)))
            .count()
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl FileService for MockService {
    async fn list_files(
        &self,
        filter: Option<&SearchFilter>,
        page: Option<Page>,
    ) -> Result<FilePage> {
        self.record_call(Call::List(filter.cloned(), page));

        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(failure());
        }

        let matching: Vec<FileRecord> = self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| match filter.and_then(|q| q.name()) {
                Some(name) => f.name.contains(name),
                None => true,
            })
            .cloned()
            .collect();
        let matched = matching.len();
        let (files, index) = match page {
            Some(page) => (
                matching
                    .into_iter()
                    .skip(page.index * page.size)
                    .take(page.size)
                    .collect(),
                page.index,
            ),
            None => (matching, 0),
        };

        Ok(FilePage {
            files,
            page: index,
            matched,
        })
    }

    async fn user_summary(&self) -> Result<UserSummary> {
        self.record_call(Call::Summary);
        if self.fail_summary.load(Ordering::SeqCst) {
            return Err(failure());
        }

        let files = self.files.lock().unwrap();
        Ok(UserSummary {
            email: "user@example.com".into(),
            total_files: if self.fail_total.load(Ordering::SeqCst) {
                None
            } else {
                Some(files.len() as u64)
            },
            storage_used: files.iter().map(|f| f.size).sum(),
        })
    }

    async fn upload(&self, source: UploadSource) -> Result<UploadReceipt> {
        self.record_call(Call::Upload(source.file_name.clone()));
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(Error::Upload(Box::new(failure())));
        }

        let mut files = self.files.lock().unwrap();
        let id = format!("{}", files.len() + 100);
        let mut file = record(&id, &source.file_name);
        file.size = source.data.len() as u64;
        files.push(file);

        Ok(UploadReceipt {
            message: Some("File uploaded successfully".into()),
            filename: Some(format!("u1/{}", source.file_name)),
            file_size: Some(source.data.len() as u64),
            upload_url: None,
        })
    }

    async fn delete_file(&self, id: &FileId) -> Result<()> {
        self.record_call(Call::Delete(id.clone()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::Delete(Box::new(failure())));
        }

        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| &f.id != id);
        if files.len() == before {
            return Err(Error::Delete(Box::new(Error::Api(ApiError::status(
                reqwest::StatusCode::NOT_FOUND,
                "File not found",
            )))));
        }

        Ok(())
    }

    async fn rename_file(&self, id: &FileId, new_name: &str) -> Result<()> {
        self.record_call(Call::Rename(id.clone(), new_name.into()));

        let mut files = self.files.lock().unwrap();
        match files.iter_mut().find(|f| &f.id == id) {
            Some(file) => {
                file.name = format!("u1/{}", new_name);
                Ok(())
            }
            None => Err(Error::Api(ApiError::status(
                reqwest::StatusCode::NOT_FOUND,
                "File not found",
            ))),
        }
    }

    async fn share_file(&self, id: &FileId) -> Result<ShareLink> {
        self.record_call(Call::Share(id.clone()));
        let n = self.shares.fetch_add(1, Ordering::SeqCst);

        Ok(ShareLink {
            public_url: format!("https://share.example.com/{}?sig={}", id, n),
            expires_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        })
    }
}
