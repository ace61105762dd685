use std::future::Future;
use std::sync::Arc;

use crate::actions::UploadSource;
use crate::error::{Error, Result};
use crate::models::UploadReceipt;
use crate::service::FileService;

pub const UPLOAD_SUCCEEDED: &str = "File uploaded successfully!";
pub const UPLOAD_FAILED: &str = "File upload failed. Please try again.";

/// State of the upload widget: the picked file and the last status line.
pub struct UploadPanel<S: FileService> {
    service: Arc<S>,
    selected: Option<UploadSource>,
    status: Option<String>,
}

impl<S: FileService> UploadPanel<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            selected: None,
            status: None,
        }
    }

    /// Picks a file, forgetting the previous status.
    pub fn select(&mut self, source: UploadSource) {
        self.selected = Some(source);
        self.status = None;
    }

    pub fn selected(&self) -> Option<&UploadSource> {
        self.selected.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn can_upload(&self) -> bool {
        self.selected.is_some()
    }

    /// Uploads the selected file. `on_success` only runs when the backend
    /// accepted the file, after which the selection is cleared. A failed
    /// upload keeps the selection so it can be retried.
    pub async fn upload<F, Fut>(&mut self, on_success: F) -> Result<UploadReceipt>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let source = self
            .selected
            .clone()
            .ok_or_else(|| Error::Validation("no file selected".into()))?;
        self.status = None;

        match self.service.upload(source).await {
            Ok(receipt) => {
                self.status = Some(UPLOAD_SUCCEEDED.into());
                on_success().await;
                self.selected = None;
                Ok(receipt)
            }
            Err(err) => {
                error!("upload failed: {}", err);
                self.status = Some(UPLOAD_FAILED.into());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::{record, Call, MockService};
    use crate::view::Coordinator;
    use crate::SearchFilter;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn failed_upload_keeps_selection() {
        let service = Arc::new(MockService::default());
        service.fail_upload.store(true, Ordering::SeqCst);
        let mut panel = UploadPanel::new(service.clone());
        panel.select(UploadSource::new("report.pdf", vec![1u8, 2, 3]));

        let called = AtomicBool::new(false);
        let result = panel
            .upload(|| async {
                called.store(true, Ordering::SeqCst);
            })
            .await;

        assert!(matches!(result, Err(Error::Upload(_))));
        assert!(panel.status().unwrap().contains("failed"));
        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(panel.selected().map(|s| s.file_name.as_str()), Some("report.pdf"));
        assert!(panel.can_upload());
    }

    #[tokio::test]
    async fn nothing_selected() {
        let service = Arc::new(MockService::default());
        let mut panel = UploadPanel::new(service.clone());

        assert!(matches!(
            panel.upload(|| async {}).await,
            Err(Error::Validation(_))
        ));
        assert!(service.calls().is_empty());
        assert!(panel.status().is_none());
    }

    #[tokio::test]
    async fn upload_refreshes_view() {
        let service = Arc::new(MockService::with_files(vec![record("1", "a.pdf")]));
        let coord = Coordinator::new(service.clone(), 10, false);
        coord
            .set_filter(SearchFilter::new().file_name("a.pdf"))
            .await;

        let mut panel = UploadPanel::new(service.clone());
        panel.select(UploadSource::new("notes.txt", &b"hello"[..]));
        let receipt = panel
            .upload(|| async {
                coord.notify_uploaded().await;
            })
            .await
            .unwrap();

        assert_eq!(receipt.filename.as_deref(), Some("u1/notes.txt"));
        assert_eq!(panel.status(), Some(UPLOAD_SUCCEEDED));
        assert!(panel.selected().is_none());

        let view = coord.snapshot();
        assert!(view.filter.is_none());
        assert_eq!(view.refresh_count, 1);
        assert_eq!(view.files.len(), 2);
        assert_eq!(
            service.calls().last(),
            Some(&Call::List(None, Some(crate::query::Page::new(0, 10))))
        );

        // picking a new file resets the status line
        panel.select(UploadSource::new("b.txt", &b"x"[..]));
        assert!(panel.status().is_none());
    }
}
