use crate::actions::{self, UploadSource};
use crate::client::Client;
use crate::error::Result;
use crate::filter::SearchFilter;
use crate::models::{FileId, ShareLink, UploadReceipt, UserSummary};
use crate::query::{self, FilePage, Page};

/// Queries and mutations the dashboard runs against a storage backend.
#[async_trait::async_trait]
pub trait FileService: Send + Sync + 'static {
    async fn list_files(&self, filter: Option<&SearchFilter>, page: Option<Page>)
        -> Result<FilePage>;
    async fn user_summary(&self) -> Result<UserSummary>;
    async fn upload(&self, source: UploadSource) -> Result<UploadReceipt>;
    async fn delete_file(&self, id: &FileId) -> Result<()>;
    async fn rename_file(&self, id: &FileId, new_name: &str) -> Result<()>;
    async fn share_file(&self, id: &FileId) -> Result<ShareLink>;
}

#[async_trait::async_trait]
impl FileService for Client {
    async fn list_files(
        &self,
        filter: Option<&SearchFilter>,
        page: Option<Page>,
    ) -> Result<FilePage> {
        query::list_files(self, filter, page).await
    }

    async fn user_summary(&self) -> Result<UserSummary> {
        query::user_summary(self).await
    }

    async fn upload(&self, source: UploadSource) -> Result<UploadReceipt> {
        actions::upload(self, source).await
    }

    async fn delete_file(&self, id: &FileId) -> Result<()> {
        actions::delete_file(self, id).await
    }

    async fn rename_file(&self, id: &FileId, new_name: &str) -> Result<()> {
        actions::rename_file(self, id, new_name).await
    }

    async fn share_file(&self, id: &FileId) -> Result<ShareLink> {
        actions::share_file(self, id).await
    }
}
