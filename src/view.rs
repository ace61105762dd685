use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::actions::validate_new_name;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::SearchFilter;
use crate::models::{FileId, FileRecord, ShareLink, UserSummary};
use crate::query::Page;
use crate::service::FileService;

/// Message shown in place of the list when loading fails.
pub const LOAD_FAILED: &str = "Failed to load files. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Row level dialogs. Each one has its own target slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialog {
    Delete,
    Share,
    Rename,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogTargets {
    pub delete: Option<FileId>,
    pub share: Option<FileId>,
    pub rename: Option<FileId>,
}

impl DialogTargets {
    fn slot(&mut self, dialog: Dialog) -> &mut Option<FileId> {
        match dialog {
            Dialog::Delete => &mut self.delete,
            Dialog::Share => &mut self.share,
            Dialog::Rename => &mut self.rename,
        }
    }

    pub fn get(&self, dialog: Dialog) -> Option<&FileId> {
        match dialog {
            Dialog::Delete => self.delete.as_ref(),
            Dialog::Share => self.share.as_ref(),
            Dialog::Rename => self.rename.as_ref(),
        }
    }
}

/// What a list view shows.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// files of the current page, in server order
    pub files: Vec<FileRecord>,
    pub state: LoadState,
    pub error: Option<String>,
    /// active filter, never an empty one
    pub filter: Option<SearchFilter>,
    pub page: usize,
    pub page_size: usize,
    pub total_files: u64,
    pub summary: Option<UserSummary>,
    pub refresh_count: u64,
    pub targets: DialogTargets,
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn page_count(&self) -> usize {
        Page::count(self.page_size, self.total_files)
    }

    pub fn target(&self, dialog: Dialog) -> Option<&FileId> {
        self.targets.get(dialog)
    }
}

/// Result of a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// the response was applied to the view
    Applied,
    /// a newer refresh was issued meanwhile, the response was dropped
    Superseded,
    /// the view was closed, nothing was applied
    Closed,
}

struct Inner {
    view: ViewState,
    /// sequence number of the latest issued refresh
    issued: u64,
    closed: bool,
}

/// Keeps the file list of one view in sync with the backend.
///
/// The displayed collection only ever changes through [`Coordinator::refresh`].
/// Mutations never patch the list locally, a successful one re-fetches the
/// view instead. Refreshes are numbered, so when several overlap only the
/// latest one lands.
pub struct Coordinator<S: FileService> {
    service: Arc<S>,
    show_summary: bool,
    inner: Mutex<Inner>,
    counter: watch::Sender<u64>,
}

impl<S: FileService> Coordinator<S> {
    pub fn new(service: Arc<S>, page_size: usize, show_summary: bool) -> Self {
        let (counter, _) = watch::channel(0);
        let view = ViewState {
            page_size: std::cmp::max(1, page_size),
            ..ViewState::default()
        };

        Self {
            service,
            show_summary,
            inner: Mutex::new(Inner {
                view,
                issued: 0,
                closed: false,
            }),
            counter,
        }
    }

    pub fn from_config(service: Arc<S>, config: &Config) -> Self {
        Self::new(service, config.page_size, config.show_summary)
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Copy of the current view.
    pub fn snapshot(&self) -> ViewState {
        self.inner.lock().expect("failed to lock state").view.clone()
    }

    /// Follows the manual refresh counter, for components that need to
    /// reload when files were uploaded or deleted.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.counter.subscribe()
    }

    /// First load of the view.
    pub async fn mount(&self) -> Outcome {
        self.refresh().await
    }

    /// Marks the view as gone. Responses arriving later are dropped.
    pub fn close(&self) {
        self.inner.lock().expect("failed to lock state").closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().expect("failed to lock state").closed
    }

    /// Reloads the current page with the active filter, and the user summary
    /// when it is shown.
    pub async fn refresh(&self) -> Outcome {
        let (seq, filter, page) = {
            let mut inner = self.inner.lock().expect("failed to lock state");
            if inner.closed {
                return Outcome::Closed;
            }
            inner.issued += 1;
            inner.view.state = LoadState::Loading;
            inner.view.error = None;
            (
                inner.issued,
                inner.view.filter.clone(),
                Page::new(inner.view.page, inner.view.page_size),
            )
        };
        debug!("refresh #{} page {} filter {:?}", seq, page.index, filter);

        let listing = self.service.list_files(filter.as_ref(), Some(page));
        let (listing, summary) = if self.show_summary {
            let (listing, summary) = tokio::join!(listing, self.service.user_summary());
            (listing, Some(summary))
        } else {
            (listing.await, None)
        };

        let mut inner = self.inner.lock().expect("failed to lock state");
        if inner.closed {
            debug!("refresh #{} finished after the view was closed", seq);
            return Outcome::Closed;
        }
        if seq != inner.issued {
            debug!(
                "discarding refresh #{}, #{} is the latest",
                seq, inner.issued
            );
            return Outcome::Superseded;
        }

        let view = &mut inner.view;
        match summary {
            Some(Ok(summary)) => view.summary = Some(summary),
            Some(Err(err)) => {
                warn!("failed to load user summary: {}", err);
                view.summary = None;
            }
            None => {}
        }

        match listing {
            Ok(listing) => {
                view.total_files = match (&view.filter, &view.summary) {
                    (
                        None,
                        Some(UserSummary {
                            total_files: Some(total),
                            ..
                        }),
                    ) => *total,
                    _ => listing.matched as u64,
                };
                view.files = listing.files;
                view.state = LoadState::Loaded;
            }
            Err(err) => {
                error!("failed to fetch files: {}", err);
                view.files.clear();
                view.state = LoadState::Failed;
                view.error = Some(LOAD_FAILED.into());
            }
        }

        Outcome::Applied
    }

    /// Applies a new filter and goes back to the first page. An empty
    /// filter is the same as no filter.
    pub async fn set_filter(&self, filter: SearchFilter) -> Outcome {
        {
            let mut inner = self.inner.lock().expect("failed to lock state");
            inner.view.filter = if filter.is_empty() { None } else { Some(filter) };
            inner.view.page = 0;
        }

        self.refresh().await
    }

    /// Applies a filter and a page together with a single reload.
    pub async fn set_query(&self, filter: SearchFilter, page: usize) -> Outcome {
        {
            let mut inner = self.inner.lock().expect("failed to lock state");
            inner.view.filter = if filter.is_empty() { None } else { Some(filter) };
            inner.view.page = page;
        }

        self.refresh().await
    }

    pub async fn clear_filter(&self) -> Outcome {
        self.set_filter(SearchFilter::new()).await
    }

    pub async fn set_page(&self, page: usize) -> Outcome {
        self.inner.lock().expect("failed to lock state").view.page = page;
        self.refresh().await
    }

    /// Bumps the manual refresh counter and reloads.
    pub async fn trigger_refresh(&self) -> Outcome {
        let count = {
            let mut inner = self.inner.lock().expect("failed to lock state");
            inner.view.refresh_count += 1;
            inner.view.refresh_count
        };
        self.counter.send_replace(count);

        self.refresh().await
    }

    /// Called once an upload went through: the filter is dropped so the new
    /// file shows up, then the view reloads.
    pub async fn notify_uploaded(&self) -> Outcome {
        {
            let mut inner = self.inner.lock().expect("failed to lock state");
            inner.view.filter = None;
            inner.view.page = 0;
        }

        self.trigger_refresh().await
    }

    pub fn open(&self, dialog: Dialog, id: FileId) {
        *self.inner.lock().expect("failed to lock state").view.targets.slot(dialog) = Some(id);
    }

    pub fn cancel(&self, dialog: Dialog) {
        self.inner.lock().expect("failed to lock state").view.targets.slot(dialog).take();
    }

    pub fn target(&self, dialog: Dialog) -> Option<FileId> {
        self.inner.lock().expect("failed to lock state").view.targets.get(dialog).cloned()
    }

    fn require_target(&self, dialog: Dialog) -> Result<FileId> {
        self.target(dialog)
            .ok_or_else(|| Error::Validation(format!("no file selected for {:?}", dialog)))
    }

    /// Clears the slot, unless it was pointed at another file meanwhile.
    fn complete(&self, dialog: Dialog, id: &FileId) {
        let mut inner = self.inner.lock().expect("failed to lock state");
        let slot = inner.view.targets.slot(dialog);
        if slot.as_ref() == Some(id) {
            slot.take();
        }
    }

    /// Deletes the file targeted by the delete dialog. On failure the
    /// dialog stays open.
    pub async fn confirm_delete(&self) -> Result<()> {
        let id = self.require_target(Dialog::Delete)?;
        if let Err(err) = self.service.delete_file(&id).await {
            error!("failed to delete file {}: {}", id, err);
            return Err(err);
        }

        self.trigger_refresh().await;
        self.complete(Dialog::Delete, &id);

        Ok(())
    }

    /// Renames the file targeted by the rename dialog. Blank names are
    /// rejected without calling the backend.
    pub async fn confirm_rename(&self, new_name: &str) -> Result<()> {
        let id = self.require_target(Dialog::Rename)?;
        let name = validate_new_name(new_name)?;
        if let Err(err) = self.service.rename_file(&id, name).await {
            error!("failed to update file {}: {}", id, err);
            return Err(err);
        }

        self.refresh().await;
        self.complete(Dialog::Rename, &id);

        Ok(())
    }

    /// Generates a share link for the file targeted by the share dialog.
    pub async fn confirm_share(&self) -> Result<ShareLink> {
        let id = self.require_target(Dialog::Share)?;
        let link = match self.service.share_file(&id).await {
            Ok(link) => link,
            Err(err) => {
                error!("failed to share file {}: {}", id, err);
                return Err(err);
            }
        };

        self.refresh().await;
        self.complete(Dialog::Share, &id);

        Ok(link)
    }
}
