use reqwest::Method;

use crate::client::{Body, Client};
use crate::error::Result;
use crate::filter::SearchFilter;
use crate::models::{
    EmailResponse, FileRecord, FilesResponse, StorageUsedResponse, TotalFilesResponse,
    UserSummary,
};

/// A page of the listing, zero based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub size: usize,
}

impl Page {
    pub fn new(index: usize, size: usize) -> Self {
        Self { index, size }
    }

    /// Number of pages needed to show `total` files, at least one.
    pub fn count(size: usize, total: u64) -> usize {
        if size == 0 {
            return 1;
        }
        let pages = total.div_ceil(size as u64);
        usize::try_from(pages).unwrap_or(usize::MAX).max(1)
    }
}

/// Files of one listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilePage {
    /// records of the requested page, in server order
    pub files: Vec<FileRecord>,
    /// requested page index
    pub page: usize,
    /// number of records the server matched, over all pages
    pub matched: usize,
}

/// Lists the files of the authenticated user.
///
/// Without a filter (or with an empty one) the plain listing endpoint is
/// used, otherwise the search endpoint with only the fields that are set.
/// The backend does not page, the requested page is cut out of the full
/// answer.
pub async fn list_files(
    client: &Client,
    filter: Option<&SearchFilter>,
    page: Option<Page>,
) -> Result<FilePage> {
    let response: FilesResponse = match filter.filter(|f| !f.is_empty()) {
        None => {
            client
                .request(Method::GET, &["files"], &[], Body::Empty)
                .await?
        }
        Some(filter) => {
            debug!("searching files with {:?}", filter);
            client
                .request(Method::GET, &["search"], &filter.query_pairs(), Body::Empty)
                .await?
        }
    };

    let matched = response.files.len();
    debug!("listing matched {} files", matched);

    Ok(match page {
        None => FilePage {
            files: response.files,
            page: 0,
            matched,
        },
        Some(page) => FilePage {
            files: response
                .files
                .into_iter()
                .skip(page.index.saturating_mul(page.size))
                .take(page.size)
                .collect(),
            page: page.index,
            matched,
        },
    })
}

/// Fetches the email, file count and storage usage of the user.
///
/// The three values come from separate endpoints. The email is required.
/// A failing file count is left unknown, a failing storage counter is
/// reported as zero.
pub async fn user_summary(client: &Client) -> Result<UserSummary> {
    let (email, total, storage) = tokio::join!(
        client.request::<EmailResponse>(Method::GET, &["user", "email"], &[], Body::Empty),
        client.request::<TotalFilesResponse>(
            Method::GET,
            &["user", "total-files"],
            &[],
            Body::Empty
        ),
        client.request::<StorageUsedResponse>(
            Method::GET,
            &["user", "storage-used"],
            &[],
            Body::Empty
        ),
    );

    let email = email?.email;
    let total_files = match total {
        Ok(total) => Some(total.total_files),
        Err(err) => {
            warn!("failed to fetch total files: {}", err);
            None
        }
    };
    let storage_used = match storage {
        Ok(storage) => storage.storage_used,
        Err(err) => {
            warn!("failed to fetch storage used, defaulting to 0: {}", err);
            0
        }
    };

    Ok(UserSummary {
        email,
        total_files,
        storage_used,
    })
}
