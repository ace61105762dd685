#[macro_use]
extern crate log;

pub mod actions;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod query;
pub mod service;
pub mod session;
pub mod upload;
pub mod view;

#[cfg(test)]
mod mock;

pub use client::Client;
pub use config::Config;
pub use error::{ApiError, Error, Result};
pub use filter::{ContentCategory, SearchFilter};
pub use models::{FileId, FileRecord, ShareLink, UserSummary};
pub use service::FileService;
pub use session::Session;
pub use upload::UploadPanel;
pub use view::{Coordinator, Dialog, LoadState, ViewState};
