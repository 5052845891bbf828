pub mod client;
pub mod error;
pub mod types;

use crate::api::error::Result;
use crate::api::types::{ExtensionSelection, FileItem, Repository, RepositoryPreview};

pub use client::ApiClient;
pub use error::ApiError;

/// The repository/file data service as seen by the app.
pub trait RepositoryService: Send + Sync {
    fn get_repository(&self, id: u64) -> Result<Repository>;

    /// A single file, with `content` and `full_path`.
    fn get_file_item(&self, repository_id: u64, file_item_id: u64) -> Result<FileItem>;

    /// Persist that a file has been typed; returns the updated file list.
    fn mark_file_typed(&self, repository_id: u64, file_item_id: u64) -> Result<Vec<FileItem>>;

    fn preview_repository(&self, url: &str) -> Result<RepositoryPreview>;

    fn create_repository(
        &self,
        url: &str,
        extensions: Option<&[ExtensionSelection]>,
    ) -> Result<Repository>;
}
