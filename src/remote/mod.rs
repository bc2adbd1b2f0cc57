pub mod lanraragi;

use serde::Deserialize;

use crate::error::RemoteError;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Metadata the server currently holds for one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArchiveMetadata {
    pub filename: String,
    pub tags: String,
    pub title: String,
    pub summary: String,
}

/// The calls a sync run makes against the archive server.
pub trait ArchiveService {
    /// Confirms the configured credentials are accepted.
    fn check_session(&self) -> RemoteResult<()>;

    fn list_untagged_archive_ids(&self) -> RemoteResult<Vec<String>>;

    fn get_metadata(&self, arcid: &str) -> RemoteResult<ArchiveMetadata>;

    /// Replaces title, tags and summary in one write. Resending the same
    /// values leaves the archive unchanged.
    fn update_metadata(&self, arcid: &str, title: &str, tags: &str, summary: &str) -> RemoteResult<()>;
}
