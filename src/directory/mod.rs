//! Directory people lookup.
//!
//! [`DirectoryLookup`] is the sole seam between the typeahead search and the
//! remote directory; the search widget and its tests never see HTTP.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::RemoteError;
pub use client::GraphDirectoryClient;
pub use types::DirectoryRecord;

/// Free-text people search against the organization directory.
///
/// Matches display name or mail address, restricted to active member-type
/// accounts, capped at `limit`. Result order is the service's; callers must
/// not re-sort.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    async fn search_people(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<DirectoryRecord>, RemoteError>;
}
