//! Content loaders for reading event data from files.
//!
//! All loaders deserialize directly into `event-core` types via serde and
//! run core validation before returning.

pub mod profiles;

pub use profiles::ProfileLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
