//! Environment/runtime helpers
//!
//! Sanity checks to ensure the storage location exists at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the parent directory of a snapshot file exists.
///
/// A missing directory is created; a path without a parent is accepted as-is.
pub async fn ensure_data_dir(data_file: &Path) -> anyhow::Result<()> {
    let Some(parent) = data_file.parent().filter(|p| !p.as_os_str().is_empty()) else {
        warn!(path = %data_file.display(), "data file has no parent directory; using working directory");
        return Ok(());
    };
    if tokio::fs::metadata(parent).await.is_err() {
        info!(dir = %parent.display(), "creating data directory");
    }
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    Ok(())
}
