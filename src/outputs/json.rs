//! JSON artifact writer.
//!
//! The artifact is consumed by a static dashboard that may read it at any
//! moment, so it is written to a sibling temp file first and renamed into
//! place. Readers see either the previous artifact or the new one.

use crate::models::AggregateOutput;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize `output` as pretty JSON and replace the file at `path`.
///
/// Missing parent directories are created.
///
/// # Arguments
///
/// * `output` - The finished artifact
/// * `path` - Destination file; `<path>.tmp` is used as the staging file
///
/// # Errors
///
/// Returns an error if serialization fails, the directory cannot be created,
/// or the staging file cannot be written or renamed into place.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_aggregate(
    output: &AggregateOutput,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(output)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, json.as_bytes()).await?;
    fs::rename(&tmp, path).await?;
    info!(bytes = json.len(), "Wrote aggregate artifact");

    Ok(())
}
