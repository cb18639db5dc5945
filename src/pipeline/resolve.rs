//! Filename resolution and the first-write-wins move.
//!
//! A collision is never resolved by inventing an alternative name: if the
//! destination already holds the resolved name, the source stays where it
//! is and the document is reported as skipped.

use crate::error::DocumentError;
use std::future::Future;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where the document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The source was moved to this path.
    Moved(PathBuf),
    /// This path already existed; nothing was moved.
    Collision(PathBuf),
}

/// Append `extension` (dot included) unless `base_name` already ends with it,
/// compared case-insensitively.
pub fn resolve_filename(base_name: &str, extension: &str) -> String {
    if base_name
        .to_lowercase()
        .ends_with(&extension.to_lowercase())
    {
        base_name.to_string()
    } else {
        format!("{base_name}{extension}")
    }
}

/// Move `source` into `destination_dir` as `filename`.
///
/// The existence check comes first, so a collision never creates the
/// destination directory. A rename that crosses filesystems falls back to
/// copy + remove.
pub async fn move_into(
    source: &Path,
    destination_dir: &Path,
    filename: &str,
) -> Result<Placement, DocumentError> {
    let target = destination_dir.join(filename);

    if matches!(tokio::fs::try_exists(&target).await, Ok(true)) {
        warn!(
            "Duplicate file '{}' already exists. Skipping '{}'.",
            filename,
            source.display()
        );
        return Ok(Placement::Collision(target));
    }

    tokio::fs::create_dir_all(destination_dir)
        .await
        .map_err(|e| DocumentError::CreateDirFailed {
            dir: destination_dir.to_path_buf(),
            detail: e.to_string(),
        })?;

    let move_failed = |e: io::Error| DocumentError::MoveFailed {
        from: source.to_path_buf(),
        to: target.clone(),
        detail: e.to_string(),
    };

    match tokio::fs::rename(source, &target).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!("Cross-device move, copying '{}'", source.display());
            copy_then_remove(source, &target, |p| async move {
                tokio::fs::remove_file(p).await
            })
            .await
            .map_err(move_failed)?;
        }
        Err(e) => return Err(move_failed(e)),
    }

    Ok(Placement::Moved(target))
}

/// Copy `source` to `target`, then remove `source` with `remove_source`.
///
/// On any error the copy at `target` is deleted again, so a failed move
/// never leaves a file under the resolved name.
async fn copy_then_remove<R, Fut>(source: &Path, target: &Path, remove_source: R) -> io::Result<()>
where
    R: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    let result = match tokio::fs::copy(source, target).await {
        Ok(_) => remove_source(source.to_path_buf()).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(target).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Could not remove partial copy '{}': {}", target.display(), e);
            }
        }
    }
    result
}
