use crate::error::LoadError;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// Suffix of in-progress image writes. Never served as a finished image.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Get the image directory ready for a load pass.
///
/// With `reset` the directory is removed first. It is then created (with
/// parents) and swept of partial files left behind by an interrupted load.
pub async fn prepare_images_dir(dir: &Path, reset: bool) -> Result<(), LoadError> {
    let dir_error = |source| LoadError::ImageDir {
        path: dir.to_path_buf(),
        source,
    };

    if reset && fs::try_exists(dir).await.map_err(dir_error)? {
        fs::remove_dir_all(dir).await.map_err(dir_error)?;
        info!("[cleanup] Removed image directory {:?}", dir);
    }

    fs::create_dir_all(dir).await.map_err(dir_error)?;

    let swept = remove_partial_files(dir).await.map_err(dir_error)?;
    if swept > 0 {
        info!("[cleanup] Removed {} partial image files from {:?}", swept, dir);
    }

    Ok(())
}

/// Delete every `*.part` file directly inside `dir`.
async fn remove_partial_files(dir: &Path) -> std::io::Result<usize> {
    let mut removed = 0;
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_partial = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(PARTIAL_SUFFIX));
        if !is_partial {
            continue;
        }

        match fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!("[cleanup] Failed to delete partial file {:?}: {}", path, e);
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("b").join("images");

        prepare_images_dir(&dir, false).await.unwrap();

        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn sweeps_partial_files_only() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        std::fs::write(dir.join("1.jpeg"), b"done").unwrap();
        std::fs::write(dir.join(".2.jpeg.abc.part"), b"half").unwrap();

        prepare_images_dir(&dir, false).await.unwrap();

        assert!(dir.join("1.jpeg").exists());
        assert!(!dir.join(".2.jpeg.abc.part").exists());
    }

    #[tokio::test]
    async fn reset_clears_existing_images() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("images");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("old.jpeg"), b"stale").unwrap();

        prepare_images_dir(&dir, true).await.unwrap();

        assert!(dir.is_dir());
        assert!(!dir.join("old.jpeg").exists());
    }

    #[tokio::test]
    async fn file_in_place_of_directory_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("images");
        std::fs::write(&dir, b"not a directory").unwrap();

        let err = prepare_images_dir(&dir, false).await.unwrap_err();

        assert!(matches!(err, LoadError::ImageDir { .. }));
    }
}
