use crate::error::ApiError;
use bytes::Bytes;
use std::path::Path;
use tracing::{error, warn};

/// Last `/`-separated segment of a request path, taken verbatim.
///
/// Callers pass `Uri::path()`, so a query string is never part of the name:
/// `/static/images/1.jpeg?x=1` serves `1.jpeg`.
pub fn requested_filename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// True when `name` can only refer to a file directly inside the image directory.
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}

/// Read an image from `images_dir`.
///
/// Without `strict` the filename is joined as-is, so a segment such as `..`
/// resolves outside the directory. Every filesystem error maps to
/// `ApiError::ImageNotFound`.
pub async fn read_image(images_dir: &Path, filename: &str, strict: bool) -> Result<Bytes, ApiError> {
    if strict && !is_plain_filename(filename) {
        warn!("[images] Rejected image name {:?}", filename);
        return Err(ApiError::ImageNotFound);
    }

    let image_path = images_dir.join(filename);
    match tokio::fs::read(&image_path).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) => {
            error!("[images] Error handling image request {:?}: {}", image_path, e);
            Err(ApiError::ImageNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_last_segment() {
        assert_eq!(requested_filename("/static/images/7.jpeg"), "7.jpeg");
        assert_eq!(requested_filename("/static/images/a/b.jpeg"), "b.jpeg");
        assert_eq!(requested_filename("/static/images/"), "");
        assert_eq!(requested_filename("/static/images/%2E%2E"), "%2E%2E");
    }

    #[test]
    fn plain_filenames() {
        assert!(is_plain_filename("7.jpeg"));
        assert!(is_plain_filename(".hidden"));
        assert!(!is_plain_filename(""));
        assert!(!is_plain_filename("."));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename("..secret"));
        assert!(!is_plain_filename("a\\b"));
    }

    #[tokio::test]
    async fn strict_mode_refuses_parent_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let images = tmp.path().join("images");
        std::fs::create_dir(&images).unwrap();

        let lenient = read_image(&images, "..", false).await;
        let strict = read_image(&images, "..", true).await;

        // `..` is a directory, so both fail, but only strict mode skips the read.
        assert!(matches!(lenient, Err(ApiError::ImageNotFound)));
        assert!(matches!(strict, Err(ApiError::ImageNotFound)));
    }

    #[tokio::test]
    async fn reads_existing_image() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("1.jpeg"), b"\xff\xd8").unwrap();

        let data = read_image(tmp.path(), "1.jpeg", true).await.unwrap();

        assert_eq!(&data[..], b"\xff\xd8");
    }
}
