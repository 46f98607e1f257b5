use crate::{
    catalog::Catalog,
    cleanup::PARTIAL_SUFFIX,
    error::LoadError,
    models::{BackupLine, MovieRecord},
};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use futures::stream::{self, StreamExt};
use std::{
    path::{Path, PathBuf},
    pin::pin,
    time::Instant,
};
use tokio::{
    fs::{self, File},
    io::{AsyncBufReadExt, BufReader},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const IMAGE_EXTENSION: &str = "jpeg";

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Standard alphabet, padding optional.
const IMAGE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub lines: usize,
    pub loaded: usize,
    pub malformed: usize,
    pub image_failures: usize,
}

/// Where the image for a movie id lives.
pub fn image_path(images_dir: &Path, id: &str) -> PathBuf {
    images_dir.join(format!("{}.{}", id, IMAGE_EXTENSION))
}

/// Read the backup file, write each movie's image and build the catalog.
///
/// Bad lines are logged and skipped. Only failing to open or read the file
/// aborts the load. Up to `concurrency` images are written at once, but
/// records keep file order and a record that carries an image is only kept
/// once that image has been fully written and renamed into place.
pub async fn load_catalog(
    backup_path: &Path,
    images_dir: &Path,
    concurrency: usize,
) -> Result<(Catalog, LoadReport), LoadError> {
    let start_time = Instant::now();
    let file = File::open(backup_path).await.map_err(|source| LoadError::Open {
        path: backup_path.to_path_buf(),
        source,
    })?;

    info!(
        "[loader] Loading {:?} into {:?} ({} concurrent writes)",
        backup_path, images_dir, concurrency
    );

    let lines = stream::unfold(
        (BufReader::new(file), 0usize, false),
        |(mut reader, line_no, failed)| async move {
            if failed {
                return None;
            }
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => None,
                Ok(_) => Some((Ok((line_no + 1, buf)), (reader, line_no + 1, false))),
                Err(e) => Some((Err(e), (reader, line_no, true))),
            }
        },
    );

    let mut outcomes = pin!(lines
        .map(|line| async move {
            let (line_no, bytes) = line?;
            Ok::<_, std::io::Error>((line_no, ingest_line(&bytes, images_dir).await))
        })
        .buffered(concurrency.max(1)));

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    while let Some(outcome) = outcomes.next().await {
        let (line_no, result) = outcome.map_err(LoadError::Read)?;
        report.lines += 1;
        match result {
            Ok(record) => {
                debug!("[loader] Line {}: loaded {}", line_no, record.id);
                records.push(record);
            }
            Err(e @ LoadError::Parse(_)) => {
                report.malformed += 1;
                error!("[loader] Error processing film line {}: {}", line_no, e);
            }
            Err(e) => {
                report.image_failures += 1;
                error!("[loader] Error processing film line {}: {}", line_no, e);
            }
        }
    }

    report.loaded = records.len();
    info!(
        "[loader] ✅ Loaded {} films from {} lines in {:.2}s ({} malformed, {} image failures)",
        report.loaded,
        report.lines,
        start_time.elapsed().as_secs_f64(),
        report.malformed,
        report.image_failures
    );

    Ok((Catalog::new(records), report))
}

/// Parse one backup line and persist its image, if it carries one.
async fn ingest_line(bytes: &[u8], images_dir: &Path) -> Result<MovieRecord, LoadError> {
    let line: BackupLine = serde_json::from_slice(trim_line(bytes))?;
    let (record, img) = line.into_parts();

    let Some(img) = img else {
        warn!("[loader] Film {} has no image payload", record.id);
        return Ok(record);
    };

    let image = decode_image(&img).map_err(|source| LoadError::Decode {
        id: record.id.clone(),
        source,
    })?;
    write_image(&image_path(images_dir, &record.id), &image).await?;

    Ok(record)
}

/// Strip surrounding ASCII whitespace and a UTF-8 byte order mark.
fn trim_line(bytes: &[u8]) -> &[u8] {
    let trimmed = bytes.trim_ascii();
    match trimmed.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.trim_ascii(),
        None => trimmed,
    }
}

fn decode_image(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        IMAGE_ENGINE.decode(compact)
    } else {
        IMAGE_ENGINE.decode(encoded)
    }
}

/// Write to a sibling partial file, then rename over the final name.
async fn write_image(path: &Path, data: &[u8]) -> Result<(), LoadError> {
    let write_error = |source| LoadError::WriteImage {
        path: path.to_path_buf(),
        source,
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = path.with_file_name(format!(
        ".{}.{}{}",
        file_name,
        Uuid::new_v4().simple(),
        PARTIAL_SUFFIX
    ));

    if let Err(e) = fs::write(&partial, data).await {
        discard_partial(&partial).await;
        return Err(write_error(e));
    }
    if let Err(e) = fs::rename(&partial, path).await {
        discard_partial(&partial).await;
        return Err(write_error(e));
    }

    Ok(())
}

async fn discard_partial(partial: &Path) {
    match fs::remove_file(partial).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("[loader] Failed to remove partial image {:?}: {}", partial, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_unpadded_and_wrapped_base64() {
        assert_eq!(decode_image("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_image("aGVsbG8").unwrap(), b"hello");
        assert_eq!(decode_image("aGVs\nbG8=").unwrap(), b"hello");
        assert!(decode_image("not base64!").is_err());
    }

    #[test]
    fn trim_line_drops_bom_and_whitespace() {
        assert_eq!(trim_line(b"\xef\xbb\xbf{\"id\":1}\r\n"), b"{\"id\":1}");
        assert_eq!(trim_line(b"  \xef\xbb\xbf {}"), b"{}");
        assert_eq!(trim_line(b"{}"), b"{}");
        assert_eq!(trim_line(b""), b"");
    }

    #[test]
    fn image_path_uses_jpeg_extension() {
        assert_eq!(
            image_path(Path::new("/srv/images"), "tt0133093"),
            PathBuf::from("/srv/images/tt0133093.jpeg")
        );
    }

    #[tokio::test]
    async fn write_image_leaves_no_partial_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = image_path(tmp.path(), "42");

        write_image(&path, b"\xff\xd8\xff").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"\xff\xd8\xff");
        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails_cleanly() {
        let tmp = tempfile::tempdir().unwrap();
        let path = image_path(&tmp.path().join("missing"), "42");

        let err = write_image(&path, b"data").await.unwrap_err();

        assert!(matches!(err, LoadError::WriteImage { .. }));
    }
}
