//! Scoped on-disk storage for uploaded audio.
//!
//! A [`TransientFile`] deletes itself when dropped, so every exit path of
//! a request handler (including errors and panics) cleans up the upload.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Extensions accepted for stored uploads.
const KNOWN_AUDIO_EXTENSIONS: &[&str] = &["wav", "webm", "ogg", "mp3", "m4a", "flac"];

/// Directory holding transient uploads.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist yet.
    pub fn ensure_dir(&self) -> io::Result<()> {
        if !self.dir.exists() {
            info!("Creating upload directory: {}", self.dir.display());
        }
        std::fs::create_dir_all(&self.dir)
    }

    /// Write `bytes` to a new uniquely named file in the store.
    pub async fn persist(&self, bytes: &[u8], extension: &str) -> io::Result<TransientFile> {
        let file = tempfile::Builder::new()
            .prefix("audio-")
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.dir)?;

        tokio::fs::write(file.path(), bytes).await?;
        debug!(
            "Stored {} bytes at {}",
            bytes.len(),
            file.path().display()
        );

        Ok(TransientFile { file })
    }
}

/// An uploaded file that is removed from disk when dropped.
#[derive(Debug)]
pub struct TransientFile {
    file: NamedTempFile,
}

impl TransientFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        debug!("Removing transient file {}", self.file.path().display());
    }
}

/// Pick a safe file extension from a client-supplied file name.
///
/// Anything unknown falls back to `wav`, the format the browser records.
pub fn audio_extension(file_name: Option<&str>) -> &'static str {
    let ext = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    ext.and_then(|ext| {
        KNOWN_AUDIO_EXTENSIONS
            .iter()
            .find(|known| **known == ext)
            .copied()
    })
    .unwrap_or("wav")
}

/// MIME type for a stored audio extension.
pub fn audio_mime_type(extension: &str) -> &'static str {
    match extension {
        "webm" => "audio/webm",
        "ogg" => "audio/ogg",
        "mp3" => "audio/mp3",
        "m4a" => "audio/aac",
        "flac" => "audio/flac",
        _ => "audio/wav",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_persist_and_cleanup_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let file = store.persist(b"RIFF0000WAVE", "wav").await.unwrap();
        let path = file.path().to_path_buf();

        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("wav"));
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF0000WAVE");

        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let a = store.persist(b"a", "wav").await.unwrap();
        let b = store.persist(b"b", "wav").await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_ensure_dir_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("uploads").join("audio");
        let store = UploadStore::new(&nested);

        store.ensure_dir().unwrap();
        assert!(nested.is_dir());

        // Second call is a no-op
        store.ensure_dir().unwrap();
    }

    #[test]
    fn test_audio_extension() {
        assert_eq!(audio_extension(Some("recording.WAV")), "wav");
        assert_eq!(audio_extension(Some("clip.webm")), "webm");
        assert_eq!(audio_extension(Some("../../etc/passwd")), "wav");
        assert_eq!(audio_extension(Some("noext")), "wav");
        assert_eq!(audio_extension(None), "wav");
    }

    #[test]
    fn test_audio_mime_type() {
        assert_eq!(audio_mime_type("wav"), "audio/wav");
        assert_eq!(audio_mime_type("webm"), "audio/webm");
        assert_eq!(audio_mime_type("unknown"), "audio/wav");
    }
}
