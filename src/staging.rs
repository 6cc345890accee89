//! Staged upload files
//!
//! Each request writes its upload to a uniquely named file so the engine
//! can read it from disk, and that file must be gone again by the time the
//! response leaves, whatever happened in between.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Extension used when the upload has no usable filename.
const DEFAULT_EXTENSION: &str = "jpg";

/// A staged copy of an uploaded image, removed on drop.
///
/// [`StagedUpload::remove`] may also be called explicitly; removing twice,
/// or removing a path someone else already deleted, is a no-op.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    removed: bool,
}

impl StagedUpload {
    /// Write `bytes` to a fresh file in the OS temp directory, keeping the
    /// upload's extension so the engine can sniff the format from the name.
    pub fn write(bytes: &[u8], original_name: Option<&str>) -> io::Result<Self> {
        Self::write_in(&env::temp_dir(), bytes, original_name)
    }

    /// Stage into a specific directory.
    pub fn write_in(dir: &Path, bytes: &[u8], original_name: Option<&str>) -> io::Result<Self> {
        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_EXTENSION);

        let path = dir.join(format!("ocr_upload_{}.{}", Uuid::new_v4(), extension));

        if let Err(err) = fs::write(&path, bytes) {
            // Partial writes must not leak files.
            let _ = fs::remove_file(&path);
            return Err(err);
        }

        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file. Idempotent.
    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;

        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    "Failed to remove staged upload {}: {}",
                    self.path.display(),
                    err
                );
            }
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn preserves_the_upload_extension() {
        let dir = TempDir::new().unwrap();

        let staged = StagedUpload::write_in(dir.path(), b"png bytes", Some("scan.PNG")).unwrap();
        assert_eq!(staged.path().extension().unwrap(), "PNG");
        assert_eq!(fs::read(staged.path()).unwrap(), b"png bytes");
    }

    #[test]
    fn defaults_to_jpg_without_an_extension() {
        let dir = TempDir::new().unwrap();

        let staged = StagedUpload::write_in(dir.path(), b"", Some("bare-name")).unwrap();
        assert_eq!(staged.path().extension().unwrap(), "jpg");

        let staged = StagedUpload::write_in(dir.path(), b"", None).unwrap();
        assert_eq!(staged.path().extension().unwrap(), "jpg");
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();

        let mut staged = StagedUpload::write_in(dir.path(), b"bytes", Some("a.jpg")).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        staged.remove();
        assert!(!path.exists());

        // Second remove (and the eventual drop) are no-ops.
        staged.remove();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_the_file() {
        let dir = TempDir::new().unwrap();

        let path = {
            let staged = StagedUpload::write_in(dir.path(), b"bytes", Some("a.jpg")).unwrap();
            staged.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[test]
    fn staged_names_are_unique_per_request() {
        let dir = TempDir::new().unwrap();

        let a = StagedUpload::write_in(dir.path(), b"a", Some("same.jpg")).unwrap();
        let b = StagedUpload::write_in(dir.path(), b"b", Some("same.jpg")).unwrap();

        assert_ne!(a.path(), b.path());
    }
}
