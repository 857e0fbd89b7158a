// src/infrastructure/media_store.rs
//
// Managed media storage.
//
// Ingestion copies source files into `images/` and `videos/` under a fixed
// root and records store-relative paths. Copy failures are logged and
// reported as absence; the caller keeps going without the asset.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::db::default_data_dir;
use crate::error::AppResult;

const IMAGES_SUBDIR: &str = "images";
const VIDEOS_SUBDIR: &str = "videos";

/// Timestamp suffix for generated file names (UTC, millisecond precision).
const STAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Media store under the default data directory.
    pub fn at_default_root() -> AppResult<Self> {
        Ok(Self::new(default_data_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_SUBDIR)
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join(VIDEOS_SUBDIR)
    }

    /// Create the managed directories if they are missing.
    pub fn ensure_directories(&self) -> AppResult<()> {
        std::fs::create_dir_all(self.images_dir())?;
        std::fs::create_dir_all(self.videos_dir())?;
        Ok(())
    }

    /// Copy a thumbnail source into managed storage.
    pub fn store_image(&self, source: &str) -> Option<String> {
        self.store_file(source, IMAGES_SUBDIR, "thumb")
    }

    /// Copy a video source into managed storage.
    pub fn store_video(&self, source: &str) -> Option<String> {
        self.store_file(source, VIDEOS_SUBDIR, "video")
    }

    /// Copy `source` (a local path or file:// URL) into `subdir` under a
    /// generated collision-free name, returning the store-relative path.
    ///
    /// Any failure (blank source, missing file, non-regular file, copy
    /// error) yields `None`.
    fn store_file(&self, source: &str, subdir: &str, prefix: &str) -> Option<String> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return None;
        }

        let local = trimmed.strip_prefix("file://").unwrap_or(trimmed);
        let source_path = Path::new(local);
        if !source_path.is_file() {
            log::warn!("media source is not a regular file: {}", local);
            return None;
        }

        let target_dir = self.root.join(subdir);
        if let Err(e) = std::fs::create_dir_all(&target_dir) {
            log::warn!("cannot create media directory {:?}: {}", target_dir, e);
            return None;
        }

        let ext = source_path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("dat");
        let base = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(prefix);

        let stamp = Utc::now().format(STAMP_FORMAT);
        let file_name = format!("{}_{}.{}", base, stamp, ext);
        let destination = target_dir.join(&file_name);

        if let Err(e) = std::fs::copy(source_path, &destination) {
            log::warn!("media copy to {:?} failed: {}", destination, e);
            return None;
        }

        Some(format!("{}/{}", subdir, file_name))
    }

    /// Resolve a store-relative path against the media root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        if Path::new(relative).is_absolute() {
            PathBuf::from(relative)
        } else {
            self.root.join(relative)
        }
    }

    /// Store-relative path to file-URL form for the presentation layer.
    /// Empty in, empty out.
    pub fn file_url(&self, relative: &str) -> String {
        if relative.is_empty() {
            return String::new();
        }
        format!("file://{}", self.resolve(relative).display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_with_source(content: &[u8], name: &str) -> (MediaStore, tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join(name);
        fs::write(&source, content).unwrap();
        let store = MediaStore::new(dir.path().join("managed"));
        (store, dir, source)
    }

    #[test]
    fn test_store_image_copies_under_generated_name() {
        let (store, _dir, source) = store_with_source(b"jpegdata", "poster.jpg");

        let relative = store
            .store_image(source.to_str().unwrap())
            .expect("copy should succeed");

        assert!(relative.starts_with("images/poster_"));
        assert!(relative.ends_with(".jpg"));
        assert_eq!(fs::read(store.resolve(&relative)).unwrap(), b"jpegdata");
    }

    #[test]
    fn test_store_accepts_file_url_source() {
        let (store, _dir, source) = store_with_source(b"mp4data", "clip.mp4");

        let url = format!("file://{}", source.display());
        let relative = store.store_video(&url).expect("copy should succeed");

        assert!(relative.starts_with("videos/clip_"));
        assert!(relative.ends_with(".mp4"));
    }

    #[test]
    fn test_missing_extension_falls_back_to_dat() {
        let (store, _dir, source) = store_with_source(b"x", "noext");

        let relative = store.store_video(source.to_str().unwrap()).unwrap();

        assert!(relative.ends_with(".dat"));
    }

    #[test]
    fn test_missing_or_blank_source_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        assert_eq!(store.store_image(""), None);
        assert_eq!(store.store_image("   "), None);
        assert_eq!(store.store_image("/no/such/file.png"), None);
        // A directory is not a regular file.
        assert_eq!(store.store_image(dir.path().to_str().unwrap()), None);
    }

    #[test]
    fn test_file_url_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        assert_eq!(store.file_url(""), "");

        let url = store.file_url("images/a.png");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("images/a.png"));
        assert!(url.contains(dir.path().to_str().unwrap()));
    }
}
