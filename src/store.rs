//! Flat-file JSON data store.
//!
//! # Layout
//!
//! ```text
//! data_dir/
//! ├── shows.json
//! ├── reviews.json
//! ├── outlet-registry.json
//! ├── show-scores.json
//! ├── review-texts/
//! │   └── <show-id>/
//! │       └── <outlet>--<critic-slug>.json
//! └── reports/
//!     └── 2025-05-06/
//!         ├── audit.json
//!         └── audit.md
//! ```
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write never leaves a half-written JSON file behind.

use crate::error::StoreError;
use crate::models::{OutletRegistry, Review, ReviewsFile, ShowsFile};
use crate::normalization::review_file_key;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// One file under `review-texts/`.
#[derive(Debug, Clone)]
pub struct ReviewTextFile {
    pub path: PathBuf,
    pub review: Review,
}

/// Paths inside a data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shows_path(&self) -> PathBuf {
        self.root.join("shows.json")
    }

    pub fn reviews_path(&self) -> PathBuf {
        self.root.join("reviews.json")
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join("outlet-registry.json")
    }

    pub fn show_scores_path(&self) -> PathBuf {
        self.root.join("show-scores.json")
    }

    pub fn review_texts_dir(&self) -> PathBuf {
        self.root.join("review-texts")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    /// Where the text file for one review lives.
    pub fn review_text_path(&self, show_id: &str, outlet_id: &str, critic: Option<&str>) -> PathBuf {
        self.review_texts_dir()
            .join(show_id)
            .join(format!("{}.json", review_file_key(outlet_id, critic)))
    }

    pub async fn load_shows(&self) -> Result<ShowsFile, StoreError> {
        load_json(&self.shows_path()).await
    }

    pub async fn load_reviews(&self) -> Result<ReviewsFile, StoreError> {
        load_json(&self.reviews_path()).await
    }

    /// `reviews.json`, or an empty file when none exists yet.
    pub async fn load_reviews_or_default(&self) -> Result<ReviewsFile, StoreError> {
        match self.load_reviews().await {
            Err(e) if e.is_missing() => {
                info!(path = %self.reviews_path().display(), "No reviews.json yet; starting empty");
                Ok(ReviewsFile::default())
            }
            other => other,
        }
    }

    /// The outlet registry; a missing file means "built-in tables only".
    pub async fn load_registry(&self) -> Result<OutletRegistry, StoreError> {
        match load_json(&self.registry_path()).await {
            Err(e) if e.is_missing() => {
                warn!(path = %self.registry_path().display(), "No outlet registry; using built-in aliases only");
                Ok(OutletRegistry::default())
            }
            other => other,
        }
    }

    /// Every review-text file, read `concurrency` at a time.
    ///
    /// Unreadable or malformed files are logged and skipped. A file with no
    /// `showId` takes the name of the directory it sits in. Results are sorted
    /// by path.
    #[instrument(level = "info", skip_all, fields(dir = %self.review_texts_dir().display()))]
    pub async fn load_review_texts(&self, concurrency: usize) -> Result<Vec<ReviewTextFile>, StoreError> {
        let paths = list_review_text_paths(&self.review_texts_dir()).await?;
        let total = paths.len();

        let mut files: Vec<ReviewTextFile> = stream::iter(paths)
            .map(|path| async move {
                match load_json::<Review>(&path).await {
                    Ok(mut review) => {
                        if review.show_id.trim().is_empty() {
                            if let Some(dir) = path.parent().and_then(|p| p.file_name()) {
                                review.show_id = dir.to_string_lossy().into_owned();
                            }
                        }
                        Some(ReviewTextFile { path, review })
                    }
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable review-text file");
                        None
                    }
                }
            })
            .buffer_unordered(concurrency.max(1))
            .filter_map(std::future::ready)
            .collect()
            .await;

        files.sort_by(|a, b| a.path.cmp(&b.path));
        info!(total, loaded = files.len(), "Loaded review-text files");
        Ok(files)
    }
}

async fn list_review_text_paths(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut paths = Vec::new();
    let mut shows = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "No review-texts directory");
            return Ok(paths);
        }
        Err(e) => return Err(StoreError::io(dir, e)),
    };

    while let Some(show_entry) = shows.next_entry().await.map_err(|e| StoreError::io(dir, e))? {
        let show_dir = show_entry.path();
        if !show_dir.is_dir() {
            continue;
        }
        let mut files = fs::read_dir(&show_dir)
            .await
            .map_err(|e| StoreError::io(&show_dir, e))?;
        while let Some(file) = files.next_entry().await.map_err(|e| StoreError::io(&show_dir, e))? {
            let path = file.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
    }
    debug!(count = paths.len(), "Listed review-text files");
    Ok(paths)
}

/// Read and parse one JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| StoreError::json(path, e))
}

/// Pretty-print `value` to `path` through a temp file and rename.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| StoreError::json(path, e))?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, json)
        .await
        .map_err(|e| StoreError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    debug!("Wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Show;

    #[tokio::test]
    async fn test_save_and_load_roundtrip_preserves_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        let mut shows = ShowsFile::default();
        shows.shows.push(Show {
            id: "wicked-2003".to_string(),
            title: "Wicked".to_string(),
            ..Default::default()
        });
        shows.extra.insert("version".to_string(), serde_json::json!(3));

        save_json(&data.shows_path(), &shows).await.unwrap();
        let raw = tokio::fs::read_to_string(data.shows_path()).await.unwrap();
        assert!(raw.ends_with("}\n"));
        assert!(!dir.path().join("shows.json.tmp").exists());

        let loaded = data.load_shows().await.unwrap();
        assert_eq!(loaded.shows[0].title, "Wicked");
        assert_eq!(loaded.extra.get("version"), Some(&serde_json::json!(3)));
    }

    #[tokio::test]
    async fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        assert!(data.load_shows().await.unwrap_err().is_missing());
        assert!(data.load_reviews_or_default().await.unwrap().reviews.is_empty());
        assert!(data.load_registry().await.unwrap().outlets.is_empty());
        assert!(data.load_review_texts(4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        tokio::fs::write(data.reviews_path(), "{\"reviews\": [").await.unwrap();
        let err = data.load_reviews().await.unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[tokio::test]
    async fn test_load_review_texts_skips_bad_files_and_fills_show_id() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        let good = data.review_text_path("hamilton-2015", "nytimes", Some("Ben Brantley"));
        tokio::fs::create_dir_all(good.parent().unwrap()).await.unwrap();
        tokio::fs::write(&good, r#"{"outletId":"nytimes","outlet":"The New York Times"}"#)
            .await
            .unwrap();
        tokio::fs::write(good.with_file_name("broken.json"), "not json").await.unwrap();
        tokio::fs::write(good.with_file_name("notes.txt"), "ignored").await.unwrap();

        let files = data.load_review_texts(2).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].review.show_id, "hamilton-2015");
        assert!(files[0].path.ends_with("hamilton-2015/nytimes--ben-brantley.json"));
    }
}
