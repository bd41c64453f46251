//! Local sync: copy a folder of photos into the site and write its manifest.
//!
//! ```text
//! ~/Pictures/Australia/            content/
//! ├── IMG_0001.JPG        sync     ├── images/australia/
//! ├── harbour-bridge.png  ─────▶   │   ├── australia-1.jpg
//! └── notes.txt (skipped)          │   └── australia-2.png
//!                                  └── data/australia.json
//! ```
//!
//! Files are taken from the top level of the source folder only, filtered to
//! `.jpg .jpeg .png .webp`, and ordered by lowercase filename. Each is copied
//! as `<trip>-<n>.<ext>`; a target whose SHA-256 already matches the source is
//! left alone, so re-running a sync over an unchanged folder copies nothing.
//!
//! The manifest is what the local source adapter reads: one
//! `{src, title, name}` row per photo, `src` relative to the site root.

use crate::naming;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("source folder not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("no supported image files found in {0} (expected .jpg, .jpeg, .png or .webp)")]
    NoImages(PathBuf),
    #[error("trip name is empty")]
    EmptyTrip,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row of a local manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    pub src: String,
    pub title: String,
    pub name: String,
}

#[derive(Debug)]
pub struct SyncReport {
    pub trip: String,
    pub rows: Vec<ManifestRow>,
    pub copied: usize,
    pub unchanged: usize,
    pub image_dir: PathBuf,
    pub manifest_path: PathBuf,
}

/// Normalize a trip name to its directory form (`"Gold Coast"` → `"gold-coast"`).
pub fn trip_slug(trip: &str) -> String {
    trip.trim().to_lowercase().replace(' ', "-")
}

/// Manifest location for a trip, relative to the content root.
pub fn manifest_path(content_root: &Path, trip: &str) -> PathBuf {
    content_root.join("data").join(format!("{trip}.json"))
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Supported image files directly inside `source_dir`, sorted by lowercase name.
pub fn collect_images(source_dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort_by_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    Ok(files)
}

/// SHA-256 of a file's contents, hex encoded.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

fn unchanged(source: &Path, target: &Path) -> io::Result<bool> {
    if !target.exists() {
        return Ok(false);
    }
    Ok(hash_file(source)? == hash_file(target)?)
}

pub fn sync_gallery(
    source_dir: &Path,
    content_root: &Path,
    trip: &str,
    max_files: Option<usize>,
) -> Result<SyncReport, SyncError> {
    let trip = trip_slug(trip);
    if trip.is_empty() {
        return Err(SyncError::EmptyTrip);
    }
    if !source_dir.is_dir() {
        return Err(SyncError::SourceNotFound(source_dir.to_path_buf()));
    }

    let mut files = collect_images(source_dir)?;
    if let Some(max) = max_files {
        files.truncate(max);
    }
    if files.is_empty() {
        return Err(SyncError::NoImages(source_dir.to_path_buf()));
    }

    let image_dir = content_root.join("images").join(&trip);
    let manifest_path = manifest_path(content_root, &trip);
    fs::create_dir_all(&image_dir)?;
    if let Some(parent) = manifest_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut rows = Vec::with_capacity(files.len());
    let mut copied = 0;
    let mut skipped = 0;

    for (i, source) in files.iter().enumerate() {
        let index = i + 1;
        let original_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let new_name = format!("{trip}-{index}.{ext}");
        let target = image_dir.join(&new_name);

        if unchanged(source, &target)? {
            log::debug!("{new_name} unchanged");
            skipped += 1;
        } else {
            fs::copy(source, &target)?;
            log::debug!("copied {} -> {new_name}", source.display());
            copied += 1;
        }

        rows.push(ManifestRow {
            src: format!("images/{trip}/{new_name}"),
            title: naming::title_from_filename(&original_name)
                .unwrap_or_else(|| format!("Photo {index}")),
            name: original_name,
        });
    }

    fs::write(&manifest_path, serde_json::to_string_pretty(&rows)?)?;
    log::info!(
        "synced {} photos for {trip} ({copied} copied, {skipped} unchanged)",
        rows.len()
    );

    Ok(SyncReport {
        trip,
        rows,
        copied,
        unchanged: skipped,
        image_dir,
        manifest_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_with(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (name, body) in files {
            fs::write(tmp.path().join(name), body).unwrap();
        }
        tmp
    }

    #[test]
    fn collects_supported_sorted_case_insensitively() {
        let src = source_with(&[
            ("b.PNG", "b"),
            ("A.jpg", "a"),
            ("c.webp", "c"),
            ("notes.txt", "n"),
            ("raw.cr2", "r"),
        ]);
        fs::create_dir(src.path().join("nested.jpg")).unwrap();
        let names: Vec<String> = collect_images(src.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.jpg", "b.PNG", "c.webp"]);
    }

    #[test]
    fn sync_copies_and_writes_manifest() {
        let src = source_with(&[
            ("harbour-bridge.JPG", "one"),
            ("20240312_151500.png", "two"),
        ]);
        let site = TempDir::new().unwrap();

        let report = sync_gallery(src.path(), site.path(), "Gold Coast", None).unwrap();
        assert_eq!(report.trip, "gold-coast");
        assert_eq!(report.copied, 2);

        let image_dir = site.path().join("images/gold-coast");
        assert_eq!(fs::read(image_dir.join("gold-coast-1.png")).unwrap(), b"two");
        assert_eq!(fs::read(image_dir.join("gold-coast-2.jpg")).unwrap(), b"one");

        let json = fs::read_to_string(site.path().join("data/gold-coast.json")).unwrap();
        let rows: Vec<ManifestRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(
            rows[0],
            ManifestRow {
                src: "images/gold-coast/gold-coast-1.png".into(),
                title: "12 Mar 2024, 03:15 PM".into(),
                name: "20240312_151500.png".into(),
            }
        );
        assert_eq!(rows[1].title, "harbour bridge");
    }

    #[test]
    fn resync_skips_unchanged_files() {
        let src = source_with(&[("a.jpg", "a"), ("b.jpg", "b")]);
        let site = TempDir::new().unwrap();
        sync_gallery(src.path(), site.path(), "dubai", None).unwrap();

        fs::write(src.path().join("b.jpg"), b"edited").unwrap();
        let report = sync_gallery(src.path(), site.path(), "dubai", None).unwrap();
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.copied, 1);
        assert_eq!(
            fs::read(site.path().join("images/dubai/dubai-2.jpg")).unwrap(),
            b"edited"
        );
    }

    #[test]
    fn max_limits_count() {
        let src = source_with(&[("a.jpg", "a"), ("b.jpg", "b"), ("c.jpg", "c")]);
        let site = TempDir::new().unwrap();
        let report = sync_gallery(src.path(), site.path(), "dubai", Some(2)).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert!(!site.path().join("images/dubai/dubai-3.jpg").exists());
    }

    #[test]
    fn empty_stem_falls_back_to_photo_number() {
        let src = source_with(&[("_.jpg", "x")]);
        let site = TempDir::new().unwrap();
        let report = sync_gallery(src.path(), site.path(), "dubai", None).unwrap();
        assert_eq!(report.rows[0].title, "Photo 1");
    }

    #[test]
    fn errors() {
        let site = TempDir::new().unwrap();
        let missing = site.path().join("nope");
        assert!(matches!(
            sync_gallery(&missing, site.path(), "dubai", None),
            Err(SyncError::SourceNotFound(_))
        ));

        let src = source_with(&[("notes.txt", "n")]);
        assert!(matches!(
            sync_gallery(src.path(), site.path(), "dubai", None),
            Err(SyncError::NoImages(_))
        ));
        assert!(matches!(
            sync_gallery(src.path(), site.path(), "  ", None),
            Err(SyncError::EmptyTrip)
        ));
    }

    #[test]
    fn hash_file_changes_with_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.bin");
        fs::write(&path, b"version 1").unwrap();
        let h1 = hash_file(&path).unwrap();
        fs::write(&path, b"version 2").unwrap();
        assert_ne!(h1, hash_file(&path).unwrap());
        assert_eq!(h1.len(), 64);
    }
}
