//! Rewrite manifest titles that still look like filenames.
//!
//! Every row with a `name` gets a display title derived from it:
//!
//! - `20240312_151500.jpg` → `Australia - 12 Mar 2024, 03:15 PM`
//! - anything else → `Australia Moment 07` (1-based row position)
//!
//! The prefix defaults to the title-cased trip. Rows without a name, and
//! non-object rows, are left as they are. The timestamp form keeps the
//! `"<destination> - "` prefix, which the source adapters strip again when
//! deriving "Captured on ..." descriptions.

use crate::naming;
use crate::sync;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetitleError {
    #[error("trip name is empty")]
    EmptyTrip,
    #[error("manifest not found: {0}")]
    ManifestNotFound(PathBuf),
    #[error("expected a JSON array in {0}")]
    NotAnArray(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct RetitleReport {
    pub manifest_path: PathBuf,
    pub updated: usize,
}

/// Title for the row at 1-based `index` whose original filename is `name`.
pub fn title_for(name: &str, prefix: &str, index: usize) -> String {
    match naming::timestamp_title(name.trim()) {
        Some(stamp) => format!("{prefix} - {stamp}"),
        None => format!("{prefix} Moment {index:02}"),
    }
}

fn text(value: Option<&Value>) -> &str {
    value.and_then(Value::as_str).map(str::trim).unwrap_or("")
}

/// Retitle rows in place. Returns how many titles changed.
pub fn retitle_rows(rows: &mut [Value], prefix: &str) -> usize {
    let mut updated = 0;
    for (i, row) in rows.iter_mut().enumerate() {
        let Some(obj) = row.as_object_mut() else {
            continue;
        };
        let name = text(obj.get("name"));
        if name.is_empty() {
            continue;
        }
        let next = title_for(name, prefix, i + 1);
        if text(obj.get("title")) != next {
            obj.insert("title".to_string(), Value::String(next));
            updated += 1;
        }
    }
    updated
}

pub fn retitle_manifest(
    content_root: &Path,
    trip: &str,
    title_prefix: Option<&str>,
) -> Result<RetitleReport, RetitleError> {
    let trip = sync::trip_slug(trip);
    if trip.is_empty() {
        return Err(RetitleError::EmptyTrip);
    }
    let prefix = title_prefix
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .unwrap_or_else(|| naming::title_case(&trip));

    let manifest_path = sync::manifest_path(content_root, &trip);
    if !manifest_path.exists() {
        return Err(RetitleError::ManifestNotFound(manifest_path));
    }

    let payload: Value = serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;
    let Value::Array(mut rows) = payload else {
        return Err(RetitleError::NotAnArray(manifest_path));
    };

    let updated = retitle_rows(&mut rows, &prefix);
    fs::write(
        &manifest_path,
        serde_json::to_string_pretty(&Value::Array(rows))?,
    )?;
    log::info!("retitled {updated} rows in {}", manifest_path.display());

    Ok(RetitleReport {
        manifest_path,
        updated,
    })
}
