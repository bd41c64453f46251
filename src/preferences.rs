//! Persisted per-gallery UI preference: the source mode (`auto` / `album`).
//!
//! Storage is best-effort. A store that cannot be read behaves as if it held
//! nothing, and a failed write is logged and forgotten; neither ever surfaces
//! as an error to the gallery.
//!
//! ## Keys
//!
//! One string value per gallery container, under
//! `travel-gal:source-mode:<container id>`. Values other than `auto` or
//! `album` are ignored on read.
//!
//! ## Query Overrides
//!
//! A query string can force the mode for a visit and persists it:
//!
//! ```text
//! ?galleryMode=album      → album (also: direct, shared-album, onedrive)
//! ?sourceMode=auto        → auto  (also: gallery, best)
//! ?gallery=direct         → album
//! ```

use crate::types::SourceMode;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Query parameter names checked, in order.
pub const MODE_QUERY_KEYS: [&str; 3] = ["galleryMode", "sourceMode", "gallery"];

const KEY_PREFIX: &str = "travel-gal:source-mode:";

/// Storage key for a gallery container's source mode.
pub fn storage_key(container_id: &str) -> String {
    format!("{KEY_PREFIX}{container_id}")
}

/// Scoped string key-value storage.
pub trait PreferenceStore {
    /// Stored value, or `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;
    /// Store a value. Failures are swallowed.
    fn set(&self, key: &str, value: &str);
}

/// Preferences kept in a JSON object file (`<state dir>/preferences.json`).
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub const FILENAME: &'static str = "preferences.json";

    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(Self::FILENAME),
        }
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.write_all(&values) {
            log::warn!(
                "could not persist preference {key} to {}: {e}",
                self.path.display()
            );
        }
    }
}

/// In-memory store, for single runs that should not touch disk.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// Source mode requested by a query string, if any.
///
/// Accepts a leading `?`. The first recognised key with a valid value wins;
/// unknown values are ignored.
pub fn mode_from_query(query: &str) -> Option<SourceMode> {
    let query = query.trim().trim_start_matches('?');
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    MODE_QUERY_KEYS.iter().find_map(|key| {
        pairs
            .iter()
            .filter(|(k, _)| k == key)
            .find_map(|(_, v)| SourceMode::parse(v))
    })
}

/// Stored mode for a container. Only the canonical `auto` and `album` are
/// read back; query aliases and anything else are ignored.
pub fn stored_mode(store: &dyn PreferenceStore, container_id: &str) -> Option<SourceMode> {
    match store.get(&storage_key(container_id))?.as_str() {
        "auto" => Some(SourceMode::Auto),
        "album" => Some(SourceMode::Album),
        _ => None,
    }
}

/// Resolve the effective mode: query override (persisted), then stored
/// value, then `default`.
pub fn read_source_mode(
    store: &dyn PreferenceStore,
    container_id: &str,
    query: Option<&str>,
    default: SourceMode,
) -> SourceMode {
    if let Some(mode) = query.and_then(mode_from_query) {
        store.set(&storage_key(container_id), mode.as_str());
        return mode;
    }
    stored_mode(store, container_id).unwrap_or(default)
}
