//! Shared types passed between the source adapters, the resolver and the viewer.
//!
//! `PhotoRecord` is the single normalized shape every adapter produces. The
//! enums here are small, serializable and used in config files as well as in
//! the preference store, so their string forms are part of the on-disk format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One photo, normalized from whichever source produced it.
///
/// `src` is always an absolute HTTP(S) URL; `title` and `description` are
/// never empty once an adapter has built the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub src: String,
    pub title: String,
    pub description: String,
}

/// Presentation of the photo collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Grid,
    List,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Grid => "grid",
            LayoutMode::List => "list",
        }
    }
}

/// Whether a gallery fetches photos or links straight to the shared album.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Run the API → OneDrive → local fallback chain.
    #[default]
    Auto,
    /// Render an outbound link to the share instead of fetching anything.
    Album,
}

impl SourceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceMode::Auto => "auto",
            SourceMode::Album => "album",
        }
    }

    /// Parse a user-facing mode name, including the aliases accepted on the
    /// query string. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" | "gallery" | "best" => Some(SourceMode::Auto),
            "album" | "direct" | "shared-album" | "onedrive" => Some(SourceMode::Album),
            _ => None,
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three places photos can come from, in fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Api,
    OneDrive,
    Local,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Api => "api",
            SourceKind::OneDrive => "onedrive",
            SourceKind::Local => "local",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome class of a single adapter attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Success,
    /// The source answered but held zero usable photos.
    Empty,
    /// The source does not exist (404, missing manifest).
    Missing,
    Error,
}
