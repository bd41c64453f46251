//! Source resolution: pick the photos a gallery shows.
//!
//! Sources are tried strictly in priority order, each attempt fully resolving
//! before the next starts:
//!
//! ```text
//! api_endpoint ──ok──▶ Photos
//!      │ err
//!      ▼
//! share_link  ──ok──▶ Photos
//!      │ err
//!      ▼
//! local_json  ──ok──▶ Photos
//!      │ err
//!      ▼
//! any "empty" signal? ──yes──▶ NoPhotos
//!      │ no
//!      ▼
//! ComingSoon
//! ```
//!
//! Unconfigured sources (absent, blank, or still holding a `PASTE_` template
//! value) are skipped without an attempt. Failures are logged and recorded as
//! [`SourceAttempt`]s; they never escape as errors. Visitors see one of two
//! neutral panels, and raw failure text is only rendered by the detailed
//! panel of an explicit single-source load.
//!
//! [`load_with_source_toggle`] layers the persisted `auto` / `album` mode on
//! top: `album` skips fetching entirely and links to the share.

use crate::config::{GalleryConfig, SiteConfig};
use crate::preferences::{self, PreferenceStore};
use crate::sources::{self, Fetcher, SourceContext, SourceError};
use crate::types::{LoadState, PhotoRecord, SourceKind, SourceMode};
use url::Url;

/// Lowercased substrings that mark a failure as "the collection is empty".
const EMPTY_SIGNALS: [&str; 4] = ["no image", "empty manifest", "no photos", "empty result"];

/// Record of one failed adapter attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAttempt {
    pub kind: SourceKind,
    pub state: LoadState,
    pub message: String,
}

impl SourceAttempt {
    pub fn failed(kind: SourceKind, error: &SourceError) -> Self {
        Self {
            kind,
            state: LoadState::from(error),
            message: error.to_string(),
        }
    }

    /// True when this failure means "there is nothing to show" rather than
    /// "something is broken".
    pub fn is_empty_signal(&self) -> bool {
        self.state == LoadState::Empty || is_empty_message(&self.message)
    }
}

pub fn is_empty_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    EMPTY_SIGNALS.iter().any(|s| lower.contains(s))
}

/// What a gallery renders.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A source produced photos. `attempts` lists the sources that failed first.
    Photos {
        source: SourceKind,
        photos: Vec<PhotoRecord>,
        attempts: Vec<SourceAttempt>,
    },
    /// Every source failed and at least one reported an empty collection.
    NoPhotos { attempts: Vec<SourceAttempt> },
    /// Every source failed for other reasons, or none was configured.
    ComingSoon { attempts: Vec<SourceAttempt> },
    /// Album mode: link to the share, nothing fetched.
    Album { share_link: String },
    /// A single, explicitly requested source failed; rendered with details.
    SourceFailed {
        attempt: SourceAttempt,
        share_link: Option<String>,
    },
}

impl Resolution {
    pub fn photos(&self) -> &[PhotoRecord] {
        match self {
            Resolution::Photos { photos, .. } => photos,
            _ => &[],
        }
    }

    /// Overall load state for reporting.
    pub fn state(&self) -> LoadState {
        match self {
            Resolution::Photos { .. } | Resolution::Album { .. } => LoadState::Success,
            Resolution::NoPhotos { .. } => LoadState::Empty,
            Resolution::ComingSoon { attempts } => {
                if attempts.iter().all(|a| a.state == LoadState::Missing) {
                    LoadState::Missing
                } else {
                    LoadState::Error
                }
            }
            Resolution::SourceFailed { attempt, .. } => attempt.state,
        }
    }

    pub fn attempts(&self) -> &[SourceAttempt] {
        match self {
            Resolution::Photos { attempts, .. }
            | Resolution::NoPhotos { attempts }
            | Resolution::ComingSoon { attempts } => attempts,
            Resolution::SourceFailed { attempt, .. } => std::slice::from_ref(attempt),
            Resolution::Album { .. } => &[],
        }
    }
}

/// Sources configured for a gallery, in fallback order, with their locations.
pub fn planned_sources(config: &GalleryConfig) -> Vec<(SourceKind, &str)> {
    [
        (SourceKind::Api, config.usable_api_endpoint()),
        (SourceKind::OneDrive, config.usable_share_link()),
        (SourceKind::Local, config.usable_local_path()),
    ]
    .into_iter()
    .filter_map(|(kind, location)| location.map(|l| (kind, l)))
    .collect()
}

/// Run one adapter.
pub fn fetch_source(
    kind: SourceKind,
    location: &str,
    fetcher: &dyn Fetcher,
    ctx: &SourceContext,
) -> Result<Vec<PhotoRecord>, SourceError> {
    match kind {
        SourceKind::Api => sources::fetch_api(fetcher, location, ctx),
        SourceKind::OneDrive => sources::fetch_onedrive(fetcher, location, ctx),
        SourceKind::Local => sources::fetch_local(fetcher, location, ctx),
    }
}

/// Try every configured source in order; the first non-empty result wins.
pub fn load_best_source(
    config: &GalleryConfig,
    fetcher: &dyn Fetcher,
    ctx: &SourceContext,
) -> Resolution {
    let mut attempts = Vec::new();

    for (kind, location) in planned_sources(config) {
        log::debug!("{}: trying {kind} source {location}", config.container_id);
        match fetch_source(kind, location, fetcher, ctx) {
            Ok(photos) if !photos.is_empty() => {
                log::info!(
                    "{}: {} photos from {kind}",
                    config.container_id,
                    photos.len()
                );
                return Resolution::Photos {
                    source: kind,
                    photos,
                    attempts,
                };
            }
            Ok(_) => attempts.push(SourceAttempt::failed(kind, &SourceError::EmptyResult)),
            Err(e) => {
                log::warn!("{}: {kind} source failed: {e}", config.container_id);
                attempts.push(SourceAttempt::failed(kind, &e));
            }
        }
    }

    if attempts.is_empty() {
        log::warn!("{}: no photo source configured", config.container_id);
    }
    classify_failures(attempts)
}

/// Choose the terminal panel for a fully failed chain.
pub fn classify_failures(attempts: Vec<SourceAttempt>) -> Resolution {
    if attempts.iter().any(SourceAttempt::is_empty_signal) {
        Resolution::NoPhotos { attempts }
    } else {
        Resolution::ComingSoon { attempts }
    }
}

/// How a failed single-source load is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureUi {
    /// Render the adapter's detailed failure panel.
    Show,
    /// Fall back silently to the neutral panels.
    Suppress,
}

/// Load from exactly one source, bypassing the fallback chain.
pub fn load_single_source(
    kind: SourceKind,
    config: &GalleryConfig,
    fetcher: &dyn Fetcher,
    ctx: &SourceContext,
    ui: FailureUi,
) -> Resolution {
    let location = planned_sources(config)
        .into_iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, l)| l);

    let attempt = match location {
        Some(location) => match fetch_source(kind, location, fetcher, ctx) {
            Ok(photos) if !photos.is_empty() => {
                return Resolution::Photos {
                    source: kind,
                    photos,
                    attempts: Vec::new(),
                };
            }
            Ok(_) => SourceAttempt::failed(kind, &SourceError::EmptyResult),
            Err(e) => {
                log::warn!("{}: {kind} source failed: {e}", config.container_id);
                SourceAttempt::failed(kind, &e)
            }
        },
        None => SourceAttempt {
            kind,
            state: LoadState::Missing,
            message: format!("{kind} source is not configured"),
        },
    };

    match ui {
        FailureUi::Show => Resolution::SourceFailed {
            attempt,
            share_link: config.usable_share_link().map(String::from),
        },
        FailureUi::Suppress => classify_failures(vec![attempt]),
    }
}

/// Resolve with the persisted `auto` / `album` preference applied.
///
/// `query` is the visit's query string; a mode found there is persisted for
/// the container. Album mode without a usable share link falls back to auto.
pub fn load_with_source_toggle(
    config: &GalleryConfig,
    fetcher: &dyn Fetcher,
    ctx: &SourceContext,
    store: &dyn PreferenceStore,
    query: Option<&str>,
) -> Resolution {
    let mode =
        preferences::read_source_mode(store, &config.container_id, query, config.source_mode);
    if mode == SourceMode::Album {
        match config.usable_share_link() {
            Some(link) => {
                log::info!("{}: album mode, linking to share", config.container_id);
                return Resolution::Album {
                    share_link: link.to_string(),
                };
            }
            None => log::warn!(
                "{}: album mode requested but no share link configured; using auto",
                config.container_id
            ),
        }
    }
    load_best_source(config, fetcher, ctx)
}

/// Which loader [`resolve_site`] runs for every destination.
#[derive(Clone, Copy)]
pub enum LoadPlan<'a> {
    /// Preference-aware fallback chain.
    Toggle {
        store: &'a dyn PreferenceStore,
        query: Option<&'a str>,
    },
    /// One source only.
    Single { kind: SourceKind, ui: FailureUi },
}

/// Resolve every configured destination, in slug order.
pub fn resolve_site(
    config: &SiteConfig,
    fetcher: &dyn Fetcher,
    base_url: &Url,
    plan: LoadPlan<'_>,
) -> Vec<(GalleryConfig, Resolution)> {
    config
        .galleries()
        .into_iter()
        .map(|gallery| {
            let ctx = SourceContext::new(&gallery, base_url);
            let resolution = match plan {
                LoadPlan::Toggle { store, query } => {
                    load_with_source_toggle(&gallery, fetcher, &ctx, store, query)
                }
                LoadPlan::Single { kind, ui } => {
                    load_single_source(kind, &gallery, fetcher, &ctx, ui)
                }
            };
            (gallery, resolution)
        })
        .collect()
}
