//! # Travel Gal
//!
//! A static site generator for a travel blog's photo galleries. Each
//! destination's photos come from whichever of three sources answers first:
//! a JSON manifest API, an anonymous OneDrive share, or a local manifest
//! written by `travel-gal sync`.
//!
//! # Architecture: Configuration → Resolver → Viewer
//!
//! Data flows one way:
//!
//! ```text
//! config.toml ──▶ resolve ──▶ Vec<PhotoRecord> ──▶ viewer ──▶ generate ──▶ dist/
//!                   │
//!                   ├─ sources::api        (manifest API)
//!                   ├─ sources::onedrive   (share listing, paginated)
//!                   └─ sources::local      (data/<trip>.json)
//! ```
//!
//! The viewer never talks to sources. Each source adapter normalizes its own
//! payload into [`types::PhotoRecord`] and reports failure as a classified
//! [`sources::SourceError`]; the resolver turns failures into one of two
//! neutral panels ("No Photos Yet" or "Coming Soon") and logs the details.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sources`] | Source adapters, the [`sources::Fetcher`] seam, raw row normalization |
//! | [`resolve`] | Fallback chain, failure classification, auto/album source mode |
//! | [`preferences`] | Persisted per-gallery source mode and query overrides |
//! | [`viewer`] | Layout mode and the single lightbox session ([`viewer::ViewerController`]) |
//! | [`generate`] | Renders the static site with Maud, driving the viewer for lightbox links |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Shared types (`PhotoRecord`, `LayoutMode`, `SourceMode`, `LoadState`) |
//! | [`naming`] | Titles, descriptions and natural ordering from filenames |
//! | [`sync`] | Copies a local photo folder into the site and writes its manifest |
//! | [`retitle`] | Rewrites manifest titles from camera timestamps |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Sequential, Blocking Fetches
//!
//! Sources are tried strictly one after another and OneDrive pages are
//! followed one at a time, capped at 100 pages. A blocking reqwest client
//! gives exactly that ordering without an async runtime.
//!
//! ## Placeholders Mean "Not Configured"
//!
//! The site template ships with values like `PASTE_AUSTRALIA_LINK_HERE`. Any
//! endpoint or share link containing `PASTE_` is skipped, never fetched.
//!
//! ## Static Lightbox
//!
//! Every photo gets its own lightbox page. Previous/next targets come from
//! walking a [`viewer::ViewerController`] through the gallery, so the pages
//! clamp at both ends exactly like the interactive viewer; a few lines of
//! JavaScript map Escape, the arrow keys and backdrop clicks onto them.

pub mod config;
pub mod generate;
pub mod naming;
pub mod output;
pub mod preferences;
pub mod resolve;
pub mod retitle;
pub mod sources;
pub mod sync;
pub mod types;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
