//! CLI output formatting for every command.
//!
//! Output is **destination-centric**: each gallery is shown by its position
//! and display name, with the outcome on the header line and supporting
//! detail (failed attempts, paths) on indented context lines.
//!
//! # Output Format
//!
//! ## Resolve
//!
//! ```text
//! 001 Australia → api (24 photos)
//!     Skipped: onedrive: request to https://... failed with HTTP 404
//! 002 Dubai → No Photos Yet
//!     local: empty manifest: data/dubai.json has no usable photos
//! 003 Bali → Coming Soon
//! 004 Japan → Album https://1drv.ms/f/s!abc
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Australia → australia/index.html (24 photo pages)
//! 002 Dubai → dubai/index.html (No Photos Yet)
//!
//! Generated 2 destinations, 24 photo pages
//! ```
//!
//! ## Sync
//!
//! ```text
//! Synced 2 photos for australia (1 copied, 1 unchanged)
//!     Images: content/images/australia
//!     Manifest: content/data/australia.json
//! 001 harbour bridge
//!     Source: harbour-bridge.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::config::GalleryConfig;
use crate::generate::GeneratedDestination;
use crate::resolve::{Resolution, SourceAttempt};
use crate::retitle::RetitleReport;
use crate::sync::SyncReport;
use crate::types::LoadState;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn attempt_line(attempt: &SourceAttempt) -> String {
    format!("{}: {}", attempt.kind, attempt.message)
}

/// Short panel name for a resolution without photos.
fn outcome_label(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Photos { source, photos, .. } => {
            format!("{} ({} photos)", source, photos.len())
        }
        Resolution::NoPhotos { .. } => "No Photos Yet".to_string(),
        Resolution::ComingSoon { .. } => "Coming Soon".to_string(),
        Resolution::Album { share_link } => format!("Album {share_link}"),
        Resolution::SourceFailed { attempt, .. } => format!("{} failed", attempt.kind),
    }
}

fn state_label(state: LoadState) -> &'static str {
    match state {
        LoadState::Success => "ok",
        LoadState::Empty => "No Photos Yet",
        LoadState::Missing | LoadState::Error => "Coming Soon",
    }
}

// ============================================================================
// Resolve
// ============================================================================

pub fn format_resolve_output(results: &[(GalleryConfig, Resolution)]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (gallery, resolution)) in results.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            gallery.destination_name,
            outcome_label(resolution)
        ));
        let skipped = matches!(resolution, Resolution::Photos { .. });
        for attempt in resolution.attempts() {
            if skipped {
                lines.push(format!("{}Skipped: {}", indent(1), attempt_line(attempt)));
            } else {
                lines.push(format!("{}{}", indent(1), attempt_line(attempt)));
            }
        }
        if !matches!(resolution, Resolution::Album { .. })
            && gallery.usable_api_endpoint().is_none()
            && gallery.usable_share_link().is_none()
            && gallery.usable_local_path().is_none()
        {
            lines.push(format!("{}No source configured", indent(1)));
        }
    }
    lines
}

pub fn print_resolve_output(results: &[(GalleryConfig, Resolution)]) {
    for line in format_resolve_output(results) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_generate_output(generated: &[GeneratedDestination]) -> Vec<String> {
    let mut lines = vec!["Home → index.html".to_string()];
    let mut total_pages = 0;

    for (i, dest) in generated.iter().enumerate() {
        let detail = if dest.photo_pages > 0 {
            format!("{} photo pages", dest.photo_pages)
        } else {
            state_label(dest.state).to_string()
        };
        lines.push(format!(
            "{} {} → {}/index.html ({})",
            format_index(i + 1),
            dest.name,
            dest.slug,
            detail
        ));
        total_pages += dest.photo_pages;
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} destinations, {} photo pages",
        generated.len(),
        total_pages
    ));
    lines
}

pub fn print_generate_output(generated: &[GeneratedDestination]) {
    for line in format_generate_output(generated) {
        println!("{}", line);
    }
}

// ============================================================================
// Sync / Retitle
// ============================================================================

pub fn format_sync_output(report: &SyncReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Synced {} photos for {} ({} copied, {} unchanged)",
            report.rows.len(),
            report.trip,
            report.copied,
            report.unchanged
        ),
        format!("{}Images: {}", indent(1), report.image_dir.display()),
        format!("{}Manifest: {}", indent(1), report.manifest_path.display()),
    ];
    for (i, row) in report.rows.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), row.title));
        lines.push(format!("{}Source: {}", indent(1), row.name));
    }
    lines
}

pub fn print_sync_output(report: &SyncReport) {
    for line in format_sync_output(report) {
        println!("{}", line);
    }
}

pub fn format_retitle_output(report: &RetitleReport) -> Vec<String> {
    vec![format!(
        "Updated {} titles in {}",
        report.updated,
        report.manifest_path.display()
    )]
}

pub fn print_retitle_output(report: &RetitleReport) {
    for line in format_retitle_output(report) {
        println!("{}", line);
    }
}
