//! HTML site generation.
//!
//! Takes each destination's [`Resolution`] and writes the static site. The
//! resolved photo list is registered with a [`ViewerController`], and the
//! controller is driven to compute every lightbox page's navigation targets,
//! so the generated links follow the same clamping rules as the live viewer.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): One card per destination
//! - **Gallery pages** (`/{slug}/index.html`): The destination in its default
//!   layout, plus `grid.html` and `list.html` for the layout toggle
//! - **Lightbox pages** (`/{slug}/photo/{n}.html`): One full-screen photo with
//!   previous/next/close targets
//!
//! A destination that resolved to no photos gets only `index.html`, holding one
//! of the terminal panels ("No Photos Yet", "Coming Soon", the album link, or
//! the detailed failure panel of a single-source load).
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── images/                   # Copied from the content root, if present
//! │   └── australia/australia-1.jpg
//! └── australia/
//!     ├── index.html
//!     ├── grid.html
//!     ├── list.html
//!     └── photo/
//!         ├── 1.html
//!         └── 2.html
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/nav.js`: Card activation, lightbox keys and backdrop clicks

use crate::config::{self, GalleryConfig, SiteConfig};
use crate::resolve::{Resolution, SourceAttempt};
use crate::types::{LayoutMode, LoadState, PhotoRecord, SourceKind};
use crate::viewer::{CardTrigger, GalleryId, Key, OverlayTarget, ViewerController, ViewerError};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("viewer error: {0}")]
    Viewer(#[from] ViewerError),
}

/// A destination ready to render.
#[derive(Debug, Clone)]
pub struct DestinationPage {
    pub gallery: GalleryConfig,
    pub resolution: Resolution,
}

/// What was written for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDestination {
    pub slug: String,
    pub name: String,
    pub state: LoadState,
    pub source: Option<SourceKind>,
    pub photo_pages: usize,
}

/// One lightbox page's content and navigation, as computed by the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxPage {
    pub index: usize,
    /// Position label, e.g. "3 / 12".
    pub counter: String,
    pub photo: PhotoRecord,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    /// Escape and a backdrop click leave the lightbox.
    pub close: bool,
    pub scroll_locked: bool,
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/nav.js");

pub fn generate(
    site: &SiteConfig,
    destinations: &[DestinationPage],
    content_root: &Path,
    output_dir: &Path,
) -> Result<Vec<GeneratedDestination>, GenerateError> {
    let color_css = config::generate_color_css(&site.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    fs::create_dir_all(output_dir)?;

    let images = content_root.join("images");
    if images.is_dir() {
        copy_dir_recursive(&images, &output_dir.join("images"))?;
    }

    let index_html = render_index(&site.site.title, destinations, &css);
    fs::write(output_dir.join("index.html"), index_html.into_string())?;
    log::info!("generated index.html");

    let mut viewer = ViewerController::new();
    let mut generated = Vec::with_capacity(destinations.len());

    for page in destinations {
        let gallery = &page.gallery;
        let dest_dir = output_dir.join(&gallery.slug);
        fs::create_dir_all(&dest_dir)?;

        let photos = page.resolution.photos();
        let mut photo_pages = 0;

        if photos.is_empty() {
            let html = render_panel_page(&site.site.title, page, &css);
            fs::write(dest_dir.join("index.html"), html.into_string())?;
        } else {
            let id = viewer.register(&gallery.container_id, photos.to_vec(), gallery.default_mode);
            for layout in [LayoutMode::Grid, LayoutMode::List] {
                viewer.set_layout(id, layout)?;
                let html = render_gallery_page(&site.site.title, gallery, photos, layout, &css);
                fs::write(
                    dest_dir.join(format!("{}.html", layout.as_str())),
                    html.into_string(),
                )?;
            }
            viewer.set_layout(id, gallery.default_mode)?;
            let current = viewer.gallery(id)?.layout();
            let html = render_gallery_page(&site.site.title, gallery, photos, current, &css);
            fs::write(dest_dir.join("index.html"), html.into_string())?;

            let photo_dir = dest_dir.join("photo");
            fs::create_dir_all(&photo_dir)?;
            for lightbox in lightbox_pages(&mut viewer, id)? {
                let html = render_lightbox_page(&site.site.title, gallery, &lightbox, &css);
                fs::write(
                    photo_dir.join(format!("{}.html", lightbox.index + 1)),
                    html.into_string(),
                )?;
                photo_pages += 1;
            }
        }

        log::info!("generated {} ({} photo pages)", gallery.slug, photo_pages);
        generated.push(GeneratedDestination {
            slug: gallery.slug.clone(),
            name: gallery.destination_name.clone(),
            state: page.resolution.state(),
            source: match &page.resolution {
                Resolution::Photos { source, .. } => Some(*source),
                _ => None,
            },
            photo_pages,
        });
    }

    Ok(generated)
}

/// Walk a registered gallery through the viewer the way a visitor would:
/// activate each card, then press ArrowLeft, ArrowRight and Escape from a
/// fresh session and record where each key leaves the lightbox.
///
/// A key that leaves the index unchanged hit the clamp, so that side gets no
/// target.
pub fn lightbox_pages(
    viewer: &mut ViewerController,
    id: GalleryId,
) -> Result<Vec<LightboxPage>, ViewerError> {
    let total = viewer.gallery(id)?.photos().len();
    let mut pages = Vec::with_capacity(total);

    for index in 0..total {
        if !viewer.activate_card(id, index, CardTrigger::Click)? {
            continue;
        }
        let (photo, counter) = match viewer.lightbox() {
            Some(lb) => (lb.photo.clone(), lb.counter()),
            None => continue,
        };
        let scroll_locked = viewer.scroll_locked();

        let prev = key_target(viewer, id, index, Key::ArrowLeft)?;
        let next = key_target(viewer, id, index, Key::ArrowRight)?;

        viewer.activate_card(id, index, CardTrigger::Click)?;
        let closes_on_escape = viewer.handle_key(Key::Escape);
        viewer.activate_card(id, index, CardTrigger::Click)?;
        let closes_on_backdrop = viewer.click_overlay(OverlayTarget::Backdrop);
        viewer.close();

        pages.push(LightboxPage {
            index,
            counter,
            photo,
            prev,
            next,
            close: closes_on_escape && closes_on_backdrop,
            scroll_locked,
        });
    }
    Ok(pages)
}

/// Index the lightbox lands on after `key`, starting from `index`.
fn key_target(
    viewer: &mut ViewerController,
    id: GalleryId,
    index: usize,
    key: Key,
) -> Result<Option<usize>, ViewerError> {
    viewer.activate_card(id, index, CardTrigger::Click)?;
    viewer.handle_key(key);
    Ok(viewer
        .lightbox()
        .map(|lb| lb.index)
        .filter(|i| *i != index))
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body class=[body_class] {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Renders the site header with breadcrumb
fn site_header(breadcrumb: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
        }
    }
}

/// Grid/list buttons. Each layout has its own page, so switching never
/// re-fetches.
fn layout_toggle(current: LayoutMode) -> Markup {
    html! {
        nav.layout-toggle aria-label="Layout" {
            @for layout in [LayoutMode::Grid, LayoutMode::List] {
                @let active = layout == current;
                a.layout-button.active[active]
                    href={ (layout.as_str()) ".html" }
                    aria-pressed=(if active { "true" } else { "false" }) {
                    (if layout == LayoutMode::Grid { "Grid" } else { "List" })
                }
            }
        }
    }
}

/// Renders one photo card.
///
/// The card itself is the activation target (click, Enter, Space via
/// `nav.js`); the fullscreen link is a separate control whose clicks stop at
/// the link.
fn photo_card(index: usize, photo: &PhotoRecord, layout: LayoutMode) -> Markup {
    let href = format!("photo/{}.html", index + 1);
    html! {
        figure.photo-card tabindex="0" role="button" data-href=(href)
            aria-label={ "Open " (photo.title) } {
            img src=(photo.src) alt=(photo.title) loading="lazy";
            @if layout == LayoutMode::List {
                figcaption {
                    h3.photo-title { (photo.title) }
                    p.photo-description { (photo.description) }
                }
            }
            a.fullscreen-button href=(href) aria-label="View fullscreen" { "⤢" }
        }
    }
}

fn panel(class: &str, heading: &str, body: Markup) -> Markup {
    html! {
        section class={ "gallery-panel " (class) } {
            h2 { (heading) }
            (body)
        }
    }
}

/// Terminal panel for a destination without photos.
pub fn render_panel(gallery: &GalleryConfig, resolution: &Resolution) -> Markup {
    let name = &gallery.destination_name;
    match resolution {
        Resolution::Photos { .. } | Resolution::NoPhotos { .. } => panel(
            "panel-empty",
            "No Photos Yet",
            html! { p { "Photos from " (name) " haven't been added yet. Check back soon." } },
        ),
        Resolution::ComingSoon { .. } => panel(
            "panel-coming-soon",
            "Coming Soon",
            html! { p { "The " (name) " gallery is on its way." } },
        ),
        Resolution::Album { share_link } => panel(
            "panel-album",
            "View the Album",
            html! {
                p { "Photos from " (name) " live in a shared album." }
                a.album-link href=(share_link) target="_blank" rel="noopener" {
                    "Open shared album"
                }
            },
        ),
        Resolution::SourceFailed { attempt, share_link } => {
            render_failure_panel(name, attempt, share_link.as_deref())
        }
    }
}

/// Detailed panel for an explicitly requested source. The only place raw
/// failure text reaches a visitor.
fn render_failure_panel(name: &str, attempt: &SourceAttempt, share_link: Option<&str>) -> Markup {
    panel(
        "panel-error",
        "Couldn't Load Photos",
        html! {
            p { "The " (attempt.kind.label()) " source for " (name) " did not return any photos." }
            pre.failure-detail { (attempt.message) }
            @if let Some(link) = share_link {
                a.album-link href=(link) target="_blank" rel="noopener" {
                    "Open shared album instead"
                }
            }
        },
    )
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the index page with one card per destination
fn render_index(site_title: &str, destinations: &[DestinationPage], css: &str) -> Markup {
    let breadcrumb = html! {
        a href="index.html" { (site_title) }
    };

    let content = html! {
        (site_header(breadcrumb))
        main.index-page {
            div.destination-grid {
                @for page in destinations {
                    @let cover = page.resolution.photos().first();
                    a.destination-card href={ (page.gallery.slug) "/" } {
                        @if let Some(photo) = cover {
                            img src=(photo.src) alt=(page.gallery.destination_name) loading="lazy";
                        }
                        span.destination-title { (page.gallery.destination_name) }
                        @let count = page.resolution.photos().len();
                        @if count > 0 {
                            span.destination-count { (count) " photos" }
                        }
                    }
                }
            }
        }
    };

    base_document(site_title, css, None, content)
}

fn destination_breadcrumb(site_title: &str, gallery: &GalleryConfig, depth: usize) -> Markup {
    let up = "../".repeat(depth);
    html! {
        a href={ (up) "index.html" } { (site_title) }
        " › "
        (gallery.destination_name)
    }
}

/// Renders a destination's photo collection in one layout
fn render_gallery_page(
    site_title: &str,
    gallery: &GalleryConfig,
    photos: &[PhotoRecord],
    layout: LayoutMode,
    css: &str,
) -> Markup {
    let content = html! {
        (site_header(destination_breadcrumb(site_title, gallery, 1)))
        main.gallery-page {
            header.gallery-header {
                h1 { (gallery.destination_name) }
                @if gallery.show_mode_toggle {
                    (layout_toggle(layout))
                }
            }
            div id=(gallery.container_id) class={ "photo-collection layout-" (layout.as_str()) } {
                @for (idx, photo) in photos.iter().enumerate() {
                    (photo_card(idx, photo, layout))
                }
            }
        }
    };

    base_document(&gallery.destination_name, css, None, content)
}

/// Renders a destination whose resolution produced no photos
fn render_panel_page(site_title: &str, page: &DestinationPage, css: &str) -> Markup {
    let gallery = &page.gallery;
    let content = html! {
        (site_header(destination_breadcrumb(site_title, gallery, 1)))
        main.gallery-page {
            header.gallery-header {
                h1 { (gallery.destination_name) }
            }
            div id=(gallery.container_id) {
                (render_panel(gallery, &page.resolution))
            }
        }
    };

    base_document(&gallery.destination_name, css, None, content)
}

/// Renders one lightbox page. Targets missing at either end are left off, so
/// the keys there do nothing.
fn render_lightbox_page(
    site_title: &str,
    gallery: &GalleryConfig,
    lightbox: &LightboxPage,
    css: &str,
) -> Markup {
    let prev_url = lightbox.prev.map(|i| format!("{}.html", i + 1));
    let next_url = lightbox.next.map(|i| format!("{}.html", i + 1));
    let close_url = lightbox.close.then_some("../index.html");
    let page_title = format!("{} - {}", gallery.destination_name, lightbox.photo.title);

    let content = html! {
        (site_header(destination_breadcrumb(site_title, gallery, 2)))
        div.lightbox role="dialog" aria-modal="true" aria-label=(lightbox.photo.title)
            data-prev=[prev_url.as_deref()]
            data-next=[next_url.as_deref()]
            data-close=[close_url] {
            div.lightbox-backdrop {}
            figure.lightbox-content {
                img src=(lightbox.photo.src) alt=(lightbox.photo.title);
                figcaption {
                    h2.photo-title { (lightbox.photo.title) }
                    p.photo-description { (lightbox.photo.description) }
                    span.lightbox-counter { (lightbox.counter) }
                }
            }
            @if let Some(url) = &prev_url {
                a.lightbox-prev href=(url) aria-label="Previous photo" { "‹" }
            }
            @if let Some(url) = &next_url {
                a.lightbox-next href=(url) aria-label="Next photo" { "›" }
            }
            @if let Some(url) = close_url {
                a.lightbox-close href=(url) aria-label="Close" { "×" }
            }
        }
    };

    let body_class = lightbox.scroll_locked.then_some("lightbox-open");
    base_document(&page_title, css, body_class, content)
}

// ============================================================================
// Tests
// ============================================================================
