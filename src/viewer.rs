//! Gallery viewer state: layout mode per gallery and a single lightbox session.
//!
//! A page may hold several galleries, but keyboard input is page-wide, so only
//! one lightbox may react to it. [`ViewerController`] owns every registered
//! [`Gallery`] and at most one open session; key and pointer events are fed to
//! the controller, which routes them to the session owner or drops them.
//!
//! ```text
//!            open_fullscreen(g, i)
//!   Closed ─────────────────────────▶ Open { g, i }
//!     ▲                                 │  ArrowLeft / ArrowRight
//!     │  Escape, backdrop click,        │  navigate(±1), clamped
//!     └──── close(), close_gallery(g) ──┘
//! ```
//!
//! Opening a second gallery replaces the session; it never stacks. The static
//! renderer in [`crate::generate`] drives the same controller to compute each
//! lightbox page's previous/next/close targets.

use crate::types::{LayoutMode, PhotoRecord};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    #[error("no gallery registered with id {0}")]
    UnknownGallery(usize),
    #[error("photo index {index} out of range for gallery of {len} photos")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Handle to a gallery registered with a [`ViewerController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GalleryId(usize);

/// One rendered gallery and its viewing state.
#[derive(Debug, Clone)]
pub struct Gallery {
    container_id: String,
    photos: Vec<PhotoRecord>,
    layout: LayoutMode,
    current_index: usize,
}

impl Gallery {
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// A gallery with no photos renders a panel instead of cards and can never
    /// open a lightbox.
    pub fn is_live(&self) -> bool {
        !self.photos.is_empty()
    }
}

/// Keys the viewer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Other,
}

/// Where a click on the open overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTarget {
    Backdrop,
    Content,
}

/// How a card was activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTrigger {
    Click,
    Key(Key),
    /// The card's dedicated "view fullscreen" control. Handled here and not
    /// propagated to the card, so it opens exactly once.
    FullscreenButton,
}

/// Snapshot of the open lightbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lightbox<'a> {
    pub gallery: GalleryId,
    pub index: usize,
    pub total: usize,
    pub photo: &'a PhotoRecord,
}

impl Lightbox<'_> {
    /// 1-based position label, e.g. "3 / 12".
    pub fn counter(&self) -> String {
        format!("{} / {}", self.index + 1, self.total)
    }
}

#[derive(Debug, Default)]
pub struct ViewerController {
    galleries: Vec<Gallery>,
    active: Option<GalleryId>,
    scroll_locked: bool,
    opened: usize,
}

impl ViewerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        container_id: &str,
        photos: Vec<PhotoRecord>,
        layout: LayoutMode,
    ) -> GalleryId {
        self.galleries.push(Gallery {
            container_id: container_id.to_string(),
            photos,
            layout,
            current_index: 0,
        });
        GalleryId(self.galleries.len() - 1)
    }

    pub fn gallery(&self, id: GalleryId) -> Result<&Gallery, ViewerError> {
        self.galleries
            .get(id.0)
            .ok_or(ViewerError::UnknownGallery(id.0))
    }

    fn gallery_mut(&mut self, id: GalleryId) -> Result<&mut Gallery, ViewerError> {
        self.galleries
            .get_mut(id.0)
            .ok_or(ViewerError::UnknownGallery(id.0))
    }

    /// Switch a gallery's layout. Photos are kept as they are.
    pub fn set_layout(&mut self, id: GalleryId, layout: LayoutMode) -> Result<(), ViewerError> {
        self.gallery_mut(id)?.layout = layout;
        Ok(())
    }

    /// Open (or replace) the lightbox session at `photos[index]`.
    pub fn open_fullscreen(&mut self, id: GalleryId, index: usize) -> Result<(), ViewerError> {
        let gallery = self.gallery_mut(id)?;
        let len = gallery.photos.len();
        if index >= len {
            return Err(ViewerError::IndexOutOfRange { index, len });
        }
        gallery.current_index = index;
        if let Some(previous) = self.active.filter(|p| *p != id) {
            log::debug!("lightbox moves from gallery {} to {}", previous.0, id.0);
        }
        self.active = Some(id);
        self.scroll_locked = true;
        self.opened += 1;
        Ok(())
    }

    /// Move the open lightbox by `delta`, clamped to the photo range.
    ///
    /// Returns the index after the move, or `None` when nothing is open.
    pub fn navigate(&mut self, delta: isize) -> Option<usize> {
        let id = self.active?;
        let gallery = self.galleries.get_mut(id.0)?;
        let last = gallery.photos.len().saturating_sub(1);
        let target = gallery.current_index.saturating_add_signed(delta).min(last);
        gallery.current_index = target;
        Some(target)
    }

    /// Close the session, if any. Returns whether one was open.
    pub fn close(&mut self) -> bool {
        self.scroll_locked = false;
        self.active.take().is_some()
    }

    /// Close only if `id` owns the session.
    pub fn close_gallery(&mut self, id: GalleryId) -> bool {
        if self.active == Some(id) {
            self.close()
        } else {
            false
        }
    }

    /// Page-level key handler. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if self.active.is_none() {
            return false;
        }
        match key {
            Key::Escape => self.close(),
            Key::ArrowLeft => self.navigate(-1).is_some(),
            Key::ArrowRight => self.navigate(1).is_some(),
            Key::Enter | Key::Space | Key::Other => false,
        }
    }

    /// Click on the open overlay. Only the backdrop closes it.
    pub fn click_overlay(&mut self, target: OverlayTarget) -> bool {
        match target {
            OverlayTarget::Backdrop => self.close(),
            OverlayTarget::Content => false,
        }
    }

    /// Card activation. Returns whether the lightbox was opened.
    pub fn activate_card(
        &mut self,
        id: GalleryId,
        index: usize,
        trigger: CardTrigger,
    ) -> Result<bool, ViewerError> {
        match trigger {
            CardTrigger::Click
            | CardTrigger::FullscreenButton
            | CardTrigger::Key(Key::Enter | Key::Space) => {
                self.open_fullscreen(id, index)?;
                Ok(true)
            }
            CardTrigger::Key(_) => Ok(false),
        }
    }

    pub fn active(&self) -> Option<GalleryId> {
        self.active
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Number of times a lightbox has been opened.
    pub fn open_count(&self) -> usize {
        self.opened
    }

    pub fn lightbox(&self) -> Option<Lightbox<'_>> {
        let id = self.active?;
        let gallery = self.galleries.get(id.0)?;
        Some(Lightbox {
            gallery: id,
            index: gallery.current_index,
            total: gallery.photos.len(),
            photo: gallery.photos.get(gallery.current_index)?,
        })
    }
}
