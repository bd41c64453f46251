//! Shared test utilities: an in-memory [`Fetcher`], source contexts, and
//! photo/listing builders.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fetcher = FakeFetcher::new()
//!     .json("https://api.example.com/photos", json!([{"src": "a.jpg"}]))
//!     .status("https://broken.example.com/", 500);
//! let photos = fetch_api(&fetcher, "https://api.example.com/photos", &test_context())?;
//! assert!(fetcher.was_requested("https://api.example.com/photos"));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;
use url::Url;

use crate::config::GalleryConfig;
use crate::sources::{FetchResponse, Fetcher, SourceContext, SourceError};
use crate::types::PhotoRecord;

pub const TEST_BASE_URL: &str = "https://trips.example.com/";

// =========================================================================
// Fake fetcher
// =========================================================================

enum Canned {
    Response { status: u16, body: String },
    TransportError(String),
}

/// In-memory fetcher. Unknown locations answer 404; every request is logged
/// so tests can assert on what was (not) fetched.
#[derive(Default)]
pub struct FakeFetcher {
    routes: HashMap<String, Canned>,
    requests: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` as a 200 JSON response at `location`.
    pub fn json(self, location: &str, value: Value) -> Self {
        self.body(location, 200, &value.to_string())
    }

    /// Serve an empty body with `status`.
    pub fn status(self, location: &str, status: u16) -> Self {
        self.body(location, status, "")
    }

    pub fn body(mut self, location: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            location.to_string(),
            Canned::Response {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Fail `location` at the transport level (e.g. DNS failure).
    pub fn unreachable(mut self, location: &str) -> Self {
        self.routes.insert(
            location.to_string(),
            Canned::TransportError("connection refused".into()),
        );
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn was_requested(&self, location: &str) -> bool {
        self.requests.borrow().iter().any(|r| r == location)
    }
}

impl Fetcher for FakeFetcher {
    fn get(&self, location: &str) -> Result<FetchResponse, SourceError> {
        self.requests.borrow_mut().push(location.to_string());
        match self.routes.get(location) {
            Some(Canned::Response { status, body }) => Ok(FetchResponse {
                url: location.to_string(),
                status: *status,
                body: body.clone(),
            }),
            Some(Canned::TransportError(message)) => Err(SourceError::Transport {
                url: location.to_string(),
                message: message.clone(),
            }),
            None => Ok(FetchResponse {
                url: location.to_string(),
                status: 404,
                body: String::new(),
            }),
        }
    }
}

// =========================================================================
// Builders
// =========================================================================

pub fn test_base_url() -> Url {
    Url::parse(TEST_BASE_URL).unwrap()
}

/// Gallery config for "Australia" with no sources configured.
pub fn test_gallery() -> GalleryConfig {
    GalleryConfig::new("australia", "Australia")
}

/// Source context for "Australia" on the test base URL.
pub fn test_context() -> SourceContext {
    SourceContext::new(&test_gallery(), &test_base_url())
}

/// A OneDrive listing entry for an image with a download URL.
pub fn share_entry(id: &str, name: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "file": {"mimeType": "image/jpeg"},
        "@content.downloadUrl": format!("https://dl.example.com/{id}/{name}"),
    })
}

/// `n` distinct photos titled "Photo 1".."Photo n".
pub fn sample_photos(n: usize) -> Vec<PhotoRecord> {
    (1..=n)
        .map(|i| PhotoRecord {
            src: format!("https://cdn.example.com/{i}.jpg"),
            title: format!("Photo {i}"),
            description: format!("Description {i}"),
        })
        .collect()
}
