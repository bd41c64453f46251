//! Photo source adapters.
//!
//! Three sources can feed a gallery, each with its own loosely-typed JSON:
//!
//! | Source | Module | Payload |
//! |--------|--------|---------|
//! | Manifest API | [`api`] | `[{src|thumbnail|downloadUrl, title?, description?, name?}]` or `{photos: [...]}` |
//! | OneDrive share | [`onedrive`] | paged `{value: [...], @odata.nextLink?}` or `{children: [...], children@odata.nextLink?}` |
//! | Local manifest | [`local`] | `[{src, title?, description?, name?}]` or `{photos: [...]}` |
//!
//! Every payload row is parsed into one [`RawItem`] variant and then
//! normalized into a [`PhotoRecord`] by [`RawItem::normalize`]. Normalization
//! fails closed: a row that does not parse, has no resolvable `src`, or (for
//! shares) is not an image is dropped, never passed on half-filled.
//!
//! All network and file access goes through the [`Fetcher`] trait so the
//! adapters can be driven by an in-memory fetcher in tests.

pub mod api;
pub mod local;
pub mod onedrive;

use crate::config::{FetchConfig, GalleryConfig};
use crate::naming;
use crate::types::{LoadState, PhotoRecord};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub use api::fetch_api;
pub use local::fetch_local;
pub use onedrive::fetch_onedrive;

/// Why an adapter produced no photos.
///
/// The `Display` text doubles as the diagnostic message the resolver
/// inspects, so the empty-collection variants all mention "no image" or
/// "empty manifest".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("request to {url} failed with HTTP {status}")]
    RequestFailed { url: String, status: u16 },
    #[error("access to the shared folder is restricted (HTTP {status})")]
    AccessRestricted { status: u16 },
    #[error("manifest not found at {path} (HTTP {status})")]
    ManifestNotFound { path: String, status: u16 },
    #[error("API returned no images")]
    EmptyResult,
    #[error("no images found in shared folder")]
    NoImagesFound,
    #[error("empty manifest: {path} has no usable photos")]
    EmptyManifest { path: String },
    #[error("pagination did not terminate after {0} pages")]
    PaginationDidNotTerminate(usize),
    #[error("network error for {url}: {message}")]
    Transport { url: String, message: String },
    #[error("invalid JSON from {url}: {message}")]
    InvalidPayload { url: String, message: String },
    #[error("invalid source location {location:?}: {message}")]
    InvalidLocation { location: String, message: String },
}

impl SourceError {
    pub fn load_state(&self) -> LoadState {
        match self {
            SourceError::EmptyResult
            | SourceError::NoImagesFound
            | SourceError::EmptyManifest { .. } => LoadState::Empty,
            SourceError::ManifestNotFound { .. } => LoadState::Missing,
            SourceError::RequestFailed { status: 404, .. } => LoadState::Missing,
            _ => LoadState::Error,
        }
    }
}

impl From<&SourceError> for LoadState {
    fn from(error: &SourceError) -> Self {
        error.load_state()
    }
}

// ============================================================================
// Fetching
// ============================================================================

/// Raw response from a [`Fetcher`]: status code plus body text.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SourceError> {
        serde_json::from_str(&self.body).map_err(|e| SourceError::InvalidPayload {
            url: self.url.clone(),
            message: e.to_string(),
        })
    }
}

/// Retrieves a location and reports its status and body.
///
/// Non-success statuses are returned as responses, not errors; only
/// transport failures (DNS, timeouts, unreadable files) are `Err`.
pub trait Fetcher {
    fn get(&self, location: &str) -> Result<FetchResponse, SourceError>;
}

/// Production fetcher: HTTP(S) through a blocking reqwest client, anything
/// else read from the content root as a static file.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    root: PathBuf,
}

impl HttpFetcher {
    pub fn new(fetch: &FetchConfig, root: &Path) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .user_agent(fetch.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            root: root.to_path_buf(),
        })
    }

    fn get_file(&self, location: &str) -> Result<FetchResponse, SourceError> {
        let path = self.root.join(location.trim_start_matches('/'));
        match std::fs::read_to_string(&path) {
            Ok(body) => Ok(FetchResponse {
                url: location.to_string(),
                status: 200,
                body,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse {
                url: location.to_string(),
                status: 404,
                body: String::new(),
            }),
            Err(e) => Err(SourceError::Transport {
                url: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, location: &str) -> Result<FetchResponse, SourceError> {
        if !is_http(location) {
            return self.get_file(location);
        }
        log::debug!("GET {location}");
        let transport = |e: reqwest::Error| SourceError::Transport {
            url: location.to_string(),
            message: e.to_string(),
        };
        let resp = self
            .client
            .get(location)
            .header("Accept", "application/json")
            .send()
            .map_err(transport)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(transport)?;
        Ok(FetchResponse {
            url: location.to_string(),
            status,
            body,
        })
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// ============================================================================
// Normalization
// ============================================================================

/// Per-gallery inputs the normalization step needs.
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Site base URL; relative locations resolve against it.
    pub base_url: Url,
    pub destination: String,
    pub default_description: String,
}

impl SourceContext {
    pub fn new(gallery: &GalleryConfig, base_url: &Url) -> Self {
        Self {
            base_url: base_url.clone(),
            destination: gallery.destination_name.clone(),
            default_description: gallery.default_description.clone(),
        }
    }

    /// Absolute URL of a configured location (endpoint or manifest path).
    pub fn locate(&self, location: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(location.trim())
            .map_err(|e| SourceError::InvalidLocation {
                location: location.to_string(),
                message: e.to_string(),
            })
    }
}

/// Row from the manifest API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRow {
    pub src: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(rename = "downloadUrl")]
    pub download_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
}

/// Row from a local manifest file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalRow {
    pub src: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
}

/// Item from a OneDrive share listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareItem {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Present (any non-null value) when OneDrive recognised the file as an image.
    #[serde(default)]
    pub image: Option<Value>,
    pub file: Option<FileFacet>,
    #[serde(rename = "@content.downloadUrl")]
    pub content_download_url: Option<String>,
    #[serde(rename = "@microsoft.graph.downloadUrl")]
    pub graph_download_url: Option<String>,
    #[serde(rename = "webUrl")]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileFacet {
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
}

impl ShareItem {
    pub fn is_image(&self) -> bool {
        if self.image.as_ref().is_some_and(|v| !v.is_null()) {
            return true;
        }
        self.file
            .as_ref()
            .and_then(|f| f.mime_type.as_deref())
            .is_some_and(|m| m.trim().to_ascii_lowercase().starts_with("image/"))
    }

    /// First available download location.
    pub fn download_url(&self) -> Option<&str> {
        [
            &self.content_download_url,
            &self.graph_download_url,
            &self.web_url,
        ]
        .into_iter()
        .filter_map(|u| non_empty(u.as_deref()))
        .next()
    }

    /// Identity used for de-duplication: item id, else the download URL.
    pub fn dedup_key(&self) -> Option<String> {
        non_empty(self.id.as_deref())
            .or_else(|| self.download_url())
            .map(String::from)
    }

    pub fn sort_name(&self) -> &str {
        non_empty(self.name.as_deref())
            .or_else(|| self.download_url().map(naming::file_stem))
            .unwrap_or("")
    }
}

/// One source row before validation.
#[derive(Debug, Clone)]
pub enum RawItem {
    Api(ApiRow),
    Share(ShareItem),
    Local(LocalRow),
}

impl RawItem {
    /// Validate and normalize into a [`PhotoRecord`].
    ///
    /// `position` is the row's 0-based position, used for the `Photo N`
    /// title of rows with nothing better. `base` resolves relative `src`
    /// values. Returns `None` when the row has no usable image URL.
    pub fn normalize(
        &self,
        position: usize,
        base: &Url,
        ctx: &SourceContext,
    ) -> Option<PhotoRecord> {
        let (src, title, description, name) = match self {
            RawItem::Api(row) => (
                first_of(&[&row.src, &row.thumbnail, &row.download_url]),
                row.title.as_deref(),
                row.description.as_deref(),
                row.name.as_deref(),
            ),
            RawItem::Local(row) => (
                non_empty(row.src.as_deref()),
                row.title.as_deref(),
                row.description.as_deref(),
                row.name.as_deref(),
            ),
            RawItem::Share(item) => {
                if !item.is_image() {
                    return None;
                }
                (item.download_url(), None, None, item.name.as_deref())
            }
        };

        let src = resolve_src(src?, base)?;
        let title = non_empty(title)
            .map(String::from)
            .or_else(|| name.and_then(naming::title_from_filename))
            .or_else(|| naming::title_from_filename(&src))
            .unwrap_or_else(|| format!("Photo {}", position + 1));
        let description = non_empty(description)
            .map(String::from)
            .unwrap_or_else(|| {
                naming::describe_title(&title, &ctx.destination, &ctx.default_description)
            });

        Some(PhotoRecord {
            src,
            title,
            description,
        })
    }
}

/// Resolve a raw `src` to an absolute HTTP(S) URL string.
pub fn resolve_src(raw: &str, base: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let url = base.join(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Extract the row array from `[...]` or `{ "photos": [...] }`.
pub(crate) fn payload_rows(payload: Value, url: &str) -> Result<Vec<Value>, SourceError> {
    match payload {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => match map.remove("photos") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(SourceError::InvalidPayload {
                url: url.to_string(),
                message: "expected an array or an object with a \"photos\" array".into(),
            }),
        },
        _ => Err(SourceError::InvalidPayload {
            url: url.to_string(),
            message: "expected an array or an object with a \"photos\" array".into(),
        }),
    }
}

/// Parse rows into `RawItem`s with `wrap`, dropping rows that do not parse,
/// then normalize.
pub(crate) fn normalize_rows<T, F>(
    rows: Vec<Value>,
    wrap: F,
    base: &Url,
    ctx: &SourceContext,
) -> Vec<PhotoRecord>
where
    T: DeserializeOwned,
    F: Fn(T) -> RawItem,
{
    rows.into_iter()
        .enumerate()
        .filter_map(|(pos, row)| {
            let item = serde_json::from_value::<T>(row).ok().map(&wrap)?;
            item.normalize(pos, base, ctx)
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn first_of<'a>(values: &[&'a Option<String>]) -> Option<&'a str> {
    values.iter().filter_map(|v| non_empty(v.as_deref())).next()
}
