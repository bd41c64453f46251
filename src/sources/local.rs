//! Local manifest adapter.
//!
//! Reads the JSON written by `travel-gal sync`. Entries carry site-relative
//! `src` paths (`images/australia/australia-1.jpg`) which resolve against the
//! site base URL. No `thumbnail`/`downloadUrl` fallback: a local row without
//! `src` is dropped.

use super::{Fetcher, RawItem, SourceContext, SourceError, normalize_rows, payload_rows};
use crate::types::PhotoRecord;
use serde_json::Value;

pub fn fetch_local(
    fetcher: &dyn Fetcher,
    json_path: &str,
    ctx: &SourceContext,
) -> Result<Vec<PhotoRecord>, SourceError> {
    let resp = fetcher.get(json_path)?;
    if !resp.is_success() {
        return Err(SourceError::ManifestNotFound {
            path: json_path.to_string(),
            status: resp.status,
        });
    }
    let payload: Value = resp.json()?;
    let rows = payload_rows(payload, json_path)?;
    let photos = normalize_rows(rows, RawItem::Local, &ctx.base_url, ctx);
    if photos.is_empty() {
        return Err(SourceError::EmptyManifest {
            path: json_path.to_string(),
        });
    }
    log::debug!("local {}: {} photos", json_path, photos.len());
    Ok(photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FakeFetcher, test_context};
    use serde_json::json;

    const PATH: &str = "data/australia.json";

    #[test]
    fn reads_manifest_rows() {
        let fetcher = FakeFetcher::new().json(
            PATH,
            json!([
                {"src": "images/australia/australia-1.jpg", "title": "Bondi", "name": "IMG_1.jpg"},
                {"src": "images/australia/australia-2.jpg", "name": "harbour-bridge.jpg"}
            ]),
        );
        let photos = fetch_local(&fetcher, PATH, &test_context()).unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(
            photos[0].src,
            "https://trips.example.com/images/australia/australia-1.jpg"
        );
        assert_eq!(photos[0].title, "Bondi");
        assert_eq!(photos[1].title, "harbour bridge");
        assert_eq!(photos[1].description, "Captured during Australia.");
    }

    #[test]
    fn ignores_thumbnail_fallback() {
        let fetcher = FakeFetcher::new().json(
            PATH,
            json!({"photos": [{"thumbnail": "https://cdn.example.com/t.jpg"}]}),
        );
        assert_eq!(
            fetch_local(&fetcher, PATH, &test_context()),
            Err(SourceError::EmptyManifest { path: PATH.into() })
        );
    }

    #[test]
    fn missing_file_is_manifest_not_found() {
        let fetcher = FakeFetcher::new();
        assert_eq!(
            fetch_local(&fetcher, PATH, &test_context()),
            Err(SourceError::ManifestNotFound {
                path: PATH.into(),
                status: 404
            })
        );
    }

    #[test]
    fn empty_manifest_message_is_classifiable() {
        let fetcher = FakeFetcher::new().json(PATH, json!([]));
        let err = fetch_local(&fetcher, PATH, &test_context()).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("empty manifest"));
    }
}
