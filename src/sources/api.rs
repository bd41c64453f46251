//! Manifest API adapter: one GET returning a JSON photo list.

use super::{Fetcher, RawItem, SourceContext, SourceError, normalize_rows, payload_rows};
use crate::types::PhotoRecord;
use serde_json::Value;

/// Fetch and normalize photos from a manifest API endpoint.
///
/// Relative `src` values resolve against the endpoint URL.
pub fn fetch_api(
    fetcher: &dyn Fetcher,
    endpoint: &str,
    ctx: &SourceContext,
) -> Result<Vec<PhotoRecord>, SourceError> {
    let url = ctx.locate(endpoint)?;
    let resp = fetcher.get(url.as_str())?;
    if !resp.is_success() {
        return Err(SourceError::RequestFailed {
            url: resp.url,
            status: resp.status,
        });
    }
    let payload: Value = resp.json()?;
    let rows = payload_rows(payload, &resp.url)?;
    let photos = normalize_rows(rows, RawItem::Api, &url, ctx);
    if photos.is_empty() {
        return Err(SourceError::EmptyResult);
    }
    log::debug!("api {}: {} photos", url, photos.len());
    Ok(photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FakeFetcher, test_context};
    use crate::types::LoadState;
    use serde_json::json;

    const ENDPOINT: &str = "https://api.example.com/trips/australia";

    #[test]
    fn maps_rows_with_fallbacks() {
        let fetcher = FakeFetcher::new().json(
            ENDPOINT,
            json!({"photos": [
                {"src": "https://cdn.example.com/1.jpg", "title": "Uluru"},
                {"thumbnail": "thumbs/2.jpg", "name": "20240312_151500.jpg"},
                {"downloadUrl": "https://cdn.example.com/3.jpg", "description": "Reef"},
                {"title": "no source"}
            ]}),
        );
        let photos = fetch_api(&fetcher, ENDPOINT, &test_context()).unwrap();

        assert_eq!(photos.len(), 3);
        assert_eq!(photos[0].title, "Uluru");
        assert_eq!(photos[1].src, "https://api.example.com/trips/thumbs/2.jpg");
        assert_eq!(photos[1].title, "12 Mar 2024, 03:15 PM");
        assert_eq!(photos[1].description, "Captured on 12 Mar 2024, 03:15 PM.");
        assert_eq!(photos[2].title, "3");
        assert_eq!(photos[2].description, "Reef");
        for p in &photos {
            assert!(!p.src.is_empty() && !p.title.is_empty() && !p.description.is_empty());
        }
    }

    #[test]
    fn accepts_bare_array() {
        let fetcher =
            FakeFetcher::new().json(ENDPOINT, json!([{"src": "https://cdn.example.com/a.jpg"}]));
        assert_eq!(fetch_api(&fetcher, ENDPOINT, &test_context()).unwrap().len(), 1);
    }

    #[test]
    fn non_success_status_is_request_failed() {
        let fetcher = FakeFetcher::new().status(ENDPOINT, 500);
        assert_eq!(
            fetch_api(&fetcher, ENDPOINT, &test_context()),
            Err(SourceError::RequestFailed {
                url: ENDPOINT.into(),
                status: 500
            })
        );
    }

    #[test]
    fn zero_usable_rows_is_empty_result() {
        let fetcher = FakeFetcher::new().json(ENDPOINT, json!({"photos": [{"title": "x"}]}));
        let err = fetch_api(&fetcher, ENDPOINT, &test_context()).unwrap_err();
        assert_eq!(err, SourceError::EmptyResult);
        assert!(err.to_string().contains("no image"));
    }

    #[test]
    fn unparseable_endpoint_fails_without_fetching() {
        let fetcher = FakeFetcher::new().json(
            crate::test_helpers::TEST_BASE_URL,
            json!([{"src": "https://cdn.example.com/home.jpg"}]),
        );
        let err = fetch_api(&fetcher, "https://[not-a-host/photos", &test_context()).unwrap_err();
        assert!(matches!(err, SourceError::InvalidLocation { .. }));
        assert_eq!(err.load_state(), LoadState::Error);
        assert_eq!(fetcher.request_count(), 0);
    }

    #[test]
    fn malformed_json_is_invalid_payload() {
        let fetcher = FakeFetcher::new().body(ENDPOINT, 200, "<html>oops</html>");
        assert!(matches!(
            fetch_api(&fetcher, ENDPOINT, &test_context()),
            Err(SourceError::InvalidPayload { .. })
        ));
    }
}
