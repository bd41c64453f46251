//! OneDrive shared-folder adapter.
//!
//! Anonymous share listings go through the sharing API: the share link is
//! encoded as an opaque share id (`u!` + URL-safe base64 of the link, padding
//! stripped) and several listing endpoints are tried in order, since which
//! one answers depends on the kind of share (folder vs album) and the
//! provider's mood.
//!
//! ## Paging
//!
//! Listings are paged through `@odata.nextLink` (or `children@odata.nextLink`
//! for the `?expand=children` form). Pages are fetched one after another and
//! capped at [`MAX_PAGES`]; a listing that still has a next link after the
//! cap is treated as broken ([`SourceError::PaginationDidNotTerminate`])
//! rather than followed forever.
//!
//! ## Mapping
//!
//! Entries are filtered to images, de-duplicated by item id (or download URL
//! when the id is missing), sorted naturally by filename, then normalized.

use super::{Fetcher, RawItem, ShareItem, SourceContext, SourceError};
use crate::naming;
use crate::types::PhotoRecord;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// Upper bound on pages followed for one endpoint.
pub const MAX_PAGES: usize = 100;

/// Encode a share link as a sharing-API share id.
pub fn share_id(share_link: &str) -> String {
    format!("u!{}", URL_SAFE_NO_PAD.encode(share_link.trim().as_bytes()))
}

/// Listing endpoints for a share id, in the order they are tried.
pub fn listing_endpoints(share_id: &str) -> Vec<String> {
    vec![
        format!("https://api.onedrive.com/v1.0/shares/{share_id}/root/children"),
        format!("https://api.onedrive.com/v1.0/shares/{share_id}/driveItem/children"),
        format!("https://graph.microsoft.com/v1.0/shares/{share_id}/driveItem/children"),
        format!("https://api.onedrive.com/v1.0/shares/{share_id}/root?expand=children"),
    ]
}

/// Fetch every photo in a shared folder.
pub fn fetch_onedrive(
    fetcher: &dyn Fetcher,
    share_link: &str,
    ctx: &SourceContext,
) -> Result<Vec<PhotoRecord>, SourceError> {
    let id = share_id(share_link);
    let mut restricted = None;
    let mut saw_empty_listing = false;
    let mut last_error = None;
    let mut entries = Vec::new();

    for endpoint in listing_endpoints(&id) {
        match fetch_all_pages(fetcher, &endpoint) {
            Ok(items) if !items.is_empty() => {
                log::debug!("onedrive: {} entries from {}", items.len(), endpoint);
                entries = items;
                break;
            }
            Ok(_) => {
                log::debug!("onedrive: {endpoint} listed no entries");
                saw_empty_listing = true;
            }
            Err(e @ SourceError::PaginationDidNotTerminate(_)) => return Err(e),
            Err(e @ SourceError::AccessRestricted { .. }) => {
                log::debug!("onedrive: {endpoint}: {e}");
                restricted = Some(e);
            }
            Err(e) => {
                log::debug!("onedrive: {endpoint}: {e}");
                last_error = Some(e);
            }
        }
    }

    if entries.is_empty() {
        return Err(restricted
            .or(saw_empty_listing.then_some(SourceError::NoImagesFound))
            .or(last_error)
            .unwrap_or(SourceError::NoImagesFound));
    }

    let base = Url::parse("https://api.onedrive.com/").expect("static url");
    map_share_items(entries, &base, ctx)
}

/// Follow a paged listing from `first_url` and concatenate all entries in
/// page order.
pub fn fetch_all_pages(fetcher: &dyn Fetcher, first_url: &str) -> Result<Vec<Value>, SourceError> {
    let mut entries = Vec::new();
    let mut next = Some(first_url.to_string());
    let mut pages = 0;

    while let Some(url) = next.take() {
        if pages == MAX_PAGES {
            return Err(SourceError::PaginationDidNotTerminate(MAX_PAGES));
        }
        let resp = fetcher.get(&url)?;
        match resp.status {
            401 | 403 => return Err(SourceError::AccessRestricted { status: resp.status }),
            _ if !resp.is_success() => {
                return Err(SourceError::RequestFailed {
                    url: resp.url,
                    status: resp.status,
                });
            }
            _ => {}
        }
        let page: Value = resp.json()?;
        pages += 1;
        let (items, next_link) = split_page(page);
        entries.extend(items);
        next = next_link;
    }

    Ok(entries)
}

/// Pull entries and the next-page link out of either listing shape.
fn split_page(page: Value) -> (Vec<Value>, Option<String>) {
    let Value::Object(mut map) = page else {
        return (Vec::new(), None);
    };
    let items = match map.remove("value").or_else(|| map.remove("children")) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let next = ["@odata.nextLink", "children@odata.nextLink"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);
    (items, next)
}

/// Filter, de-duplicate, sort and normalize raw listing entries.
pub fn map_share_items(
    entries: Vec<Value>,
    base: &Url,
    ctx: &SourceContext,
) -> Result<Vec<PhotoRecord>, SourceError> {
    let mut seen = HashSet::new();
    let mut items: Vec<ShareItem> = entries
        .into_iter()
        .filter_map(|v| serde_json::from_value::<ShareItem>(v).ok())
        .filter(|item| item.is_image() && item.download_url().is_some())
        .filter(|item| item.dedup_key().is_some_and(|key| seen.insert(key)))
        .collect();

    items.sort_by(|a, b| naming::natural_cmp(a.sort_name(), b.sort_name()));

    let photos: Vec<PhotoRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(pos, item)| RawItem::Share(item).normalize(pos, base, ctx))
        .collect();

    if photos.is_empty() {
        return Err(SourceError::NoImagesFound);
    }
    Ok(photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FakeFetcher, share_entry, test_context};
    use serde_json::json;

    const LINK: &str = "https://1drv.ms/f/s!AbCdEf?e=xyz";

    fn first_endpoint() -> String {
        listing_endpoints(&share_id(LINK))[0].clone()
    }

    #[test]
    fn share_id_is_url_safe_and_unpadded() {
        // "a?" encodes to "YT8=" in standard base64
        assert_eq!(share_id("a?"), "u!YT8");
        let id = share_id("https://1drv.ms/a/c/97c5e937e7e76f1c/IgAdpW4YCcYNRaVSD1LgqJZpATYP0xKXm44REXTqb0BANCc");
        assert!(id.starts_with("u!aHR0cHM6"));
        assert!(!id.contains('=') && !id.contains('+') && !id.contains('/'));
    }

    #[test]
    fn pages_are_concatenated_in_order() {
        let url1 = "https://api.example.com/p1";
        let fetcher = FakeFetcher::new()
            .json(
                url1,
                json!({"value": [share_entry("1", "a.jpg"), share_entry("2", "b.jpg")],
                       "@odata.nextLink": "https://api.example.com/p2"}),
            )
            .json(
                "https://api.example.com/p2",
                json!({"value": [share_entry("3", "c.jpg"), share_entry("4", "d.jpg")],
                       "@odata.nextLink": "https://api.example.com/p3"}),
            )
            .json(
                "https://api.example.com/p3",
                json!({"value": [share_entry("5", "e.jpg"), share_entry("6", "f.jpg")]}),
            );

        let entries = fetch_all_pages(&fetcher, url1).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn children_shape_is_followed() {
        let fetcher = FakeFetcher::new()
            .json(
                "https://x/root",
                json!({"children": [share_entry("1", "a.jpg")],
                       "children@odata.nextLink": "https://x/next"}),
            )
            .json("https://x/next", json!({"children": [share_entry("2", "b.jpg")]}));
        assert_eq!(fetch_all_pages(&fetcher, "https://x/root").unwrap().len(), 2);
    }

    #[test]
    fn endless_pagination_is_fatal() {
        let mut fetcher = FakeFetcher::new();
        for i in 0..=MAX_PAGES + 5 {
            fetcher = fetcher.json(
                &format!("https://loop.example/{i}"),
                json!({"value": [share_entry(&i.to_string(), "x.jpg")],
                       "@odata.nextLink": format!("https://loop.example/{}", i + 1)}),
            );
        }
        assert_eq!(
            fetch_all_pages(&fetcher, "https://loop.example/0"),
            Err(SourceError::PaginationDidNotTerminate(MAX_PAGES))
        );
        assert_eq!(fetcher.request_count(), MAX_PAGES);
    }

    #[test]
    fn self_referencing_next_link_terminates() {
        let fetcher = FakeFetcher::new().json(
            "https://loop.example/self",
            json!({"value": [], "@odata.nextLink": "https://loop.example/self"}),
        );
        assert_eq!(
            fetch_all_pages(&fetcher, "https://loop.example/self"),
            Err(SourceError::PaginationDidNotTerminate(MAX_PAGES))
        );
    }

    #[test]
    fn exactly_max_pages_is_fine() {
        let mut fetcher = FakeFetcher::new();
        for i in 0..MAX_PAGES {
            let mut page = json!({"value": [share_entry(&i.to_string(), "x.jpg")]});
            if i + 1 < MAX_PAGES {
                page["@odata.nextLink"] = json!(format!("https://p.example/{}", i + 1));
            }
            fetcher = fetcher.json(&format!("https://p.example/{i}"), page);
        }
        assert_eq!(fetch_all_pages(&fetcher, "https://p.example/0").unwrap().len(), MAX_PAGES);
    }

    #[test]
    fn natural_sort_and_dedup() {
        let ctx = test_context();
        let base = Url::parse("https://api.onedrive.com/").unwrap();
        let entries = vec![
            share_entry("a", "img10.jpg"),
            share_entry("b", "img2.jpg"),
            share_entry("c", "img1.jpg"),
            share_entry("b", "img2.jpg"),
        ];
        let photos = map_share_items(entries, &base, &ctx).unwrap();
        let titles: Vec<&str> = photos.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["img1", "img2", "img10"]);
    }

    #[test]
    fn dedup_by_url_without_id() {
        let ctx = test_context();
        let base = Url::parse("https://api.onedrive.com/").unwrap();
        let entry = json!({"name": "a.jpg", "image": {},
                           "@content.downloadUrl": "https://dl.example/a.jpg"});
        let photos = map_share_items(vec![entry.clone(), entry], &base, &ctx).unwrap();
        assert_eq!(photos.len(), 1);
    }

    #[test]
    fn non_images_are_filtered() {
        let ctx = test_context();
        let base = Url::parse("https://api.onedrive.com/").unwrap();
        let entries = vec![
            json!({"id": "f", "name": "Subfolder", "folder": {"childCount": 3}}),
            json!({"id": "v", "name": "clip.mp4", "file": {"mimeType": "video/mp4"},
                   "@content.downloadUrl": "https://dl.example/clip.mp4"}),
        ];
        assert_eq!(
            map_share_items(entries, &base, &ctx),
            Err(SourceError::NoImagesFound)
        );
    }

    #[test]
    fn dated_filenames_get_captured_on_description() {
        let ctx = test_context();
        let base = Url::parse("https://api.onedrive.com/").unwrap();
        let photos =
            map_share_items(vec![share_entry("1", "20231224_083000.jpg")], &base, &ctx).unwrap();
        assert_eq!(photos[0].title, "24 Dec 2023, 08:30 AM");
        assert_eq!(photos[0].description, "Captured on 24 Dec 2023, 08:30 AM.");
    }

    #[test]
    fn stops_at_first_endpoint_with_entries() {
        let endpoints = listing_endpoints(&share_id(LINK));
        let fetcher = FakeFetcher::new()
            .status(&endpoints[0], 404)
            .json(&endpoints[1], json!({"value": [share_entry("1", "a.jpg")]}))
            .json(&endpoints[2], json!({"value": [share_entry("2", "b.jpg")]}));
        let photos = fetch_onedrive(&fetcher, LINK, &test_context()).unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].title, "a");
        assert!(!fetcher.was_requested(&endpoints[2]));
    }

    #[test]
    fn forbidden_everywhere_is_access_restricted() {
        let mut fetcher = FakeFetcher::new();
        for endpoint in listing_endpoints(&share_id(LINK)) {
            fetcher = fetcher.status(&endpoint, 403);
        }
        assert_eq!(
            fetch_onedrive(&fetcher, LINK, &test_context()),
            Err(SourceError::AccessRestricted { status: 403 })
        );
    }

    #[test]
    fn empty_listing_is_no_images_found() {
        let fetcher = FakeFetcher::new().json(&first_endpoint(), json!({"value": []}));
        let err = fetch_onedrive(&fetcher, LINK, &test_context()).unwrap_err();
        assert_eq!(err, SourceError::NoImagesFound);
        assert!(err.to_string().contains("no image"));
    }

    #[test]
    fn unreachable_everywhere_is_request_failed() {
        let fetcher = FakeFetcher::new();
        assert!(matches!(
            fetch_onedrive(&fetcher, LINK, &test_context()),
            Err(SourceError::RequestFailed { status: 404, .. })
        ));
    }
}
