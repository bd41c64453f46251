//! Filename-driven naming: display titles, descriptions, and natural ordering.
//!
//! Photos from cloud shares and synced folders rarely carry curated titles,
//! so the filename is the fallback source of truth:
//!
//! - `sunset_over-uluru.jpg` → "sunset over uluru"
//! - `20240312_151500.jpg` → "12 Mar 2024, 03:15 PM" (camera timestamp)
//!
//! Descriptions are derived from titles: when the title carries a date like
//! `12 Mar 2024`, the description reads "Captured on 12 Mar 2024, 03:15 PM.".
//! Anything else falls back to a caller-supplied default.
//!
//! ## Natural Ordering
//!
//! Share listings arrive in provider order. [`natural_cmp`] sorts them the way
//! a person would: `img1, img2, img10`, not `img1, img10, img2`.

use chrono::NaiveDateTime;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static TIMESTAMP_STEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{8})_(\d{6})").expect("timestamp regex"));

static DAY_MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}\s[A-Za-z]{3}\s\d{4}").expect("date regex"));

/// Strip the extension from the last path segment of a name or URL.
///
/// Query strings and fragments are ignored, so download URLs such as
/// `https://host/a/IMG_01.jpg?download=1` yield `IMG_01`.
pub fn file_stem(name: &str) -> &str {
    let without_query = name.split(['?', '#']).next().unwrap_or(name);
    let segment = without_query
        .rsplit('/')
        .next()
        .unwrap_or(without_query);
    match segment.rfind('.') {
        Some(0) | None => segment,
        Some(pos) => &segment[..pos],
    }
}

/// Parse a camera-style `YYYYMMDD_HHMMSS` prefix into a display timestamp.
pub fn timestamp_title(stem: &str) -> Option<String> {
    let caps = TIMESTAMP_STEM.captures(stem)?;
    let raw = format!("{}{}", &caps[1], &caps[2]);
    let dt = NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S").ok()?;
    Some(dt.format("%d %b %Y, %I:%M %p").to_string())
}

/// Display title for a filename: timestamp form when the stem is a camera
/// timestamp, otherwise the stem with `-` and `_` turned into spaces.
/// Returns `None` when nothing readable remains.
pub fn title_from_filename(name: &str) -> Option<String> {
    let stem = file_stem(name.trim()).trim();
    if let Some(title) = timestamp_title(stem) {
        return Some(title);
    }
    let pretty = stem
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!pretty.is_empty()).then_some(pretty)
}

/// Derive a description from a title.
///
/// A leading `"<destination> - "` is dropped first. If what remains contains
/// a `D[D] Mon YYYY` date, the description is `Captured on <rest>.`;
/// otherwise `fallback` is returned.
pub fn describe_title(title: &str, destination: &str, fallback: &str) -> String {
    let title = title.trim();
    let destination = destination.trim();
    let mut detail = title;
    if !destination.is_empty() {
        let prefix = format!("{destination} - ");
        if title.len() >= prefix.len()
            && title.is_char_boundary(prefix.len())
            && title[..prefix.len()].eq_ignore_ascii_case(&prefix)
        {
            detail = title[prefix.len()..].trim();
        }
    }
    if !detail.is_empty() && DAY_MONTH_YEAR.is_match(detail) {
        format!("Captured on {detail}.")
    } else {
        fallback.to_string()
    }
}

/// `"gold-coast"` → `"Gold Coast"`. Splits on `-`, `_` and whitespace.
pub fn title_case(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased, dash-separated slug (`"Gold Coast!"` → `"gold-coast"`).
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "photo".to_string()
    } else {
        slug
    }
}

/// Compare two names in natural order: case-insensitive, with runs of ASCII
/// digits compared by numeric value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(&b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let lnum = take_digits(&mut left);
                let rnum = take_digits(&mut right);
                let ord = compare_digit_runs(&lnum, &rnum);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        run.push(c);
        chars.next();
    }
    run
}

// Leading zeros are ignored for magnitude; longer runs win ties ("01" after "1").
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}
