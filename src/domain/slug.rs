//! Slug handling for content routes and generated anchors.
//!
//! Route slugs come straight from request paths and are checked before they
//! are handed to the content store. Anchors are derived with the `slug` crate
//! so headings and gallery items get stable, URL-safe fragment ids.

use slug::slugify;
use thiserror::Error;

const MAX_SLUG_CHARS: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug is empty")]
    Empty,
    #[error("slug exceeds {MAX_SLUG_CHARS} characters")]
    TooLong,
    #[error("slug `{0}` contains unsupported characters")]
    Unsupported(String),
}

/// Validate a slug captured from a request path.
///
/// Surrounding slashes and whitespace are ignored. Anything other than
/// alphanumerics, `-`, `_` and `.` is rejected.
pub fn validate_route_slug(raw: &str) -> Result<&str, SlugError> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(SlugError::Empty);
    }

    if trimmed.chars().count() > MAX_SLUG_CHARS {
        return Err(SlugError::TooLong);
    }

    let supported = trimmed
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if !supported {
        return Err(SlugError::Unsupported(trimmed.to_string()));
    }

    Ok(trimmed)
}

/// Derive a DOM id from free text, unique within a page through `index`.
pub fn anchor_for(text: &str, prefix: &str, index: usize) -> String {
    let base = slugify(text);
    if base.is_empty() {
        format!("{prefix}-{index}")
    } else {
        format!("{prefix}-{index}-{base}")
    }
}

/// CSS-friendly token for a category label (`Web Dev` → `web-dev`).
pub fn category_token(category: &str) -> String {
    let token = slugify(category);
    if token.is_empty() {
        "uncategorized".to_string()
    } else {
        token
    }
}
