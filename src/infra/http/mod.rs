mod middleware;
mod public;
mod ui;

pub use public::{HttpState, build_router};

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;

use crate::domain::theme::{THEME_COOKIE, Theme};

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";

/// Element ids patched by the interactive endpoints.
pub(crate) mod selectors {
    pub const TOAST_STACK: &str = "#toast-stack";
    pub const GENERAL_RESULTS: &str = "#general-results";
    pub const REACTIONS: &str = "#reactions";
    pub const NEWSLETTER: &str = "#newsletter-form";
    pub const CONTACT: &str = "#contact-form";
    pub const TRIPS: &str = "#trips";
}

fn is_datastar(headers: &HeaderMap) -> bool {
    headers.contains_key(DATASTAR_REQUEST_HEADER)
}

/// Visitor theme from the cookie, or the site default when unset or unreadable.
fn visitor_theme(jar: &CookieJar, default: Theme) -> Theme {
    jar.get(THEME_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
        .unwrap_or(default)
}
