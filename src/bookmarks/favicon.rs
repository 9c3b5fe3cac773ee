//! URL helpers shared by every bookmark codec.

use url::Url;

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";

/// Parse a bookmark target. Only absolute URLs are accepted.
pub fn parse_bookmark_url(raw: &str) -> Result<Url, url::ParseError> {
    Url::parse(raw.trim())
}

/// Host component of a URL, if it has one.
pub fn hostname_of(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_string())
}

/// Deterministic favicon location for a URL's host.
pub fn favicon_url_for(url: &Url) -> Option<String> {
    hostname_of(url).map(|host| format!("{}?domain={}&sz=64", FAVICON_SERVICE, host))
}
