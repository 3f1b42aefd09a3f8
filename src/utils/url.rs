// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Force a possibly protocol-relative url onto the `https` scheme.
///
/// # Examples
/// ```
/// use salesfeed::utils::url::https_url;
///
/// assert_eq!(
///     https_url("//artist.bandcamp.com/album/x"),
///     "https://artist.bandcamp.com/album/x"
/// );
/// ```
pub fn https_url(url: &str) -> String {
    match url.split_once("//") {
        Some((_, rest)) => format!("https://{rest}"),
        None => format!("https://{url}"),
    }
}

/// Resolve a potentially relative URL against a base URL.
///
/// Falls back to `href` unchanged when the base cannot be parsed.
pub fn resolve_url(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
