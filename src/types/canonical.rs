//! Canonical URL helpers.

use url::Url;

/// Drop a `|version` suffix from a canonical reference.
pub fn strip_version(canonical: &str) -> &str {
    canonical
        .split_once('|')
        .map_or(canonical, |(url, _)| url)
}

/// The type or artifact name a canonical URL points at: its last path segment.
pub fn tail_name(canonical: &str) -> String {
    let canonical = strip_version(canonical);

    if let Ok(url) = Url::parse(canonical) {
        if let Some(last) = url
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|s| !s.is_empty())
        {
            return last.to_string();
        }
    }

    canonical
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(canonical)
        .to_string()
}
