//! Profile scope detection from the page a payload was observed on.

/// Top-level paths that are site sections rather than profile handles.
const RESERVED_PATHS: &[&str] = &[
    "reels",
    "explore",
    "direct",
    "stories",
    "accounts",
    "p",
    "reel",
    "tv",
    "about",
    "legal",
    "api",
    "static",
    "developer",
    "graphql",
    "web",
    "emails",
    "challenge",
    "oauth",
    "session",
    "nametag",
    "directory",
    "lite",
    "ar",
    "topics",
    "locations",
];

/// Returns the lowercase profile handle a page URL belongs to.
///
/// Accepts full URLs (`https://www.instagram.com/someone/reels/`) or bare
/// paths (`/someone/`). Returns `None` for site sections such as `/explore/`
/// or `/reel/<code>/`.
#[must_use]
pub fn profile_from_page_url(url: &str) -> Option<String> {
    let url = url.trim();
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let (_, path) = after_scheme.split_once('/')?;
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let handle = path.split('/').next().unwrap_or_default().to_lowercase();

    if handle.is_empty() || RESERVED_PATHS.contains(&handle.as_str()) {
        return None;
    }
    Some(handle)
}
