//! Media identifier extraction from player script URLs.
//!
//! The lesson iframe embeds a Wistia player via
//! `<script src="https://fast.wistia.com/embed/medias/<id>.jsonp">`. The id
//! is the 4th slash-delimited path segment with the `.jsonp` suffix removed.

use url::Url;

/// Extract a media id from a script `src`, if it points at the player host.
///
/// Returns `None` for non-matching hosts (regardless of path shape) and for
/// URLs that don't parse or are too shallow.
pub fn media_id_from_src(src: &str, player_prefix: &str) -> Option<String> {
    if !src.starts_with(player_prefix) {
        return None;
    }
    let url = Url::parse(src).ok()?;
    let segment = url.path().split('/').nth(3)?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.strip_suffix(".jsonp").unwrap_or(segment).to_string())
}

/// Run [`media_id_from_src`] over every script source on a page, in order.
pub fn media_ids(sources: &[String], player_prefix: &str) -> Vec<String> {
    sources
        .iter()
        .filter_map(|src| media_id_from_src(src, player_prefix))
        .collect()
}
