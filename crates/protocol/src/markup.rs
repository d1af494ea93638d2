//! Note-body markup helpers.
//!
//! Note content may embed attachments by digest:
//!
//! ```text
//! <media type="image/png" hash="d41d8cd98f00b204e9800998ecf8427e"/>
//! ```
//!
//! The client promises every referenced hash resolves to an attachment in
//! the same note, so the scanner here is the basis of that check.

use crate::types::ContentHash;
use regex_lite::Regex;
use std::sync::OnceLock;

fn media_hash_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<media\b[^>]*?\bhash="([0-9a-fA-F]{32})""#).expect("static pattern")
    })
}

/// Extracts every attachment digest referenced by `<media>` tags, in
/// document order. Malformed hash attributes are skipped, not errors; the
/// tag simply fails to reference anything.
pub fn media_references(markup: &str) -> Vec<ContentHash> {
    media_hash_pattern()
        .captures_iter(markup)
        .filter_map(|caps| ContentHash::from_hex(&caps[1]))
        .collect()
}

/// Renders a media tag referencing an attachment by digest.
pub fn media_tag(mime_type: &str, hash: &ContentHash) -> String {
    format!(r#"<media type="{mime_type}" hash="{hash}"/>"#)
}
