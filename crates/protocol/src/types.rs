//! Core domain types used across the wire.
//!
//! Notebooks and notes are value objects: fetched per request, never
//! mutated in place once handed to the executor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A notebook as returned by `listNotebooks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    /// Server-assigned notebook identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the service marks this notebook as the account default.
    #[serde(default)]
    pub is_default: bool,
}

/// A note, either outbound (no `id` yet) or as returned by the service.
///
/// `findNotes` returns metadata-only notes: `content` is empty and
/// `attachments` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Server-assigned identifier; absent until the note is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Identifier of the notebook this note belongs to.
    pub notebook_id: String,
    /// Note title.
    pub title: String,
    /// Note body markup. May reference attachments by content hash via
    /// `<media ... hash="..."/>` tags (see [`crate::markup`]).
    #[serde(default)]
    pub content: String,
    /// Binary attachments, in submission order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Note {
    /// Creates an outbound note with no attachments.
    pub fn new(
        notebook_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            notebook_id: notebook_id.into(),
            title: title.into(),
            content: content.into(),
            attachments: Vec::new(),
        }
    }
}

/// A binary attachment carried inside a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Raw bytes; base64-encoded on the wire.
    #[serde(with = "base64_blob")]
    pub bytes: Vec<u8>,
    /// 128-bit digest of `bytes`. Recomputed by the client at submission;
    /// a caller-supplied value is never trusted.
    pub content_hash: ContentHash,
}

impl Attachment {
    /// Creates an attachment with the hash computed from `bytes`.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let content_hash = ContentHash::of(&bytes);
        Self {
            mime_type: mime_type.into(),
            bytes,
            content_hash,
        }
    }

    /// Recomputes `content_hash` from the current bytes.
    ///
    /// Returns `true` if the stored hash was stale and had to be replaced.
    pub fn refresh_hash(&mut self) -> bool {
        let fresh = ContentHash::of(&self.bytes);
        let stale = self.content_hash != fresh;
        self.content_hash = fresh;
        stale
    }
}

/// 128-bit content digest, hex-encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes the digest of `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }

    /// Parses a 32-character lowercase or uppercase hex digest.
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut raw = [0u8; 16];
        hex::decode_to_slice(s, &mut raw).ok()?;
        Some(Self(raw))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex rendering, as embedded in markup media tags.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentHash::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid content hash: {s:?}")))
    }
}

/// Serde adapter encoding binary blobs as base64 strings on the wire.
mod base64_blob {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}
