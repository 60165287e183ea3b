use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::ItemId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when constructing a review item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("review item text must not be empty")]
    EmptyText,
}

//
// ─── MEDIA KEY ────────────────────────────────────────────────────────────────
//

/// Opaque key into the externally built asset index.
///
/// Resolution to a URL happens in the asset layer; the core only carries
/// the key around.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaKey(String);

impl MediaKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaKey({})", self.0)
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── REVIEW ITEM ──────────────────────────────────────────────────────────────
//

/// A single reviewable vocabulary item within a unit.
///
/// Items are immutable once constructed; the session queue moves them around
/// but never changes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    id: ItemId,
    text: String,
    image_key: Option<MediaKey>,
    audio_key: Option<MediaKey>,
}

impl ReviewItem {
    /// Creates a review item with validated display text.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyText` if `text` is empty or whitespace-only.
    pub fn new(
        id: ItemId,
        text: impl Into<String>,
        image_key: Option<MediaKey>,
        audio_key: Option<MediaKey>,
    ) -> Result<Self, ItemError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ItemError::EmptyText);
        }

        Ok(Self {
            id,
            text,
            image_key,
            audio_key,
        })
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn image_key(&self) -> Option<&MediaKey> {
        self.image_key.as_ref()
    }

    #[must_use]
    pub fn audio_key(&self) -> Option<&MediaKey> {
        self.audio_key.as_ref()
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
