use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use practice_core::model::{ItemId, MediaKey, ReviewItem, UnitContent, UnitKey};

use crate::error::ContentError;

//
// ─── PROVIDER CONTRACT ────────────────────────────────────────────────────────
//

/// Upstream source of reviewable unit content.
///
/// Implementations must return an ordered, deduplicated-by-id item list that
/// is stable for the duration of a session.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Resolve the full content for a unit.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnknownUnit` if the unit does not exist, or
    /// other `ContentError` variants for malformed content.
    async fn unit(&self, key: &UnitKey) -> Result<UnitContent, ContentError>;
}

//
// ─── BUILT CONTENT SHAPE ──────────────────────────────────────────────────────
//

/// Wire shape of one item inside a built unit JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitItemRecord {
    id: u32,
    text: String,
    #[serde(default)]
    image_key: Option<String>,
    #[serde(default)]
    audio_key: Option<String>,
}

/// Wire shape of a built unit JSON file, as emitted by the content pipeline.
///
/// `order` and the unit-level `audio_key` exist in the files but are only
/// used by navigation and playback layers, so they are accepted and dropped
/// here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitRecord {
    slug: String,
    title: String,
    level: String,
    #[serde(default)]
    #[allow(dead_code)]
    order: Option<u32>,
    #[serde(default)]
    #[allow(dead_code)]
    audio_key: Option<String>,
    items: Vec<UnitItemRecord>,
}

fn media_key(value: Option<String>) -> Option<MediaKey> {
    value.filter(|v| !v.trim().is_empty()).map(MediaKey::new)
}

impl UnitRecord {
    /// Convert the record into validated domain content.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the key, title, or any item fails
    /// validation, or if item ids are duplicated.
    fn into_unit_content(self) -> Result<UnitContent, ContentError> {
        let key = UnitKey::new(self.level, self.slug)?;

        let mut items = Vec::with_capacity(self.items.len());
        for record in self.items {
            items.push(ReviewItem::new(
                ItemId::new(record.id),
                record.text,
                media_key(record.image_key),
                media_key(record.audio_key),
            )?);
        }

        Ok(UnitContent::new(key, self.title, items)?)
    }
}

//
// ─── IN-MEMORY LIBRARY ────────────────────────────────────────────────────────
//

/// In-memory content provider backed by parsed unit JSON files.
///
/// The library is built once at startup from the content package and then
/// only read, so lookups clone the stored units.
#[derive(Debug, Clone, Default)]
pub struct ContentLibrary {
    units: HashMap<UnitKey, UnitContent>,
}

impl ContentLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register already-validated unit content.
    pub fn insert(&mut self, content: UnitContent) {
        self.units.insert(content.key().clone(), content);
    }

    /// Parse and register one built unit JSON document.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Parse` for malformed JSON and other
    /// `ContentError` variants for invalid content.
    pub fn insert_json(&mut self, json: &str) -> Result<&mut Self, ContentError> {
        let record: UnitRecord = serde_json::from_str(json)?;
        self.insert(record.into_unit_content()?);
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[async_trait]
impl ContentProvider for ContentLibrary {
    async fn unit(&self, key: &UnitKey) -> Result<UnitContent, ContentError> {
        self.units
            .get(key)
            .cloned()
            .ok_or_else(|| ContentError::UnknownUnit(key.clone()))
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
