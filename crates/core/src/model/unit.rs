use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::model::ids::ItemId;
use crate::model::item::ReviewItem;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when constructing a unit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("unit level must not be empty")]
    EmptyLevel,

    #[error("unit slug must not be empty")]
    EmptySlug,

    #[error("unit title must not be empty")]
    EmptyTitle,

    #[error("duplicate item id {0} in unit content")]
    DuplicateItemId(ItemId),
}

//
// ─── UNIT KEY ─────────────────────────────────────────────────────────────────
//

/// Identity of a unit: level code plus unit slug, e.g. `1A` / `u01`.
///
/// The key doubles as the seed for the deterministic session ordering, so the
/// same unit always shuffles the same way across reloads.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitKey {
    level: String,
    slug: String,
}

impl UnitKey {
    /// Creates a unit key.
    ///
    /// # Errors
    ///
    /// Returns `UnitError::EmptyLevel` or `UnitError::EmptySlug` if either
    /// component is empty.
    pub fn new(level: impl Into<String>, slug: impl Into<String>) -> Result<Self, UnitError> {
        let level = level.into();
        let slug = slug.into();
        if level.trim().is_empty() {
            return Err(UnitError::EmptyLevel);
        }
        if slug.trim().is_empty() {
            return Err(UnitError::EmptySlug);
        }

        Ok(Self { level, slug })
    }

    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Seed string for the deterministic shuffle: `"{level}-{slug}"`.
    #[must_use]
    pub fn seed_string(&self) -> String {
        format!("{}-{}", self.level, self.slug)
    }
}

impl fmt::Debug for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitKey({}-{})", self.level, self.slug)
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.level, self.slug)
    }
}

//
// ─── UNIT CONTENT ─────────────────────────────────────────────────────────────
//

/// A unit's full reviewable content, as produced by the content build.
///
/// The item list is ordered and deduplicated by id; the engine assumes it is
/// stable and fully loaded by the time a session starts.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitContent {
    key: UnitKey,
    title: String,
    items: Vec<ReviewItem>,
}

impl UnitContent {
    /// Creates unit content from an ordered item list.
    ///
    /// # Errors
    ///
    /// Returns `UnitError::EmptyTitle` for a blank title and
    /// `UnitError::DuplicateItemId` if two items share an id.
    pub fn new(
        key: UnitKey,
        title: impl Into<String>,
        items: Vec<ReviewItem>,
    ) -> Result<Self, UnitError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(UnitError::EmptyTitle);
        }

        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(UnitError::DuplicateItemId(item.id()));
            }
        }

        Ok(Self { key, title, items })
    }

    #[must_use]
    pub fn key(&self) -> &UnitKey {
        &self.key
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
