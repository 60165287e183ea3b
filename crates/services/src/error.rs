//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::model::{ItemError, UnitError, UnitKey};

/// Errors emitted while loading or resolving unit content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("no content for unit {0}")]
    UnknownUnit(UnitKey),

    #[error("failed to parse unit content: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Item(#[from] ItemError),

    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// Errors emitted by recorder and assignment-tracker calls.
///
/// These never reach engine state; the lifecycle hooks log and swallow them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecorderError {
    #[error("recorder request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `ReviewQueueEngine`.
///
/// Only content resolution can fail; queue mutations are infallible.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error(transparent)]
    Content(#[from] ContentError),
}
