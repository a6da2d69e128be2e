//! Failure taxonomy.
//!
//! # Failure Modes
//!
//! | Variant | Cause | Handling |
//! |---------|-------|----------|
//! | `MissingElement` | Page variant omits a feature's markup | Subsystem not mounted, logged at `debug` |
//! | `ExternalApiUnavailable` | Captcha library not loaded | Treated as a pass |
//! | `InvalidUserInput` | Native constraint violation on submit | Focus + scroll to the field |
//! | `Config` | Malformed host configuration | Defaults are used |
//! | `Input` | Malformed host event | Event dropped, logged at `warn` |
//!
//! No variant crosses a subsystem boundary: every failure is handled where
//! it is detected.

use thiserror::Error;

use crate::dom::NodeId;

/// Errors from interaction subsystems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteractionError {
    /// A node the feature requires is not in the document.
    #[error("{feature}: no element matches `{selector}`")]
    MissingElement {
        feature: &'static str,
        selector: String,
    },
    /// A third-party script the feature talks to is not loaded.
    #[error("external API unavailable: {0}")]
    ExternalApiUnavailable(&'static str),
    /// The user's input failed native validation.
    #[error("invalid user input")]
    InvalidUserInput { field: Option<NodeId> },
    /// Host configuration could not be parsed or holds unusable values.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A host event could not be decoded.
    #[error("malformed host input: {0}")]
    Input(String),
}

impl InteractionError {
    /// Shorthand for [`InteractionError::MissingElement`].
    pub fn missing(feature: &'static str, selector: impl Into<String>) -> Self {
        Self::MissingElement {
            feature,
            selector: selector.into(),
        }
    }

    /// Whether the error means "feature absent on this page".
    #[must_use]
    pub fn is_missing_element(&self) -> bool {
        matches!(self, Self::MissingElement { .. })
    }
}

pub type Result<T> = std::result::Result<T, InteractionError>;
