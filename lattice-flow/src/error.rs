//! Error types.
//!
//! Rendering is fail-fast: an error raised while a scope renders stops the
//! current mount or flush and is returned to the caller unchanged. Nothing in
//! this crate retries.

use thiserror::Error;

use crate::host::ScopeId;

/// Errors raised while mounting or flushing a view.
#[derive(Debug, Error)]
pub enum RenderError {
    /// `For` had elements to render but neither an `item` component nor a
    /// `children` function.
    #[error("`For` needs an `item` component or a `children` render function")]
    MissingItemRenderer,

    /// A scope called its hooks in a different order or with different
    /// types than on its previous render.
    #[error("hook {index} of scope {scope} changed type between renders")]
    HookMismatch {
        /// The scope whose hooks were inconsistent.
        scope: ScopeId,
        /// Position of the offending hook call.
        index: usize,
    },

    /// Flushing kept producing new dirty scopes.
    #[error("view did not settle after {passes} flush passes")]
    RenderLoop {
        /// Number of passes attempted.
        passes: usize,
    },

    /// The renderer has no mounted root.
    #[error("no view is mounted")]
    NotMounted,

    /// A render function reported a failure of its own.
    #[error("component error: {0}")]
    Component(String),

    /// The renderer configuration could not be parsed.
    #[error("invalid renderer configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl RenderError {
    /// Build an error from inside a render function.
    pub fn component(message: impl Into<String>) -> Self {
        RenderError::Component(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;
