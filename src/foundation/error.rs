/// Convenience result type used across clipline.
pub type ClipLineResult<T> = Result<T, ClipLineError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ClipLineError {
    /// Invalid user-provided clip or sequence data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A query referenced a track or style track that does not exist.
    #[error("query error: {0}")]
    Query(String),

    /// Errors while resolving easing functions or fade windows.
    #[error("animation error: {0}")]
    Animation(String),

    /// The per-clip render callback did not produce a text/style pair.
    #[error("render error: {0}")]
    Render(String),

    /// Errors raised by a text styler while shaping or placing glyphs.
    #[error("layout error: {0}")]
    Layout(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClipLineError {
    /// Build a [`ClipLineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ClipLineError::Query`] value.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Build a [`ClipLineError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ClipLineError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ClipLineError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`ClipLineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
