use crate::foundation::core::Variant;

/// Convenience result type used across bannerforge.
pub type BannerResult<T> = Result<T, BannerError>;

/// Top-level error taxonomy used by the pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum BannerError {
    /// Invalid configuration or user-provided record data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A template could not be loaded after every retry attempt.
    #[error("template fetch error: '{locator}' failed after {attempts} attempt(s): {cause}")]
    TemplateFetch {
        /// Template path or URL.
        locator: String,
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Last observed failure.
        cause: String,
    },

    /// Rendering one record/variant pair failed.
    #[error("render error: '{record}' ({variant}): {cause}")]
    Render {
        /// Name of the record being rendered.
        record: String,
        /// Variant being rendered.
        variant: Variant,
        /// Underlying failure.
        #[source]
        cause: Box<BannerError>,
    },

    /// The tabular input stream could not be read.
    #[error("stream read error: {0}")]
    StreamRead(String),

    /// The output archive could not be assembled.
    #[error("archive error: {0}")]
    Archive(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BannerError {
    /// Build a [`BannerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BannerError::StreamRead`] value.
    pub fn stream_read(msg: impl Into<String>) -> Self {
        Self::StreamRead(msg.into())
    }

    /// Build a [`BannerError::Archive`] value.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Wrap `cause` as a [`BannerError::Render`] for `record`/`variant`.
    ///
    /// A cause that is already a render error is returned unchanged.
    pub fn render(record: impl Into<String>, variant: Variant, cause: BannerError) -> Self {
        if matches!(cause, Self::Render { .. }) {
            return cause;
        }
        Self::Render {
            record: record.into(),
            variant,
            cause: Box::new(cause),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
