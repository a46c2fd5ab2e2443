use std::path::{Path, PathBuf};

/// Convenience result type used across the crate.
pub type LetterboxResult<T> = Result<T, LetterboxError>;

/// Top-level error taxonomy for batch processing.
///
/// [`Config`](LetterboxError::Config) is surfaced before any concurrency
/// starts. The per-item variants carry the source image the failure refers
/// to, so a batch that stops early still names the offending item.
#[derive(thiserror::Error, Debug)]
pub enum LetterboxError {
    /// Invalid configuration (malformed aspect ratio, out-of-range quality, ...).
    #[error("config error: {0}")]
    Config(String),

    /// A source image could not be read.
    #[error("reading '{}': {}", .path.display(), .cause)]
    SourceRead {
        /// Source image the failure refers to.
        path: PathBuf,
        /// Underlying I/O failure.
        cause: anyhow::Error,
    },

    /// A source image could not be decoded (corrupt or unsupported format).
    #[error("decoding '{}': {}", .path.display(), .cause)]
    Decode {
        /// Source image the failure refers to.
        path: PathBuf,
        /// Underlying codec failure.
        cause: anyhow::Error,
    },

    /// The letterboxed canvas could not be encoded.
    #[error("encoding '{}': {}", .path.display(), .cause)]
    Encode {
        /// Source image the failure refers to.
        path: PathBuf,
        /// Underlying codec failure.
        cause: anyhow::Error,
    },

    /// The output image (or its directory tree) could not be written.
    #[error("writing output for '{}': {}", .path.display(), .cause)]
    DestinationWrite {
        /// Source image the failure refers to.
        path: PathBuf,
        /// Underlying I/O failure.
        cause: anyhow::Error,
    },

    /// The batch was cancelled before every item was admitted.
    #[error("batch cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LetterboxError {
    /// Build a [`LetterboxError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`LetterboxError::SourceRead`] value.
    pub fn source_read(path: impl Into<PathBuf>, cause: impl Into<anyhow::Error>) -> Self {
        Self::SourceRead {
            path: path.into(),
            cause: cause.into(),
        }
    }

    /// Build a [`LetterboxError::Decode`] value.
    pub fn decode(path: impl Into<PathBuf>, cause: impl Into<anyhow::Error>) -> Self {
        Self::Decode {
            path: path.into(),
            cause: cause.into(),
        }
    }

    /// Build a [`LetterboxError::Encode`] value.
    pub fn encode(path: impl Into<PathBuf>, cause: impl Into<anyhow::Error>) -> Self {
        Self::Encode {
            path: path.into(),
            cause: cause.into(),
        }
    }

    /// Build a [`LetterboxError::DestinationWrite`] value.
    pub fn destination_write(path: impl Into<PathBuf>, cause: impl Into<anyhow::Error>) -> Self {
        Self::DestinationWrite {
            path: path.into(),
            cause: cause.into(),
        }
    }

    /// The source item a per-item failure refers to, if any.
    pub fn item(&self) -> Option<&Path> {
        match self {
            Self::SourceRead { path, .. }
            | Self::Decode { path, .. }
            | Self::Encode { path, .. }
            | Self::DestinationWrite { path, .. } => Some(path),
            Self::Config(_) | Self::Cancelled | Self::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            LetterboxError::config("x")
                .to_string()
                .contains("config error:")
        );
        assert!(
            LetterboxError::source_read("a.jpg", std::io::Error::other("boom"))
                .to_string()
                .starts_with("reading 'a.jpg':")
        );
        assert!(
            LetterboxError::decode("a.jpg", std::io::Error::other("boom"))
                .to_string()
                .starts_with("decoding 'a.jpg':")
        );
        assert!(
            LetterboxError::encode("a.jpg", std::io::Error::other("boom"))
                .to_string()
                .starts_with("encoding 'a.jpg':")
        );
        assert!(
            LetterboxError::destination_write("a.jpg", std::io::Error::other("boom"))
                .to_string()
                .starts_with("writing output for 'a.jpg':")
        );
        assert_eq!(LetterboxError::Cancelled.to_string(), "batch cancelled");
    }

    #[test]
    fn item_is_attached_to_per_item_variants() {
        let err = LetterboxError::decode("dir/a.jpg", std::io::Error::other("boom"));
        assert_eq!(err.item(), Some(Path::new("dir/a.jpg")));
        assert_eq!(LetterboxError::Cancelled.item(), None);
        assert_eq!(LetterboxError::config("x").item(), None);
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = LetterboxError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
