//! Error types for tracking sessions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing or running a tracking session.
///
/// Every variant is fatal to the run; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing command-line input, or a data directory with no frames.
    #[error("configuration error: {message}")]
    Config {
        stage: ConfigStage,
        message: String,
    },
    /// A file or directory could not be read or written.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    /// A frame file could not be decoded.
    #[error("failed to decode frame {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The ground-truth annotation is malformed or missing.
    #[error("ground truth parse error: {0}")]
    Parse(String),
    /// Tracker session methods were invoked out of order.
    #[error("tracker session state error: {0}")]
    State(String),
    /// The underlying tracker failed.
    #[error("tracker call failed: {0}")]
    Tracker(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The run was stopped at a frame boundary.
    #[error("session cancelled")]
    Cancelled,
}

/// Where a [`Error::Config`] was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStage {
    Arguments,
    FrameDiscovery,
}

impl Error {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Config {
            stage: ConfigStage::Arguments,
            message: message.into(),
        }
    }

    pub(crate) fn no_frames(message: impl Into<String>) -> Self {
        Self::Config {
            stage: ConfigStage::FrameDiscovery,
            message: message.into(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Short name of the stage that failed, for user-facing reports.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config {
                stage: ConfigStage::Arguments,
                ..
            } => "argument parsing",
            Self::Config {
                stage: ConfigStage::FrameDiscovery,
                ..
            } => "frame discovery",
            Self::Io { .. } => "file access",
            Self::Image { .. } => "frame read",
            Self::Parse(_) => "ground-truth parsing",
            Self::State(_) | Self::Tracker(_) => "tracker call",
            Self::Cancelled => "cancellation",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_stage_names() {
        assert_eq!(Error::usage("unknown option 'turbo'").stage(), "argument parsing");
        let err = Error::no_frames("no frames found in seq/img");
        assert_eq!(err.stage(), "frame discovery");
        assert_eq!(err.to_string(), "configuration error: no frames found in seq/img");
    }
}
