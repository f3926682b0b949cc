use thiserror::Error;

use crate::analyzer::AnalysisError;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Unsupported video file {name}: expected one of mp4, mov, avi, mkv, webm")]
    UnsupportedVideo { name: String },

    #[error("Video {name} is too large: {size_bytes} bytes (limit {limit_bytes})")]
    VideoTooLarge {
        name: String,
        size_bytes: u64,
        limit_bytes: u64,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Nothing to export: {reason}")]
    NothingToExport { reason: String },

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StudioError>;
