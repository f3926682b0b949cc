use std::time::Duration;

use async_trait::async_trait;

use crate::{
    types::{AnalysisResult, SceneMarker},
    upload::VideoUpload,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Unreadable input {name}: {reason}")]
    UnreadableInput { name: String, reason: String },

    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Failed(String),
}

/// Produces the emotion, tempo and scene layout of a video.
///
/// The simulator asks for a result once its progress reaches 100, so an
/// implementation may take as long as it needs without stalling the ticks.
#[async_trait]
pub trait Analyzer: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn analyze(&self, video: &VideoUpload) -> Result<AnalysisResult, AnalysisError>;
}

/// Ignores the video and always reports the same energetic four-scene cut.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAnalyzer;

impl FixedAnalyzer {
    pub fn result() -> AnalysisResult {
        AnalysisResult {
            emotion: "energetic".to_string(),
            tempo_bpm: 128,
            scenes: vec![
                SceneMarker::new(0, "intro"),
                SceneMarker::new(15, "action"),
                SceneMarker::new(45, "climax"),
                SceneMarker::new(60, "outro"),
            ],
        }
    }
}

#[async_trait]
impl Analyzer for FixedAnalyzer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn analyze(&self, _video: &VideoUpload) -> Result<AnalysisResult, AnalysisError> {
        Ok(Self::result())
    }
}
