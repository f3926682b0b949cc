use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::{Result, StudioError},
    selection::SelectedTrackSet,
    types::{AnalysisResult, AnalysisState, TrackRef},
    upload::VideoUpload,
};

/// What an export would contain. Nothing is rendered or written.
#[derive(Debug, Clone, Serialize)]
pub struct ExportPlan {
    pub video: VideoUpload,
    pub tracks: Vec<TrackRef>,
    pub track_count: usize,
    pub total_duration_secs: u64,
    pub analysis: Option<Arc<AnalysisResult>>,
}

impl ExportPlan {
    pub fn build(
        video: Option<&VideoUpload>,
        selection: &SelectedTrackSet,
        state: &AnalysisState,
    ) -> Result<Self> {
        let video = video.ok_or_else(|| StudioError::NothingToExport {
            reason: "no video uploaded".to_string(),
        })?;
        if selection.is_empty() {
            return Err(StudioError::NothingToExport {
                reason: "no tracks staged".to_string(),
            });
        }

        Ok(Self {
            video: video.clone(),
            tracks: selection.to_ordered_list(),
            track_count: selection.size(),
            total_duration_secs: selection.total_duration_secs(),
            analysis: state.result().cloned(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
