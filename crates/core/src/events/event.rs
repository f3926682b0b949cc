use std::{sync::Arc, time::SystemTime};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    types::{AnalysisResult, TrackRef},
    upload::VideoUpload,
};

/// Something the UI should react to: a toast, a progress redraw, a list refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    VideoUploaded {
        video: VideoUpload,
    },
    AnalysisStarted {
        run_id: u64,
    },
    AnalysisProgressed {
        run_id: u64,
        progress: u8,
    },
    AnalysisCompleted {
        run_id: u64,
        result: Arc<AnalysisResult>,
    },
    AnalysisCancelled {
        run_id: u64,
        progress: u8,
    },
    AnalysisFailed {
        run_id: u64,
        reason: String,
    },
    TrackAdded {
        track: TrackRef,
    },
    TrackRemoved {
        track: TrackRef,
    },
}

impl StudioEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            StudioEvent::VideoUploaded { .. } => "video.uploaded",
            StudioEvent::AnalysisStarted { .. } => "analysis.started",
            StudioEvent::AnalysisProgressed { .. } => "analysis.progressed",
            StudioEvent::AnalysisCompleted { .. } => "analysis.completed",
            StudioEvent::AnalysisCancelled { .. } => "analysis.cancelled",
            StudioEvent::AnalysisFailed { .. } => "analysis.failed",
            StudioEvent::TrackAdded { .. } => "track.added",
            StudioEvent::TrackRemoved { .. } => "track.removed",
        }
    }

    /// Run that produced the event, for analysis events.
    pub fn run_id(&self) -> Option<u64> {
        match self {
            StudioEvent::AnalysisStarted { run_id }
            | StudioEvent::AnalysisProgressed { run_id, .. }
            | StudioEvent::AnalysisCompleted { run_id, .. }
            | StudioEvent::AnalysisCancelled { run_id, .. }
            | StudioEvent::AnalysisFailed { run_id, .. } => Some(*run_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventHeader {
    pub event_id: Uuid,
    pub session_id: Uuid,
    pub ingest_seq: u64,
    pub timestamp: SystemTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedEvent {
    pub header: EventHeader,
    pub event: StudioEvent,
}
