//! audiostudio core library
//!
//! Session engine behind the audio studio: video upload handling, the
//! analysis progress state machine, the built-in track library and the
//! export staging set.

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod format;
pub mod queues;
pub mod selection;
pub mod session;
pub mod simulator;
pub mod types;
pub mod upload;

pub use analyzer::{AnalysisError, Analyzer, FixedAnalyzer};
pub use catalog::Catalog;
pub use config::StudioConfig;
pub use error::{Result, StudioError};
pub use events::{EnrichedEvent, EventBus, StudioEvent, Subscription};
pub use export::ExportPlan;
pub use format::{
    format_analysis_readable, format_export_plan_readable, format_scene_badges,
    format_timestamp, format_track_line,
};
pub use selection::SelectedTrackSet;
pub use session::StudioSession;
pub use simulator::AnalysisSimulator;
pub use types::{AnalysisResult, AnalysisState, SceneMarker, Track, TrackCategory, TrackRef};
pub use upload::VideoUpload;
