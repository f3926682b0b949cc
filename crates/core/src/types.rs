use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackCategory {
    Music,
    #[serde(rename = "SFX")]
    Sfx,
    Voice,
}

impl TrackCategory {
    pub const ALL: [TrackCategory; 3] = [
        TrackCategory::Music,
        TrackCategory::Sfx,
        TrackCategory::Voice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TrackCategory::Music => "Music",
            TrackCategory::Sfx => "SFX",
            TrackCategory::Voice => "Voice",
        }
    }
}

impl fmt::Display for TrackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown track category: {0} (expected music, sfx or voice)")]
pub struct UnknownCategory(pub String);

impl FromStr for TrackCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "music" => Ok(TrackCategory::Music),
            "sfx" => Ok(TrackCategory::Sfx),
            "voice" => Ok(TrackCategory::Voice),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// An entry of the built-in audio library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub category: TrackCategory,
    pub duration_secs: u32,
    pub emotion: String,
}

/// Tracks are shared between the catalog and every selection that stages them.
pub type TrackRef = Arc<Track>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMarker {
    pub time_secs: u32,
    pub kind: String,
}

impl SceneMarker {
    pub fn new(time_secs: u32, kind: impl Into<String>) -> Self {
        Self {
            time_secs,
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub emotion: String,
    pub tempo_bpm: u32,
    pub scenes: Vec<SceneMarker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisState {
    #[default]
    Idle,
    Running {
        progress: u8,
    },
    Complete {
        result: Arc<AnalysisResult>,
    },
    Failed {
        reason: String,
    },
}

impl AnalysisState {
    pub fn is_running(&self) -> bool {
        matches!(self, AnalysisState::Running { .. })
    }

    pub fn progress(&self) -> Option<u8> {
        match self {
            AnalysisState::Running { progress } => Some(*progress),
            AnalysisState::Complete { .. } => Some(100),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&Arc<AnalysisResult>> {
        match self {
            AnalysisState::Complete { result } => Some(result),
            _ => None,
        }
    }
}
