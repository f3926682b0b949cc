use std::sync::{Arc, Mutex};

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    analyzer::{Analyzer, FixedAnalyzer},
    catalog::Catalog,
    config::StudioConfig,
    error::Result,
    events::{BusConfig, EventBus, StudioEvent, Subscription},
    export::ExportPlan,
    selection::SelectedTrackSet,
    simulator::AnalysisSimulator,
    types::{AnalysisState, TrackRef},
    upload::VideoUpload,
};

/// Everything one user works on: the uploaded video, its analysis and the
/// tracks staged for export. Dropping the session stops any running analysis.
pub struct StudioSession {
    catalog: Arc<Catalog>,
    bus: EventBus,
    simulator: AnalysisSimulator,
    video: Mutex<Option<VideoUpload>>,
    selection: Mutex<SelectedTrackSet>,
}

impl StudioSession {
    pub fn new(config: StudioConfig, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        config.validate()?;

        let bus = EventBus::new(BusConfig {
            session_id: Uuid::new_v4(),
            subscriber_capacity: config.subscriber_capacity,
        })?;
        let simulator = AnalysisSimulator::new(config, analyzer, bus.clone())?;
        debug!(session_id = %bus.session_id(), "session created");

        Ok(Self {
            catalog: Arc::new(Catalog::builtin()),
            bus,
            simulator,
            video: Mutex::new(None),
            selection: Mutex::new(SelectedTrackSet::new()),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(StudioConfig::default(), Arc::new(FixedAnalyzer))
    }

    pub fn session_id(&self) -> Uuid {
        self.bus.session_id()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    /// Accepts a new video and restarts analysis for it. A rejected upload
    /// leaves the previous video and run untouched.
    pub fn upload_video(&self, video: VideoUpload) -> Result<u64> {
        video.validate()?;

        info!(video = %video.name, size_bytes = ?video.size_bytes, "video uploaded");
        *self.video.lock().expect("StudioSession poisoned") = Some(video.clone());
        self.bus.publish(StudioEvent::VideoUploaded {
            video: video.clone(),
        });

        Ok(self.simulator.start(video))
    }

    pub fn video(&self) -> Option<VideoUpload> {
        self.video.lock().expect("StudioSession poisoned").clone()
    }

    pub fn cancel_analysis(&self) -> bool {
        self.simulator.cancel()
    }

    pub fn analysis_state(&self) -> AnalysisState {
        self.simulator.state()
    }

    pub async fn wait_for_analysis(&self) -> AnalysisState {
        self.simulator.wait_until_settled().await
    }

    /// Stages a catalog track. Unknown or already staged ids are ignored.
    pub fn add_track(&self, id: &str) -> bool {
        let Some(track) = self.catalog.get(id) else {
            debug!(id, "add ignored: not in catalog");
            return false;
        };

        let added = self
            .selection
            .lock()
            .expect("StudioSession poisoned")
            .add(Arc::clone(track));
        if added {
            info!(id, name = %track.name, "track added");
            self.bus.publish(StudioEvent::TrackAdded {
                track: Arc::clone(track),
            });
        }
        added
    }

    pub fn remove_track(&self, id: &str) -> bool {
        let removed = self
            .selection
            .lock()
            .expect("StudioSession poisoned")
            .remove(id);

        match removed {
            Some(track) => {
                info!(id, name = %track.name, "track removed");
                self.bus.publish(StudioEvent::TrackRemoved { track });
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Vec<TrackRef> {
        self.selection
            .lock()
            .expect("StudioSession poisoned")
            .to_ordered_list()
    }

    pub fn export_plan(&self) -> Result<ExportPlan> {
        let video = self.video();
        let state = self.analysis_state();
        let selection = self.selection.lock().expect("StudioSession poisoned");
        ExportPlan::build(video.as_ref(), &selection, &state)
    }
}
