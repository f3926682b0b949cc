use std::sync::{Arc, Mutex};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    analyzer::{AnalysisError, Analyzer},
    config::StudioConfig,
    error,
    events::{EventBus, StudioEvent},
    types::{AnalysisResult, AnalysisState},
    upload::VideoUpload,
};

/// Drives one analysis run at a time: a recurring tick raises progress by a
/// fixed step until it reaches 100, then the injected [`Analyzer`] supplies
/// the result.
///
/// Starting a new run aborts the previous one. Every tick and the final
/// result are checked against the current run number under the state lock,
/// so a stale timer can never overwrite a newer run.
pub struct AnalysisSimulator {
    inner: Arc<SimulatorInner>,
}

struct SimulatorInner {
    config: StudioConfig,
    analyzer: Arc<dyn Analyzer>,
    bus: EventBus,
    slot: Mutex<RunSlot>,
    state_tx: watch::Sender<AnalysisState>,
}

#[derive(Default)]
struct RunSlot {
    run_id: u64,
    state: AnalysisState,
    task: Option<JoinHandle<()>>,
}

enum Tick {
    Progressed,
    Reached100,
    Stale,
}

impl AnalysisSimulator {
    pub fn new(
        config: StudioConfig,
        analyzer: Arc<dyn Analyzer>,
        bus: EventBus,
    ) -> error::Result<Self> {
        config.validate()?;

        let (state_tx, _) = watch::channel(AnalysisState::Idle);
        Ok(Self {
            inner: Arc::new(SimulatorInner {
                config,
                analyzer,
                bus,
                slot: Mutex::new(RunSlot::default()),
                state_tx,
            }),
        })
    }

    /// Begins a new run at `Running(0)`, discarding any previous run or
    /// result. Must be called from within a tokio runtime.
    pub fn start(&self, video: VideoUpload) -> u64 {
        let mut slot = self.inner.lock();

        if let Some(previous) = slot.task.take() {
            previous.abort();
            if slot.state.is_running() {
                debug!(run_id = slot.run_id, "restart aborts in-flight run");
            }
        }

        slot.run_id += 1;
        let run_id = slot.run_id;
        info!(
            run_id,
            video = %video.name,
            analyzer = self.inner.analyzer.name(),
            "analysis started"
        );
        self.inner
            .set_state(&mut slot, AnalysisState::Running { progress: 0 });
        self.inner.bus.publish(StudioEvent::AnalysisStarted { run_id });

        let inner = Arc::clone(&self.inner);
        slot.task = Some(tokio::spawn(run_ticks(inner, run_id, video)));

        run_id
    }

    /// Stops a running analysis and returns to `Idle`. Returns whether a run
    /// was cancelled.
    pub fn cancel(&self) -> bool {
        let mut slot = self.inner.lock();

        let AnalysisState::Running { progress } = slot.state else {
            return false;
        };
        if let Some(task) = slot.task.take() {
            task.abort();
        }

        let run_id = slot.run_id;
        info!(run_id, progress, "analysis cancelled");
        self.inner.set_state(&mut slot, AnalysisState::Idle);
        self.inner
            .bus
            .publish(StudioEvent::AnalysisCancelled { run_id, progress });
        true
    }

    pub fn state(&self) -> AnalysisState {
        self.inner.lock().state.clone()
    }

    /// Number of the current or most recent run; 0 before the first start.
    pub fn run_id(&self) -> u64 {
        self.inner.lock().run_id
    }

    pub fn watch_state(&self) -> watch::Receiver<AnalysisState> {
        self.inner.state_tx.subscribe()
    }

    /// Resolves once no run is in flight and returns the state it settled in.
    pub async fn wait_until_settled(&self) -> AnalysisState {
        let mut rx = self.watch_state();
        let settled = rx.wait_for(|state| !state.is_running()).await;
        match settled {
            Ok(state) => state.clone(),
            // Sender lives in `inner`, which `self` keeps alive.
            Err(_) => self.state(),
        }
    }
}

impl Drop for AnalysisSimulator {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.inner.slot.lock()
            && let Some(task) = slot.task.take()
        {
            task.abort();
        }
    }
}

impl SimulatorInner {
    fn lock(&self) -> std::sync::MutexGuard<'_, RunSlot> {
        self.slot.lock().expect("AnalysisSimulator poisoned")
    }

    fn set_state(&self, slot: &mut RunSlot, state: AnalysisState) {
        slot.state = state.clone();
        self.state_tx.send_replace(state);
    }

    fn advance(&self, run_id: u64) -> Tick {
        let mut slot = self.lock();

        let AnalysisState::Running { progress } = slot.state else {
            return Tick::Stale;
        };
        if slot.run_id != run_id {
            return Tick::Stale;
        }

        let progress = progress.saturating_add(self.config.progress_step).min(100);
        debug!(run_id, progress, "tick");
        self.set_state(&mut slot, AnalysisState::Running { progress });
        self.bus
            .publish(StudioEvent::AnalysisProgressed { run_id, progress });

        if progress >= 100 {
            Tick::Reached100
        } else {
            Tick::Progressed
        }
    }

    fn finish(&self, run_id: u64, outcome: Result<AnalysisResult, AnalysisError>) {
        let mut slot = self.lock();

        if slot.run_id != run_id || !slot.state.is_running() {
            debug!(run_id, current = slot.run_id, "discarding stale analysis result");
            return;
        }
        slot.task = None;

        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                info!(
                    run_id,
                    emotion = %result.emotion,
                    tempo_bpm = result.tempo_bpm,
                    scenes = result.scenes.len(),
                    "analysis complete"
                );
                self.set_state(
                    &mut slot,
                    AnalysisState::Complete {
                        result: Arc::clone(&result),
                    },
                );
                self.bus
                    .publish(StudioEvent::AnalysisCompleted { run_id, result });
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(run_id, error = %reason, "analysis failed");
                self.set_state(
                    &mut slot,
                    AnalysisState::Failed {
                        reason: reason.clone(),
                    },
                );
                self.bus
                    .publish(StudioEvent::AnalysisFailed { run_id, reason });
            }
        }
    }
}

async fn run_ticks(inner: Arc<SimulatorInner>, run_id: u64, video: VideoUpload) {
    let period = inner.config.tick_period;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match inner.advance(run_id) {
            Tick::Progressed => {}
            Tick::Reached100 => break,
            Tick::Stale => return,
        }
    }

    let outcome = inner.analyzer.analyze(&video).await;
    inner.finish(run_id, outcome);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::{
        analyzer::FixedAnalyzer,
        error::StudioError,
        events::{BusConfig, Subscription},
    };

    struct FailingAnalyzer;

    #[async_trait]
    impl Analyzer for FailingAnalyzer {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn analyze(&self, video: &VideoUpload) -> Result<AnalysisResult, AnalysisError> {
            Err(AnalysisError::UnreadableInput {
                name: video.name.clone(),
                reason: "corrupt header".to_string(),
            })
        }
    }

    struct SlowAnalyzer(Duration);

    #[async_trait]
    impl Analyzer for SlowAnalyzer {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn analyze(&self, _video: &VideoUpload) -> Result<AnalysisResult, AnalysisError> {
            tokio::time::sleep(self.0).await;
            Ok(FixedAnalyzer::result())
        }
    }

    fn bus() -> EventBus {
        EventBus::new(BusConfig {
            session_id: Uuid::new_v4(),
            subscriber_capacity: 256,
        })
        .unwrap()
    }

    fn simulator(analyzer: Arc<dyn Analyzer>) -> (AnalysisSimulator, Subscription) {
        let bus = bus();
        let sub = bus.subscribe();
        (
            AnalysisSimulator::new(StudioConfig::default(), analyzer, bus).unwrap(),
            sub,
        )
    }

    fn video() -> VideoUpload {
        VideoUpload::new("clip.mp4")
    }

    fn drain(sub: &mut Subscription) -> Vec<StudioEvent> {
        std::iter::from_fn(|| sub.try_next())
            .map(|e| e.event.clone())
            .collect()
    }

    /// Progress values implied by the events: 0 on start, then each tick.
    fn progress_trace(events: &[StudioEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                StudioEvent::AnalysisStarted { .. } => Some(0),
                StudioEvent::AnalysisProgressed { progress, .. } => Some(*progress),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_counts_to_100_and_completes_once() {
        let (sim, mut sub) = simulator(Arc::new(FixedAnalyzer));
        let started_at = Instant::now();

        sim.start(video());
        assert_eq!(sim.state(), AnalysisState::Running { progress: 0 });

        let settled = sim.wait_until_settled().await;
        let events = drain(&mut sub);

        assert_eq!(
            progress_trace(&events),
            [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
        let completions = events
            .iter()
            .filter(|e| matches!(e, StudioEvent::AnalysisCompleted { .. }))
            .count();
        assert_eq!(completions, 1);
        assert_eq!(
            settled.result().map(|r| r.as_ref()),
            Some(&FixedAnalyzer::result())
        );
        assert_eq!(started_at.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_complete_resets_to_zero() {
        let (sim, mut sub) = simulator(Arc::new(FixedAnalyzer));
        sim.start(video());
        sim.wait_until_settled().await;
        assert!(sim.state().result().is_some());

        let second = sim.start(video());

        assert_eq!(second, 2);
        assert_eq!(sim.state(), AnalysisState::Running { progress: 0 });
        assert!(sim.state().result().is_none());

        sim.wait_until_settled().await;
        let second_run: Vec<_> = drain(&mut sub)
            .into_iter()
            .filter(|e| e.run_id() == Some(2))
            .collect();
        assert_eq!(progress_trace(&second_run).len(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks_for_good() {
        let (sim, mut sub) = simulator(Arc::new(FixedAnalyzer));
        sim.start(video());

        tokio::time::sleep(Duration::from_millis(950)).await;
        assert_eq!(sim.state(), AnalysisState::Running { progress: 30 });

        assert!(sim.cancel());
        assert_eq!(sim.state(), AnalysisState::Idle);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let events = drain(&mut sub);

        assert_eq!(sim.state(), AnalysisState::Idle);
        assert_eq!(
            events.last(),
            Some(&StudioEvent::AnalysisCancelled {
                run_id: 1,
                progress: 30
            })
        );
        assert_eq!(progress_trace(&events), [0, 10, 20, 30]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_without_run_is_noop() {
        let (sim, mut sub) = simulator(Arc::new(FixedAnalyzer));

        assert!(!sim.cancel());
        sim.start(video());
        sim.wait_until_settled().await;
        assert!(!sim.cancel());

        assert!(sim.state().result().is_some());
        assert!(
            !drain(&mut sub)
                .iter()
                .any(|e| matches!(e, StudioEvent::AnalysisCancelled { .. }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restart_mid_run_silences_previous_timer() {
        let (sim, mut sub) = simulator(Arc::new(FixedAnalyzer));
        sim.start(video());
        tokio::time::sleep(Duration::from_millis(650)).await;
        let before_restart = drain(&mut sub);

        sim.start(video());
        sim.wait_until_settled().await;
        let after_restart = drain(&mut sub);

        assert_eq!(progress_trace(&before_restart), [0, 10, 20]);
        assert!(after_restart.iter().all(|e| e.run_id() == Some(2)));
        assert_eq!(
            progress_trace(&after_restart),
            [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn result_of_superseded_run_is_discarded() {
        let (sim, mut sub) = simulator(Arc::new(SlowAnalyzer(Duration::from_secs(2))));
        sim.start(video());

        // Progress hits 100 at 3s; the analyzer is still busy until 5s.
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(sim.state(), AnalysisState::Running { progress: 100 });
        sim.start(video());

        let settled = sim.wait_until_settled().await;
        let completed: Vec<_> = drain(&mut sub)
            .into_iter()
            .filter_map(|e| match e {
                StudioEvent::AnalysisCompleted { run_id, .. } => Some(run_id),
                _ => None,
            })
            .collect();

        assert!(settled.result().is_some());
        assert_eq!(completed, [2]);
    }

    #[tokio::test(start_paused = true)]
    async fn analyzer_error_settles_in_failed() {
        let (sim, mut sub) = simulator(Arc::new(FailingAnalyzer));
        sim.start(video());

        let settled = sim.wait_until_settled().await;

        let AnalysisState::Failed { reason } = &settled else {
            panic!("expected failed state, got {settled:?}");
        };
        assert!(reason.contains("corrupt header"));
        assert!(drain(&mut sub).iter().any(|e| matches!(
            e,
            StudioEvent::AnalysisFailed { run_id: 1, .. }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn uneven_step_clamps_at_100() {
        let bus = bus();
        let mut sub = bus.subscribe();
        let config = StudioConfig {
            progress_step: 30,
            ..Default::default()
        };
        let sim = AnalysisSimulator::new(config, Arc::new(FixedAnalyzer), bus).unwrap();

        sim.start(video());
        sim.wait_until_settled().await;

        assert_eq!(progress_trace(&drain(&mut sub)), [0, 30, 60, 90, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_analyzer_works_drops_the_result() {
        let (sim, mut sub) = simulator(Arc::new(SlowAnalyzer(Duration::from_secs(2))));
        sim.start(video());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(sim.state(), AnalysisState::Running { progress: 100 });

        assert!(sim.cancel());
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(sim.state(), AnalysisState::Idle);
        let events = drain(&mut sub);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, StudioEvent::AnalysisCompleted { .. }))
        );
        assert_eq!(
            events.last(),
            Some(&StudioEvent::AnalysisCancelled {
                run_id: 1,
                progress: 100
            })
        );
    }

    #[test]
    fn degenerate_config_is_rejected_at_construction() {
        let zero_step = StudioConfig {
            progress_step: 0,
            ..Default::default()
        };
        let zero_period = StudioConfig {
            tick_period: Duration::ZERO,
            ..Default::default()
        };

        for config in [zero_step, zero_period] {
            let result = AnalysisSimulator::new(config, Arc::new(FixedAnalyzer), bus());
            assert!(matches!(result, Err(StudioError::InvalidConfig { .. })));
        }
    }
}
