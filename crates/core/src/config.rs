use std::time::Duration;

use crate::error::{Result, StudioError};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(300);
pub const DEFAULT_PROGRESS_STEP: u8 = 10;
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Interval between two progress ticks of a run.
    pub tick_period: Duration,
    /// Progress added per tick, in percent.
    pub progress_step: u8,
    /// Events buffered per subscriber before the oldest are dropped.
    pub subscriber_capacity: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            progress_step: DEFAULT_PROGRESS_STEP,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

impl StudioConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_period.is_zero() {
            return Err(invalid("tick period must be > 0"));
        }
        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(invalid("progress step must be within 1..=100"));
        }
        if self.subscriber_capacity == 0 {
            return Err(invalid("subscriber capacity must be > 0"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> StudioError {
    StudioError::InvalidConfig {
        reason: reason.to_string(),
    }
}
