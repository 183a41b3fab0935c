use std::time::Instant;

use crate::time::try_interval_for;

use super::error::ConfigError;

/// Scheduler configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Desired callback invocation rate, frames per second.
    pub target_fps: f32,

    /// Clear the surface before each fired frame.
    pub auto_clear: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            auto_clear: true,
        }
    }
}

impl SchedulerConfig {
    pub fn new(target_fps: f32) -> Self {
        Self {
            target_fps,
            ..Self::default()
        }
    }

    pub fn auto_clear(mut self, on: bool) -> Self {
        self.auto_clear = on;
        self
    }

    /// Checks that `target_fps` is finite, positive and maps to a non-zero
    /// frame interval that timestamps can be advanced by.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 {
            return Err(ConfigError::InvalidTargetFps(self.target_fps));
        }
        match try_interval_for(self.target_fps) {
            Some(interval) if !interval.is_zero() && Instant::now().checked_add(interval).is_some() => Ok(()),
            _ => Err(ConfigError::InvalidTargetFps(self.target_fps)),
        }
    }
}
