use std::path::PathBuf;
use std::time::Duration;

use crate::compute::WaitPolicy;
use crate::error::SimulationError;

const DEFAULT_PARTICLE_COUNT: u32 = 100;
const DEFAULT_BOUNDS: [f32; 2] = [100.0, 56.0];
const DEFAULT_SPEED: f32 = 0.5;
const DEFAULT_FRAMES: u64 = 100_000;
const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Run parameters for [`super::Simulation`]. Fixed for the life of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub particle_count: u32,
    pub bounds: [f32; 2],
    /// Per-axis upper bound on the initial speed.
    pub speed: f32,
    pub frames: u64,
    pub frame_interval: Duration,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Kernel file to load; `None` uses the builtin kernel.
    pub kernel: Option<PathBuf>,
    /// Workgroup size declared by a loaded kernel. Ignored for builtins.
    pub workgroup_size: u32,
    /// Bind a parameter buffer at slot 1.
    pub use_params: bool,
    pub wait: WaitPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            bounds: DEFAULT_BOUNDS,
            speed: DEFAULT_SPEED,
            frames: DEFAULT_FRAMES,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            seed: None,
            kernel: None,
            workgroup_size: 1,
            use_params: true,
            wait: WaitPolicy::Block,
        }
    }
}

impl SimulationConfig {
    pub fn with_particle_count(mut self, particle_count: u32) -> Self {
        self.particle_count = particle_count;
        self
    }

    pub fn with_bounds(mut self, bounds: [f32; 2]) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_frames(mut self, frames: u64) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_kernel(mut self, kernel: PathBuf, workgroup_size: u32) -> Self {
        self.kernel = Some(kernel);
        self.workgroup_size = workgroup_size;
        self
    }

    pub fn with_params(mut self, use_params: bool) -> Self {
        self.use_params = use_params;
        self
    }

    pub fn with_wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.particle_count == 0 {
            return Err(SimulationError::InvalidConfig(
                "particle count must be at least 1".to_string(),
            ));
        }
        if !self.bounds.iter().all(|b| b.is_finite() && *b > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "bounds must be positive and finite, got {:?}",
                self.bounds
            )));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "speed must be a non-negative number, got {}",
                self.speed
            )));
        }
        if self.workgroup_size == 0 {
            return Err(SimulationError::InvalidConfig(
                "workgroup size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = SimulationConfig::default();
        assert_eq!(config.particle_count, 100);
        assert_eq!(config.bounds, [100.0, 56.0]);
        assert_eq!(config.frames, 100_000);
        assert_eq!(config.frame_interval, Duration::from_millis(1));
        assert!(config.use_params);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_run() {
        let config = SimulationConfig::default().with_particle_count(0);
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_degenerate_bounds() {
        for bounds in [[0.0, 10.0], [10.0, -1.0], [f32::NAN, 10.0], [f32::INFINITY, 1.0]] {
            let config = SimulationConfig::default().with_bounds(bounds);
            assert!(config.validate().is_err(), "{:?} should be rejected", bounds);
        }
    }

    #[test]
    fn test_rejects_negative_speed() {
        let config = SimulationConfig::default().with_speed(-1.0);
        assert!(config.validate().is_err());
    }
}
