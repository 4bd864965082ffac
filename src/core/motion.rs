/// Default oscillation amplitude (scene units)
pub const DEFAULT_AMPLITUDE: f64 = 20.0;

/// Default angular frequency (rad per simulated second)
pub const DEFAULT_OMEGA: f64 = 0.1;

/// Simulated seconds advanced per display frame
pub const DEFAULT_STEP: f64 = 0.1;

/// One recorded point of the trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Simulated time in seconds
    pub t: f64,
    /// Object x position at `t`
    pub position: f64,
    /// Object x velocity at `t`
    pub velocity: f64,
}

impl Sample {
    /// Label used on the chart time axis
    pub fn label(&self) -> String {
        format!("{:.2}", self.t)
    }
}

/// Fixed analytic harmonic motion: x(t) = A·sin(ωt), v(t) = A·ω·cos(ωt)
///
/// The model is frame driven: every playing frame advances the clock by
/// `step`, so the history holds `samples_per_unit()` samples per simulated
/// second and a playback value maps to a history index by multiplication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionModel {
    pub amplitude: f64,
    pub omega: f64,
    pub step: f64,
}

impl Default for MotionModel {
    fn default() -> Self {
        Self {
            amplitude: DEFAULT_AMPLITUDE,
            omega: DEFAULT_OMEGA,
            step: DEFAULT_STEP,
        }
    }
}

impl MotionModel {
    pub fn position(&self, t: f64) -> f64 {
        self.amplitude * (self.omega * t).sin()
    }

    pub fn velocity(&self, t: f64) -> f64 {
        self.amplitude * self.omega * (self.omega * t).cos()
    }

    /// Evaluate the model at `t`
    pub fn sample(&self, t: f64) -> Sample {
        Sample {
            t,
            position: self.position(t),
            velocity: self.velocity(t),
        }
    }

    /// Simulated time after `frames` playing frames
    pub fn time_at(&self, frames: u64) -> f64 {
        frames as f64 * self.step
    }

    /// History entries per simulated second (10 for the default step)
    pub fn samples_per_unit(&self) -> f64 {
        (1.0 / self.step).round()
    }

    /// Map a playback value (simulated seconds) to a history index.
    ///
    /// Returns `None` for non-finite input. Negative values map to 0; the
    /// upper bound is left to the caller, which knows the history length.
    pub fn index_for(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let index = (value * self.samples_per_unit()).round();
        Some(if index <= 0.0 { 0 } else { index as usize })
    }
}
