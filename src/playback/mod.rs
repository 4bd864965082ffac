pub mod engine;

pub use engine::SimulationContext;

use serde::{Deserialize, Serialize};

/// Allowed range of the configured initial position
pub const INITIAL_POSITION_RANGE: (f64, f64) = (0.0, 40.0);

/// Allowed range of the configured initial velocity
pub const INITIAL_VELOCITY_RANGE: (f64, f64) = (-5.0, 5.0);

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// User-configurable starting conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    pub position: f64,
    /// Surfaced on the control panel; the analytic model does not consume it
    pub velocity: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            position: 0.0,
            velocity: 1.0,
        }
    }
}

impl InitialConditions {
    /// Copy with both values forced into their allowed ranges
    pub fn clamped(self) -> Self {
        Self {
            position: self.position.clamp(INITIAL_POSITION_RANGE.0, INITIAL_POSITION_RANGE.1),
            velocity: self.velocity.clamp(INITIAL_VELOCITY_RANGE.0, INITIAL_VELOCITY_RANGE.1),
        }
    }
}

/// Every user action the synchronizer understands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play,
    Stop,
    Reset,
    /// Preview a point of the history (simulated seconds)
    Scrub(f64),
    SetInitialPosition(f64),
    SetInitialVelocity(f64),
    TogglePlayback,
    StepBackward,
    StepForward,
}

/// The 3-D scene as seen by the simulation
pub trait SceneView {
    /// Move the animated object along the x axis
    fn set_object_position(&mut self, x: f64);

    /// Ask for the current (possibly frozen) state to be drawn
    fn request_render(&mut self);
}

/// A time-series chart as seen by the simulation
pub trait ChartView {
    /// Append one point; `label` is the formatted time of the sample
    fn append_sample(&mut self, label: &str, value: f64);

    /// Drop all samples and labels
    fn clear(&mut self);

    /// Place the vertical cursor at time `x`
    fn set_cursor(&mut self, x: f64);

    /// Redraw after a mutation
    fn update(&mut self);
}

/// Collaborators driven by the simulation each frame
pub struct Views<'a> {
    pub scene: &'a mut dyn SceneView,
    pub position_chart: &'a mut dyn ChartView,
    pub velocity_chart: &'a mut dyn ChartView,
}
