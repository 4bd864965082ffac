use crate::core::{History, MotionModel};
use crate::playback::{
    Command, InitialConditions, PlaybackState, Views, INITIAL_POSITION_RANGE,
    INITIAL_VELOCITY_RANGE,
};
use tracing::{debug, info, trace, warn};

/// Simulation clock plus playback synchronizer.
///
/// Owns the authoritative time, the sample history and the scrub position.
/// While playing, the clock drives the object and the charts and the scrub
/// value mirrors time. While stopped, the scrub value alone decides which
/// recorded sample is displayed.
pub struct SimulationContext {
    model: MotionModel,
    initial: InitialConditions,
    state: PlaybackState,
    /// Playing frames elapsed since the last reset
    frames: u64,
    history: History,
    scrub_value: f64,
    object_position: f64,
}

impl SimulationContext {
    pub fn new(model: MotionModel, initial: InitialConditions) -> Self {
        let initial = initial.clamped();
        Self {
            model,
            initial,
            state: PlaybackState::Stopped,
            frames: 0,
            history: History::new(),
            scrub_value: 0.0,
            object_position: initial.position,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Current simulated time in seconds
    pub fn time(&self) -> f64 {
        self.model.time_at(self.frames)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn initial(&self) -> InitialConditions {
        self.initial
    }

    /// Playback value shown on the scrub control
    pub fn scrub_value(&self) -> f64 {
        self.scrub_value
    }

    /// History index addressed by the scrub value
    pub fn scrub_index(&self) -> usize {
        self.model.index_for(self.scrub_value).unwrap_or(0)
    }

    /// Advance the clock by `frames` display frames (only while playing),
    /// then request a render of whatever is current.
    pub fn tick(&mut self, frames: u32, views: &mut Views) {
        if self.is_playing() {
            for _ in 0..frames {
                self.advance(views);
            }
            trace!(frames = self.frames, time = self.time(), position = self.object_position, "tick");
        }
        views.scene.request_render();
    }

    fn advance(&mut self, views: &mut Views) {
        self.frames += 1;
        let sample = self.model.sample(self.time());

        self.object_position = sample.position;
        views.scene.set_object_position(sample.position);

        let label = sample.label();
        views.position_chart.append_sample(&label, sample.position);
        views.velocity_chart.append_sample(&label, sample.velocity);
        views.position_chart.update();
        views.velocity_chart.update();

        self.history.push(sample);
        self.scrub_value = sample.t;
    }

    /// Start or resume playback from the current time
    pub fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        self.state = PlaybackState::Playing;
        // The scrub control follows the clock again from here on
        self.scrub_value = self.time();
        info!(time = self.time(), "playback started");
    }

    /// Freeze the clock; object and scrub control keep their last values
    pub fn stop(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.state = PlaybackState::Stopped;
        info!(time = self.time(), position = self.object_position, samples = self.history.len(), "playback stopped");
    }

    /// Return to time zero with an empty history and empty charts
    pub fn reset(&mut self, views: &mut Views) {
        self.state = PlaybackState::Stopped;
        self.frames = 0;
        self.history.clear();
        self.scrub_value = 0.0;

        self.object_position = self.initial.position;
        views.scene.set_object_position(self.initial.position);

        views.position_chart.clear();
        views.velocity_chart.clear();
        views.position_chart.set_cursor(0.0);
        views.velocity_chart.set_cursor(0.0);
        views.position_chart.update();
        views.velocity_chart.update();

        info!(initial_position = self.initial.position, "simulation reset");
    }

    /// Preview the recorded sample at `value` simulated seconds.
    ///
    /// Ignored while playing. Indices past the end of the history clamp to
    /// the last sample.
    pub fn scrub(&mut self, value: f64, views: &mut Views) {
        if self.is_playing() {
            debug!(value, "scrub ignored while playing");
            return;
        }
        let Some(index) = self.model.index_for(value) else {
            warn!(value, "ignoring non-finite scrub value");
            return;
        };

        if let Some(sample) = self.history.get_clamped(index) {
            if index >= self.history.len() {
                debug!(index, len = self.history.len(), "scrub index clamped");
            }
            self.object_position = sample.position;
            views.scene.set_object_position(sample.position);
        }

        self.scrub_value = value;
        views.position_chart.set_cursor(value);
        views.velocity_chart.set_cursor(value);
        views.position_chart.update();
        views.velocity_chart.update();
    }

    /// Move the scrub position by whole samples while stopped
    pub fn step_scrub(&mut self, delta: i64, views: &mut Views) {
        if self.is_playing() || self.history.is_empty() {
            return;
        }
        let last = self.history.len() as i64 - 1;
        // The scrub value may address past the end (e.g. right after stop)
        let start = (self.scrub_index() as i64).min(last);
        let index = (start + delta).clamp(0, last);
        if index == start {
            return;
        }
        self.scrub(index as f64 / self.model.samples_per_unit(), views);
    }

    /// Store the reset target; while stopped, preview it on the scene
    pub fn set_initial_position(&mut self, value: f64, views: &mut Views) {
        let value = value.clamp(INITIAL_POSITION_RANGE.0, INITIAL_POSITION_RANGE.1);
        self.initial.position = value;
        if !self.is_playing() {
            self.object_position = value;
            views.scene.set_object_position(value);
        }
    }

    pub fn set_initial_velocity(&mut self, value: f64) {
        self.initial.velocity = value.clamp(INITIAL_VELOCITY_RANGE.0, INITIAL_VELOCITY_RANGE.1);
    }

    pub fn dispatch(&mut self, command: Command, views: &mut Views) {
        debug!(?command, "dispatch");
        match command {
            Command::Play => self.play(),
            Command::Stop => self.stop(),
            Command::Reset => self.reset(views),
            Command::Scrub(value) => self.scrub(value, views),
            Command::SetInitialPosition(value) => self.set_initial_position(value, views),
            Command::SetInitialVelocity(value) => self.set_initial_velocity(value),
            Command::TogglePlayback => {
                if self.is_playing() {
                    self.stop();
                } else {
                    self.play();
                }
            }
            Command::StepBackward => self.step_scrub(-1, views),
            Command::StepForward => self.step_scrub(1, views),
        }
    }
}

#[cfg(test)]
impl SimulationContext {
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Last position pushed to the scene
    pub fn object_position(&self) -> f64 {
        self.object_position
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(MotionModel::default(), InitialConditions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{ChartView, SceneView};

    const EPS: f64 = 1e-9;

    #[derive(Default)]
    struct RecordingScene {
        position: Option<f64>,
        renders: usize,
    }

    impl SceneView for RecordingScene {
        fn set_object_position(&mut self, x: f64) {
            self.position = Some(x);
        }

        fn request_render(&mut self) {
            self.renders += 1;
        }
    }

    #[derive(Default)]
    struct RecordingChart {
        labels: Vec<String>,
        values: Vec<f64>,
        cursor: Option<f64>,
        updates: usize,
    }

    impl ChartView for RecordingChart {
        fn append_sample(&mut self, label: &str, value: f64) {
            self.labels.push(label.to_string());
            self.values.push(value);
        }

        fn clear(&mut self) {
            self.labels.clear();
            self.values.clear();
        }

        fn set_cursor(&mut self, x: f64) {
            self.cursor = Some(x);
        }

        fn update(&mut self) {
            self.updates += 1;
        }
    }

    #[derive(Default)]
    struct Harness {
        scene: RecordingScene,
        position: RecordingChart,
        velocity: RecordingChart,
    }

    impl Harness {
        fn views(&mut self) -> Views<'_> {
            Views {
                scene: &mut self.scene,
                position_chart: &mut self.position,
                velocity_chart: &mut self.velocity,
            }
        }
    }

    fn played_ten_frames() -> (SimulationContext, Harness) {
        let mut sim = SimulationContext::default();
        let mut h = Harness::default();
        sim.play();
        for _ in 0..10 {
            sim.tick(1, &mut h.views());
        }
        (sim, h)
    }

    #[test]
    fn test_initial_state() {
        let sim = SimulationContext::default();
        assert_eq!(sim.state(), PlaybackState::Stopped);
        assert_eq!(sim.time(), 0.0);
        assert!(sim.history().is_empty());
        assert_eq!(sim.scrub_value(), 0.0);
        assert_eq!(sim.object_position(), 0.0);
    }

    #[test]
    fn test_ten_frames_of_playback() {
        let (sim, h) = played_ten_frames();

        assert_eq!(sim.time(), 1.0);
        assert_eq!(sim.history().len(), 10);
        let expected = 20.0 * 0.1f64.sin();
        assert!((sim.object_position() - expected).abs() < EPS);
        assert!((h.scene.position.unwrap() - expected).abs() < EPS);

        assert_eq!(h.position.values.len(), 10);
        assert_eq!(h.velocity.values.len(), 10);
        assert_eq!(h.position.labels.first().map(String::as_str), Some("0.10"));
        assert_eq!(h.position.labels.last().map(String::as_str), Some("1.00"));
        assert!((h.velocity.values[9] - 2.0 * 0.1f64.cos()).abs() < EPS);
        assert_eq!(h.position.updates, 10);
        assert_eq!(h.scene.renders, 10);
    }

    #[test]
    fn test_scrub_value_mirrors_clock_while_playing() {
        let (sim, _h) = played_ten_frames();
        assert_eq!(sim.scrub_value(), sim.time());
        assert_eq!(sim.scrub_index() as u64, sim.frames());
    }

    #[test]
    fn test_play_after_scrub_mirrors_clock_immediately() {
        let (mut sim, mut h) = played_ten_frames();
        sim.stop();
        sim.scrub(0.5, &mut h.views());
        assert_eq!(sim.scrub_value(), 0.5);

        sim.play();
        sim.tick(0, &mut h.views());

        assert!(sim.is_playing());
        assert_eq!(sim.scrub_value(), sim.time());
        assert_eq!(sim.scrub_index() as u64, sim.frames());
    }

    #[test]
    fn test_tick_while_stopped_only_renders() {
        let mut sim = SimulationContext::default();
        let mut h = Harness::default();
        sim.tick(5, &mut h.views());

        assert_eq!(sim.time(), 0.0);
        assert!(sim.history().is_empty());
        assert!(h.scene.position.is_none());
        assert!(h.position.values.is_empty());
        assert_eq!(h.scene.renders, 1);
    }

    #[test]
    fn test_tick_zero_frames_while_playing() {
        let mut sim = SimulationContext::default();
        let mut h = Harness::default();
        sim.play();
        sim.tick(0, &mut h.views());
        assert_eq!(sim.time(), 0.0);
        assert!(sim.history().is_empty());
        assert_eq!(h.scene.renders, 1);
    }

    #[test]
    fn test_multi_frame_tick_matches_single_ticks() {
        let (single, _) = played_ten_frames();

        let mut sim = SimulationContext::default();
        let mut h = Harness::default();
        sim.play();
        sim.tick(10, &mut h.views());

        assert_eq!(sim.time(), single.time());
        assert_eq!(sim.history().samples(), single.history().samples());
        assert_eq!(h.scene.renders, 1);
    }

    #[test]
    fn test_stop_then_scrub() {
        let (mut sim, mut h) = played_ten_frames();
        sim.stop();
        sim.scrub(0.5, &mut h.views());

        let recorded = sim.history().get(5).unwrap().position;
        assert_eq!(sim.object_position(), recorded);
        assert_eq!(h.scene.position, Some(recorded));
        assert_eq!(sim.time(), 1.0);
        assert_eq!(sim.scrub_value(), 0.5);
        assert_eq!(h.position.cursor, Some(0.5));
        assert_eq!(h.velocity.cursor, Some(0.5));
    }

    #[test]
    fn test_scrub_while_playing_is_noop() {
        let (mut sim, mut h) = played_ten_frames();
        let position = sim.object_position();
        let updates = h.position.updates;

        sim.scrub(0.3, &mut h.views());

        assert!(sim.is_playing());
        assert_eq!(sim.object_position(), position);
        assert_eq!(sim.scrub_value(), 1.0);
        assert_eq!(sim.time(), 1.0);
        assert!(h.position.cursor.is_none());
        assert_eq!(h.position.updates, updates);
    }

    #[test]
    fn test_scrub_past_end_clamps_to_last_sample() {
        let (mut sim, mut h) = played_ten_frames();
        sim.stop();
        sim.scrub(100.0, &mut h.views());

        let last = sim.history().last().unwrap().position;
        assert_eq!(sim.object_position(), last);
        assert_eq!(h.position.cursor, Some(100.0));
    }

    #[test]
    fn test_scrub_with_empty_history_keeps_object() {
        let mut sim = SimulationContext::default();
        let mut h = Harness::default();
        sim.scrub(3.0, &mut h.views());

        assert_eq!(sim.object_position(), 0.0);
        assert!(h.scene.position.is_none());
        assert_eq!(sim.scrub_value(), 3.0);
        assert_eq!(h.position.cursor, Some(3.0));
    }

    #[test]
    fn test_scrub_rejects_non_finite_value() {
        let (mut sim, mut h) = played_ten_frames();
        sim.stop();
        sim.scrub(f64::NAN, &mut h.views());
        assert_eq!(sim.scrub_value(), 1.0);
        assert!(h.position.cursor.is_none());
    }

    #[test]
    fn test_play_resumes_from_current_time() {
        let mut sim = SimulationContext::default();
        let mut h = Harness::default();

        sim.play();
        sim.tick(5, &mut h.views());
        sim.stop();
        sim.tick(3, &mut h.views());
        assert_eq!(sim.time(), 0.5);

        sim.play();
        sim.tick(5, &mut h.views());
        assert_eq!(sim.time(), 1.0);
        assert_eq!(sim.history().len(), 10);
    }

    #[test]
    fn test_time_monotonic_over_play_stop_sequence() {
        let mut sim = SimulationContext::default();
        let mut h = Harness::default();
        let mut last = sim.time();

        for round in 0..20 {
            if round % 3 == 0 {
                sim.play();
            } else if round % 5 == 0 {
                sim.stop();
            }
            let before = sim.time();
            sim.tick(1, &mut h.views());
            if sim.is_playing() {
                assert!(sim.time() > before);
            } else {
                assert_eq!(sim.time(), before);
            }
            assert!(sim.time() >= last);
            last = sim.time();
        }
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut sim = SimulationContext::new(
            MotionModel::default(),
            InitialConditions { position: 12.0, velocity: 1.0 },
        );
        let mut h = Harness::default();
        sim.play();
        sim.tick(7, &mut h.views());

        sim.reset(&mut h.views());

        assert_eq!(sim.state(), PlaybackState::Stopped);
        assert_eq!(sim.time(), 0.0);
        assert!(sim.history().is_empty());
        assert_eq!(sim.object_position(), 12.0);
        assert_eq!(h.scene.position, Some(12.0));
        assert_eq!(sim.scrub_value(), 0.0);
        assert!(h.position.labels.is_empty());
        assert!(h.velocity.values.is_empty());
        assert_eq!(h.position.cursor, Some(0.0));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let (mut sim, mut h) = played_ten_frames();

        sim.reset(&mut h.views());
        let first = (sim.state(), sim.time(), sim.history().len(), sim.object_position(), sim.scrub_value());
        sim.reset(&mut h.views());
        let second = (sim.state(), sim.time(), sim.history().len(), sim.object_position(), sim.scrub_value());

        assert_eq!(first, second);
    }

    #[test]
    fn test_initial_position_preview_while_stopped() {
        let (mut sim, mut h) = played_ten_frames();
        sim.stop();

        sim.set_initial_position(25.0, &mut h.views());

        assert_eq!(sim.initial().position, 25.0);
        assert_eq!(sim.object_position(), 25.0);
        assert_eq!(h.scene.position, Some(25.0));
        assert_eq!(sim.time(), 1.0);
        assert_eq!(sim.history().len(), 10);
    }

    #[test]
    fn test_initial_position_while_playing_is_stored_only() {
        let (mut sim, mut h) = played_ten_frames();
        let position = sim.object_position();

        sim.set_initial_position(99.0, &mut h.views());

        assert_eq!(sim.initial().position, 40.0);
        assert_eq!(sim.object_position(), position);

        sim.reset(&mut h.views());
        assert_eq!(sim.object_position(), 40.0);
    }

    #[test]
    fn test_initial_velocity_is_clamped_and_stored() {
        let mut sim = SimulationContext::default();
        sim.set_initial_velocity(-12.0);
        assert_eq!(sim.initial().velocity, -5.0);
        sim.set_initial_velocity(2.5);
        assert_eq!(sim.initial().velocity, 2.5);
    }

    #[test]
    fn test_dispatch_commands() {
        let mut sim = SimulationContext::default();
        let mut h = Harness::default();

        sim.dispatch(Command::TogglePlayback, &mut h.views());
        assert!(sim.is_playing());
        sim.tick(4, &mut h.views());
        sim.dispatch(Command::TogglePlayback, &mut h.views());
        assert!(!sim.is_playing());

        sim.dispatch(Command::Scrub(0.2), &mut h.views());
        assert_eq!(sim.scrub_index(), 2);

        sim.dispatch(Command::Play, &mut h.views());
        sim.dispatch(Command::Stop, &mut h.views());
        sim.dispatch(Command::SetInitialVelocity(3.0), &mut h.views());
        assert_eq!(sim.initial().velocity, 3.0);

        sim.dispatch(Command::Reset, &mut h.views());
        assert_eq!(sim.time(), 0.0);
    }

    #[test]
    fn test_step_scrub_stays_in_history() {
        let (mut sim, mut h) = played_ten_frames();
        sim.stop();

        sim.dispatch(Command::StepBackward, &mut h.views());
        assert_eq!(sim.scrub_index(), 8);
        assert_eq!(sim.object_position(), sim.history().get(8).unwrap().position);

        sim.scrub(0.0, &mut h.views());
        sim.dispatch(Command::StepBackward, &mut h.views());
        assert_eq!(sim.scrub_index(), 0);
    }

    #[test]
    fn test_step_forward_at_end_of_history_is_noop() {
        let (mut sim, mut h) = played_ten_frames();
        sim.stop();

        sim.dispatch(Command::StepForward, &mut h.views());
        assert_eq!(sim.scrub_value(), 1.0);
        assert!(h.position.cursor.is_none());

        sim.scrub(0.9, &mut h.views());
        sim.dispatch(Command::StepForward, &mut h.views());
        assert_eq!(sim.scrub_index(), 9);
    }

    #[test]
    fn test_step_scrub_ignored_while_playing() {
        let (mut sim, mut h) = played_ten_frames();
        sim.dispatch(Command::StepBackward, &mut h.views());
        assert_eq!(sim.scrub_value(), 1.0);
    }
}
