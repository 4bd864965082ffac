use crate::playback::{
    Command, InitialConditions, SimulationContext, INITIAL_POSITION_RANGE, INITIAL_VELOCITY_RANGE,
};
use imgui::Ui;

/// Upper bound of the playback slider (simulated seconds)
pub const PLAYBACK_MAX: f32 = 100.0;

/// Snap a dragged playback value to the slider's whole-second steps
fn snap_playback(value: f32) -> f32 {
    value.round().clamp(0.0, PLAYBACK_MAX)
}

/// Control panel: initial conditions, transport buttons and the playback slider
pub struct ControlPanel {
    initial_position: f32,
    initial_velocity: f32,
    playback: f32,
    is_playing: bool,
    time: f64,
    samples: usize,
}

impl ControlPanel {
    pub fn new(initial: InitialConditions) -> Self {
        Self {
            initial_position: initial.position as f32,
            initial_velocity: initial.velocity as f32,
            playback: 0.0,
            is_playing: false,
            time: 0.0,
            samples: 0,
        }
    }

    /// Write the simulation's view of the controls back into the widgets.
    /// Called every frame so the playback slider mirrors the clock.
    pub fn sync(&mut self, sim: &SimulationContext) {
        let initial = sim.initial();
        self.initial_position = initial.position as f32;
        self.initial_velocity = initial.velocity as f32;
        self.set_playback(sim.scrub_value());
        self.is_playing = sim.is_playing();
        self.time = sim.time();
        self.samples = sim.history().len();
    }

    pub fn set_playback(&mut self, value: f64) {
        self.playback = (value as f32).clamp(0.0, PLAYBACK_MAX);
    }

    /// Render the panel and return the commands the user issued this frame
    pub fn render(&mut self, ui: &Ui) -> Vec<Command> {
        let mut commands = Vec::new();

        if ui.slider_config(
            "Initial Position",
            INITIAL_POSITION_RANGE.0 as f32,
            INITIAL_POSITION_RANGE.1 as f32,
        )
        .display_format("%.1f")
        .build(&mut self.initial_position)
        {
            commands.push(Command::SetInitialPosition(self.initial_position as f64));
        }

        if ui.slider_config(
            "Initial Velocity",
            INITIAL_VELOCITY_RANGE.0 as f32,
            INITIAL_VELOCITY_RANGE.1 as f32,
        )
        .display_format("%.2f")
        .build(&mut self.initial_velocity)
        {
            commands.push(Command::SetInitialVelocity(self.initial_velocity as f64));
        }

        ui.separator();

        if ui.button("Play") {
            commands.push(Command::Play);
        }
        ui.same_line();
        if ui.button("Stop") {
            commands.push(Command::Stop);
        }
        ui.same_line();
        if ui.button("Reset") {
            commands.push(Command::Reset);
        }

        if ui.slider_config("Playback", 0.0, PLAYBACK_MAX)
            .display_format("%.1f")
            .build(&mut self.playback)
        {
            self.playback = snap_playback(self.playback);
            commands.push(Command::Scrub(self.playback as f64));
        }
        if self.is_playing && ui.is_item_hovered() {
            ui.tooltip_text("Stop playback to scrub");
        }

        ui.separator();
        let (label, color) = if self.is_playing {
            ("Playing", [0.3, 0.9, 0.3, 1.0])
        } else {
            ("Stopped", [0.9, 0.7, 0.3, 1.0])
        };
        ui.text_colored(color, label);
        ui.same_line();
        ui.text(format!("t = {:.2}s | {} samples", self.time, self.samples));

        commands
    }
}
