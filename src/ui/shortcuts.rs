use crate::playback::Command;
use imgui::{Condition, Ui};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// Keyboard shortcut manager
pub struct ShortcutManager {
    shortcuts: Vec<Shortcut>,
}

#[derive(Clone)]
pub struct Shortcut {
    pub key: PhysicalKey,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub action: ShortcutAction,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShortcutAction {
    TogglePlayback,
    Stop,
    Reset,
    StepBackward,
    StepForward,
    ToggleHelp,
}

impl ShortcutAction {
    /// Simulation command for this action, if it is one
    pub fn command(self) -> Option<Command> {
        match self {
            ShortcutAction::TogglePlayback => Some(Command::TogglePlayback),
            ShortcutAction::Stop => Some(Command::Stop),
            ShortcutAction::Reset => Some(Command::Reset),
            ShortcutAction::StepBackward => Some(Command::StepBackward),
            ShortcutAction::StepForward => Some(Command::StepForward),
            ShortcutAction::ToggleHelp => None,
        }
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManager {
    pub fn new() -> Self {
        let mut manager = Self {
            shortcuts: Vec::new(),
        };
        manager.register_defaults();
        manager
    }

    fn register_defaults(&mut self) {
        self.register_key(KeyCode::Space, ShortcutAction::TogglePlayback, "Play/Stop");
        self.register_key(KeyCode::Escape, ShortcutAction::Stop, "Stop");
        self.register_key(KeyCode::KeyR, ShortcutAction::Reset, "Reset");
        self.register_key(KeyCode::ArrowLeft, ShortcutAction::StepBackward, "Previous Sample");
        self.register_key(KeyCode::ArrowRight, ShortcutAction::StepForward, "Next Sample");
        self.register_key(KeyCode::F1, ShortcutAction::ToggleHelp, "Keyboard Shortcuts");
    }

    fn register_key(&mut self, code: KeyCode, action: ShortcutAction, description: &str) {
        self.register(Shortcut {
            key: PhysicalKey::Code(code),
            ctrl: false,
            shift: false,
            alt: false,
            action,
            description: description.to_string(),
        });
    }

    fn register(&mut self, shortcut: Shortcut) {
        self.shortcuts.push(shortcut);
    }

    /// Process a key event and return the matching action (if any)
    pub fn process_event(&self, event: &KeyEvent, modifiers: ModifiersState) -> Option<ShortcutAction> {
        self.lookup(event.physical_key, event.state, modifiers)
    }

    pub fn lookup(&self, key: PhysicalKey, state: ElementState, modifiers: ModifiersState) -> Option<ShortcutAction> {
        if state != ElementState::Pressed {
            return None;
        }

        self.shortcuts.iter()
            .find(|s| {
                s.key == key
                    && s.ctrl == modifiers.control_key()
                    && s.shift == modifiers.shift_key()
                    && s.alt == modifiers.alt_key()
            })
            .map(|s| s.action)
    }

    /// Render a shortcuts help window
    pub fn render_help(&self, ui: &Ui, is_open: &mut bool) {
        ui.window("Keyboard Shortcuts")
            .size([300.0, 200.0], Condition::FirstUseEver)
            .position([500.0, 200.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                for shortcut in &self.shortcuts {
                    let mut shortcut_str = String::new();
                    if shortcut.ctrl {
                        shortcut_str.push_str("Ctrl+");
                    }
                    if shortcut.shift {
                        shortcut_str.push_str("Shift+");
                    }
                    if shortcut.alt {
                        shortcut_str.push_str("Alt+");
                    }
                    shortcut_str.push_str(&key_to_string(shortcut.key));

                    ui.text(format!("  {:10} - {}", shortcut_str, shortcut.description));
                }
            });
    }
}

fn key_to_string(key: PhysicalKey) -> String {
    match key {
        PhysicalKey::Code(code) => match code {
            KeyCode::Space => "Space".to_string(),
            KeyCode::Escape => "Esc".to_string(),
            KeyCode::ArrowLeft => "←".to_string(),
            KeyCode::ArrowRight => "→".to_string(),
            KeyCode::KeyR => "R".to_string(),
            KeyCode::F1 => "F1".to_string(),
            other => format!("{:?}", other),
        },
        PhysicalKey::Unidentified(_) => "?".to_string(),
    }
}
