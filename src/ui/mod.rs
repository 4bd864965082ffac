pub mod chart;
pub mod controls;
pub mod scene;
pub mod shortcuts;

pub use chart::LineChart;
pub use controls::ControlPanel;
pub use scene::CubeScene;
pub use shortcuts::{ShortcutAction, ShortcutManager};
