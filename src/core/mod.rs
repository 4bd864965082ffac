pub mod motion;
pub mod history;

pub use motion::MotionModel;
pub use history::History;
