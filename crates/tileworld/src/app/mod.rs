mod clock;
mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use clock::LoopRates;
pub use input::{InputAction, KeyEdge};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{palette, Color, DrawCommand, DrawList, Renderer};
pub use scene::{InputSnapshot, Scene, SceneCommand};
