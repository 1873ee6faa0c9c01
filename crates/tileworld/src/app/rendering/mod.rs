mod draw_list;
pub mod palette;
mod renderer;

pub use draw_list::{Color, DrawCommand, DrawList};
pub use renderer::Renderer;
