mod render;
mod root;
mod simulate;

pub use render::RenderCommand;
pub use root::Cli;
pub use simulate::SimulateCommand;
