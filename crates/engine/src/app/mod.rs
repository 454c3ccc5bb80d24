mod input;
mod loop_runner;
mod metrics;
mod rendering;

pub use input::{InputAction, InputPolicy, InputSnapshot, ParseInputPolicyError};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{visible_tile_span, world_to_screen_px, Renderer, TileSpan};
