pub mod agent;
pub mod bridge;
pub mod debug_logger;
pub mod render;

pub use debug_logger::{get_debug_logger, EnhancedDebugLogger};
pub use render::ConsoleRenderer;
