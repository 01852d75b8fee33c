//! Core types - pure abstractions shared across the pipeline.

mod category;
mod mode;
mod state;

pub use category::Category;
pub use mode::Mode;
pub use state::{is_shutdown, register_server, setup_shutdown_handler, shutdown_signal};
