//! Terminal rendering and prompts.

pub mod live;
pub mod prompt;
pub mod table;

pub use live::{run_live, LiveView};
pub use prompt::LinePrompter;
pub use table::format_snapshot;
