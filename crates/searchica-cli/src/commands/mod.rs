pub mod config;
pub mod search;
pub mod status;
pub mod tui;

pub use search::run_search;
pub use status::show_status;
pub use tui::{run_tui, TuiArgs};
