// Terminal UI implementation using ratatui
// Draws the controller's QuoteState and turns key presses into QuoteEvents

pub mod app;
pub mod help_ui;
pub mod runner;
pub mod ui;

pub use app::{App, Tab};
pub use runner::run_tui;
