mod app;
pub mod keys;
pub mod view;

pub use app::{run_playground_tui, run_scripted_session};
