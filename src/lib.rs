pub mod app;
pub mod client;
pub mod config;
pub mod session;
pub mod shared;
pub mod tui;
