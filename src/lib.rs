// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod feedback;
pub mod generator;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod ui;

pub use app::{App, AppState};
