// Library surface for the binary and for headless integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod engine;
pub mod feedback;
pub mod history;
pub mod logging;
pub mod message;
pub mod phrases;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod ui;
