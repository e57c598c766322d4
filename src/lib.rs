// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod auth;
pub mod config;
pub mod engine;
pub mod logging;
pub mod metrics;
pub mod runtime;
pub mod ui;
