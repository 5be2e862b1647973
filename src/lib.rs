// ABOUTME: Library root for deskchat: re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod accountant;
pub mod agent;
pub mod app;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod notify;
pub mod prompt;
pub mod session;
pub mod tokens;
pub mod tui;
