// The binary in main.rs drives the terminal; everything it uses lives in
// this library so integration tests and benchmarks can reach it too.

pub mod api;
pub mod app;
pub mod config;
pub mod event;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;
