//! kbase-cli
//!
//! Service wiring shared by the `kbase` binary and its HTTP server.

pub mod app;
pub mod server;

pub use app::App;
