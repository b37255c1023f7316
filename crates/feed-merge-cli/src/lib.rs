//! Command-line and HTTP front end for [`feed_merge`].
//!
//! ## Modules
//!
//! - [`cli`]: argument parsing, config loading and file/stdin helpers
//! - [`server`]: the `axum` router serving the merged calendar
//! - [`telemetry`]: `tracing-subscriber` installation

pub mod cli;
pub mod server;
pub mod telemetry;
