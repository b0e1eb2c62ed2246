//! icondl core: resolve an Iconify set, list and filter its icons, fetch them
//! as SVG files with a bounded worker pool, then optionally zip the result.

pub mod config;
pub mod control;
pub mod endpoints;
pub mod error;
pub mod filter;
pub mod finalize;
pub mod http;
pub mod listing;
pub mod logging;
pub mod pipeline;
pub mod plan;
pub mod resolver;
pub mod retry;
pub mod storage;

pub use error::IcondlError;
