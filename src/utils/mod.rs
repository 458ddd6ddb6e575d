//! Utilities Module
//!
//! Common utilities used across the crate.

mod format;
mod http;
pub mod logging;
#[cfg(test)]
pub(crate) mod test_server;

pub use format::*;
pub use http::*;
