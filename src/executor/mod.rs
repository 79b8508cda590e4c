//! Test execution engine
//!
//! Process side effects and the standard pull request executor.

mod host;
mod standard;

pub use host::{ProcessHost, SystemHost};
pub use standard::StandardExecutor;

#[cfg(test)]
pub(crate) use host::mock;
