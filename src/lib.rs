//! histgrep - grep through the history of many git repositories at once
//!
//! Every immediate subdirectory of a root directory is opened as a git
//! repository and scanned on its own worker. A commit matches when the patch
//! text of any path it changed (relative to its single parent) matches the
//! regular expression.

pub mod bounds;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod matcher;
pub mod ports;
pub mod report;
pub mod scan;
pub mod scanner;

// Re-exports for ergonomics
pub use bounds::BoundPolicy;
pub use domain::*;
pub use error::{Result, ScanError};
pub use scan::Coordinator;
