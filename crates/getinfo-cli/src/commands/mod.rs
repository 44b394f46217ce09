//! CLI commands

pub mod completion;
pub mod get;
