//! CLI commands

pub mod analyze;
pub mod diff;
pub mod init;
