//! CLI library components for the dashboard engine.

pub mod cli;
pub mod logging;
pub mod report;
pub mod session;
