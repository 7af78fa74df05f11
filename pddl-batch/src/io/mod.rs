//! Side effects: configuration, task discovery, process and planner execution.

pub mod config;
pub mod planner;
pub mod process;
pub mod tasks;
