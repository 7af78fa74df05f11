//! Batch harness for running a classical planner over a directory of PDDL tasks.
//!
//! Each task directory holds one problem file. The harness invokes the
//! planner once per task, classifies the run from the planner's output and
//! plan file, and prints a summary.
//!
//! - **[`core`]**: Pure logic (PDDL scanning, plan parsing, classification,
//!   summary). No I/O.
//! - **[`io`]**: Config, filesystem and process execution.
//!
//! [`run`] orchestrates the two; [`report`] renders the result.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod report;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
