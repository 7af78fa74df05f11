//! Stable exit codes for the `pddl-batch` CLI.

/// Batch completed and the summary was printed.
pub const OK: i32 = 0;
/// Invalid config, missing input, planner spawn failure or other fatal error.
pub const INVALID: i32 = 1;
/// An unsolved task had no known cause and the batch was configured to abort.
pub const UNEXPLAINED: i32 = 2;
