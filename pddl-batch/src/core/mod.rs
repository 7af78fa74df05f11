//! Pure logic: PDDL scanning, plan parsing, classification, summary.
//!
//! Nothing here touches the filesystem or spawns processes.

pub mod classify;
pub mod pddl;
pub mod plan;
pub mod summary;
