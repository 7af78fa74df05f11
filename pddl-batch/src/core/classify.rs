//! Outcome taxonomy for a single planner run.
//!
//! Every task ends in exactly one [`Outcome`], and every outcome maps to
//! exactly one [`Bucket`] of the summary. Unsolved tasks are explained by the
//! unsupported constructs found in their problem text; a task that cannot be
//! explained this way is [`Outcome::Unexplained`] rather than a crash.

use crate::core::pddl::ProblemText;
use crate::core::plan::Plan;

/// How a task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Planner reported a solution with a non-degenerate plan.
    Solved { plan_cost: Option<u64> },
    /// Planner reported a solution but the plan has cost 0.
    ZeroCostPlan,
    /// Problem mentions a skip-listed predicate; planner not invoked.
    Skipped { predicate: String },
    /// No solution, and the problem uses constructs the planner cannot parse.
    Unsupported { constructs: Vec<String> },
    /// No solution and no known cause.
    Unexplained,
    /// Planner exceeded the configured timeout.
    TimedOut,
}

/// Summary partition an outcome is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Success,
    Failure,
    ParsingFailure,
}

impl Outcome {
    pub fn bucket(&self) -> Bucket {
        match self {
            Outcome::Solved { .. } => Bucket::Success,
            Outcome::Unsupported { .. } => Bucket::ParsingFailure,
            Outcome::ZeroCostPlan
            | Outcome::Skipped { .. }
            | Outcome::Unexplained
            | Outcome::TimedOut => Bucket::Failure,
        }
    }

    pub fn solved(&self) -> bool {
        self.bucket() == Bucket::Success
    }

    /// False only when the input could not be handled by the planner's grammar.
    pub fn ran_successfully(&self) -> bool {
        self.bucket() != Bucket::ParsingFailure
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Solved { .. } => "solved",
            Outcome::ZeroCostPlan => "zero_cost_plan",
            Outcome::Skipped { .. } => "skipped",
            Outcome::Unsupported { .. } => "unsupported",
            Outcome::Unexplained => "unexplained",
            Outcome::TimedOut => "timed_out",
        }
    }
}

/// Known-unsupported input categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRules {
    /// List-head keywords the planner grammar rejects (e.g. `forall`).
    pub unsupported_constructs: Vec<String>,
    /// Predicates whose presence means the task is not attempted.
    pub skip_predicates: Vec<String>,
}

impl InputRules {
    /// First skip-listed predicate present in the problem.
    pub fn skip_reason(&self, problem: &ProblemText<'_>) -> Option<String> {
        self.skip_predicates
            .iter()
            .find(|predicate| problem.has_symbol(predicate))
            .cloned()
    }

    /// Unsupported constructs present in the problem, in rule order.
    pub fn unsupported_in(&self, problem: &ProblemText<'_>) -> Vec<String> {
        self.unsupported_constructs
            .iter()
            .filter(|construct| problem.has_list_head(construct))
            .cloned()
            .collect()
    }

    /// Explain a run that produced no solution.
    pub fn classify_unsolved(&self, problem: &ProblemText<'_>) -> Outcome {
        let constructs = self.unsupported_in(problem);
        if constructs.is_empty() {
            Outcome::Unexplained
        } else {
            Outcome::Unsupported { constructs }
        }
    }
}

/// True when planner stdout announces a solution.
pub fn solution_reported(stdout: &str, marker: &str) -> bool {
    stdout.contains(marker)
}

/// Classify a run whose output announced a solution.
pub fn classify_plan(plan: &Plan) -> Outcome {
    if plan.is_zero_cost() {
        Outcome::ZeroCostPlan
    } else {
        Outcome::Solved {
            plan_cost: plan.cost,
        }
    }
}
