//! Plan file parsing.
//!
//! Fast Downward writes one action per line, e.g. `(pick-up agent bowl_1)`,
//! followed by a comment line `; cost = 3 (unit cost)`.

use std::sync::LazyLock;

use regex::Regex;

static COST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^;\s*cost\s*=\s*(\d+)").unwrap());

const ZERO_COST_MARKER: &str = "cost = 0";

/// A parsed plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Action lines, parentheses included.
    pub actions: Vec<String>,
    /// Cost reported by the planner, if a cost line was found.
    pub cost: Option<u64>,
    zero_cost_marker: bool,
}

impl Plan {
    pub fn parse(text: &str) -> Self {
        let mut actions = Vec::new();
        let mut cost = None;
        for line in text.lines().map(str::trim) {
            if line.starts_with('(') {
                actions.push(line.to_string());
            } else if let Some(captures) = COST_RE.captures(line) {
                cost = captures[1].parse().ok();
            }
        }
        Self {
            actions,
            cost,
            zero_cost_marker: text.contains(ZERO_COST_MARKER),
        }
    }

    /// A zero-cost plan is degenerate and counts as a failure.
    ///
    /// Falls back to the raw `cost = 0` marker when no cost line parses.
    pub fn is_zero_cost(&self) -> bool {
        match self.cost {
            Some(cost) => cost == 0,
            None => self.zero_cost_marker,
        }
    }
}
