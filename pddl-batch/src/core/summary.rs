//! Partition of run records into summary buckets.

use crate::core::classify::{Bucket, Outcome};

/// Result of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub task: String,
    pub outcome: Outcome,
}

impl RunRecord {
    pub fn new(task: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            task: task.into(),
            outcome,
        }
    }
}

/// How tasks in the parsing-failure bucket are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParsingFailures {
    /// Kept in their own bucket.
    #[default]
    Separate,
    /// Counted with the other failures.
    Folded,
}

/// Task names per bucket, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub successes: Vec<String>,
    pub failures: Vec<String>,
    /// Always empty when `parsing` is `Folded`.
    pub parsing_failures: Vec<String>,
    /// Subset of `failures` with no known cause.
    pub unexplained: Vec<String>,
    pub parsing: ParsingFailures,
}

impl Summary {
    /// Failures including parsing failures.
    pub fn failed_count(&self) -> usize {
        self.failures.len() + self.parsing_failures.len()
    }
}

pub fn summarize(records: &[RunRecord], parsing: ParsingFailures) -> Summary {
    let mut summary = Summary {
        total: records.len(),
        parsing,
        ..Summary::default()
    };
    for record in records {
        let task = record.task.clone();
        match record.outcome.bucket() {
            Bucket::Success => summary.successes.push(task),
            Bucket::ParsingFailure if parsing == ParsingFailures::Separate => {
                summary.parsing_failures.push(task);
            }
            Bucket::ParsingFailure => summary.failures.push(task),
            Bucket::Failure => {
                if record.outcome == Outcome::Unexplained {
                    summary.unexplained.push(task.clone());
                }
                summary.failures.push(task);
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_records() -> Vec<RunRecord> {
        vec![
            RunRecord::new("a", Outcome::Solved { plan_cost: Some(3) }),
            RunRecord::new("b", Outcome::ZeroCostPlan),
            RunRecord::new(
                "c",
                Outcome::Unsupported {
                    constructs: vec!["forall".to_string()],
                },
            ),
            RunRecord::new("d", Outcome::Unexplained),
            RunRecord::new(
                "e",
                Outcome::Skipped {
                    predicate: "stained".to_string(),
                },
            ),
        ]
    }

    #[test]
    fn every_record_lands_in_one_bucket() {
        let summary = summarize(&mixed_records(), ParsingFailures::Separate);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.successes, vec!["a"]);
        assert_eq!(summary.failures, vec!["b", "d", "e"]);
        assert_eq!(summary.parsing_failures, vec!["c"]);
        assert_eq!(summary.unexplained, vec!["d"]);
        assert_eq!(
            summary.total,
            summary.successes.len() + summary.failures.len() + summary.parsing_failures.len()
        );
        assert_eq!(summary.failed_count(), 4);
    }

    #[test]
    fn folded_parsing_failures_leave_two_buckets() {
        let summary = summarize(&mixed_records(), ParsingFailures::Folded);
        assert_eq!(summary.successes, vec!["a"]);
        assert_eq!(summary.failures, vec!["b", "c", "d", "e"]);
        assert!(summary.parsing_failures.is_empty());
        assert_eq!(summary.total, summary.successes.len() + summary.failures.len());
        assert_eq!(summary.failed_count(), 4);
    }

    #[test]
    fn empty_batch_has_zero_counts() {
        let summary = summarize(&[], ParsingFailures::Separate);
        assert_eq!(summary, Summary::default());
    }
}
