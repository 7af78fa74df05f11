//! Batch orchestration: enumerate tasks, run the planner once per task,
//! classify each run.
//!
//! Tasks run strictly one after another. Fatal conditions (a missing problem
//! file, a reported solution without a plan file, an unexplained unsolved task
//! under [`OnUnexplained::Abort`]) stop the whole batch.

use std::error::Error;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::core::classify::{InputRules, Outcome, classify_plan, solution_reported};
use crate::core::pddl::ProblemText;
use crate::core::summary::RunRecord;
use crate::io::config::{BatchConfig, OnUnexplained};
use crate::io::planner::{PlanRequest, Planner};
use crate::io::tasks::{enumerate_tasks, load_problem, problem_path};

/// The planner found no solution and the problem has none of the known
/// unsupported constructs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexplainedFailure {
    pub task: String,
    pub problem_file: PathBuf,
}

impl fmt::Display for UnexplainedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "planner found no solution for {} and {} uses no known unsupported construct",
            self.task,
            self.problem_file.display()
        )
    }
}

impl Error for UnexplainedFailure {}

/// Run every task under `cfg.tasks_root`, in enumeration order.
///
/// Diagnostics for zero-cost plans are written to `out` as they happen.
#[instrument(skip_all, fields(tasks_root = %cfg.tasks_root.display()))]
pub fn run_batch<P: Planner, W: Write>(
    cfg: &BatchConfig,
    planner: &P,
    out: &mut W,
) -> Result<Vec<RunRecord>> {
    let tasks = enumerate_tasks(&cfg.tasks_root, &cfg.domain_dir_marker)?;
    info!(tasks = tasks.len(), "batch started");

    let rules = cfg.classify.input_rules();
    let mut records = Vec::with_capacity(tasks.len());
    for task in tasks {
        let outcome = run_task(cfg, &rules, planner, &task, out)?;
        records.push(RunRecord::new(task, outcome));
    }

    info!(tasks = records.len(), "batch finished");
    Ok(records)
}

/// Run and classify one task.
#[instrument(skip_all, fields(task = %task))]
pub fn run_task<P: Planner, W: Write>(
    cfg: &BatchConfig,
    rules: &InputRules,
    planner: &P,
    task: &str,
    out: &mut W,
) -> Result<Outcome> {
    let problem_file = problem_path(&cfg.tasks_root, task, &cfg.problem_file_name);
    let text = load_problem(&cfg.tasks_root, task, &cfg.problem_file_name)?;
    let problem = ProblemText::parse(&text);

    if let Some(predicate) = rules.skip_reason(&problem) {
        info!(predicate = %predicate, "skipping task with unsupported predicate");
        return Ok(Outcome::Skipped { predicate });
    }

    let request = PlanRequest {
        task: task.to_string(),
        domain_file: cfg.domain_file.clone(),
        problem_file: problem_file.clone(),
        search_config: cfg.search_config.clone(),
        timeout: cfg.planner_timeout(),
    };
    let run = planner
        .solve(&request)
        .with_context(|| format!("plan task {task}"))?;
    debug!(exit_code = ?run.exit_code, timed_out = run.timed_out, "planner returned");

    let outcome = if run.timed_out {
        Outcome::TimedOut
    } else if solution_reported(&run.stdout, &cfg.solution_marker) {
        let plan = run.plan.as_ref().ok_or_else(|| {
            anyhow!(
                "planner reported a solution for {task} but wrote no {}",
                cfg.plan_file_name
            )
        })?;
        let outcome = classify_plan(plan);
        if outcome == Outcome::ZeroCostPlan {
            warn!("planner returned a zero-cost plan");
            writeln!(out, "{task} fails because of cost = 0 plan").context("write diagnostic")?;
        }
        outcome
    } else {
        rules.classify_unsolved(&problem)
    };

    if outcome == Outcome::Unexplained && cfg.classify.on_unexplained == OnUnexplained::Abort {
        return Err(UnexplainedFailure {
            task: task.to_string(),
            problem_file,
        }
        .into());
    }

    info!(outcome = outcome.label(), "task classified");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::planner::PlannerRun;
    use crate::test_support::{ScriptedPlanner, TaskTree, solved_run, unsolved_run};

    #[test]
    fn unexplained_failure_message_names_task() {
        let err = UnexplainedFailure {
            task: "task_bar".to_string(),
            problem_file: PathBuf::from("tasks/task_bar/problem0.pddl"),
        };
        let message = err.to_string();
        assert!(message.contains("task_bar"));
        assert!(message.contains("problem0.pddl"));
    }

    #[test]
    fn solution_without_plan_file_is_fatal() {
        let tree = TaskTree::new();
        tree.write_task("task_bar", "(:goal (and (cooked chicken_1)))");
        let planner = ScriptedPlanner::new(vec![PlannerRun {
            stdout: "Solution found!".to_string(),
            exit_code: Some(0),
            timed_out: false,
            plan: None,
        }]);

        let mut out = Vec::new();
        let err = run_batch(&tree.config(), &planner, &mut out).expect_err("missing plan");
        assert!(format!("{err:#}").contains("wrote no sas_plan"));
    }

    #[test]
    fn timeout_is_recorded_before_output_is_inspected() {
        let tree = TaskTree::new();
        tree.write_task("task_bar", "(:goal (forall (?x - obj) (clean ?x)))");
        let planner = ScriptedPlanner::new(vec![PlannerRun {
            timed_out: true,
            ..unsolved_run()
        }]);

        let mut out = Vec::new();
        let records = run_batch(&tree.config(), &planner, &mut out).expect("batch");
        assert_eq!(records[0].outcome, Outcome::TimedOut);
    }

    #[test]
    fn request_carries_config() {
        let tree = TaskTree::new();
        tree.write_task("task_bar", "(:goal (and (cooked chicken_1)))");
        let mut cfg = tree.config();
        cfg.planner_timeout_secs = Some(90);
        let planner = ScriptedPlanner::new(vec![solved_run(3)]);

        let mut out = Vec::new();
        run_batch(&cfg, &planner, &mut out).expect("batch");
        let requests = planner.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].task, "task_bar");
        assert_eq!(requests[0].domain_file, PathBuf::from("behavior_full.pddl"));
        assert_eq!(
            requests[0].problem_file,
            tree.root().join("task_bar").join("problem0.pddl")
        );
        assert_eq!(requests[0].search_config, "lazy_greedy([ff()], preferred=[ff()])");
        assert_eq!(requests[0].timeout, Some(std::time::Duration::from_secs(90)));
    }
}
