//! Test-only helpers: on-disk task trees and a scripted planner.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::plan::Plan;
use crate::io::config::BatchConfig;
use crate::io::planner::{PlanRequest, Planner, PlannerRun};

/// A temporary tasks root with one subdirectory per task.
pub struct TaskTree {
    temp: TempDir,
}

impl TaskTree {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("tasks")).expect("tasks root");
        Self { temp }
    }

    /// The tasks root.
    pub fn root(&self) -> PathBuf {
        self.temp.path().join("tasks")
    }

    /// The directory holding the tasks root; usable as a harness working directory.
    pub fn workdir(&self) -> &Path {
        self.temp.path()
    }

    /// Create `<root>/<name>/problem0.pddl` with `problem`.
    pub fn write_task(&self, name: &str, problem: &str) -> PathBuf {
        let dir = self.root().join(name);
        fs::create_dir_all(&dir).expect("task dir");
        let path = dir.join("problem0.pddl");
        fs::write(&path, problem).expect("problem file");
        path
    }

    /// Create a task directory without a problem file.
    pub fn write_empty_dir(&self, name: &str) {
        fs::create_dir_all(self.root().join(name)).expect("dir");
    }

    /// Default config pointed at this tree.
    pub fn config(&self) -> BatchConfig {
        BatchConfig {
            tasks_root: self.root(),
            ..BatchConfig::default()
        }
    }
}

impl Default for TaskTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Planner that replays scripted runs and records every request.
pub struct ScriptedPlanner {
    script: RefCell<Script>,
    requests: RefCell<Vec<PlanRequest>>,
}

enum Script {
    /// Runs handed out in invocation order.
    Queue(VecDeque<PlannerRun>),
    /// Runs looked up by task name, independent of enumeration order.
    Keyed(BTreeMap<String, PlannerRun>),
}

impl ScriptedPlanner {
    pub fn new(runs: Vec<PlannerRun>) -> Self {
        Self::with_script(Script::Queue(runs.into()))
    }

    pub fn keyed(runs: Vec<(&str, PlannerRun)>) -> Self {
        let runs = runs
            .into_iter()
            .map(|(task, run)| (task.to_string(), run))
            .collect();
        Self::with_script(Script::Keyed(runs))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: RefCell::new(script),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<PlanRequest> {
        self.requests.borrow().clone()
    }

    /// Tasks the planner was invoked for, in order.
    pub fn invoked_tasks(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| request.task.clone())
            .collect()
    }
}

impl Planner for ScriptedPlanner {
    fn solve(&self, request: &PlanRequest) -> Result<PlannerRun> {
        self.requests.borrow_mut().push(request.clone());
        let run = match &mut *self.script.borrow_mut() {
            Script::Queue(runs) => runs.pop_front(),
            Script::Keyed(runs) => runs.get(&request.task).cloned(),
        };
        run.ok_or_else(|| anyhow!("scripted planner has no run for {}", request.task))
    }
}

/// A run that reports a solution with a plan of the given cost.
pub fn solved_run(cost: u64) -> PlannerRun {
    PlannerRun {
        stdout: "Solution found!\nPlan length: 1 step(s).".to_string(),
        exit_code: Some(0),
        timed_out: false,
        plan: Some(Plan::parse(&format!(
            "(navigate-to agent sink_1)\n; cost = {cost} (unit cost)\n"
        ))),
    }
}

/// A run that reports a solution whose plan costs nothing.
pub fn zero_cost_run() -> PlannerRun {
    PlannerRun {
        plan: Some(Plan::parse("; cost = 0 (unit cost)\n")),
        ..solved_run(0)
    }
}

/// A run that finds no solution.
pub fn unsolved_run() -> PlannerRun {
    PlannerRun {
        stdout: "Completely explored state space -- no solution!".to_string(),
        exit_code: Some(12),
        timed_out: false,
        plan: None,
    }
}
