//! Planner abstraction and the Fast Downward backend.
//!
//! The [`Planner`] trait decouples batch orchestration from the external
//! planner process. Tests use scripted planners that return predetermined runs
//! without spawning anything.
//!
//! Fast Downward writes its plan to a fixed file name in its working
//! directory. With [`PlanChannel::Isolated`] every invocation gets a fresh
//! temporary directory, so a plan can only come from the run that wrote it.
//! With [`PlanChannel::Shared`] the harness working directory is reused; the
//! stale plan is removed before each run and the slot is only valid until the
//! next invocation.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::plan::Plan;
use crate::io::config::{BatchConfig, PlanChannel};
use crate::io::process::{CommandOutput, run_command};

/// Parameters for one planner invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub task: String,
    pub domain_file: PathBuf,
    pub problem_file: PathBuf,
    /// Value of `--search`.
    pub search_config: String,
    pub timeout: Option<Duration>,
}

/// What a planner invocation left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannerRun {
    pub stdout: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Parsed plan file, when the planner wrote one.
    pub plan: Option<Plan>,
}

/// Abstraction over planner backends.
pub trait Planner {
    /// Run the planner once and block until it exits.
    fn solve(&self, request: &PlanRequest) -> Result<PlannerRun>;
}

/// Planner that spawns Fast Downward (`fast-downward.py <domain> <problem> --search <cfg>`).
#[derive(Debug, Clone)]
pub struct FastDownward {
    executable: PathBuf,
    plan_file_name: String,
    channel: PlanChannel,
}

impl FastDownward {
    pub fn new(executable: PathBuf, plan_file_name: String, channel: PlanChannel) -> Self {
        Self {
            executable,
            plan_file_name,
            channel,
        }
    }

    pub fn from_config(cfg: &BatchConfig) -> Self {
        Self::new(
            cfg.planner_executable.clone(),
            cfg.plan_file_name.clone(),
            cfg.plan_channel,
        )
    }

    fn solve_shared(&self, request: &PlanRequest) -> Result<PlannerRun> {
        let workdir = std::env::current_dir().context("resolve working directory")?;
        let plan_path = workdir.join(&self.plan_file_name);
        remove_stale_plan(&plan_path)?;

        let output = invoke_planner(&self.executable, request, &workdir)?;
        let plan = inspect_plan_file(&plan_path)?;
        Ok(planner_run(output, plan))
    }

    fn solve_isolated(&self, request: &PlanRequest) -> Result<PlannerRun> {
        let workdir = tempfile::Builder::new()
            .prefix("pddl-batch-")
            .tempdir()
            .context("create planner working directory")?;

        let executable = resolve_executable(&self.executable)?;
        let request = PlanRequest {
            domain_file: std::path::absolute(&request.domain_file).with_context(|| {
                format!("resolve domain file {}", request.domain_file.display())
            })?,
            problem_file: std::path::absolute(&request.problem_file).with_context(|| {
                format!("resolve problem file {}", request.problem_file.display())
            })?,
            ..request.clone()
        };

        let output = invoke_planner(&executable, &request, workdir.path())?;
        let plan = inspect_plan_file(&workdir.path().join(&self.plan_file_name))?;
        Ok(planner_run(output, plan))
    }
}

impl Planner for FastDownward {
    #[instrument(skip_all, fields(task = %request.task, channel = ?self.channel))]
    fn solve(&self, request: &PlanRequest) -> Result<PlannerRun> {
        let run = match self.channel {
            PlanChannel::Isolated => self.solve_isolated(request)?,
            PlanChannel::Shared => self.solve_shared(request)?,
        };
        if run.timed_out {
            warn!(timeout = ?request.timeout, "planner timed out");
        } else if run.exit_code != Some(0) {
            // Fast Downward exits non-zero for unsolvable and unparsable tasks alike.
            info!(exit_code = ?run.exit_code, "planner exited with non-zero status");
        }
        Ok(run)
    }
}

/// Spawn the planner in `workdir` and wait for it to exit.
///
/// Exit status is reported, not judged: callers classify by output text.
#[instrument(skip_all, fields(problem = %request.problem_file.display()))]
pub fn invoke_planner(
    executable: &Path,
    request: &PlanRequest,
    workdir: &Path,
) -> Result<CommandOutput> {
    let mut cmd = Command::new(executable);
    cmd.arg(&request.domain_file)
        .arg(&request.problem_file)
        .arg("--search")
        .arg(&request.search_config)
        .current_dir(workdir);

    debug!(executable = %executable.display(), workdir = %workdir.display(), "invoking planner");
    let output = run_command(cmd, request.timeout)
        .with_context(|| format!("run planner {}", executable.display()))?;
    if !output.stderr.is_empty() {
        debug!(stderr = %output.stderr_lossy().trim(), "planner stderr");
    }
    Ok(output)
}

/// Read and parse the plan file at `path`. `None` when the file does not exist.
pub fn inspect_plan_file(path: &Path) -> Result<Option<Plan>> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let plan = Plan::parse(&text);
            debug!(
                path = %path.display(),
                actions = plan.actions.len(),
                cost = ?plan.cost,
                "read plan"
            );
            Ok(Some(plan))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("read plan {}", path.display())),
    }
}

fn remove_stale_plan(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale plan");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("remove stale plan {}", path.display())),
    }
}

/// Bare program names are left for `PATH` lookup; anything with a directory
/// component is made absolute so it survives a change of working directory.
fn resolve_executable(executable: &Path) -> Result<PathBuf> {
    if executable.components().count() > 1 {
        std::path::absolute(executable)
            .with_context(|| format!("resolve planner {}", executable.display()))
    } else {
        Ok(executable.to_path_buf())
    }
}

fn planner_run(output: CommandOutput, plan: Option<Plan>) -> PlannerRun {
    PlannerRun {
        stdout: output.stdout_lossy(),
        exit_code: output.status.code(),
        timed_out: output.timed_out,
        plan,
    }
}
