//! Batch configuration stored in `pddl-batch.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::classify::InputRules;
use crate::core::summary::ParsingFailures;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pddl-batch.toml";

/// Batch configuration (TOML).
///
/// Missing fields take the values the harness has always used against the
/// BEHAVIOR activity definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory holding one subdirectory per task.
    pub tasks_root: PathBuf,

    /// Domain file passed to the planner as the first positional argument.
    pub domain_file: PathBuf,

    /// Value of the planner's `--search` option.
    pub search_config: String,

    pub planner_executable: PathBuf,

    /// Problem file name inside each task directory.
    pub problem_file_name: String,

    /// Directories whose name contains this are domain definitions, not tasks.
    pub domain_dir_marker: String,

    /// Substring of planner stdout that announces a solution.
    pub solution_marker: String,

    /// Plan file the planner writes into its working directory.
    pub plan_file_name: String,

    pub plan_channel: PlanChannel,

    /// Per-invocation wall-clock limit. Unset waits for the planner forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planner_timeout_secs: Option<u64>,

    pub classify: ClassifyConfig,
}

/// Where the planner runs, and so where its plan file lands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PlanChannel {
    /// Fresh temporary working directory per task.
    Isolated,
    /// The harness working directory; one plan slot reused by every task.
    Shared,
}

/// What to do with an unsolved task whose problem has no known unsupported construct.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OnUnexplained {
    /// Count it as a failure and continue.
    Record,
    /// Stop the batch.
    Abort,
}

/// Presets reproducing the two historical harness behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Abort on unexplained unsolved tasks; no skip list; separate parsing failures.
    A,
    /// Skip problems mentioning `stained`; record unexplained tasks; two buckets only.
    B,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClassifyConfig {
    /// List-head keywords that explain an unsolved task as a parsing failure.
    pub unsupported_constructs: Vec<String>,

    /// Predicates whose presence skips the task without invoking the planner.
    pub skip_predicates: Vec<String>,

    pub on_unexplained: OnUnexplained,

    /// Count unsupported-input tasks as plain failures and drop the
    /// `Parsing Failures` line from the report.
    pub fold_parsing_failures: bool,
}

fn default_unsupported_constructs() -> Vec<String> {
    ["forn", "forall", "forpairs", "fornpairs"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            unsupported_constructs: default_unsupported_constructs(),
            skip_predicates: Vec::new(),
            on_unexplained: OnUnexplained::Record,
            fold_parsing_failures: false,
        }
    }
}

impl ClassifyConfig {
    pub fn input_rules(&self) -> InputRules {
        InputRules {
            unsupported_constructs: self.unsupported_constructs.clone(),
            skip_predicates: self.skip_predicates.clone(),
        }
    }

    pub fn parsing_failures(&self) -> ParsingFailures {
        if self.fold_parsing_failures {
            ParsingFailures::Folded
        } else {
            ParsingFailures::Separate
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            tasks_root: PathBuf::from("activity_definitions"),
            domain_file: PathBuf::from("behavior_full.pddl"),
            search_config: "lazy_greedy([ff()], preferred=[ff()])".to_string(),
            planner_executable: PathBuf::from("./fast-downward.py"),
            problem_file_name: "problem0.pddl".to_string(),
            domain_dir_marker: "domain_".to_string(),
            solution_marker: "Solution".to_string(),
            plan_file_name: "sas_plan".to_string(),
            plan_channel: PlanChannel::Isolated,
            planner_timeout_secs: None,
            classify: ClassifyConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tasks_root.as_os_str().is_empty() {
            return Err(anyhow!("tasks_root must be non-empty"));
        }
        if self.domain_file.as_os_str().is_empty() {
            return Err(anyhow!("domain_file must be non-empty"));
        }
        if self.planner_executable.as_os_str().is_empty() {
            return Err(anyhow!("planner_executable must be non-empty"));
        }
        if self.search_config.trim().is_empty() {
            return Err(anyhow!("search_config must be non-empty"));
        }
        if self.problem_file_name.trim().is_empty() {
            return Err(anyhow!("problem_file_name must be non-empty"));
        }
        if self.problem_file_name.contains('/') || self.problem_file_name.contains('\\') {
            return Err(anyhow!("problem_file_name must not contain path separators"));
        }
        if self.domain_dir_marker.is_empty() {
            return Err(anyhow!("domain_dir_marker must be non-empty"));
        }
        if self.solution_marker.is_empty() {
            return Err(anyhow!("solution_marker must be non-empty"));
        }
        if self.plan_file_name.trim().is_empty() {
            return Err(anyhow!("plan_file_name must be non-empty"));
        }
        if self.planner_timeout_secs == Some(0) {
            return Err(anyhow!("planner_timeout_secs must be > 0"));
        }
        if self
            .classify
            .unsupported_constructs
            .iter()
            .any(|construct| construct.trim().is_empty())
        {
            return Err(anyhow!("classify.unsupported_constructs entries must be non-empty"));
        }
        if self
            .classify
            .skip_predicates
            .iter()
            .any(|predicate| predicate.trim().is_empty())
        {
            return Err(anyhow!("classify.skip_predicates entries must be non-empty"));
        }
        Ok(())
    }

    pub fn planner_timeout(&self) -> Option<Duration> {
        self.planner_timeout_secs.map(Duration::from_secs)
    }

    pub fn apply_variant(&mut self, variant: Variant) {
        match variant {
            Variant::A => {
                self.classify.unsupported_constructs = default_unsupported_constructs();
                self.classify.skip_predicates.clear();
                self.classify.on_unexplained = OnUnexplained::Abort;
                self.classify.fold_parsing_failures = false;
            }
            Variant::B => {
                self.classify.skip_predicates = vec!["stained".to_string()];
                self.classify.on_unexplained = OnUnexplained::Record;
                self.classify.fold_parsing_failures = true;
            }
        }
    }
}

/// Command-line overrides layered on top of the loaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub variant: Option<Variant>,
    pub tasks_root: Option<PathBuf>,
    pub domain_file: Option<PathBuf>,
    pub planner_executable: Option<PathBuf>,
    pub search_config: Option<String>,
    pub planner_timeout_secs: Option<u64>,
    pub plan_channel: Option<PlanChannel>,
    pub skip_predicates: Vec<String>,
    pub abort_on_unexplained: bool,
}

/// Apply overrides to a base config. The variant preset goes first so
/// explicit flags win over it.
pub fn apply_overrides(mut base: BatchConfig, overrides: &ConfigOverrides) -> Result<BatchConfig> {
    if let Some(variant) = overrides.variant {
        base.apply_variant(variant);
    }
    if let Some(tasks_root) = &overrides.tasks_root {
        base.tasks_root = tasks_root.clone();
    }
    if let Some(domain_file) = &overrides.domain_file {
        base.domain_file = domain_file.clone();
    }
    if let Some(planner_executable) = &overrides.planner_executable {
        base.planner_executable = planner_executable.clone();
    }
    if let Some(search_config) = &overrides.search_config {
        base.search_config = search_config.clone();
    }
    if let Some(timeout_secs) = overrides.planner_timeout_secs {
        base.planner_timeout_secs = Some(timeout_secs);
    }
    if let Some(plan_channel) = overrides.plan_channel {
        base.plan_channel = plan_channel;
    }
    for predicate in &overrides.skip_predicates {
        if !base.classify.skip_predicates.contains(predicate) {
            base.classify.skip_predicates.push(predicate.clone());
        }
    }
    if overrides.abort_on_unexplained {
        base.classify.on_unexplained = OnUnexplained::Abort;
    }
    base.validate()?;
    Ok(base)
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BatchConfig::default()`.
pub fn load_config(path: &Path) -> Result<BatchConfig> {
    if !path.exists() {
        let cfg = BatchConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BatchConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &BatchConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
