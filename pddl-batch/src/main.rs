//! `pddl-batch`: run Fast Downward over every task under a tasks root and
//! report how many were solved.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use pddl_batch::core::pddl::ProblemText;
use pddl_batch::exit_codes;
use pddl_batch::io::config::{
    BatchConfig, ConfigOverrides, DEFAULT_CONFIG_FILE, PlanChannel, Variant, apply_overrides,
    load_config, write_config,
};
use pddl_batch::io::planner::FastDownward;
use pddl_batch::io::tasks::enumerate_tasks;
use pddl_batch::logging;
use pddl_batch::report::write_report;
use pddl_batch::run::{UnexplainedFailure, run_batch};

#[derive(Parser)]
#[command(
    name = "pddl-batch",
    version,
    about = "Run a classical planner over a directory of PDDL tasks"
)]
struct Cli {
    /// Config file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a config file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Run the planner on every task and print the summary.
    Run(RunArgs),
    /// Print the task names that `run` would process.
    List {
        #[arg(long)]
        tasks_root: Option<PathBuf>,
    },
    /// Print unsupported constructs and skip-listed predicates found in problem files.
    Scan {
        #[arg(required = true)]
        problems: Vec<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Apply one of the historical harness presets.
    #[arg(long, value_enum)]
    variant: Option<Variant>,
    #[arg(long)]
    tasks_root: Option<PathBuf>,
    #[arg(long)]
    domain_file: Option<PathBuf>,
    /// Planner executable.
    #[arg(long = "planner")]
    planner_executable: Option<PathBuf>,
    /// Value passed to the planner's `--search`.
    #[arg(long = "search")]
    search_config: Option<String>,
    #[arg(long = "timeout-secs")]
    planner_timeout_secs: Option<u64>,
    #[arg(long, value_enum)]
    plan_channel: Option<PlanChannel>,
    /// Skip tasks whose problem mentions this predicate (repeatable).
    #[arg(long = "skip-predicate")]
    skip_predicates: Vec<String>,
    /// Stop the batch on an unsolved task with no known cause.
    #[arg(long)]
    abort_on_unexplained: bool,
}

impl RunArgs {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            variant: self.variant,
            tasks_root: self.tasks_root,
            domain_file: self.domain_file,
            planner_executable: self.planner_executable,
            search_config: self.search_config,
            planner_timeout_secs: self.planner_timeout_secs,
            plan_channel: self.plan_channel,
            skip_predicates: self.skip_predicates,
            abort_on_unexplained: self.abort_on_unexplained,
        }
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli) {
        eprintln!("{:#}", err);
        let code = if err.downcast_ref::<UnexplainedFailure>().is_some() {
            exit_codes::UNEXPLAINED
        } else {
            exit_codes::INVALID
        };
        std::process::exit(code);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Run(args) => cmd_run(&cli.config, args),
        Command::List { tasks_root } => cmd_list(&cli.config, tasks_root),
        Command::Scan { problems } => cmd_scan(&cli.config, &problems),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if !force && config_path.exists() {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    write_config(config_path, &BatchConfig::default()).context("write default config")?;
    println!("wrote {}", config_path.display());
    Ok(())
}

fn cmd_run(config_path: &Path, args: RunArgs) -> Result<()> {
    let cfg = apply_overrides(load_config(config_path)?, &args.into_overrides())?;
    let planner = FastDownward::from_config(&cfg);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let records = run_batch(&cfg, &planner, &mut out)?;
    write_report(&mut out, &records, cfg.classify.parsing_failures())?;
    out.flush().context("flush stdout")?;
    Ok(())
}

fn cmd_list(config_path: &Path, tasks_root: Option<PathBuf>) -> Result<()> {
    let overrides = ConfigOverrides {
        tasks_root,
        ..ConfigOverrides::default()
    };
    let cfg = apply_overrides(load_config(config_path)?, &overrides)?;
    for task in enumerate_tasks(&cfg.tasks_root, &cfg.domain_dir_marker)? {
        println!("{task}");
    }
    Ok(())
}

fn cmd_scan(config_path: &Path, problems: &[PathBuf]) -> Result<()> {
    let cfg = load_config(config_path)?;
    let rules = cfg.classify.input_rules();
    for path in problems {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let problem = ProblemText::parse(&text);
        println!(
            "{}: unsupported={:?} skip={:?}",
            path.display(),
            rules.unsupported_in(&problem),
            rules.skip_reason(&problem)
        );
    }
    Ok(())
}
