//! CLI tests for `pddl-batch`.
//!
//! Spawns the binary against a shell script standing in for Fast Downward
//! and checks exit codes and printed output for both plan channels.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

use pddl_batch::exit_codes;
use pddl_batch::test_support::TaskTree;

/// Solves any problem mentioning `easy_goal`; writes a zero-cost plan for `trivial_goal`.
const FAKE_PLANNER: &str = r#"#!/bin/sh
test -f "$1" || { echo "missing domain $1" >&2; exit 2; }
test "$3" = "--search" || exit 2
if grep -q easy_goal "$2"; then
  printf '(navigate-to agent sink_1)\n; cost = 1 (unit cost)\n' > sas_plan
  echo "Solution found!"
elif grep -q trivial_goal "$2"; then
  printf '; cost = 0 (unit cost)\n' > sas_plan
  echo "Solution found!"
else
  echo "Completely explored state space -- no solution!"
  exit 12
fi
"#;

fn setup(tree: &TaskTree) {
    let planner = tree.workdir().join("fake-downward.sh");
    fs::write(&planner, FAKE_PLANNER).expect("planner");
    let mut perms = fs::metadata(&planner).expect("meta").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&planner, perms).expect("chmod");

    fs::write(tree.workdir().join("behavior_full.pddl"), "(define (domain behavior))")
        .expect("domain");
    fs::write(
        tree.workdir().join("pddl-batch.toml"),
        "tasks_root = \"tasks\"\nplanner_executable = \"./fake-downward.sh\"\n",
    )
    .expect("config");
}

fn pddl_batch(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pddl-batch"))
        .current_dir(workdir)
        .args(args)
        .output()
        .expect("pddl-batch")
}

#[test]
fn run_prints_summary_for_isolated_channel() {
    let tree = TaskTree::new();
    setup(&tree);
    tree.write_task("make_tea", "(:goal (and (easy_goal)))");
    tree.write_task("wipe_table", "(:goal (and (trivial_goal)))");
    tree.write_task("sort_books", "(:goal (forall (?b - book) (shelved ?b)))");
    tree.write_empty_dir("domain_behavior");

    let output = pddl_batch(tree.workdir(), &["run"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(exit_codes::OK), "stdout: {stdout}");
    assert_eq!(
        stdout
            .matches("wipe_table fails because of cost = 0 plan")
            .count(),
        1
    );
    assert!(stdout.contains("Ran on 3 tasks"));
    assert!(stdout.contains("Failed 2"));
    assert!(stdout.contains("Success 1"));
    assert!(stdout.contains("Parsing Failures 1"));
    assert!(!tree.workdir().join("sas_plan").exists());
}

#[test]
fn run_with_shared_channel_does_not_reuse_stale_plan() {
    let tree = TaskTree::new();
    setup(&tree);
    tree.write_task("sort_books", "(:goal (forall (?b - book) (shelved ?b)))");
    fs::write(tree.workdir().join("sas_plan"), "(stale)\n; cost = 4 (unit cost)\n")
        .expect("stale plan");

    let output = pddl_batch(tree.workdir(), &["run", "--plan-channel", "shared"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(stdout.contains("Success 0"));
    assert!(stdout.contains("Parsing Failures 1"));
    assert!(!tree.workdir().join("sas_plan").exists());
}

#[test]
fn variant_a_exits_with_unexplained_code() {
    let tree = TaskTree::new();
    setup(&tree);
    tree.write_task("cook_chicken", "(:goal (and (cooked chicken_1)))");

    let output = pddl_batch(tree.workdir(), &["run", "--variant", "a"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(exit_codes::UNEXPLAINED));
    assert!(stderr.contains("cook_chicken"));
}

#[test]
fn variant_b_skips_stained_problems() {
    let tree = TaskTree::new();
    setup(&tree);
    tree.write_task("clean_plate", "(:init (stained plate_1)) (:goal (and (easy_goal)))");

    let output = pddl_batch(tree.workdir(), &["run", "--variant", "b"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(stdout.contains("Failures: [\"clean_plate\"]"));
    assert!(stdout.contains("Success 0"));
    assert!(!stdout.contains("Parsing Failures"));
}

#[test]
fn missing_problem_file_exits_invalid() {
    let tree = TaskTree::new();
    setup(&tree);
    tree.write_empty_dir("broken_task");

    let output = pddl_batch(tree.workdir(), &["run"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn list_prints_task_names() {
    let tree = TaskTree::new();
    setup(&tree);
    tree.write_task("make_tea", "(:goal (and (easy_goal)))");
    tree.write_empty_dir("domain_behavior");

    let output = pddl_batch(tree.workdir(), &["list"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "make_tea\n");
}

#[test]
fn init_refuses_to_overwrite() {
    let tree = TaskTree::new();
    setup(&tree);

    let output = pddl_batch(tree.workdir(), &["init"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));

    let output = pddl_batch(tree.workdir(), &["init", "--force"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let written = fs::read_to_string(tree.workdir().join("pddl-batch.toml")).expect("config");
    assert!(written.contains("search_config"));
}
