//! Task discovery under the tasks root.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// List task names: immediate subdirectories of `tasks_root` whose name does
/// not contain `domain_marker`. Symlinks to directories count; dangling
/// links are skipped.
///
/// Order is whatever the filesystem returns.
pub fn enumerate_tasks(tasks_root: &Path, domain_marker: &str) -> Result<Vec<String>> {
    let mut tasks = Vec::new();
    for entry in fs::read_dir(tasks_root)
        .with_context(|| format!("read tasks root {}", tasks_root.display()))?
    {
        let entry = entry.context("read task entry")?;
        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "skipping dangling link in tasks root");
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("stat {}", path.display())),
        };
        if !metadata.is_dir() {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!(name = ?raw, "skipping task directory with non-UTF-8 name");
                continue;
            }
        };
        if name.contains(domain_marker) {
            debug!(name, "skipping domain definition directory");
            continue;
        }
        tasks.push(name);
    }
    Ok(tasks)
}

pub fn problem_path(tasks_root: &Path, task_name: &str, problem_file_name: &str) -> PathBuf {
    tasks_root.join(task_name).join(problem_file_name)
}

/// Read a task's problem file. A missing file is an error.
pub fn load_problem(tasks_root: &Path, task_name: &str, problem_file_name: &str) -> Result<String> {
    let path = problem_path(tasks_root, task_name, problem_file_name);
    fs::read_to_string(&path).with_context(|| format!("read problem {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_domain_directories_and_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("domain_foo")).expect("domain dir");
        fs::create_dir_all(temp.path().join("task_bar")).expect("task dir");
        fs::create_dir_all(temp.path().join("old_domain_copy")).expect("nested marker");
        fs::write(temp.path().join("README.md"), "notes").expect("file");

        let tasks = enumerate_tasks(temp.path(), "domain_").expect("enumerate");
        assert_eq!(tasks, vec!["task_bar"]);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_task_directories() {
        use std::os::unix::fs::symlink;

        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("tasks");
        fs::create_dir_all(root.join("task_plain")).expect("task dir");
        fs::create_dir_all(temp.path().join("elsewhere")).expect("link target");
        symlink(temp.path().join("elsewhere"), root.join("task_linked")).expect("dir link");
        symlink(temp.path().join("gone"), root.join("task_dangling")).expect("dangling link");
        fs::write(temp.path().join("notes.txt"), "notes").expect("file");
        symlink(temp.path().join("notes.txt"), root.join("task_file_link")).expect("file link");

        let mut tasks = enumerate_tasks(&root, "domain_").expect("enumerate");
        tasks.sort();
        assert_eq!(tasks, vec!["task_linked", "task_plain"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = enumerate_tasks(&temp.path().join("missing"), "domain_").expect_err("missing");
        assert!(format!("{err:#}").contains("read tasks root"));
    }

    #[test]
    fn loads_problem_text() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("task_bar")).expect("task dir");
        fs::write(temp.path().join("task_bar/problem0.pddl"), "(define)").expect("problem");
        let text = load_problem(temp.path(), "task_bar", "problem0.pddl").expect("load");
        assert_eq!(text, "(define)");
    }

    #[test]
    fn missing_problem_names_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("task_bar")).expect("task dir");
        let err = load_problem(temp.path(), "task_bar", "problem0.pddl").expect_err("missing");
        let message = format!("{err:#}");
        assert!(message.contains("task_bar"));
        assert!(message.contains("problem0.pddl"));
    }
}
