use std::path::Path;
use std::process::Command;
use tracing::debug;

/// State of the git working tree the command runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeStatus {
    Clean,
    /// `git status --porcelain` output listing the changes
    Dirty(String),
    /// Not inside a work tree, or git is not installed
    NotARepo,
}

/// Check whether `dir` has uncommitted changes
pub fn working_tree_status(dir: &Path) -> TreeStatus {
    let inside = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["rev-parse", "--is-inside-work-tree"])
        .output();

    match inside {
        Ok(output) if output.status.success() => {}
        Ok(_) => return TreeStatus::NotARepo,
        Err(e) => {
            debug!("git not available: {}", e);
            return TreeStatus::NotARepo;
        }
    }

    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["status", "--porcelain"])
        .output();

    match status {
        Ok(output) if output.status.success() => {
            let changes = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
            if changes.is_empty() {
                TreeStatus::Clean
            } else {
                TreeStatus::Dirty(changes)
            }
        }
        _ => TreeStatus::NotARepo,
    }
}
