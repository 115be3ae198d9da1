//! Version-control lookup used as the second step of root resolution.
//!
//! Every failure mode (git not installed, not inside a work tree, git exiting
//! non-zero, unreadable output) collapses to `None`. Callers cannot tell a
//! failed query apart from "not in a repository".

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const GIT: &str = "git";

/// Top-level directory of the git work tree containing `start`, if any.
pub fn git_toplevel(start: &Path) -> Option<PathBuf> {
    toplevel_with(GIT, start)
}

fn toplevel_with(program: &str, start: &Path) -> Option<PathBuf> {
    let git = match which::which(program) {
        Ok(p) => p,
        Err(_) => {
            tracing::debug!(program, "vcs tool not on PATH");
            return None;
        }
    };

    let output = Command::new(git)
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(start)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;

    if !output.status.success() {
        tracing::debug!(status = %output.status, "git rev-parse reported no work tree");
        return None;
    }

    let top = String::from_utf8(output.stdout).ok()?;
    let top = top.trim();
    if top.is_empty() {
        return None;
    }
    Some(PathBuf::from(top))
}
