//! `hookshim pre-tool`: allow or block a tool call before it runs.
//!
//! Prints one verdict JSON line. Exit 0 allows the call, exit 1 blocks it.
//! Anything that prevents a decision blocks.

use crate::output::print_json_line;
use hookshim_core::event::{Severity, ToolEvent};
use hookshim_core::safety::{Policy, SafetyCheck, Verdict};
use hookshim_core::vcs;
use std::path::Path;

pub fn run(root: &Path, marker: &str) -> anyhow::Result<i32> {
    let verdict = match evaluate(root, marker) {
        Ok(v) => v,
        Err(e) => Verdict::block(format!("Hook execution error: {e}"), Severity::Critical),
    };
    if !verdict.allowed {
        tracing::info!(reason = %verdict.reason, "tool call blocked");
    }
    print_json_line(&verdict)?;
    Ok(if verdict.allowed { 0 } else { 1 })
}

fn evaluate(root: &Path, marker: &str) -> hookshim_core::Result<Verdict> {
    let event = ToolEvent::from_reader(std::io::stdin().lock())?;
    let policy = Policy::load(root, marker)?;
    let cwd = std::env::current_dir()?;
    let check = SafetyCheck::new(&policy, &cwd).with_worktree(vcs::git_toplevel(&cwd));
    Ok(check.check(&event))
}
