//! Run a handler from the project root and report its exit code.
//!
//! The handler inherits stdin, stdout and stderr, so hook payloads and
//! verdicts pass through untouched. `HOOKSHIM_ROOT` is set for the child so a
//! nested `hookshim` invocation resolves the same root.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::config::HandlerSpec;
use crate::error::{HookError, Result};

pub const ROOT_ENV: &str = "HOOKSHIM_ROOT";

/// Make `root` the working directory of this process.
pub fn enter_root(root: &Path) -> Result<()> {
    std::env::set_current_dir(root)?;
    Ok(())
}

/// Spawn `spec` (plus `extra_args`) with `root` as its working directory,
/// wait for it, and return the exit code to forward.
pub fn run_handler(root: &Path, spec: &HandlerSpec, extra_args: &[String]) -> Result<i32> {
    let program = spec.program.trim();
    if program.is_empty() {
        return Err(HookError::EmptyHandler(spec.program.clone()));
    }
    // A missing working directory also surfaces as NotFound from spawn.
    if !root.is_dir() {
        return Err(HookError::RootUnavailable(root.to_path_buf()));
    }

    let program_path = program_path(root, program);
    let mut cmd = Command::new(&program_path);
    cmd.args(&spec.args)
        .args(extra_args)
        .envs(&spec.env)
        .env(ROOT_ENV, root)
        .current_dir(root)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    tracing::info!(
        program,
        args = ?spec.args,
        extra = ?extra_args,
        root = %root.display(),
        "dispatching handler"
    );

    let status = cmd.status().map_err(|e| match e.kind() {
        ErrorKind::NotFound => HookError::HandlerNotFound(program.to_string()),
        ErrorKind::PermissionDenied => HookError::HandlerPermission(program.to_string()),
        _ => HookError::HandlerSpawn {
            program: program.to_string(),
            source: e,
        },
    })?;

    let code = exit_code(status);
    tracing::debug!(%status, code, "handler finished");
    Ok(code)
}

/// Relative programs containing a path separator are taken relative to the
/// project root; bare names are looked up on PATH.
fn program_path(root: &Path, program: &str) -> PathBuf {
    let p = Path::new(program);
    if p.is_relative() && p.components().count() > 1 {
        root.join(p)
    } else {
        p.to_path_buf()
    }
}

/// Exit code to forward for a finished handler. A handler killed by a
/// signal maps to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}
