//! Pre-tool safety check.
//!
//! Blocks shell deletions and configured dangerous commands, and guards file
//! writes against protected paths, oversized files and paths outside the
//! current git work tree.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::Result;
use crate::event::{Severity, ToolEvent};
use crate::paths;

/// Command words that delete files. Matched as whole words, never as substrings.
pub const DELETION_COMMANDS: &[&str] = &["rm", "rmdir", "unlink", "shred", "del"];

const SHELL_SEPARATORS: &[char] = &[';', '|', '&', '(', ')', '`'];

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyRules {
    #[serde(default = "default_protected_files")]
    pub protected_files: Vec<String>,
    #[serde(default = "default_protected_patterns")]
    pub protected_patterns: Vec<String>,
    #[serde(default = "default_dangerous_commands")]
    pub dangerous_commands: Vec<String>,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_protected_files() -> Vec<String> {
    strings(&[
        ".env",
        ".github/workflows/*.yml",
        "package-lock.json",
        "yarn.lock",
        "requirements-lock.txt",
        "Pipfile.lock",
    ])
}

fn default_protected_patterns() -> Vec<String> {
    strings(&[".env", "secrets", "credentials", "private"])
}

fn default_dangerous_commands() -> Vec<String> {
    strings(&[
        "rm -rf /",
        "rm -rf /*",
        "format",
        "fdisk",
        "mkfs",
        "dd if=",
        "shutdown",
        "reboot",
        "halt",
        "db_init",
        "drop table",
        "truncate table",
        "delete from * where",
        "alter table drop",
        "docker compose down -v",
        "docker system prune",
        "docker volume rm",
    ])
}

fn default_max_file_bytes() -> u64 {
    50 * 1024 * 1024
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            protected_files: default_protected_files(),
            protected_patterns: default_protected_patterns(),
            dangerous_commands: default_dangerous_commands(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub safety: SafetyRules,
}

impl Policy {
    /// Load `<root>/<marker>/policy.yaml`, or the defaults when it is absent.
    pub fn load(root: &Path, marker: &str) -> Result<Self> {
        let path = paths::policy_path(root, marker);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub allowed: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl Verdict {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            severity: None,
        }
    }

    pub fn block(reason: impl Into<String>, severity: Severity) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            severity: Some(severity),
        }
    }
}

// ---------------------------------------------------------------------------
// SafetyCheck
// ---------------------------------------------------------------------------

pub struct SafetyCheck<'a> {
    rules: &'a SafetyRules,
    base: PathBuf,
    worktree: Option<PathBuf>,
}

impl<'a> SafetyCheck<'a> {
    /// `base` is the directory relative file paths are resolved against.
    pub fn new(policy: &'a Policy, base: &Path) -> Self {
        Self {
            rules: &policy.safety,
            base: base.canonicalize().unwrap_or_else(|_| base.to_path_buf()),
            worktree: None,
        }
    }

    /// Restrict file writes to the given work tree.
    pub fn with_worktree(mut self, worktree: Option<PathBuf>) -> Self {
        self.worktree = worktree;
        self
    }

    pub fn check(&self, event: &ToolEvent) -> Verdict {
        match event.tool_kind().as_str() {
            "bash" => self.check_command(&event.parameters.command),
            "write" | "edit" => self.check_file(&event.parameters.file_path),
            _ => Verdict::allow("Tool validation passed"),
        }
    }

    pub fn check_command(&self, command: &str) -> Verdict {
        if let Some(word) = deletion_word(command) {
            return Verdict::block(
                format!("Absolute {word} ban - no safe deletions allowed"),
                Severity::Critical,
            );
        }

        let normalized = command
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        for dangerous in &self.rules.dangerous_commands {
            if normalized.contains(&dangerous.to_lowercase()) {
                return Verdict::block(
                    format!("Dangerous command detected: {dangerous}"),
                    Severity::Critical,
                );
            }
        }

        Verdict::allow("Bash command validation passed")
    }

    pub fn check_file(&self, file_path: &str) -> Verdict {
        if file_path.is_empty() {
            return Verdict::allow("No file path specified");
        }

        for protected in &self.rules.protected_files {
            if matches_protected_file(file_path, protected) {
                return Verdict::block(
                    format!("Protected file modification attempt: {file_path}"),
                    Severity::High,
                );
            }
        }

        let lower = file_path.to_lowercase();
        for pattern in &self.rules.protected_patterns {
            if lower.contains(&pattern.to_lowercase()) {
                return Verdict::block(
                    format!("Protected pattern detected in path: {pattern}"),
                    Severity::Medium,
                );
            }
        }

        let abs = normalize(&self.base.join(file_path));
        if let Ok(meta) = std::fs::metadata(&abs) {
            if meta.is_file() && meta.len() > self.rules.max_file_bytes {
                return Verdict::block(
                    format!("File too large for modification: {} bytes", meta.len()),
                    Severity::Medium,
                );
            }
        }

        if let Some(worktree) = &self.worktree {
            if !abs.starts_with(worktree) {
                return Verdict::block(
                    format!(
                        "File {file_path} is outside current worktree boundary ({})",
                        worktree.display()
                    ),
                    Severity::High,
                );
            }
        }

        Verdict::allow("File operation validation passed")
    }
}

/// First command word that is a deletion command, compared by basename so
/// `/bin/rm` and `sudo rm` are both caught.
fn deletion_word(command: &str) -> Option<&'static str> {
    command
        .split(|c: char| c.is_whitespace() || SHELL_SEPARATORS.contains(&c))
        .map(|w| w.trim_matches(|c: char| c == '"' || c == '\''))
        .map(|w| w.rsplit('/').next().unwrap_or(w).to_ascii_lowercase())
        .find_map(|w| DELETION_COMMANDS.iter().copied().find(|d| *d == w))
}

/// Plain entries match as a substring or suffix. Entries containing `*`
/// are globs (`*` never crosses `/`) matched against the path or any of its
/// trailing segments.
fn matches_protected_file(file_path: &str, protected: &str) -> bool {
    if !protected.contains('*') {
        return file_path.contains(protected);
    }
    let body = regex::escape(protected).replace(r"\*", "[^/]*");
    Regex::new(&format!("(^|/){body}$"))
        .map(|re| re.is_match(file_path))
        .unwrap_or(false)
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
