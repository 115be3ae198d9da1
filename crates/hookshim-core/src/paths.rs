use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DEFAULT_MARKER: &str = ".claude";
pub const HOOKS_DIR: &str = "hooks";
pub const CONFIG_FILE: &str = "hookshim.yaml";
pub const POLICY_FILE: &str = "policy.yaml";

pub const PRE_TOOL_SCRIPT: &str = "safety_pre_tool.py";
pub const POST_TOOL_SCRIPT: &str = "validation_post_tool.py";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn marker_dir(root: &Path, marker: &str) -> PathBuf {
    root.join(marker)
}

pub fn config_path(root: &Path, marker: &str) -> PathBuf {
    marker_dir(root, marker).join(CONFIG_FILE)
}

pub fn policy_path(root: &Path, marker: &str) -> PathBuf {
    marker_dir(root, marker).join(POLICY_FILE)
}

/// Path of a hook script relative to the project root, e.g. `.claude/hooks/x.py`.
pub fn hook_script(marker: &str, script: &str) -> String {
    format!("{marker}/{HOOKS_DIR}/{script}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
