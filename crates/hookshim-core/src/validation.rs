//! Post-tool validation of a tool's output.
//!
//! Each analysis looks at one concern; [`validate`] combines them into a
//! single primary [`Feedback`] plus an optional plan-size warning.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::OnceLock;

use crate::event::{Severity, ToolEvent};

pub const READY_FOR_EVALUATOR: &str = "READY_FOR_EVALUATOR";
pub const UI_ARTIFACTS_CONFIRMED: &str = "UI artifacts provided by human? = yes";
pub const PLANS_DIR_FRAGMENT: &str = "documentation/plans/";

const PLAN_MAX_BYTES: u64 = 10 * 1024;
const PLAN_MAX_LINES: usize = 1500;

const ERROR_PATTERNS: &[&str] = &[
    r"Traceback\s*\(most recent call last\):",
    r"FAILED",
    r"ERROR",
    r"Exception",
    r"AssertionError",
    r"ValueError",
    r"TypeError",
    r"AttributeError",
    r"ImportError",
    r"ModuleNotFoundError",
    r"SyntaxError",
    r"IndentationError",
    r"NameError",
    r"ZeroDivisionError",
    r"IndexError",
    r"KeyError",
    r"FileNotFoundError",
    r"PermissionError",
    r"ConnectionError",
    r"TimeoutError",
];

const PLACEHOLDER_PATTERNS: &[&str] = &[
    r"\.\.\..*existing code.*\.\.\.",
    r"\.\.\..*rest of.*\.\.\.",
    r"\.\.\..*implementation.*\.\.\.",
    r"\.\.\..*add.*here.*\.\.\.",
    r"//.*TODO.*implement",
    r"#.*TODO.*implement",
    r"/\*.*TODO.*\*/",
    r"placeholder",
    r"stub.*implementation",
    r"mock.*implementation",
];

const UI_API_INDICATORS: &[&str] = &[
    ".html", ".css", ".js", ".jsx", ".tsx", "api/", "frontend/", "ui/", "component", "chart",
    "graph", "dashboard", "visual", "react", "vue", "angular", "svelte",
];

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub feedback_type: FeedbackType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrective_action: Option<String>,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks_workflow: Option<bool>,
}

impl Feedback {
    fn blocking(message: String, corrective_action: &str, severity: Severity) -> Self {
        Self {
            feedback_type: FeedbackType::Error,
            message,
            corrective_action: Some(corrective_action.to_string()),
            severity,
            blocks_workflow: Some(true),
        }
    }

    /// Feedback for a hook that could not process its input.
    pub fn hook_error(err: impl std::fmt::Display) -> Self {
        Self {
            feedback_type: FeedbackType::Error,
            message: format!("Hook error: {err}"),
            corrective_action: None,
            severity: Severity::Low,
            blocks_workflow: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub primary: Feedback,
    pub warning: Option<Feedback>,
}

// ---------------------------------------------------------------------------
// Analyses
// ---------------------------------------------------------------------------

fn compile(patterns: &'static [&'static str]) -> Vec<(&'static str, Regex)> {
    patterns
        .iter()
        .filter_map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .ok()
                .map(|re| (*p, re))
        })
        .collect()
}

fn error_res() -> &'static [(&'static str, Regex)] {
    static RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RES.get_or_init(|| compile(ERROR_PATTERNS))
}

fn placeholder_res() -> &'static [(&'static str, Regex)] {
    static RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RES.get_or_init(|| compile(PLACEHOLDER_PATTERNS))
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"READY_FOR_(?:CODER|TESTER|EVALUATOR|EVALUATION_COMPLETE)").unwrap()
    })
}

fn invalid_scope_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"INVALID_SCOPE:\s*\[(.*?)\]").unwrap())
}

/// First error pattern found in `output`.
pub fn find_error_pattern(output: &str) -> Option<&'static str> {
    error_res()
        .iter()
        .find(|(_, re)| re.is_match(output))
        .map(|(p, _)| *p)
}

/// First placeholder ("lazy output") pattern found in `output`.
pub fn find_placeholder(output: &str) -> Option<&'static str> {
    placeholder_res()
        .iter()
        .find(|(_, re)| re.is_match(output))
        .map(|(p, _)| *p)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIssue {
    pub token: String,
    pub line: usize,
    pub error: String,
}

/// Workflow tokens must sit alone on their line, after a blank (or comment)
/// line.
pub fn token_isolation_issues(output: &str) -> Vec<TokenIssue> {
    let lines: Vec<&str> = output.split('\n').collect();
    let mut issues = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(m) = token_re().find(line) else {
            continue;
        };
        let token = m.as_str().to_string();
        let stripped = line.trim();

        if stripped != token {
            issues.push(TokenIssue {
                token: token.clone(),
                line: i + 1,
                error: format!("Token not isolated - found: \"{stripped}\""),
            });
        }

        if i > 0 {
            let prev = lines[i - 1].trim();
            if !prev.is_empty() && !prev.starts_with("//") && !prev.starts_with('#') {
                issues.push(TokenIssue {
                    token,
                    line: i + 1,
                    error: "Token not properly separated by blank line".to_string(),
                });
            }
        }
    }
    issues
}

/// Paths listed in an `INVALID_SCOPE: [...]` marker.
pub fn invalid_scope(output: &str) -> Option<String> {
    invalid_scope_re()
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn ui_artifacts_missing(output: &str) -> bool {
    output.contains(READY_FOR_EVALUATOR) && !output.contains(UI_ARTIFACTS_CONFIRMED)
}

pub fn touches_ui_or_api(event: &ToolEvent) -> bool {
    let command = event.parameters.command.to_lowercase();
    let file_path = event.parameters.file_path.to_lowercase();
    UI_API_INDICATORS
        .iter()
        .any(|i| command.contains(i) || file_path.contains(i))
}

pub fn sanity_check_missing(event: &ToolEvent) -> bool {
    let output = &event.output;
    output.contains(READY_FOR_EVALUATOR)
        && touches_ui_or_api(event)
        && !(output.contains("SANITY_CHECK_PASS") || output.contains("SANITY_CHECK_COMPLETE"))
}

/// Warn when a plan document grows past the context-size thresholds.
pub fn plan_size_warning(event: &ToolEvent) -> Option<Feedback> {
    if !event.is_file_edit() || !event.parameters.file_path.contains(PLANS_DIR_FRAGMENT) {
        return None;
    }
    let path = std::path::Path::new(&event.parameters.file_path);
    if !path.exists() {
        return None;
    }

    let (size, lines) = match std::fs::read(path) {
        Ok(bytes) => (
            bytes.len() as u64,
            String::from_utf8_lossy(&bytes).lines().count(),
        ),
        Err(e) => {
            return Some(Feedback {
                feedback_type: FeedbackType::Warning,
                message: format!("[WARNING: Could not check plan file size: {e}]"),
                corrective_action: None,
                severity: Severity::Low,
                blocks_workflow: Some(false),
            })
        }
    };

    if size <= PLAN_MAX_BYTES && lines <= PLAN_MAX_LINES {
        return None;
    }
    Some(Feedback {
        feedback_type: FeedbackType::Warning,
        message: format!(
            "[WARNING: Plan size indicates potential context drift ({:.1}KB, {} lines). Consider splitting the feature or summarizing sections.]",
            size as f64 / 1024.0,
            lines
        ),
        corrective_action: None,
        severity: Severity::Medium,
        blocks_workflow: Some(false),
    })
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

pub fn validate(event: &ToolEvent) -> Report {
    let tool = if event.tool.is_empty() {
        "unknown"
    } else {
        event.tool.as_str()
    };
    let output = event.output.as_str();
    let token_issues = token_isolation_issues(output);

    let primary = if sanity_check_missing(event) {
        Feedback::blocking(
            format!(
                "{tool} attempted to advance to evaluation without sanity check: Completeness proof missing. Invoke @sanity-checker to verify UI/Data integrity before proceeding."
            ),
            "SANITY CHECK REQUIRED - WORKFLOW BLOCKED. Must invoke @sanity-checker for UI/API features before evaluation.",
            Severity::High,
        )
    } else if ui_artifacts_missing(output) {
        Feedback::blocking(
            format!(
                "{tool} attempted to advance without UI artifact validation: {READY_FOR_EVALUATOR} present but no UI artifacts confirmation found"
            ),
            "UI ARTIFACT VALIDATION FAILED - WORKFLOW BLOCKED. Cannot proceed to evaluation without confirmed UI artifacts.",
            Severity::High,
        )
    } else if let Some(paths) = invalid_scope(output) {
        Feedback::blocking(
            format!("{tool} detected invalid repair scope: Repair scope validation failed: missing paths {paths}"),
            "SCOPE VALIDATION FAILED - WORKFLOW BLOCKED. Repair scope contains non-existent paths.",
            Severity::High,
        )
    } else if !token_issues.is_empty() {
        let details = token_issues
            .iter()
            .map(|i| format!("{}: {}", i.token, i.error))
            .collect::<Vec<_>>()
            .join("; ");
        Feedback::blocking(
            format!("{tool} has improperly formatted workflow tokens: {details}"),
            "TOKEN ISOLATION ERROR - WORKFLOW BLOCKED. Tokens must be on their own line at the end, preceded by a blank line.",
            Severity::High,
        )
    } else if let Some(pattern) = find_placeholder(output) {
        Feedback::blocking(
            format!("{tool} produced lazy/hallucinated output: Detected lazy agent pattern: {pattern}"),
            "HALLUCINATION DETECTED - DO NOT PROCEED. Agent left placeholder content instead of real implementation.",
            Severity::High,
        )
    } else if let Some(pattern) = find_error_pattern(output) {
        let error = event.error.as_deref().unwrap_or("Unknown error");
        Feedback::blocking(
            format!("{tool} failed with {pattern}: {error}"),
            "ERROR DETECTED - DO NOT PROCEED WITH READY_FOR_* TOKENS. Address the error first.",
            Severity::High,
        )
    } else if !event.success {
        let error = event.error.as_deref().unwrap_or("Unknown error");
        Feedback {
            feedback_type: FeedbackType::Error,
            message: format!("{tool} failed: {error}"),
            corrective_action: Some("Review the error and try again".to_string()),
            severity: Severity::Medium,
            blocks_workflow: None,
        }
    } else {
        Feedback {
            feedback_type: FeedbackType::Success,
            message: format!("{tool} completed successfully"),
            corrective_action: None,
            severity: Severity::Low,
            blocks_workflow: None,
        }
    };

    Report {
        primary,
        warning: plan_size_warning(event),
    }
}
