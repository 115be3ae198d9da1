//! The JSON tool event a hook receives on stdin, and what it answers with.

use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::error::Result;

/// Accepts both the legacy `tool`/`parameters` keys and the assistant's
/// `tool_name`/`tool_input`. When a payload carries both, the legacy key wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawToolEvent")]
pub struct ToolEvent {
    pub tool: String,
    pub parameters: Parameters,
    pub output: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct RawToolEvent {
    tool: Option<String>,
    tool_name: Option<String>,
    parameters: Option<Parameters>,
    tool_input: Option<Parameters>,
    #[serde(default)]
    output: String,
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl From<RawToolEvent> for ToolEvent {
    fn from(raw: RawToolEvent) -> Self {
        Self {
            tool: raw.tool.or(raw.tool_name).unwrap_or_default(),
            parameters: raw.parameters.or(raw.tool_input).unwrap_or_default(),
            output: raw.output,
            success: raw.success,
            error: raw.error,
        }
    }
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameters {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub file_path: String,
}

impl ToolEvent {
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut data = String::new();
        reader.read_to_string(&mut data)?;
        Self::from_json(&data)
    }

    /// Lowercased tool name; assistants report `Bash`, older payloads `bash`.
    pub fn tool_kind(&self) -> String {
        self.tool.to_ascii_lowercase()
    }

    pub fn is_file_edit(&self) -> bool {
        matches!(self.tool_kind().as_str(), "write" | "edit")
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}
