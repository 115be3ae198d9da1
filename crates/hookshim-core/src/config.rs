use crate::error::{HookError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const PRE_TOOL: &str = "pre_tool";
pub const POST_TOOL: &str = "post_tool";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// HandlerSpec
// ---------------------------------------------------------------------------

/// An external program run from the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl HandlerSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: BTreeMap::new(),
        }
    }

    fn python(marker: &str, script: &str) -> Self {
        Self::new("python3", vec![paths::hook_script(marker, script)])
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_handler_name")]
    pub default_handler: String,
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerSpec>,
}

fn default_version() -> u32 {
    1
}

fn default_handler_name() -> String {
    PRE_TOOL.to_string()
}

impl Config {
    /// Built-in configuration: the conventional Python hooks under
    /// `<marker>/hooks/`, with the pre-tool hook as the default.
    pub fn builtin(marker: &str) -> Self {
        let mut handlers = BTreeMap::new();
        handlers.insert(
            PRE_TOOL.to_string(),
            HandlerSpec::python(marker, paths::PRE_TOOL_SCRIPT),
        );
        handlers.insert(
            POST_TOOL.to_string(),
            HandlerSpec::python(marker, paths::POST_TOOL_SCRIPT),
        );
        Self {
            version: default_version(),
            default_handler: default_handler_name(),
            handlers,
        }
    }

    /// Load `<root>/<marker>/hookshim.yaml`.
    ///
    /// A missing file yields [`Config::builtin`]. Handlers named in the file
    /// replace built-ins of the same name; the others are kept.
    pub fn load(root: &Path, marker: &str) -> Result<Self> {
        let path = paths::config_path(root, marker);
        let mut cfg = Self::builtin(marker);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using built-in handlers");
            return Ok(cfg);
        }
        let data = std::fs::read_to_string(&path)?;
        let file: Config = serde_yaml::from_str(&data)?;
        cfg.version = file.version;
        cfg.default_handler = file.default_handler;
        cfg.handlers.extend(file.handlers);
        Ok(cfg)
    }

    pub fn handler(&self, name: &str) -> Result<&HandlerSpec> {
        self.handlers
            .get(name)
            .ok_or_else(|| HookError::UnknownHandler {
                name: name.to_string(),
                known: self.handler_names().join(", "),
            })
    }

    pub fn default_spec(&self) -> Result<&HandlerSpec> {
        self.handler(&self.default_handler)
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check the configuration against the project at `root`.
    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !self.handlers.contains_key(&self.default_handler) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "default_handler '{}' is not defined in handlers",
                    self.default_handler
                ),
            });
        }

        for (name, spec) in &self.handlers {
            if spec.program.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("handler '{name}' has an empty program"),
                });
                continue;
            }

            if !program_exists(root, &spec.program) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "handler '{}' program '{}' not found on PATH or under the project root",
                        name, spec.program
                    ),
                });
            }
        }

        warnings
    }
}

fn program_exists(root: &Path, program: &str) -> bool {
    if program.contains('/') {
        return root.join(program).exists();
    }
    which::which(program).is_ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(root: &Path, yaml: &str) {
        let path = paths::config_path(root, paths::DEFAULT_MARKER);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, yaml).unwrap();
    }

    #[test]
    fn missing_file_yields_builtin_handlers() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path(), ".claude").unwrap();
        assert_eq!(cfg.default_handler, PRE_TOOL);
        assert_eq!(cfg.handler_names(), vec![POST_TOOL, PRE_TOOL]);

        let spec = cfg.default_spec().unwrap();
        assert_eq!(spec.program, "python3");
        assert_eq!(spec.args, vec![".claude/hooks/safety_pre_tool.py"]);
    }

    #[test]
    fn builtin_scripts_follow_marker() {
        let cfg = Config::builtin(".agent");
        assert_eq!(
            cfg.handler(POST_TOOL).unwrap().args,
            vec![".agent/hooks/validation_post_tool.py"]
        );
    }

    #[test]
    fn file_handlers_merge_over_builtins() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            "default_handler: lint\nhandlers:\n  lint:\n    program: sh\n    args: [-c, 'exit 0']\n    env:\n      LEVEL: strict\n  pre_tool:\n    program: hookshim\n    args: [pre-tool]\n",
        );

        let cfg = Config::load(dir.path(), ".claude").unwrap();
        assert_eq!(cfg.default_handler, "lint");
        assert_eq!(cfg.version, 1);

        let lint = cfg.default_spec().unwrap();
        assert_eq!(lint.program, "sh");
        assert_eq!(lint.env.get("LEVEL").map(String::as_str), Some("strict"));

        assert_eq!(cfg.handler(PRE_TOOL).unwrap().program, "hookshim");
        assert_eq!(cfg.handler(POST_TOOL).unwrap().program, "python3");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), "handlers: [not, a, map]\n");
        assert!(matches!(
            Config::load(dir.path(), ".claude"),
            Err(HookError::Yaml(_))
        ));
    }

    #[test]
    fn misspelled_top_level_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), "defualt_handler: lint\nhandlers: {}\n");
        assert!(matches!(
            Config::load(dir.path(), ".claude"),
            Err(HookError::Yaml(_))
        ));
    }

    #[test]
    fn handler_spec_rejects_unknown_fields() {
        let result = serde_yaml::from_str::<HandlerSpec>("program: sh\nargz: [x]\n");
        assert!(result.is_err(), "typo in field name should be rejected");
    }

    #[test]
    fn unknown_handler_names_known_ones() {
        let cfg = Config::builtin(".claude");
        let err = cfg.handler("nope").unwrap_err();
        assert!(err.to_string().contains("post_tool, pre_tool"));
    }

    #[test]
    fn validate_flags_missing_default_and_empty_program() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::builtin(".claude");
        cfg.default_handler = "ghost".to_string();
        cfg.handlers
            .insert("blank".to_string(), HandlerSpec::new("  ", vec![]));

        let warnings = cfg.validate(dir.path());
        let errors: Vec<_> = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|w| w.message.contains("ghost")));
        assert!(errors.iter().any(|w| w.message.contains("'blank'")));
    }

    #[test]
    fn validate_warns_on_missing_relative_program() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::builtin(".claude");
        cfg.handlers.insert(
            "local".to_string(),
            HandlerSpec::new("./scripts/hook.sh", vec![]),
        );
        let warnings = cfg.validate(dir.path());
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("'local'")));

        std::fs::create_dir_all(dir.path().join("scripts")).unwrap();
        std::fs::write(dir.path().join("scripts/hook.sh"), "#!/bin/sh\n").unwrap();
        let warnings = cfg.validate(dir.path());
        assert!(!warnings.iter().any(|w| w.message.contains("'local'")));
    }
}
