use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("unknown handler '{name}' (known: {known})")]
    UnknownHandler { name: String, known: String },

    #[error("project root is not a directory: {}", .0.display())]
    RootUnavailable(std::path::PathBuf),

    #[error("handler '{0}' has an empty program")]
    EmptyHandler(String),

    #[error("handler program not found: {0}")]
    HandlerNotFound(String),

    #[error("permission denied executing handler: {0}")]
    HandlerPermission(String),

    #[error("failed to spawn handler '{program}': {source}")]
    HandlerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HookError {
    /// Process exit code used when this error ends a dispatch.
    ///
    /// Follows the shell convention: 127 for a missing executable, 126 for
    /// one that exists but cannot be executed.
    pub fn exit_code(&self) -> i32 {
        match self {
            HookError::HandlerNotFound(_) => 127,
            HookError::HandlerPermission(_) => 126,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, HookError>;
