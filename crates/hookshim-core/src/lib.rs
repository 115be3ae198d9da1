pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod paths;
pub mod root;
pub mod safety;
pub mod validation;
pub mod vcs;

pub use error::{HookError, Result};
