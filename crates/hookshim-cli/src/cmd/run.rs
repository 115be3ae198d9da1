use anyhow::Context;
use hookshim_core::config::Config;
use hookshim_core::dispatch;
use std::path::Path;

/// Enter `root`, run the named (or default) handler and return its exit code.
pub fn run(root: &Path, marker: &str, name: Option<&str>, extra: &[String]) -> anyhow::Result<i32> {
    let config = Config::load(root, marker)
        .with_context(|| format!("failed to load handler config under {}", root.display()))?;
    let spec = match name {
        Some(n) => config.handler(n)?,
        None => config.default_spec()?,
    };

    dispatch::enter_root(root)
        .with_context(|| format!("cannot enter project root {}", root.display()))?;

    let code = dispatch::run_handler(root, spec, extra)?;
    Ok(code)
}
