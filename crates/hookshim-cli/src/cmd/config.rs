use crate::output::print_json;
use clap::Subcommand;
use hookshim_core::config::{Config, WarnLevel};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective handler configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, marker: &str, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<i32> {
    let config = Config::load(root, marker)?;
    match subcmd {
        ConfigSubcommand::Show => show(&config, json).map(|_| 0),
        ConfigSubcommand::Validate => validate(root, &config, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(config);
    }

    let width = config.handlers.keys().map(String::len).max().unwrap_or(0);
    for (name, spec) in &config.handlers {
        let default = if *name == config.default_handler { '*' } else { ' ' };
        let line = format!("{default} {name:width$}  {} {}", spec.program, spec.args.join(" "));
        println!("{}", line.trim_end());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, config: &Config, json: bool) -> anyhow::Result<i32> {
    let warnings = config.validate(root);
    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);

    if json {
        print_json(&serde_json::json!({
            "ok": !has_errors,
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("config ok");
    } else {
        for w in &warnings {
            let label = match w.level {
                WarnLevel::Error => "error",
                WarnLevel::Warning => "warning",
            };
            println!("{label}: {}", w.message);
        }
    }

    Ok(if has_errors { 1 } else { 0 })
}
