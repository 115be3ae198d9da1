mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use hookshim_core::{paths, root, HookError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hookshim",
    about = "Locate the project root and run an assistant hook handler from it",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from the marker directory, git, or cwd)
    #[arg(long, global = true, env = "HOOKSHIM_ROOT")]
    root: Option<PathBuf>,

    /// Directory name that marks a project root
    #[arg(long, global = true, env = "HOOKSHIM_MARKER", default_value = paths::DEFAULT_MARKER)]
    marker: String,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a handler from the project root and exit with its status
    Run {
        /// Handler name from hookshim.yaml (default: default_handler)
        name: Option<String>,

        /// Extra arguments appended to the handler command
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print the resolved project root
    Root,

    /// Built-in pre-tool safety check (tool event JSON on stdin)
    PreTool,

    /// Built-in post-tool output validation (tool event JSON on stdin)
    PostTool,

    /// Inspect the handler configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    // stdout belongs to the handler; diagnostics go to stderr only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let resolution = root::resolve_root(cli.root.as_deref(), &cli.marker);
    let root = resolution.root.as_path();
    let marker = cli.marker.as_str();

    let result = match cli.command {
        None => cmd::run::run(root, marker, None, &[]),
        Some(Commands::Run { name, args }) => cmd::run::run(root, marker, name.as_deref(), &args),
        Some(Commands::Root) => cmd::root::run(&resolution, cli.json).map(|_| 0),
        Some(Commands::PreTool) => cmd::pre_tool::run(root, marker),
        Some(Commands::PostTool) => cmd::post_tool::run(),
        Some(Commands::Config { subcommand }) => {
            cmd::config::run(root, marker, subcommand, cli.json)
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            let code = e.downcast_ref::<HookError>().map_or(1, HookError::exit_code);
            std::process::exit(code);
        }
    }
}
