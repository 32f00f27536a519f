//! MCP stdio server binary for the virtual lab.

use clap::Parser;
use labsim::{about, config::LabConfig, mcp_server::run_stdio_server};

/// Starts an MCP stdio server with tools list_reagents, list_inventory,
/// order_reagent, combine_items, submit and capabilities.
#[derive(Parser)]
#[command(name = "labsim_mcp", disable_version_flag = true)]
struct Args {
    /// Inventory document path
    #[arg(long, alias = "inventory")]
    state: Option<String>,

    /// Reagent catalog path
    #[arg(long, alias = "reagents")]
    catalog: Option<String>,

    /// Config file (defaults to labsim.toml when present)
    #[arg(long, env = "LABSIM_CONFIG")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print version information
    #[arg(short = 'V', long)]
    version: bool,
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    if args.version {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    // stdout carries the protocol; logs go to stderr.
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = LabConfig::load(args.config.as_deref()).map_err(|e| e.to_string())?;
    config.apply_overrides(args.state, args.catalog);
    run_stdio_server(&config)
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
