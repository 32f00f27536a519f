//! Command-line access to the lab inventory.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use labsim::{
    about,
    catalog::ReagentCatalog,
    config::LabConfig,
    engine::{LabEngine, Operation, Workflow, run_operation, run_workflow},
    inventory::{InventoryStore, JsonFileStore},
};
use serde::Serialize;
use std::fs;

#[derive(Parser)]
#[command(name = "labsim_cli", about = "Virtual lab inventory", disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Inventory document path
    #[arg(long, global = true)]
    state: Option<String>,

    /// Reagent catalog path
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Config file (defaults to labsim.toml when present)
    #[arg(long, global = true, env = "LABSIM_CONFIG")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print version information
    #[arg(short = 'V', long)]
    version: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the reagents available for ordering
    Reagents,
    /// Print the inventory document
    Inventory,
    /// Print a short summary of the inventory
    StateSummary,
    /// Order a reagent from the catalog
    Order { name: String, quantity: String },
    /// Combine two top-level items
    Combine { id1: u64, id2: u64 },
    /// Apply one operation from JSON (or @file.json)
    Op { payload: String },
    /// Apply a workflow from JSON (or @file.json)
    Workflow { payload: String },
    /// Print engine capabilities
    Capabilities,
}

fn load_json_arg(value: &str) -> Result<String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).with_context(|| format!("Could not read JSON file '{path}'"))
    } else {
        Ok(value.to_string())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not serialize JSON output")?;
    println!("{text}");
    Ok(())
}

fn load_catalog(config: &LabConfig) -> Result<ReagentCatalog> {
    Ok(ReagentCatalog::from_json_file(&config.catalog_path)?)
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", about::version_cli_text());
        return Ok(());
    }
    init_logging(cli.verbose);

    let mut config = LabConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.state, cli.catalog);
    let store = JsonFileStore::new(config.state_path.clone());

    let Some(command) = cli.command else {
        return Err(anyhow!("Missing command. Try --help"));
    };

    match command {
        Commands::Reagents => print_json(&load_catalog(&config)?),
        Commands::Inventory => print_json(&store.read()?),
        Commands::StateSummary => {
            let engine = LabEngine::from_state(store.read()?, ReagentCatalog::default());
            print_json(&engine.summarize_state())
        }
        Commands::Capabilities => print_json(&LabEngine::capabilities()),
        Commands::Order { name, quantity } => {
            let result = run_operation(
                &store,
                &load_catalog(&config)?,
                Operation::OrderReagent { name, quantity },
            )?;
            print_json(&result)
        }
        Commands::Combine { id1, id2 } => {
            // Combining needs no catalog.
            let result = run_operation(
                &store,
                &ReagentCatalog::default(),
                Operation::CombineItems { id1, id2 },
            )?;
            print_json(&result)
        }
        Commands::Op { payload } => {
            let json = load_json_arg(&payload)?;
            let op: Operation = serde_json::from_str(&json).context("Invalid operation JSON")?;
            let result = run_operation(&store, &load_catalog(&config)?, op)?;
            print_json(&result)
        }
        Commands::Workflow { payload } => {
            let json = load_json_arg(&payload)?;
            let workflow: Workflow =
                serde_json::from_str(&json).context("Invalid workflow JSON")?;
            let results = run_workflow(&store, &load_catalog(&config)?, workflow)?;
            print_json(&results)
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
