use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use techforge::error::CliResult;
use techforge::sources::Source;
use techforge::ClientConfig;
use techforge_core::cache::Catalog;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read tech trees and platforms from a JSON snapshot instead of the API
    #[arg(global = true, long)]
    catalog: Option<PathBuf>,

    /// Client settings as JSON. Replaces the client flags below.
    #[arg(global = true, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    client: ClientConfig,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the text form of a grid JSON file
    Encode(cmd::encode::EncodeArgs),
    /// Resolve a grid string against the catalog
    Decode(cmd::decode::DecodeArgs),
    /// Build a share link for a grid JSON file
    Share(cmd::share::ShareArgs),
    /// Decode the grid carried by a share link
    Open(cmd::share::OpenArgs),
    /// Write a grid JSON file as a `.nms` build file
    Save(cmd::save::SaveArgs),
    /// Validate and decode a `.nms` build file
    Load(cmd::load::LoadArgs),
    /// Ask the solver to place a technology
    Optimize(cmd::optimize::OptimizeArgs),
    /// Print a recommended build or the starting grid of a ship type
    Recommended(cmd::recommended::RecommendedArgs),
    /// List the ship types the catalog knows
    Platforms,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match &cli.config {
        Some(path) => ClientConfig::load_from_file(path).unwrap_or_else(|e| {
            error!("❌ {}", e);
            process::exit(1);
        }),
        None => cli.client.clone(),
    };

    if let Err(e) = run(cli, client).await {
        error!("❌ {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli, client: ClientConfig) -> CliResult<()> {
    let open_catalog = || -> CliResult<Catalog<Source>> {
        Ok(Catalog::new(Source::open(cli.catalog.as_deref(), &client)?))
    };

    match cli.command {
        Commands::Encode(args) => cmd::encode::run(args),
        Commands::Decode(args) => cmd::decode::run(args, &open_catalog()?).await,
        Commands::Share(args) => cmd::share::run(args),
        Commands::Open(args) => cmd::share::open(args, &open_catalog()?).await,
        Commands::Save(args) => cmd::save::run(args),
        Commands::Load(args) => cmd::load::run(args, &open_catalog()?).await,
        Commands::Optimize(args) => cmd::optimize::run(args, &client).await,
        Commands::Recommended(args) => cmd::recommended::run(args, &open_catalog()?).await,
        Commands::Platforms => cmd::platforms::run(&open_catalog()?).await,
    }
}
