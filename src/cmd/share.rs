use super::decode::{decode, show};
use super::read_grid;
use anyhow::anyhow;
use clap::Args;
use std::path::PathBuf;
use techforge::error::{CliError, CliResult};
use techforge::sources::Source;
use techforge_client::{parse_share_url, share_url};
use techforge_core::cache::Catalog;
use techforge_core::codec;
use techforge_core::platform::{PlatformSelection, DEFAULT_SHIP_TYPE};

#[derive(Args, Debug, Clone)]
pub struct ShareArgs {
    /// Grid JSON file
    pub grid: PathBuf,

    #[arg(short, long, default_value = DEFAULT_SHIP_TYPE)]
    pub ship: String,

    /// Page the link points at
    #[arg(long, env = "TECHFORGE_APP_URL", default_value = "http://localhost:5173/")]
    pub base_url: String,
}

#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    pub url: String,

    /// Ship type to use when the link doesn't name one
    #[arg(short, long, default_value = DEFAULT_SHIP_TYPE)]
    pub ship: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: ShareArgs) -> CliResult<()> {
    let grid = read_grid(&args.grid)?;
    let serialized = codec::serialize(&grid)?;
    println!("{}", share_url(&args.base_url, &serialized, &args.ship)?);
    Ok(())
}

pub async fn open(args: OpenArgs, catalog: &Catalog<Source>) -> CliResult<()> {
    let shared = parse_share_url(&args.url)
        .ok_or_else(|| CliError::Any(anyhow!("Link has no grid parameter: {}", args.url)))?;

    let mut platform = PlatformSelection::new(&args.ship);
    if let Some(ship) = &shared.platform {
        platform.select(ship);
    }

    let (grid, colors) = decode(&shared.grid, platform.current(), catalog).await?;
    if !args.json {
        println!("Platform: {}", platform.current());
    }
    show(&grid, &colors, args.json)
}
