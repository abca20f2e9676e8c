use crate::reports;
use anyhow::anyhow;
use clap::Args;
use std::collections::BTreeMap;
use techforge::error::{CliError, CliResult};
use techforge::sources::Source;
use techforge_core::cache::Catalog;
use techforge_core::codec;
use techforge_core::grid::Grid;
use techforge_core::platform::DEFAULT_SHIP_TYPE;

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Grid string, as found in a share link or build file
    pub serialized: String,

    #[arg(short, long, default_value = DEFAULT_SHIP_TYPE)]
    pub ship: String,

    /// Print the grid as JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub async fn run(args: DecodeArgs, catalog: &Catalog<Source>) -> CliResult<()> {
    let (grid, colors) = decode(&args.serialized, &args.ship, catalog).await?;
    show(&grid, &colors, args.json)
}

pub async fn decode(
    serialized: &str,
    ship: &str,
    catalog: &Catalog<Source>,
) -> CliResult<(Grid, BTreeMap<String, String>)> {
    let mut colors = BTreeMap::new();
    let grid = codec::deserialize(serialized, ship, catalog, |c| colors = c)
        .await
        .ok_or_else(|| CliError::Any(anyhow!("Could not decode the grid string")))?;
    Ok((grid, colors))
}

pub fn show(grid: &Grid, colors: &BTreeMap<String, String>, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(grid)?);
    } else {
        reports::print_grid(grid);
        reports::print_legend(colors);
    }
    Ok(())
}
