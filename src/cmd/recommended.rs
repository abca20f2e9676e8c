use super::decode::show;
use crate::reports;
use clap::Args;
use std::collections::BTreeMap;
use techforge::error::CliResult;
use techforge::sources::Source;
use techforge_core::cache::Catalog;
use techforge_core::catalog::TechTree;
use techforge_core::grid::Grid;
use techforge_core::platform::DEFAULT_SHIP_TYPE;
use techforge_core::presets;

#[derive(Args, Debug, Clone)]
pub struct RecommendedArgs {
    #[arg(short, long, default_value = DEFAULT_SHIP_TYPE)]
    pub ship: String,

    /// Which build to print, counting from 0
    #[arg(short, long, default_value_t = 0)]
    pub index: usize,

    /// List the titles of the ship's recommended builds
    #[arg(long, default_value_t = false)]
    pub list: bool,

    /// Print the ship's starting grid instead
    #[arg(long, default_value_t = false)]
    pub starting: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Colors of the techs placed on `grid`.
fn colors_in(grid: &Grid, tree: &TechTree) -> BTreeMap<String, String> {
    let colors = tree.colors();
    grid.cells
        .iter()
        .flatten()
        .filter_map(|cell| cell.tech.as_ref())
        .filter_map(|tech| colors.get(tech).map(|c| (tech.clone(), c.clone())))
        .collect()
}

pub async fn run(args: RecommendedArgs, catalog: &Catalog<Source>) -> CliResult<()> {
    let tree = catalog.tech_tree(&args.ship).await?;

    if args.list {
        reports::print_builds(&tree.recommended_builds);
        return Ok(());
    }

    let grid = if args.starting {
        presets::starting_grid(catalog, &args.ship).await?
    } else {
        let (title, grid) = presets::recommended(catalog, &args.ship, args.index).await?;
        if !args.json {
            println!("Build: {}", title);
        }
        grid
    };

    show(&grid, &colors_in(&grid, &tree), args.json)
}
