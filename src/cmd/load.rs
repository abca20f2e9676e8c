use super::decode::show;
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;
use techforge::error::CliResult;
use techforge::sources::Source;
use techforge_core::build_file;
use techforge_core::cache::Catalog;
use techforge_core::platform::{PlatformSelection, DEFAULT_SHIP_TYPE};

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// `.nms` build file
    pub file: PathBuf,

    /// Platform selected before loading; the build's own ship type wins
    #[arg(short, long, default_value = DEFAULT_SHIP_TYPE)]
    pub ship: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub async fn run(args: LoadArgs, catalog: &Catalog<Source>) -> CliResult<()> {
    let mut platform = PlatformSelection::new(&args.ship);
    let mut colors = BTreeMap::new();

    let grid =
        build_file::load_from_path(&args.file, catalog, &mut platform, |c| colors = c).await?;

    if !args.json {
        println!("Platform: {}", platform.current());
    }
    show(&grid, &colors, args.json)
}
