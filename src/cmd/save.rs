use super::read_grid;
use clap::Args;
use std::path::PathBuf;
use techforge::error::CliResult;
use techforge_core::build_file;
use techforge_core::platform::DEFAULT_SHIP_TYPE;

#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    /// Grid JSON file
    pub grid: PathBuf,

    #[arg(short, long, default_value = DEFAULT_SHIP_TYPE)]
    pub ship: String,

    /// Build name, also used for the file name
    #[arg(short, long)]
    pub name: String,

    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: SaveArgs) -> CliResult<()> {
    let grid = read_grid(&args.grid)?;
    let path = build_file::save(&args.dir, &grid, &args.ship, &args.name)?;
    println!("{}", path.display());
    Ok(())
}
