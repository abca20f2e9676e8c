use super::read_grid;
use clap::Args;
use std::path::PathBuf;
use techforge::error::CliResult;
use techforge_core::codec;

#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Grid JSON file
    pub grid: PathBuf,
}

pub fn run(args: EncodeArgs) -> CliResult<()> {
    let grid = read_grid(&args.grid)?;
    println!("{}", codec::serialize(&grid)?);
    Ok(())
}
