use crate::reports;
use techforge::error::CliResult;
use techforge::sources::Source;
use techforge_core::cache::Catalog;

pub async fn run(catalog: &Catalog<Source>) -> CliResult<()> {
    let ship_types = catalog.ship_types().await?;
    reports::print_platforms(&ship_types);
    Ok(())
}
