use crate::error::CliResult;
use std::path::Path;
use techforge_client::{ClientConfig, HttpCatalog};
use techforge_core::catalog::{ShipTypes, TechTree};
use techforge_core::error::CatalogResult;
use techforge_core::source::{CatalogSource, StaticCatalog};
use tracing::info;

/// The catalog a command runs against: a JSON snapshot on disk or the live API.
pub enum Source {
    File(StaticCatalog),
    Api(HttpCatalog),
}

impl Source {
    pub fn open(snapshot: Option<&Path>, config: &ClientConfig) -> CliResult<Self> {
        match snapshot {
            Some(path) => {
                info!("📂 Loading catalog snapshot: {:?}", path);
                Ok(Source::File(StaticCatalog::load_from_file(path)?))
            }
            None => {
                info!("🌐 Using catalog API at {}", config.api_url);
                Ok(Source::Api(HttpCatalog::from_config(config)?))
            }
        }
    }
}

impl CatalogSource for Source {
    async fn fetch_tech_tree(&self, ship_type: &str) -> CatalogResult<TechTree> {
        match self {
            Source::File(catalog) => catalog.fetch_tech_tree(ship_type).await,
            Source::Api(catalog) => catalog.fetch_tech_tree(ship_type).await,
        }
    }

    async fn fetch_ship_types(&self) -> CatalogResult<ShipTypes> {
        match self {
            Source::File(catalog) => catalog.fetch_ship_types().await,
            Source::Api(catalog) => catalog.fetch_ship_types().await,
        }
    }
}
