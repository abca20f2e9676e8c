use crate::catalog::{ShipTypeDetail, ShipTypes, TechTree};
use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::path::Path;

/// Where tech trees and the ship type list come from.
pub trait CatalogSource: Send + Sync {
    fn fetch_tech_tree(
        &self,
        ship_type: &str,
    ) -> impl Future<Output = CatalogResult<TechTree>> + Send;

    fn fetch_ship_types(&self) -> impl Future<Output = CatalogResult<ShipTypes>> + Send;
}

/// An in-memory catalog, typically read from a JSON snapshot of the API.
///
/// ```json
/// { "platforms": { "standard": { "label": "Starship", "type": "Starship" } },
///   "tech_trees": { "standard": { "Weaponry": [ ... ] } } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    pub platforms: ShipTypes,
    #[serde(default)]
    pub tech_trees: BTreeMap<String, TechTree>,
}

impl StaticCatalog {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let content = fs::read_to_string(&path)?;
        let catalog: StaticCatalog = serde_json::from_str(&content)?;
        Ok(catalog)
    }

    pub fn with_tree(mut self, ship_type: &str, tree: TechTree) -> Self {
        self.tech_trees.insert(ship_type.to_string(), tree);
        self
    }

    /// Declared platforms, or one entry per tech tree when none are declared.
    pub fn ship_types(&self) -> ShipTypes {
        if !self.platforms.is_empty() {
            return self.platforms.clone();
        }
        self.tech_trees
            .keys()
            .map(|k| {
                (
                    k.clone(),
                    ShipTypeDetail {
                        label: k.clone(),
                        ship_class: String::new(),
                    },
                )
            })
            .collect()
    }
}

impl CatalogSource for StaticCatalog {
    async fn fetch_tech_tree(&self, ship_type: &str) -> CatalogResult<TechTree> {
        self.tech_trees
            .get(ship_type)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownShipType(ship_type.to_string()))
    }

    async fn fetch_ship_types(&self) -> CatalogResult<ShipTypes> {
        Ok(self.ship_types())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file_and_derive_platforms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"{{"tech_trees": {{"freighter": {{"Hyperdrive": [{{"key": "hyper", "color": "iris", "modules": []}}]}}}}}}"#
        )
        .unwrap();

        let catalog = StaticCatalog::load_from_file(&path).unwrap();
        let ships = catalog.ship_types();
        assert_eq!(ships.keys().collect::<Vec<_>>(), vec!["freighter"]);
        assert!(catalog.tech_trees["freighter"].tech("hyper").is_some());
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let err = StaticCatalog::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
