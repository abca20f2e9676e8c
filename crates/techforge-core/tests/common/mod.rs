#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use techforge_core::catalog::{ShipTypes, TechTree};
use techforge_core::error::{CatalogError, CatalogResult};
use techforge_core::grid::{Cell, Grid};
use techforge_core::source::{CatalogSource, StaticCatalog};

pub const SHIP: &str = "standard";

/// Two categories, three techs. `hyper` has two modules, `shield` three.
pub fn sample_tree() -> TechTree {
    serde_json::from_value(serde_json::json!({
        "Defensive Systems": [
            {
                "key": "shield",
                "label": "Defensive Shields",
                "color": "blue",
                "module_count": 3,
                "type": "normal",
                "modules": [
                    {"id": "Cb", "label": "Defensive Shields", "bonus": 0.0, "type": "core", "sc_eligible": true},
                    {"id": "Ca", "label": "Shield Upgrade Theta", "bonus": 0.3, "type": "bonus", "adjacency": "greater"},
                    {"id": "DS", "label": "Shield Upgrade Sigma", "bonus": 0.2, "type": "bonus"}
                ]
            }
        ],
        "Hyperdrive": [
            {
                "key": "hyper",
                "label": "Hyperdrive",
                "color": "iris",
                "module_count": 2,
                "modules": [
                    {"id": "HD", "label": "Hyperdrive", "type": "core"},
                    {"id": "Xa", "label": "Hyperdrive Upgrade Theta", "bonus": 0.32, "type": "bonus"}
                ]
            },
            {
                "key": "launch",
                "label": "Launch Thruster",
                "color": "amber",
                "modules": [
                    {"id": "LT", "label": "Launch Thruster", "type": "core"}
                ]
            }
        ],
        "grid_definition": {"grid": [], "gridFixed": false}
    }))
    .unwrap()
}

pub fn sample_catalog() -> StaticCatalog {
    let platforms: ShipTypes = serde_json::from_value(serde_json::json!({
        "standard": {"label": "Starship", "type": "Starship"},
        "freighter": {"label": "Freighter", "type": "Freighter"}
    }))
    .unwrap();

    StaticCatalog {
        platforms,
        ..Default::default()
    }
    .with_tree(SHIP, sample_tree())
    .with_tree("freighter", sample_tree())
}

/// Fluent grid construction for tests.
pub struct GridBuilder {
    grid: Grid,
    tree: TechTree,
}

impl GridBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            tree: sample_tree(),
        }
    }

    /// Places a module with display fields taken from the sample tree.
    pub fn place(mut self, row: usize, col: usize, tech: &str, module: &str) -> Self {
        let module = self.tree.module(tech, module).unwrap().clone();
        let cell = self.grid.cell_mut(row, col).unwrap();
        *cell = Cell::placed(tech, &module, cell.supercharged, cell.active);
        self
    }

    /// Places a module the sample tree doesn't know about.
    pub fn place_raw(mut self, row: usize, col: usize, tech: &str, module: Option<&str>) -> Self {
        let cell = self.grid.cell_mut(row, col).unwrap();
        cell.tech = Some(tech.to_string());
        cell.module = module.map(str::to_string);
        self
    }

    pub fn supercharge(mut self, row: usize, col: usize) -> Self {
        self.grid.cell_mut(row, col).unwrap().supercharged = true;
        self
    }

    pub fn deactivate(mut self, row: usize, col: usize) -> Self {
        self.grid.cell_mut(row, col).unwrap().active = false;
        self
    }

    pub fn build(self) -> Grid {
        self.grid
    }
}

/// Wraps a [`StaticCatalog`], counting fetches and optionally failing them.
#[derive(Default)]
pub struct CountingSource {
    pub inner: StaticCatalog,
    pub tree_fetches: AtomicUsize,
    pub ship_type_fetches: AtomicUsize,
    pub failing: AtomicBool,
}

impl CountingSource {
    pub fn new(inner: StaticCatalog) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn tree_fetches(&self) -> usize {
        self.tree_fetches.load(Ordering::SeqCst)
    }
}

impl CatalogSource for CountingSource {
    async fn fetch_tech_tree(&self, ship_type: &str) -> CatalogResult<TechTree> {
        self.tree_fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Http("HTTP error! status: 500".into()));
        }
        self.inner.fetch_tech_tree(ship_type).await
    }

    async fn fetch_ship_types(&self) -> CatalogResult<ShipTypes> {
        self.ship_type_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Http("HTTP error! status: 500".into()));
        }
        self.inner.fetch_ship_types().await
    }
}
