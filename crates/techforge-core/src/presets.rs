//! Grids built from a ship's catalog: its starting grid and its recommended
//! builds. Module references go through the same lookup as decoded grids, so
//! unknown techs and modules leave the cell empty.

use crate::cache::Catalog;
use crate::catalog::{DefinitionCell, GridDefinition, LayoutCell, RecommendedBuild, TechTree};
use crate::codec::{resolve_cell, EncodedCell};
use crate::error::{PresetError, PresetResult};
use crate::grid::{Cell, Grid};
use crate::source::CatalogSource;
use tracing::info;

/// Size of a ship grid when nothing says otherwise.
pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 6;

fn non_empty(key: &Option<String>) -> Option<String> {
    key.as_deref().filter(|k| !k.is_empty()).map(str::to_string)
}

fn layout_cell(slot: &LayoutCell, tree: &TechTree) -> Cell {
    let enc = EncodedCell {
        supercharged: slot.supercharged,
        active: slot.active,
        tech: non_empty(&slot.tech),
        module: non_empty(&slot.module),
    };
    Cell {
        adjacency_bonus: slot.adjacency_bonus,
        ..resolve_cell(&enc, tree)
    }
}

/// Lays `build` out on a grid of at least the default size.
pub fn from_recommended(build: &RecommendedBuild, tree: &TechTree) -> Grid {
    let width = build
        .layout
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(DEFAULT_WIDTH);
    let height = build.layout.len().max(DEFAULT_HEIGHT);

    let mut grid = Grid::new(width, height);
    for (r, row) in build.layout.iter().enumerate() {
        for (c, slot) in row.iter().enumerate() {
            if let Some(slot) = slot {
                grid.cells[r][c] = layout_cell(slot, tree);
            }
        }
    }
    grid
}

fn definition_cell(slot: &DefinitionCell, tree: &TechTree) -> Cell {
    let enc = EncodedCell {
        supercharged: slot.supercharged,
        active: slot.active.unwrap_or(true),
        tech: non_empty(&slot.tech),
        module: non_empty(&slot.id),
    };
    resolve_cell(&enc, tree)
}

/// The starting grid a definition describes. `None` when it is empty or
/// ragged.
pub fn from_definition(definition: &GridDefinition, tree: &TechTree) -> Option<Grid> {
    let rows = definition
        .grid
        .iter()
        .map(|row| {
            row.iter()
                .map(|slot| slot.as_ref().map_or_else(Cell::default, |s| definition_cell(s, tree)))
                .collect()
        })
        .collect();

    Grid::from_rows(rows).filter(|g| g.width > 0)
}

/// Builds recommended build number `index` of `ship_type`. Returns the build's
/// title with the grid.
pub async fn recommended<S: CatalogSource>(
    catalog: &Catalog<S>,
    ship_type: &str,
    index: usize,
) -> PresetResult<(String, Grid)> {
    let tree = catalog.tech_tree(ship_type).await?;
    let build = tree
        .recommended_builds
        .get(index)
        .ok_or_else(|| PresetError::NoRecommendedBuild {
            ship_type: ship_type.to_string(),
            index,
            count: tree.recommended_builds.len(),
        })?;

    info!("⭐ Applying recommended build '{}' for '{}'", build.title, ship_type);
    Ok((build.title.clone(), from_recommended(build, &tree)))
}

/// Builds the starting grid of `ship_type`.
pub async fn starting_grid<S: CatalogSource>(
    catalog: &Catalog<S>,
    ship_type: &str,
) -> PresetResult<Grid> {
    let tree = catalog.tech_tree(ship_type).await?;
    let definition = tree
        .grid_definition
        .as_ref()
        .ok_or_else(|| PresetError::NoGridDefinition(ship_type.to_string()))?;

    from_definition(definition, &tree)
        .ok_or_else(|| PresetError::MalformedDefinition(ship_type.to_string()))
}
