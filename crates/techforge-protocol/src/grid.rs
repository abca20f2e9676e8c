use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::Module;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub supercharged: bool,
    #[serde(default)]
    pub tech: Option<String>,
    #[serde(default)]
    pub module: Option<String>,

    // Display fields. Always derived from the tech tree, never trusted from a
    // shared grid.
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub value: f64,
    #[serde(default, deserialize_with = "de_adjacency")]
    pub adjacency: Option<String>,
    #[serde(default)]
    pub adjacency_bonus: f64,
    #[serde(default)]
    pub sc_eligible: bool,
    #[serde(default, rename = "type")]
    pub module_type: String,
    #[serde(default)]
    pub total: f64,
}

fn default_active() -> bool {
    true
}

/// The solver reports adjacency either as a string ("greater", "lesser", ...)
/// or as a plain boolean.
fn de_adjacency<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Flag(bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) if !s.is_empty() && s != "none" => Some(s),
        Some(Raw::Flag(true)) => Some("true".to_string()),
        _ => None,
    })
}

impl Cell {
    /// An untenanted cell that keeps its two layout flags.
    pub fn empty(supercharged: bool, active: bool) -> Self {
        Self {
            active,
            supercharged,
            tech: None,
            module: None,
            label: String::new(),
            image: None,
            bonus: 0.0,
            value: 0.0,
            adjacency: None,
            adjacency_bonus: 0.0,
            sc_eligible: false,
            module_type: String::new(),
            total: 0.0,
        }
    }

    /// A cell holding `module` of `tech`, display fields copied from the
    /// tech tree definition.
    pub fn placed(tech: &str, module: &Module, supercharged: bool, active: bool) -> Self {
        Self {
            active,
            supercharged,
            tech: Some(tech.to_string()),
            module: Some(module.id.clone()),
            label: module.label.clone(),
            image: module.image.clone(),
            bonus: module.bonus,
            value: module.value,
            adjacency: module.adjacency.clone(),
            adjacency_bonus: module.adjacency_bonus,
            sc_eligible: module.sc_eligible,
            module_type: module.module_type.clone(),
            total: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tech.is_none()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty(false, true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub cells: Vec<Vec<Cell>>,
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![Cell::default(); width]; height],
            width,
            height,
        }
    }

    /// Builds a grid from rows, rejecting ragged input.
    pub fn from_rows(cells: Vec<Vec<Cell>>) -> Option<Self> {
        let height = cells.len();
        let width = cells.first().map_or(0, Vec::len);
        let grid = Self {
            cells,
            width,
            height,
        };
        grid.is_well_formed().then_some(grid)
    }

    /// `height` rows of exactly `width` cells each.
    pub fn is_well_formed(&self) -> bool {
        self.cells.len() == self.height && self.cells.iter().all(|row| row.len() == self.width)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Row-major iteration.
    pub fn iter_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    pub fn has_tech(&self, tech: &str) -> bool {
        self.iter_cells().any(|c| c.tech.as_deref() == Some(tech))
    }

    /// Copy of the grid where every cell holding `tech` is reset to an empty
    /// cell. Layout flags survive; other cells are untouched.
    pub fn without_tech(&self, tech: &str) -> Grid {
        let cells = self
            .cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        if cell.tech.as_deref() == Some(tech) {
                            Cell::empty(cell.supercharged, cell.active)
                        } else {
                            cell.clone()
                        }
                    })
                    .collect()
            })
            .collect();

        Grid {
            cells,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![Cell::default(); 3], vec![Cell::default(); 2]];
        assert!(Grid::from_rows(rows).is_none());

        let rows = vec![vec![Cell::default(); 3]; 2];
        let grid = Grid::from_rows(rows).unwrap();
        assert_eq!((grid.width, grid.height), (3, 2));
    }

    #[test]
    fn test_without_tech_keeps_flags_and_other_cells() {
        let mut grid = Grid::new(2, 2);
        {
            let c = grid.cell_mut(0, 0).unwrap();
            c.tech = Some("shield".into());
            c.module = Some("DS".into());
            c.supercharged = true;
        }
        grid.cell_mut(1, 1).unwrap().tech = Some("pulse".into());

        let cleared = grid.without_tech("shield");
        let c = cleared.cell(0, 0).unwrap();
        assert!(c.tech.is_none());
        assert!(c.module.is_none());
        assert!(c.supercharged);
        assert!(c.active);
        assert_eq!(cleared.cell(1, 1), grid.cell(1, 1));
    }

    #[test]
    fn test_adjacency_accepts_bool_or_string() {
        let c: Cell = serde_json::from_str(r#"{"adjacency": "greater"}"#).unwrap();
        assert_eq!(c.adjacency.as_deref(), Some("greater"));

        let c: Cell = serde_json::from_str(r#"{"adjacency": false}"#).unwrap();
        assert!(c.adjacency.is_none());

        let c: Cell = serde_json::from_str(r#"{"adjacency": null, "active": false}"#).unwrap();
        assert!(c.adjacency.is_none());
        assert!(!c.active);
    }
}
