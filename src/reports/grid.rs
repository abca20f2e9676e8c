use comfy_table::presets::ASCII_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use techforge_core::grid::{Cell as GridCell, Grid};

/// `tech/module`, `*` for supercharged, `x` for an inactive slot.
fn label(cell: &GridCell) -> String {
    let mut text = match (&cell.tech, &cell.module) {
        (Some(tech), Some(module)) => format!("{}/{}", tech, module),
        (Some(tech), None) => tech.clone(),
        (None, _) if !cell.active => "x".to_string(),
        (None, _) => " ".to_string(),
    };
    if cell.supercharged {
        text.push('*');
    }
    text
}

pub fn print_grid(grid: &Grid) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    for row in &grid.cells {
        let cells: Vec<Cell> = row
            .iter()
            .map(|c| Cell::new(label(c)).set_alignment(CellAlignment::Center))
            .collect();
        table.add_row(cells);
    }
    println!("{}x{}", grid.width, grid.height);
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_labels() {
        let placed = GridCell {
            tech: Some("shield".into()),
            module: Some("Cb".into()),
            supercharged: true,
            ..GridCell::default()
        };
        assert_eq!(label(&placed), "shield/Cb*");
        assert_eq!(label(&GridCell::empty(false, false)), "x");
        assert_eq!(label(&GridCell::empty(true, true)), " *");
    }
}
