use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use std::collections::BTreeMap;
use techforge_core::catalog::{RecommendedBuild, ShipTypes};
use techforge_core::events::OptimizationResult;

pub fn print_legend(colors: &BTreeMap<String, String>) {
    if colors.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Tech", "Color"]);
    for (tech, color) in colors {
        table.add_row(vec![tech, color]);
    }
    println!("{}", table);
}

pub fn print_platforms(ship_types: &ShipTypes) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Key", "Label", "Class"]);
    for (key, detail) in ship_types {
        table.add_row(vec![key, &detail.label, &detail.ship_class]);
    }
    println!("{}", table);
}

pub fn print_builds(builds: &[RecommendedBuild]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["#", "Title"]);
    for (index, build) in builds.iter().enumerate() {
        table.add_row(vec![index.to_string(), build.title.clone()]);
    }
    println!("{}", table);
}

fn bonus(value: Option<f64>) -> Cell {
    let text = value.map_or("-".to_string(), |v| format!("{:.2}", v));
    Cell::new(text).set_alignment(CellAlignment::Right)
}

pub fn print_result(tech: &str, result: &OptimizationResult) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Tech", "Method", "Max Bonus", "Solved Bonus"]);
    table.add_row(vec![
        Cell::new(tech),
        Cell::new(&result.solve_method),
        bonus(result.max_bonus),
        bonus(result.solved_bonus),
    ]);
    println!("{}", table);
}
