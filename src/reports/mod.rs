pub mod grid;
pub mod tables;

pub use grid::print_grid;
pub use tables::{print_builds, print_legend, print_platforms, print_result};
