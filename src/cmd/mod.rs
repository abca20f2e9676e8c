pub mod decode;
pub mod encode;
pub mod load;
pub mod optimize;
pub mod platforms;
pub mod recommended;
pub mod save;
pub mod share;

use std::fs;
use std::path::Path;
use techforge::error::{CliError, CliResult};
use techforge_core::grid::Grid;

/// Reads a grid saved as JSON (`{"cells": [[...]], "width": .., "height": ..}`).
pub fn read_grid(path: &Path) -> CliResult<Grid> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::GridJson {
        path: path.to_path_buf(),
        source,
    })
}
