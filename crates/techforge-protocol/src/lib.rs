//! Wire and file types shared by the codec, the build file manager and the
//! solver client.

pub mod build;
pub mod catalog;
pub mod events;
pub mod grid;

pub use build::BuildFile;
pub use catalog::{Module, ShipTypeDetail, ShipTypes, TechTree, TechTreeItem};
pub use events::{Frame, OptimizationResult, OptimizeRequest, ProgressUpdate};
pub use grid::{Cell, Grid};
