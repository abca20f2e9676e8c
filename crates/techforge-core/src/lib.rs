//! Grid codec, catalog cache and build files.

pub use techforge_protocol::build;
pub use techforge_protocol::catalog;
pub use techforge_protocol::events;
pub use techforge_protocol::grid;

pub mod build_file;
pub mod cache;
pub mod codec;
pub mod error;
pub mod platform;
pub mod presets;
pub mod rle;
pub mod source;
pub mod util;
