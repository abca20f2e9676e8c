//! Technology grid layouts: the text codec, `.nms` build files and the solver
//! client, plus the glue the `techforge` binary needs.

pub mod error;
pub mod sources;

pub use techforge_client::{
    parse_share_url, share_url, ClientConfig, ConnectionManager, HttpCatalog, MemoryGridStore,
    ModuleSelection, OptimizationSession, Outcome, Phase, SessionError, SharedGrid, SocketError,
};
pub use techforge_core::{build_file, cache, codec, platform, presets, rle, source};
pub use techforge_protocol::{build, catalog, events, grid};
