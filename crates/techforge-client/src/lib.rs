pub mod config;
pub mod error;
pub mod http_catalog;
pub mod session;
pub mod share;
pub mod socket;

pub use config::ClientConfig;
pub use error::{SessionError, SocketError};
pub use http_catalog::HttpCatalog;
pub use session::{
    GridStore, MemoryGridStore, ModuleSelection, OptimizationSession, Outcome, Phase, SessionState,
};
pub use share::{parse_share_url, share_url, SharedGrid};
pub use socket::{Channel, ConnectionManager, Subscription};
