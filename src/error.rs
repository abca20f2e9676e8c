use std::path::PathBuf;
use techforge_client::share::ShareError;
use techforge_client::SessionError;
use techforge_core::error::{BuildFileError, CatalogError, CodecError, PresetError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path:?} is not a grid: {source}")]
    GridJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    BuildFile(#[from] BuildFileError),

    #[error(transparent)]
    Preset(#[from] PresetError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Share(#[from] ShareError),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Serialization Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

pub type CliResult<T> = Result<T, CliError>;
