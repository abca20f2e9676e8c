use thiserror::Error;

/// Encoding failures. Decoding never errors: untrusted grid strings decode to
/// `None` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Grid is malformed: expected {height} rows of {width} cells")]
    MalformedGrid { width: usize, height: usize },

    #[error("Grid is empty or larger than {max} cells")]
    BadSize { max: usize },

    #[error("'{0}' can't be encoded: keys must be non-empty and free of '|', ',' and ':'")]
    ReservedCharacter(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Tech tree request failed: {0}")]
    Http(String),

    #[error("Tech tree request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Catalog JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No tech tree for ship type '{0}'")]
    UnknownShipType(String),
}

/// Every way a build file can be rejected. Each load check has its own
/// variant so the UI can say exactly what is wrong.
#[derive(Error, Debug)]
pub enum BuildFileError {
    #[error("Invalid file type. Please select a .nms file.")]
    InvalidExtension,

    #[error("File is too large. Build files should be under 10MB.")]
    TooLarge,

    #[error("File is empty. Please select a valid build file.")]
    Empty,

    #[error("File contains invalid JSON. The build file may be corrupted.")]
    InvalidJson,

    #[error("The build file couldn't be loaded: missing or invalid '{0}' field.")]
    InvalidShape(&'static str),

    #[error("The build file has no checksum. Please export it again.")]
    MissingChecksum,

    #[error("Build file integrity check failed. The file may have been corrupted or tampered with.")]
    IntegrityFailure,

    #[error("Unsupported ship type: \"{ship_type}\". Valid types are: {}.", .valid.join(", "))]
    UnsupportedShipType {
        ship_type: String,
        valid: Vec<String>,
    },

    #[error("The build file's grid could not be decoded.")]
    Decode,

    #[error("Failed to encode grid: {0}")]
    Encode(#[from] CodecError),

    #[error("Could not load ship types: {0}")]
    Catalog(#[from] CatalogError),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Serialization Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures building a grid from a ship's catalog presets.
#[derive(Error, Debug)]
pub enum PresetError {
    #[error("Ship type '{ship_type}' has {count} recommended builds, no build #{index}")]
    NoRecommendedBuild {
        ship_type: String,
        index: usize,
        count: usize,
    },

    #[error("Ship type '{0}' has no starting grid")]
    NoGridDefinition(String),

    #[error("Starting grid of '{0}' is empty or ragged")]
    MalformedDefinition(String),

    #[error("Could not load tech tree: {0}")]
    Catalog(#[from] CatalogError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
pub type BuildResult<T> = Result<T, BuildFileError>;
pub type PresetResult<T> = Result<T, PresetError>;
