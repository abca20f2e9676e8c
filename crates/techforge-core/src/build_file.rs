//! `.nms` build files: a serialized grid in a checksummed JSON envelope.

use crate::build::{checksum_of, BuildFile, BUILD_FILE_EXTENSION, MAX_BUILD_FILE_SIZE};
use crate::cache::Catalog;
use crate::codec;
use crate::error::{BuildFileError, BuildResult};
use crate::grid::Grid;
use crate::platform::PlatformSelection;
use crate::source::CatalogSource;
use crate::util::{atomic_write, now_millis};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const MAX_FILENAME_CHARS: usize = 255;
const FALLBACK_FILENAME: &str = "build";
const FORBIDDEN_FILENAME_CHARS: &[char] = &[
    '<', '>', ':', '"', '/', '\\', '|', '?', '*', '`', '$', '&', ';', '(', ')', '{', '}', '#', '!',
];

/// Serializes `grid` and wraps it with the current timestamp and checksum.
pub fn create(grid: &Grid, ship_type: &str, name: &str) -> BuildResult<BuildFile> {
    let serialized = codec::serialize(grid)?;
    Ok(BuildFile::new(
        name.to_string(),
        ship_type.to_string(),
        serialized,
        now_millis(),
    ))
}

/// Writes the build to `<dir>/<sanitized name>.nms` and returns that path.
pub fn save<P: AsRef<Path>>(
    dir: P,
    grid: &Grid,
    ship_type: &str,
    name: &str,
) -> BuildResult<PathBuf> {
    let build = create(grid, ship_type, name)?;
    let json = serde_json::to_string_pretty(&build)?;

    let path = dir
        .as_ref()
        .join(format!("{}.{}", sanitize_filename(name), BUILD_FILE_EXTENSION));
    atomic_write(&path, json)?;

    info!("💾 Saved build '{}' to {:?}", name, path);
    Ok(path)
}

fn is_reserved_device_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    match upper.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            let bytes = upper.as_bytes();
            bytes.len() == 4
                && (upper.starts_with("COM") || upper.starts_with("LPT"))
                && (b'1'..=b'9').contains(&bytes[3])
        }
    }
}

/// Makes `name` safe to use as a file stem on common filesystems.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| (*c as u32) >= 0x20 && !FORBIDDEN_FILENAME_CHARS.contains(c))
        .collect();

    let trimmed = cleaned.trim_end_matches(|c: char| c.is_whitespace() || c == '.');
    let clamped: String = trimmed.chars().take(MAX_FILENAME_CHARS).collect();

    if clamped.is_empty() || is_reserved_device_name(&clamped) {
        FALLBACK_FILENAME.to_string()
    } else {
        clamped
    }
}

fn string_field(obj: &serde_json::Map<String, Value>, field: &'static str) -> BuildResult<String> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(BuildFileError::InvalidShape(field))
}

/// Every check except the ship type, in load order.
fn check_envelope(file_name: &str, bytes: &[u8]) -> BuildResult<BuildFile> {
    let has_extension = Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext == BUILD_FILE_EXTENSION);
    if !has_extension {
        return Err(BuildFileError::InvalidExtension);
    }
    if bytes.len() as u64 > MAX_BUILD_FILE_SIZE {
        return Err(BuildFileError::TooLarge);
    }
    if bytes.is_empty() {
        return Err(BuildFileError::Empty);
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|_| BuildFileError::InvalidJson)?;
    let empty = serde_json::Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    let name = string_field(obj, "name")?;
    let ship_type = string_field(obj, "shipType")?;
    let serialized = string_field(obj, "serialized")?;
    let timestamp = obj
        .get("timestamp")
        .and_then(|t| t.as_i64().or_else(|| t.as_f64().map(|f| f as i64)))
        .ok_or(BuildFileError::InvalidShape("timestamp"))?;

    let checksum = obj
        .get("checksum")
        .and_then(Value::as_str)
        .ok_or(BuildFileError::MissingChecksum)?
        .to_string();

    let build = BuildFile {
        name,
        ship_type,
        serialized,
        timestamp,
        checksum,
    };
    if !build.verify_checksum() {
        error!(
            "❌ Checksum mismatch for '{}': expected {}, computed {}",
            file_name,
            build.checksum,
            checksum_of(&build.serialized)
        );
        return Err(BuildFileError::IntegrityFailure);
    }

    Ok(build)
}

fn check_ship_type(build: &BuildFile, known_ship_types: &[String]) -> BuildResult<()> {
    if known_ship_types.iter().any(|s| *s == build.ship_type) {
        Ok(())
    } else {
        Err(BuildFileError::UnsupportedShipType {
            ship_type: build.ship_type.clone(),
            valid: known_ship_types.to_vec(),
        })
    }
}

/// Checks a build file's bytes. The first failing check decides the error.
pub fn validate(
    file_name: &str,
    bytes: &[u8],
    known_ship_types: &[String],
) -> BuildResult<BuildFile> {
    let build = check_envelope(file_name, bytes)?;
    check_ship_type(&build, known_ship_types)?;
    Ok(build)
}

/// Validates a build file, switches `platform` to its ship type and decodes
/// its grid.
pub async fn load<S, F>(
    file_name: &str,
    bytes: &[u8],
    catalog: &Catalog<S>,
    platform: &mut PlatformSelection,
    on_colors: F,
) -> BuildResult<Grid>
where
    S: CatalogSource,
    F: FnOnce(BTreeMap<String, String>),
{
    let build = check_envelope(file_name, bytes)?;
    let known = catalog.ship_type_keys().await?;
    check_ship_type(&build, &known)?;

    platform.select(&build.ship_type);

    let grid = codec::deserialize(&build.serialized, &build.ship_type, catalog, on_colors)
        .await
        .ok_or(BuildFileError::Decode)?;

    info!(
        "📂 Loaded build '{}' ({}x{}, {})",
        build.name, grid.width, grid.height, build.ship_type
    );
    Ok(grid)
}

/// [`load`] for a file on disk. Reads at most one byte more than
/// `MAX_BUILD_FILE_SIZE`.
pub async fn load_from_path<S, F>(
    path: &Path,
    catalog: &Catalog<S>,
    platform: &mut PlatformSelection,
    on_colors: F,
) -> BuildResult<Grid>
where
    S: CatalogSource,
    F: FnOnce(BTreeMap<String, String>),
{
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // One byte past the cap is enough for the size check to fail.
    let mut bytes = Vec::new();
    fs::File::open(path)?
        .take(MAX_BUILD_FILE_SIZE + 1)
        .read_to_end(&mut bytes)?;
    load(&file_name, &bytes, catalog, platform, on_colors).await
}
