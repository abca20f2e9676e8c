use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Extension of saved builds, without the dot.
pub const BUILD_FILE_EXTENSION: &str = "nms";

/// Builds are a few KB; anything near this is not one of ours.
pub const MAX_BUILD_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A saved grid: the serialized grid string plus metadata, checksummed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BuildFile {
    pub name: String,
    #[serde(rename = "shipType")]
    pub ship_type: String,
    pub serialized: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub checksum: String,
}

impl BuildFile {
    pub fn new(name: String, ship_type: String, serialized: String, timestamp: i64) -> Self {
        let checksum = checksum_of(&serialized);
        Self {
            name,
            ship_type,
            serialized,
            timestamp,
            checksum,
        }
    }

    pub fn verify_checksum(&self) -> bool {
        checksum_of(&self.serialized) == self.checksum
    }
}

/// Lowercase hex SHA-256 of the serialized grid.
pub fn checksum_of(serialized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_vector() {
        assert_eq!(
            checksum_of("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_field_names_on_the_wire() {
        let file = BuildFile::new("My Build".into(), "standard".into(), "106|F60|T60".into(), 1);
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["shipType"], "standard");
        assert!(json.get("ship_type").is_none());
        assert!(file.verify_checksum());
    }
}
