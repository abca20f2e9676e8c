use tracing::info;

pub const DEFAULT_SHIP_TYPE: &str = "standard";

/// The ship type whose tech tree the current grid belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSelection {
    selected: String,
}

impl Default for PlatformSelection {
    fn default() -> Self {
        Self::new(DEFAULT_SHIP_TYPE)
    }
}

impl PlatformSelection {
    pub fn new(ship_type: &str) -> Self {
        Self {
            selected: ship_type.to_string(),
        }
    }

    pub fn current(&self) -> &str {
        &self.selected
    }

    /// Switches to `ship_type`. Returns whether the selection changed.
    pub fn select(&mut self, ship_type: &str) -> bool {
        if self.selected == ship_type {
            return false;
        }
        info!("🚀 Platform: '{}' -> '{}'", self.selected, ship_type);
        self.selected = ship_type.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_reports_change() {
        let mut platform = PlatformSelection::default();
        assert_eq!(platform.current(), "standard");
        assert!(platform.select("freighter"));
        assert!(!platform.select("freighter"));
        assert_eq!(platform.current(), "freighter");
    }
}
