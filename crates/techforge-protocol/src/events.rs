use crate::grid::Grid;
use serde::{Deserialize, Serialize};

pub const CONNECT_ERROR: &str = "connect_error";
pub const DISCONNECT: &str = "disconnect";

pub const OPTIMIZE: &str = "optimize";
pub const PROGRESS: &str = "progress";
pub const OPTIMIZATION_RESULT: &str = "optimization_result";

/// Reported by the fast pattern solver when it could not place a technology.
pub const PATTERN_NO_FIT: &str = "Pattern No Fit";

/// One line on the solver channel.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
            id: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Responses without an id are broadcast replies and match any waiter.
    pub fn answers(&self, event: &str, request_id: u64) -> bool {
        self.event == event && self.id.map_or(true, |id| id == request_id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OptimizeRequest {
    pub ship: String,
    pub tech: String,
    pub available_modules: Vec<String>,
    pub grid: Grid,
    pub forced: bool,
    pub send_grid_updates: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solve_type: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProgressUpdate {
    pub progress_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_grid: Option<Grid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OptimizationResult {
    pub solve_method: String,
    /// Absent when the solver gave up on placement.
    #[serde(default)]
    pub grid: Option<Grid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bonus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved_bonus: Option<f64>,
}

impl OptimizationResult {
    /// Structural check of an untrusted `optimization_result` payload.
    ///
    /// `solve_method` must be a string, `grid` must be null or a well-formed
    /// grid, and the bonus fields must be numbers when they are present.
    pub fn validate(data: &serde_json::Value) -> Option<Self> {
        let obj = data.as_object()?;
        if !obj.get("solve_method")?.is_string() {
            return None;
        }
        let grid = obj.get("grid")?;
        if !(grid.is_null() || grid.is_object()) {
            return None;
        }
        for field in ["max_bonus", "solved_bonus"] {
            if let Some(v) = obj.get(field) {
                if !v.is_number() {
                    return None;
                }
            }
        }

        let result: OptimizationResult = serde_json::from_value(data.clone()).ok()?;
        if let Some(grid) = &result.grid {
            if !grid.is_well_formed() {
                return None;
            }
        }
        Some(result)
    }

    pub fn is_pattern_no_fit(&self) -> bool {
        self.solve_method == PATTERN_NO_FIT
    }
}
