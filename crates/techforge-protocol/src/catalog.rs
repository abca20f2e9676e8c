use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub adjacency: Option<String>,
    #[serde(default)]
    pub adjacency_bonus: f64,
    #[serde(default)]
    pub sc_eligible: bool,
    #[serde(default, rename = "type")]
    pub module_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechTreeItem {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub module_count: usize,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub tech_type: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

fn default_active() -> bool {
    true
}

/// One slot of a recommended layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutCell {
    #[serde(default)]
    pub tech: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub supercharged: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub adjacency_bonus: f64,
}

/// A curated layout for a ship type. `None` slots are empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedBuild {
    pub title: String,
    pub layout: Vec<Vec<Option<LayoutCell>>>,
}

/// One slot of a ship's starting grid. The module is named by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionCell {
    #[serde(default)]
    pub tech: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub supercharged: bool,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Starting grid of a ship type, and which parts of it the user may edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridDefinition {
    pub grid: Vec<Vec<Option<DefinitionCell>>>,
    #[serde(default, rename = "gridFixed")]
    pub grid_fixed: bool,
    #[serde(default, rename = "superchargedFixed")]
    pub supercharged_fixed: bool,
}

/// Per ship type reference data: category name -> technologies.
///
/// The served JSON mixes categories with a grid definition and a list of
/// recommended builds. Malformed recommended builds are skipped one by one;
/// anything else that doesn't look like a list of technologies is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TechTree {
    #[serde(flatten)]
    pub categories: BTreeMap<String, Vec<TechTreeItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_definition: Option<GridDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommended_builds: Vec<RecommendedBuild>,
}

impl<'de> Deserialize<'de> for TechTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut tree = TechTree::default();

        for (key, value) in raw {
            match key.as_str() {
                "grid_definition" => tree.grid_definition = serde_json::from_value(value).ok(),
                "recommended_builds" => {
                    if let serde_json::Value::Array(builds) = value {
                        tree.recommended_builds = builds
                            .into_iter()
                            .filter_map(|b| serde_json::from_value(b).ok())
                            .collect();
                    }
                }
                _ => {
                    if let Ok(items) = serde_json::from_value::<Vec<TechTreeItem>>(value) {
                        tree.categories.insert(key, items);
                    }
                }
            }
        }

        Ok(tree)
    }
}

impl TechTree {
    pub fn technologies(&self) -> impl Iterator<Item = &TechTreeItem> {
        self.categories.values().flatten()
    }

    pub fn tech(&self, key: &str) -> Option<&TechTreeItem> {
        self.technologies().find(|t| t.key == key)
    }

    pub fn module(&self, tech: &str, module_id: &str) -> Option<&Module> {
        self.tech(tech)?.modules.iter().find(|m| m.id == module_id)
    }

    /// `{tech key: color}` for every technology in the tree.
    pub fn colors(&self) -> BTreeMap<String, String> {
        self.technologies()
            .map(|t| (t.key.clone(), t.color.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipTypeDetail {
    pub label: String,
    #[serde(default, rename = "type")]
    pub ship_class: String,
}

pub type ShipTypes = BTreeMap<String, ShipTypeDetail>;
