//! Text encoding of a [`Grid`] for share URLs and build files.
//!
//! Six sections joined by `|`:
//!
//! ```text
//! <width><height> | sc bitmap | active bitmap | tech-code grid | key:code,... | id:code,...
//! ```
//!
//! The three grid sections are RLE compressed. Every tech and module referenced
//! by the grid gets a code from [`CODE_ALPHABET`]; a cell's token is its tech
//! code followed by its module code, with [`EMPTY`] standing in for an absent
//! part.

use crate::cache::Catalog;
use crate::catalog::TechTree;
use crate::error::CodecError;
use crate::grid::{Cell, Grid};
use crate::rle;
use crate::source::CatalogSource;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, warn};

/// Largest grid a serialized string may describe.
pub const MAX_CELLS: usize = 10_000;

/// Code symbols. Digits are left out so codes survive RLE.
pub const CODE_ALPHABET: &[u8; 52] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Filler for an absent tech or module code.
pub const EMPTY: char = '.';

const SECTION_SEP: char = '|';
const ENTRY_SEP: char = ',';
const PAIR_SEP: char = ':';
const SECTION_COUNT: usize = 6;

/// A cell as the text format describes it, before catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCell {
    pub supercharged: bool,
    pub active: bool,
    pub tech: Option<String>,
    pub module: Option<String>,
}

/// Structurally valid content of a serialized grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedGrid {
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` entries.
    pub cells: Vec<EncodedCell>,
    /// Tech legend keys in code order.
    pub techs: Vec<String>,
}

/// Smallest code width able to name `count` entries.
fn code_width(count: usize) -> usize {
    let base = CODE_ALPHABET.len();
    let mut width = 1;
    let mut capacity = base;
    while capacity < count {
        width += 1;
        capacity = capacity.saturating_mul(base);
    }
    width
}

/// Fixed-width code for the `index`-th entry.
fn code_for(mut index: usize, width: usize) -> String {
    let base = CODE_ALPHABET.len();
    let mut code = vec![CODE_ALPHABET[0]; width];
    for slot in code.iter_mut().rev() {
        *slot = CODE_ALPHABET[index % base];
        index /= base;
    }
    code.into_iter().map(char::from).collect()
}

/// First-seen ordered set of legend entries.
#[derive(Default)]
struct Legend {
    keys: Vec<String>,
    index: HashMap<String, usize>,
}

impl Legend {
    fn insert(&mut self, key: &str) -> Result<(), CodecError> {
        if self.index.contains_key(key) {
            return Ok(());
        }
        if !is_encodable(key) {
            return Err(CodecError::ReservedCharacter(key.to_string()));
        }
        self.index.insert(key.to_string(), self.keys.len());
        self.keys.push(key.to_string());
        Ok(())
    }

    fn width(&self) -> usize {
        code_width(self.keys.len())
    }

    fn code(&self, key: &str) -> Option<String> {
        self.index.get(key).map(|&i| code_for(i, self.width()))
    }

    fn render(&self) -> String {
        let width = self.width();
        self.keys
            .iter()
            .enumerate()
            .map(|(i, key)| format!("{key}{PAIR_SEP}{}", code_for(i, width)))
            .collect::<Vec<_>>()
            .join(&ENTRY_SEP.to_string())
    }
}

fn is_encodable(key: &str) -> bool {
    !key.is_empty() && !key.contains([SECTION_SEP, ENTRY_SEP, PAIR_SEP])
}

fn bitmap<'a>(cells: impl Iterator<Item = &'a Cell>, flag: impl Fn(&Cell) -> bool) -> String {
    cells.map(|c| if flag(c) { 'T' } else { 'F' }).collect()
}

/// Encodes `grid` into its text form.
pub fn serialize(grid: &Grid) -> Result<String, CodecError> {
    if !grid.is_well_formed() {
        return Err(CodecError::MalformedGrid {
            width: grid.width,
            height: grid.height,
        });
    }
    let cell_count = grid.width * grid.height;
    if cell_count == 0 || cell_count > MAX_CELLS {
        return Err(CodecError::BadSize { max: MAX_CELLS });
    }

    let mut techs = Legend::default();
    let mut modules = Legend::default();
    for cell in grid.iter_cells() {
        if let Some(tech) = &cell.tech {
            techs.insert(tech)?;
            if let Some(module) = &cell.module {
                modules.insert(module)?;
            }
        }
    }

    let tech_blank = EMPTY.to_string().repeat(techs.width());
    let module_blank = EMPTY.to_string().repeat(modules.width());
    let mut tokens = String::with_capacity(cell_count * (techs.width() + modules.width()));
    for cell in grid.iter_cells() {
        match &cell.tech {
            Some(tech) => {
                tokens.push_str(&techs.code(tech).unwrap_or_else(|| tech_blank.clone()));
                match cell.module.as_deref().and_then(|m| modules.code(m)) {
                    Some(code) => tokens.push_str(&code),
                    None => tokens.push_str(&module_blank),
                }
            }
            None => {
                tokens.push_str(&tech_blank);
                tokens.push_str(&module_blank);
            }
        }
    }

    let sections = [
        format!("{}{}", grid.width, grid.height),
        rle::compress(&bitmap(grid.iter_cells(), |c| c.supercharged)),
        rle::compress(&bitmap(grid.iter_cells(), |c| c.active)),
        rle::compress(&tokens),
        techs.render(),
        modules.render(),
    ];

    debug!(
        "Serialized {}x{} grid with {} techs and {} modules",
        grid.width,
        grid.height,
        techs.keys.len(),
        modules.keys.len()
    );
    Ok(sections.join(&SECTION_SEP.to_string()))
}

fn parse_bitmap(section: &str, limit: usize) -> Option<Vec<bool>> {
    rle::decompress_bounded(section, limit)?
        .chars()
        .map(|c| match c {
            'T' => Some(true),
            'F' => Some(false),
            _ => None,
        })
        .collect()
}

fn parse_dimension(digits: &str) -> Option<usize> {
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    digits.parse().ok().filter(|&n| n > 0)
}

/// Splits the concatenated `<width><height>` so that the product matches the
/// cell count. The first split from the left wins.
fn parse_dimensions(section: &str, cell_count: usize) -> Option<(usize, usize)> {
    if section.len() < 2 || !section.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    (1..section.len()).find_map(|split| {
        let width = parse_dimension(&section[..split])?;
        let height = parse_dimension(&section[split..])?;
        (width.checked_mul(height)? == cell_count).then_some((width, height))
    })
}

/// Parses `key:code,...`. Returns the keys in legend order, a code lookup and
/// the shared code width.
fn parse_legend(section: &str) -> Option<(Vec<String>, HashMap<String, String>, usize)> {
    let mut keys = Vec::new();
    let mut by_code = HashMap::new();
    if section.is_empty() {
        return Some((keys, by_code, 1));
    }

    let mut width = None;
    for entry in section.split(ENTRY_SEP) {
        let (key, code) = entry.split_once(PAIR_SEP)?;
        if key.is_empty()
            || code.is_empty()
            || !code.bytes().all(|b| CODE_ALPHABET.contains(&b))
        {
            return None;
        }
        if *width.get_or_insert(code.len()) != code.len() {
            return None;
        }
        if by_code.insert(code.to_string(), key.to_string()).is_some() {
            return None;
        }
        keys.push(key.to_string());
    }

    Some((keys, by_code, width.unwrap_or(1)))
}

fn is_blank(part: &str) -> bool {
    part.chars().all(|c| c == EMPTY)
}

/// Structural decode. Any malformed section yields `None`.
pub fn parse(serialized: &str) -> Option<EncodedGrid> {
    let sections: Vec<&str> = serialized.split(SECTION_SEP).collect();
    if sections.len() != SECTION_COUNT {
        warn!(
            "Grid string has {} sections, expected {}",
            sections.len(),
            SECTION_COUNT
        );
        return None;
    }

    let supercharged = parse_bitmap(sections[1], MAX_CELLS)?;
    let cell_count = supercharged.len();
    let (width, height) = parse_dimensions(sections[0], cell_count)?;

    let active = parse_bitmap(sections[2], cell_count)?;
    if active.len() != cell_count {
        return None;
    }

    let (techs, tech_codes, tech_width) = parse_legend(sections[4])?;
    let (_, module_codes, module_width) = parse_legend(sections[5])?;
    let token_width = tech_width + module_width;

    let tokens = rle::decompress_bounded(sections[3], cell_count.checked_mul(token_width)?)?;
    if !tokens.is_ascii() || tokens.len() != cell_count * token_width {
        return None;
    }

    let mut cells = Vec::with_capacity(cell_count);
    for (i, token) in tokens.as_bytes().chunks(token_width).enumerate() {
        // ASCII checked above, so byte offsets are char boundaries.
        let token = std::str::from_utf8(token).ok()?;
        let (tech_part, module_part) = token.split_at(tech_width);

        let (tech, module) = if is_blank(tech_part) {
            (None, None)
        } else {
            let tech = tech_codes.get(tech_part)?.clone();
            let module = if is_blank(module_part) {
                None
            } else {
                Some(module_codes.get(module_part)?.clone())
            };
            (Some(tech), module)
        };

        cells.push(EncodedCell {
            supercharged: supercharged[i],
            active: active[i],
            tech,
            module,
        });
    }

    Some(EncodedGrid {
        width,
        height,
        cells,
        techs,
    })
}

/// Builds the grid from parsed content using `tree` for display fields, and
/// collects `{tech: color}` for legend techs the tree knows.
pub fn resolve(encoded: &EncodedGrid, tree: &TechTree) -> (Grid, BTreeMap<String, String>) {
    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(encoded.height);

    for row in encoded.cells.chunks(encoded.width) {
        let resolved = row
            .iter()
            .map(|enc| resolve_cell(enc, tree))
            .collect();
        rows.push(resolved);
    }

    let colors = encoded
        .techs
        .iter()
        .filter_map(|key| tree.tech(key).map(|item| (key.clone(), item.color.clone())))
        .collect();

    let grid = Grid {
        cells: rows,
        width: encoded.width,
        height: encoded.height,
    };
    (grid, colors)
}

pub(crate) fn resolve_cell(enc: &EncodedCell, tree: &TechTree) -> Cell {
    let Some(tech) = enc.tech.as_deref() else {
        return Cell::empty(enc.supercharged, enc.active);
    };

    if tree.tech(tech).is_none() {
        warn!("⚠️ Unknown tech '{}' in grid, leaving cell empty", tech);
        return Cell::empty(enc.supercharged, enc.active);
    }

    match enc.module.as_deref() {
        Some(module_id) => match tree.module(tech, module_id) {
            Some(module) => Cell::placed(tech, module, enc.supercharged, enc.active),
            None => {
                warn!(
                    "⚠️ Unknown module '{}' for tech '{}', leaving cell empty",
                    module_id, tech
                );
                Cell::empty(enc.supercharged, enc.active)
            }
        },
        None => Cell {
            tech: Some(tech.to_string()),
            ..Cell::empty(enc.supercharged, enc.active)
        },
    }
}

/// Decodes `serialized` against the tech tree of `ship_type`.
///
/// Returns `None` when the string is malformed or the tree can't be fetched.
/// `on_colors` receives the tech colors once the grid is resolved.
pub async fn deserialize<S, F>(
    serialized: &str,
    ship_type: &str,
    catalog: &Catalog<S>,
    on_colors: F,
) -> Option<Grid>
where
    S: CatalogSource,
    F: FnOnce(BTreeMap<String, String>),
{
    if serialized.is_empty() {
        warn!("No serialized grid data found, skipping");
        return None;
    }

    let Some(encoded) = parse(serialized) else {
        error!("❌ Invalid serialized grid, skipping");
        return None;
    };

    let tree = match catalog.tech_tree(ship_type).await {
        Ok(tree) => tree,
        Err(e) => {
            error!("❌ Could not fetch tech tree for '{}': {}", ship_type, e);
            return None;
        }
    };

    let (grid, colors) = resolve(&encoded, &tree);
    on_colors(colors);
    Some(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_width_grows_with_count() {
        assert_eq!(code_width(0), 1);
        assert_eq!(code_width(52), 1);
        assert_eq!(code_width(53), 2);
        assert_eq!(code_width(52 * 52), 2);
        assert_eq!(code_width(52 * 52 + 1), 3);
    }

    #[test]
    fn test_codes_are_fixed_width_and_ordered() {
        assert_eq!(code_for(0, 1), "A");
        assert_eq!(code_for(25, 1), "Z");
        assert_eq!(code_for(26, 1), "a");
        assert_eq!(code_for(51, 1), "z");
        assert_eq!(code_for(0, 2), "AA");
        assert_eq!(code_for(53, 2), "BB");
    }

    #[test]
    fn test_dimensions_follow_cell_count() {
        assert_eq!(parse_dimensions("106", 60), Some((10, 6)));
        assert_eq!(parse_dimensions("1010", 100), Some((10, 10)));
        assert_eq!(parse_dimensions("111", 11), Some((1, 11)));
        assert_eq!(parse_dimensions("105", 50), Some((10, 5)));
        assert_eq!(parse_dimensions("010", 10), None);
        assert_eq!(parse_dimensions("1x", 1), None);
        assert_eq!(parse_dimensions("7", 7), None);
    }

    #[test]
    fn test_legend_parsing() {
        let (keys, codes, width) = parse_legend("shield:A,hyper:B").unwrap();
        assert_eq!(keys, vec!["shield", "hyper"]);
        assert_eq!(codes["B"], "hyper");
        assert_eq!(width, 1);

        assert_eq!(parse_legend("").unwrap().2, 1);
        assert!(parse_legend("shield").is_none());
        assert!(parse_legend("shield:A,hyper:BB").is_none());
        assert!(parse_legend("shield:A,hyper:A").is_none());
        assert!(parse_legend("shield:1").is_none());
        assert!(parse_legend(":A").is_none());
    }
}
