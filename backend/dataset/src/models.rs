use std::fmt;

use serde::Serialize;

pub const FIRST_NAME: &str = "first_name";
pub const LAST_NAME: &str = "last_name";
pub const FARMER_IMAGE_URL: &str = "farmer_image_url";
pub const NATIONALITY: &str = "nationality";
pub const FARM_LOCATION: &str = "farm_location";
pub const CROP_NAME: &str = "crop_name";
pub const VARIETY: &str = "variety";
pub const FARM_NUMBER: &str = "farm_number";
pub const GEO_COORDINATES: &str = "geo_coordinates";
pub const GEO_BOUNDARIES: &str = "geo_boundaries";
pub const ACREAGE: &str = "acreage";

/// Columns every dataset must carry, in [`Row`] field order.
pub const COLUMNS: [&str; 11] = [
    FIRST_NAME,
    LAST_NAME,
    FARMER_IMAGE_URL,
    NATIONALITY,
    FARM_LOCATION,
    CROP_NAME,
    VARIETY,
    FARM_NUMBER,
    GEO_COORDINATES,
    GEO_BOUNDARIES,
    ACREAGE,
];

/// Cells read as missing, in addition to empty ones. Same set a typed table
/// reader treats as NA by default.
pub const NA_MARKERS: [&str; 18] = [
    "NA", "N/A", "n/a", "NaN", "-NaN", "nan", "-nan", "null", "NULL", "#N/A", "#N/A N/A", "#NA",
    "<NA>", "None", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// One typed value from the source table.
///
/// Serializes untagged: numbers as JSON numbers, text as strings and
/// [`Cell::Missing`] as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Text rendering of a present cell, `None` when missing.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            Cell::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Trimmed text, empty when missing.
    pub fn trimmed(&self) -> String {
        self.text()
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    /// Replaces a missing cell with `default`, leaving present values untouched.
    pub fn or_text(&self, default: &str) -> Cell {
        match self {
            Cell::Missing => Cell::Text(default.to_string()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Integer(v) => write!(f, "{v}"),
            // whole floats keep their trailing `.0`, as the table stores them
            Cell::Float(v) if v.fract() == 0.0 && v.abs() < 1e16 => write!(f, "{v:.1}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// One source record with its derived identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub farm_id: usize,
    pub farmer_id: usize,
    pub first_name: Cell,
    pub last_name: Cell,
    pub farmer_image_url: Cell,
    pub nationality: Cell,
    pub farm_location: Cell,
    pub crop_name: Cell,
    pub variety: Cell,
    pub farm_number: Cell,
    pub geo_coordinates: Cell,
    pub geo_boundaries: Cell,
    pub acreage: Cell,
}

impl Row {
    /// Grouping key for farmer identity. Missing names group as empty.
    pub fn name_key(&self) -> (String, String) {
        (
            self.first_name.text().unwrap_or_default(),
            self.last_name.text().unwrap_or_default(),
        )
    }
}
