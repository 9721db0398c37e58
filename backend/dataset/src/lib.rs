//! # Dataset
//!
//! Farmer/farm table pulled from object storage.
//!
//! ## Source
//!
//! - One comma-separated file with a header row, one farm per record
//! - A farmer appears once per farm they own, identified only by first and last name
//! - Columns beyond [`models::COLUMNS`] are ignored
//!
//! ## Identifiers
//!
//! Neither identifier is stored in the file, both are derived on load.
//!
//! - `farm_id`: position of the record in the file, starting at 0
//! - `farmer_id`: index of the (first name, last name) pair in first-seen order
//!
//! Both depend only on record order, so the same file always yields the same ids.
//!
//! ## Typing
//!
//! Cells are typed per column. A column where every present value is numeric
//! is read as numbers, integers only when nothing in the column is missing.
//! Everything else is text. Empty cells and the usual NA markers are missing.
use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

pub mod error;
pub mod models;
pub mod remote;

pub use error::DatasetError;
pub use models::{Cell, Row};
pub use remote::{ObjectLocation, ObjectStore, load_remote};

use models::{COLUMNS, NA_MARKERS};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Row>,
    farmer_count: usize,
}

impl Dataset {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatasetError> {
        Self::parse(std::str::from_utf8(bytes)?)
    }

    /// Parses a CSV table with a header row.
    ///
    /// Every column in [`COLUMNS`] must be present, a table missing any of them is
    /// rejected as a whole, even if a caller only reads the name columns.
    pub fn parse(text: &str) -> Result<Self, DatasetError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let indices = column_indices(&headers)?;

        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); COLUMNS.len()];
        for (record_index, record) in reader.records().enumerate() {
            let record = record?;

            if record.len() > headers.len() {
                return Err(DatasetError::TooManyFields {
                    record: record_index,
                    found: record.len(),
                    expected: headers.len(),
                });
            }

            for (column, &index) in indices.iter().enumerate() {
                // short records are padded with missing cells
                raw[column].push(record.get(index).and_then(present).map(str::to_string));
            }
        }

        let mut columns: Vec<Vec<Cell>> = raw.into_iter().map(infer_column).collect();
        let row_count = columns.first().map_or(0, Vec::len);

        let mut rows = Vec::with_capacity(row_count);
        for i in 0..row_count {
            let mut take = |column: usize| std::mem::take(&mut columns[column][i]);

            rows.push(Row {
                farm_id: 0,
                farmer_id: 0,
                first_name: take(0),
                last_name: take(1),
                farmer_image_url: take(2),
                nationality: take(3),
                farm_location: take(4),
                crop_name: take(5),
                variety: take(6),
                farm_number: take(7),
                geo_coordinates: take(8),
                geo_boundaries: take(9),
                acreage: take(10),
            });
        }

        let farmer_count = assign_ids(&mut rows);
        debug!("Parsed {} rows, {} farmers", rows.len(), farmer_count);

        Ok(Self { rows, farmer_count })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct (first name, last name) pairs.
    pub fn farmer_count(&self) -> usize {
        self.farmer_count
    }

    /// First row of every farmer, in `farmer_id` order.
    pub fn farmers(&self) -> impl Iterator<Item = &Row> {
        let mut next = 0;

        self.rows.iter().filter(move |row| {
            let first = row.farmer_id == next;
            if first {
                next += 1;
            }
            first
        })
    }
}

fn column_indices(headers: &StringRecord) -> Result<[usize; COLUMNS.len()], DatasetError> {
    let mut indices = [0; COLUMNS.len()];

    for (slot, name) in indices.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|header| header == name)
            .ok_or(DatasetError::MissingColumn(name))?;
    }

    Ok(indices)
}

fn present(raw: &str) -> Option<&str> {
    if raw.is_empty() || NA_MARKERS.contains(&raw) {
        None
    } else {
        Some(raw)
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn infer_column(values: Vec<Option<String>>) -> Vec<Cell> {
    let has_missing = values.iter().any(Option::is_none);
    let mut present_values = values.iter().flatten().peekable();

    if present_values.peek().is_none() {
        return vec![Cell::Missing; values.len()];
    }

    if !has_missing && values.iter().flatten().all(|v| v.parse::<i64>().is_ok()) {
        return values
            .into_iter()
            .map(|v| v.and_then(|s| s.parse().ok()).map_or(Cell::Missing, Cell::Integer))
            .collect();
    }

    if values.iter().flatten().all(|v| parse_float(v).is_some()) {
        return values
            .into_iter()
            .map(|v| v.and_then(|s| parse_float(&s)).map_or(Cell::Missing, Cell::Float))
            .collect();
    }

    values
        .into_iter()
        .map(|v| v.map_or(Cell::Missing, Cell::Text))
        .collect()
}

fn assign_ids(rows: &mut [Row]) -> usize {
    let mut farmers: HashMap<(String, String), usize> = HashMap::new();

    for (farm_id, row) in rows.iter_mut().enumerate() {
        let next = farmers.len();

        row.farm_id = farm_id;
        row.farmer_id = *farmers.entry(row.name_key()).or_insert(next);
    }

    farmers.len()
}
