//! # Geo Fields
//!
//! Decoding of the two location columns.
//!
//! ## Formats
//!
//! - `geo_coordinates`: `"lat lon"` pairs separated by commas, only the first pair is used
//! - `geo_boundaries`: `"lat lon"` pairs separated by commas, `NA` segments are placeholders
//!
//! ## Failures
//!
//! A bad field never fails a request. Coordinates fall back to [`Point::default`],
//! boundaries to an empty polygon. The tagged results keep missing and malformed
//! input apart for logging only.
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_LATITUDE: f64 = 6.11;
pub const DEFAULT_LONGITUDE: f64 = -0.11;

/// Fewest vertices that still describe an area.
pub const MIN_POLYGON_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
    Parsed(Point),
    Missing,
    Malformed,
}

impl Coordinates {
    pub fn point(self) -> Point {
        match self {
            Coordinates::Parsed(point) => point,
            Coordinates::Missing | Coordinates::Malformed => Point::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Polygon { points: Vec<Point>, skipped: usize },
    Missing,
    TooFewPoints { parsed: usize, skipped: usize },
}

impl Boundary {
    pub fn points(self) -> Vec<Point> {
        match self {
            Boundary::Polygon { points, .. } => points,
            Boundary::Missing | Boundary::TooFewPoints { .. } => Vec::new(),
        }
    }
}

pub fn read_coordinates(raw: Option<&str>) -> Coordinates {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Coordinates::Missing;
    };

    let first = raw.split(',').next().unwrap_or_default();

    match parse_pair(first) {
        Some(point) => Coordinates::Parsed(point),
        None => Coordinates::Malformed,
    }
}

pub fn read_boundaries(raw: Option<&str>) -> Boundary {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Boundary::Missing;
    };

    let mut points = Vec::new();
    let mut skipped = 0;

    for segment in raw.split(',').map(str::trim) {
        if segment.is_empty() || segment == "NA" {
            continue;
        }

        match parse_pair(segment) {
            Some(point) => points.push(point),
            None => skipped += 1,
        }
    }

    if points.len() >= MIN_POLYGON_POINTS {
        Boundary::Polygon { points, skipped }
    } else {
        Boundary::TooFewPoints {
            parsed: points.len(),
            skipped,
        }
    }
}

/// First point of `raw`, or the default point when missing or malformed.
pub fn parse_coordinates(raw: Option<&str>) -> Point {
    let coordinates = read_coordinates(raw);

    if coordinates == Coordinates::Malformed {
        debug!("Malformed coordinates {raw:?}, using default");
    }

    coordinates.point()
}

/// Polygon vertices of `raw`, empty unless at least three pairs parse.
pub fn parse_boundaries(raw: Option<&str>) -> Vec<Point> {
    let boundary = read_boundaries(raw);

    match &boundary {
        Boundary::Polygon { skipped, .. } if *skipped > 0 => {
            debug!("Dropped {skipped} malformed boundary segments in {raw:?}");
        }
        Boundary::TooFewPoints { parsed, skipped } => {
            debug!("Boundary {raw:?} has {parsed} valid points ({skipped} malformed), ignoring");
        }
        _ => {}
    }

    boundary.points()
}

fn parse_pair(segment: &str) -> Option<Point> {
    let mut tokens = segment.split_whitespace();

    let (Some(latitude), Some(longitude), None) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return None;
    };

    Some(Point::new(parse_float(latitude)?, parse_float(longitude)?))
}

fn parse_float(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}
