use dataset::Cell;
use serde::Serialize;

use crate::geo::Point;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmerRecord {
    pub farmer_id: usize,
    pub first_name: String,
    pub last_name: String,
    pub farmer_image_url: Option<String>,
    pub nationality: String,
    pub farm_location: String,
    pub crop_name: String,
    pub variety: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmRecord {
    pub farm_id: usize,
    pub farmer_id: usize,
    pub first_name: Cell,
    pub last_name: Cell,
    pub farm_number: Cell,
    pub farm_location: Cell,
    pub crop_name: Cell,
    pub variety: Cell,
    pub geo_coordinates: Point,
    pub geo_boundaries: Vec<Point>,
    pub acreage: Cell,
}

/// Certification counts are not tracked in the dataset and stay at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerCount {
    pub total_farmers: usize,
    pub usda_certified_count: usize,
    pub global_gap_certified_count: usize,
}

impl FarmerCount {
    pub fn new(total_farmers: usize) -> Self {
        Self {
            total_farmers,
            usda_certified_count: 0,
            global_gap_certified_count: 0,
        }
    }
}
