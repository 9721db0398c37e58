use dataset::Dataset;

use crate::{
    geo::{parse_boundaries, parse_coordinates},
    models::{FarmRecord, FarmerCount, FarmerRecord},
};

pub const UNSPECIFIED_LOCATION: &str = "Location not specified";

pub fn farmer_records(dataset: &Dataset) -> Vec<FarmerRecord> {
    dataset
        .farmers()
        .map(|row| FarmerRecord {
            farmer_id: row.farmer_id,
            first_name: row.first_name.trimmed(),
            last_name: row.last_name.trimmed(),
            farmer_image_url: row.farmer_image_url.text(),
            nationality: row.nationality.trimmed(),
            farm_location: row.farm_location.trimmed(),
            crop_name: row.crop_name.trimmed(),
            variety: row.variety.trimmed(),
        })
        .collect()
}

pub fn farm_records(dataset: &Dataset) -> Vec<FarmRecord> {
    dataset
        .rows()
        .iter()
        .map(|row| FarmRecord {
            farm_id: row.farm_id,
            farmer_id: row.farmer_id,
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            farm_number: row.farm_number.or_text(""),
            farm_location: row.farm_location.or_text(UNSPECIFIED_LOCATION),
            crop_name: row.crop_name.or_text(""),
            variety: row.variety.or_text(""),
            geo_coordinates: parse_coordinates(row.geo_coordinates.text().as_deref()),
            geo_boundaries: parse_boundaries(row.geo_boundaries.text().as_deref()),
            acreage: row.acreage.or_text(""),
        })
        .collect()
}

pub fn farmer_count(dataset: &Dataset) -> FarmerCount {
    FarmerCount::new(dataset.farmer_count())
}
