//! GeoJSON shapes stored on farms (point) and fields (boundary).

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use validator::ValidationError;

/// GeoJSON `Point` as `[longitude, latitude]`.
///
/// The incoming `type` member is ignored and always written back as `"Point"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoPoint {
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            coordinates: vec![longitude, latitude],
        }
    }
}

impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GeoPoint", 2)?;
        state.serialize_field("type", "Point")?;
        state.serialize_field("coordinates", &self.coordinates)?;
        state.end()
    }
}

/// GeoJSON `Polygon` or `MultiPolygon` outlining a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Boundary {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
}

fn geo_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn position_is_valid(position: &[f64]) -> bool {
    match position {
        [lon, lat] => {
            lon.is_finite()
                && lat.is_finite()
                && (-180.0..=180.0).contains(lon)
                && (-90.0..=90.0).contains(lat)
        }
        _ => false,
    }
}

pub fn validate_point(point: &GeoPoint) -> Result<(), ValidationError> {
    if position_is_valid(&point.coordinates) {
        Ok(())
    } else {
        Err(geo_error(
            "geo_point",
            "location must be a Point with [longitude, latitude] inside [-180, 180] x [-90, 90]",
        ))
    }
}

fn validate_polygon(rings: &[Vec<Vec<f64>>]) -> Result<(), ValidationError> {
    if rings.is_empty() {
        return Err(geo_error("geo_polygon", "polygon needs at least one linear ring"));
    }
    for ring in rings {
        if ring.len() < 4 {
            return Err(geo_error(
                "geo_polygon",
                "every linear ring needs at least four positions",
            ));
        }
        if ring.first() != ring.last() {
            return Err(geo_error(
                "geo_polygon",
                "every linear ring must start and end at the same position",
            ));
        }
        if !ring.iter().all(|p| position_is_valid(p)) {
            return Err(geo_error(
                "geo_polygon",
                "polygon positions must be [longitude, latitude] inside [-180, 180] x [-90, 90]",
            ));
        }
    }
    Ok(())
}

pub fn validate_boundary(boundary: &Boundary) -> Result<(), ValidationError> {
    match boundary {
        Boundary::Polygon { coordinates } => validate_polygon(coordinates),
        Boundary::MultiPolygon { coordinates } => {
            if coordinates.is_empty() {
                return Err(geo_error(
                    "geo_multipolygon",
                    "multipolygon needs at least one polygon",
                ));
            }
            coordinates.iter().try_for_each(|p| validate_polygon(p))
        }
    }
}
