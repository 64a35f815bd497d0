//! Dual-datum point spatialization.
//!
//! Valid rows are split by the latitude-magnitude heuristic into a
//! geographic (WGS84) group and a projected (UTM NAD83 zone 12) group, each
//! is reprojected to Web Mercator, and the groups are recombined with
//! geographic rows first. Rows missing either coordinate never advance past
//! this stage; they come back verbatim in the outcome's report.

use geo::Point;
use lead_map_source_models::ServiceLineRecord;
use lead_map_spatial::{
    CoordinateSystem, ProjectionError, utm12n_to_web_mercator, wgs84_to_web_mercator,
};

/// A service line record with its normalized Web Mercator geometry.
#[derive(Debug, Clone)]
pub struct SpatialPoint {
    /// The source record, untouched.
    pub record: ServiceLineRecord,
    /// Point geometry in the destination spatial reference.
    pub geometry: Point<f64>,
}

/// The result of spatializing one batch of records.
#[derive(Debug, Default)]
pub struct SpatializeOutcome {
    /// Successfully projected points: geographic-sourced rows first, then
    /// projected-sourced rows, original order preserved within each group.
    pub points: Vec<SpatialPoint>,
    /// Rows excluded for missing latitude and/or longitude.
    pub missing_coords: Vec<ServiceLineRecord>,
}

/// Spatializes records, reporting rows with missing coordinates.
///
/// # Errors
///
/// Returns [`ProjectionError`] when a row carries a latitude that cannot be
/// projected at all (on or beyond a pole), which is malformed enough to
/// abort the run rather than silently misplace the point.
pub fn spatialize(
    records: Vec<ServiceLineRecord>,
) -> Result<SpatializeOutcome, ProjectionError> {
    let mut missing_coords = Vec::new();
    let mut geographic = Vec::new();
    let mut projected = Vec::new();

    for record in records {
        let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
            missing_coords.push(record);
            continue;
        };

        match CoordinateSystem::classify(latitude) {
            CoordinateSystem::Geographic => geographic.push((record, longitude, latitude)),
            CoordinateSystem::UtmNad83Zone12 => projected.push((record, longitude, latitude)),
        }
    }

    if !missing_coords.is_empty() {
        log::warn!("{} rows with missing coordinates", missing_coords.len());
    }

    let mut points = Vec::with_capacity(geographic.len() + projected.len());

    if !geographic.is_empty() {
        log::debug!(
            "Projecting {} rows from EPSG:{}",
            geographic.len(),
            CoordinateSystem::Geographic.wkid()
        );
        for (record, longitude, latitude) in geographic {
            let geometry = wgs84_to_web_mercator(Point::new(longitude, latitude))?;
            points.push(SpatialPoint { record, geometry });
        }
    }

    if !projected.is_empty() {
        log::debug!(
            "Projecting {} rows from EPSG:{}",
            projected.len(),
            CoordinateSystem::UtmNad83Zone12.wkid()
        );
        for (record, easting, northing) in projected {
            let geometry = utm12n_to_web_mercator(Point::new(easting, northing))?;
            points.push(SpatialPoint { record, geometry });
        }
    }

    Ok(SpatializeOutcome {
        points,
        missing_coords,
    })
}
