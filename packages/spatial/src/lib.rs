#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate system classification and projection math.
//!
//! Source records carry their position in one of two reference systems with
//! no explicit tag: decimal degrees (WGS84, EPSG:4326) or UTM NAD83 zone 12
//! meters (EPSG:26912). The only reliable discriminator is magnitude (a
//! northing is always in the millions while a latitude never reaches 100),
//! so [`CoordinateSystem::classify`] keys off the latitude value alone.
//!
//! Both groups are normalized to spherical Web Mercator (EPSG:3857), the
//! spatial reference of the destination layers. The transverse Mercator
//! inverse uses the standard Snyder series on the GRS80 ellipsoid; the
//! NAD83/WGS84 datum difference (under a meter) is ignored.

use geo::Point;

/// EPSG well-known ID for geographic WGS84 coordinates.
pub const WGS84_WKID: i32 = 4326;

/// EPSG well-known ID for UTM NAD83 zone 12N.
pub const UTM_NAD83_12N_WKID: i32 = 26912;

/// EPSG well-known ID for spherical Web Mercator, the destination reference.
pub const WEB_MERCATOR_WKID: i32 = 3857;

/// Latitude values at or above this magnitude are treated as UTM northings.
///
/// The boundary value itself belongs to the projected group: 100 is
/// impossible as a latitude but representable (if nonsensical) as a
/// northing, and `>=` keeps the two partitions exhaustive and disjoint.
pub const UTM_LATITUDE_THRESHOLD: f64 = 100.0;

// GRS80 ellipsoid (shared by NAD83) and the spherical Web Mercator radius.
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_222_101;
const UTM_SCALE_FACTOR: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
/// Central meridian of UTM zone 12, in degrees.
const ZONE_12_CENTRAL_MERIDIAN: f64 = -111.0;

/// Errors produced while projecting coordinates.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// A geographic latitude outside the open interval (-90, 90).
    #[error("latitude {latitude} is outside the valid range for projection")]
    LatitudeOutOfRange {
        /// The offending latitude value.
        latitude: f64,
    },
}

/// The inferred source reference system of a point record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Decimal degrees, WGS84 (EPSG:4326).
    Geographic,
    /// Meters, UTM NAD83 zone 12N (EPSG:26912).
    UtmNad83Zone12,
}

impl CoordinateSystem {
    /// Infers the reference system from a record's latitude value.
    #[must_use]
    pub fn classify(latitude: f64) -> Self {
        if latitude >= UTM_LATITUDE_THRESHOLD {
            Self::UtmNad83Zone12
        } else {
            Self::Geographic
        }
    }

    /// The EPSG well-known ID of this reference system.
    #[must_use]
    pub const fn wkid(self) -> i32 {
        match self {
            Self::Geographic => WGS84_WKID,
            Self::UtmNad83Zone12 => UTM_NAD83_12N_WKID,
        }
    }
}

/// Projects a geographic point (x = longitude, y = latitude, degrees) to
/// Web Mercator meters.
///
/// # Errors
///
/// Returns [`ProjectionError::LatitudeOutOfRange`] when the latitude is not
/// strictly between -90 and 90 degrees; the projection diverges at the
/// poles.
pub fn wgs84_to_web_mercator(point: Point<f64>) -> Result<Point<f64>, ProjectionError> {
    let (longitude, latitude) = point.x_y();
    if !latitude.is_finite() || latitude.abs() >= 90.0 {
        return Err(ProjectionError::LatitudeOutOfRange { latitude });
    }

    let x = SEMI_MAJOR_AXIS * longitude.to_radians();
    let y = SEMI_MAJOR_AXIS * (std::f64::consts::FRAC_PI_4 + latitude.to_radians() / 2.0)
        .tan()
        .ln();

    Ok(Point::new(x, y))
}

/// Converts a UTM NAD83 zone 12N point (x = easting, y = northing, meters)
/// to geographic degrees (x = longitude, y = latitude).
///
/// Northern hemisphere is assumed (false northing 0), which holds for every
/// value the latitude-magnitude heuristic can route here.
#[must_use]
#[allow(clippy::suboptimal_flops, clippy::many_single_char_names)]
pub fn utm12n_to_wgs84(point: Point<f64>) -> Point<f64> {
    let e2 = FLATTENING * (2.0 - FLATTENING);
    let ep2 = e2 / (1.0 - e2);

    let x = point.x() - UTM_FALSE_EASTING;
    let m = point.y() / UTM_SCALE_FACTOR;

    // Footpoint latitude from the meridian arc.
    let mu = m
        / (SEMI_MAJOR_AXIS
            * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = SEMI_MAJOR_AXIS / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = SEMI_MAJOR_AXIS * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * UTM_SCALE_FACTOR);

    let latitude = phi1
        - (n1 * tan_phi1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);

    let longitude = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
            / 120.0)
        / cos_phi1;

    Point::new(
        ZONE_12_CENTRAL_MERIDIAN + longitude.to_degrees(),
        latitude.to_degrees(),
    )
}

/// Converts a UTM NAD83 zone 12N point straight to Web Mercator.
///
/// # Errors
///
/// Returns [`ProjectionError::LatitudeOutOfRange`] if the intermediate
/// geographic latitude is degenerate (a northing so malformed it lands on a
/// pole).
pub fn utm12n_to_web_mercator(point: Point<f64>) -> Result<Point<f64>, ProjectionError> {
    wgs84_to_web_mercator(utm12n_to_wgs84(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Forward transverse Mercator on GRS80 (Snyder 8-9..8-15), test-only
    /// since the pipeline never needs to go back into UTM.
    #[allow(clippy::many_single_char_names)]
    fn wgs84_to_utm12n(longitude: f64, latitude: f64) -> (f64, f64) {
        let e2 = FLATTENING * (2.0 - FLATTENING);
        let ep2 = e2 / (1.0 - e2);

        let phi = latitude.to_radians();
        let lambda = (longitude - ZONE_12_CENTRAL_MERIDIAN).to_radians();

        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = SEMI_MAJOR_AXIS / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = lambda * cos_phi;

        let m = SEMI_MAJOR_AXIS
            * ((1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e2 * e2 / 32.0 + 45.0 * e2 * e2 * e2 / 1024.0)
                    * (2.0 * phi).sin()
                + (15.0 * e2 * e2 / 256.0 + 45.0 * e2 * e2 * e2 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e2 * e2 * e2 / 3072.0) * (6.0 * phi).sin());

        let easting = UTM_SCALE_FACTOR
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
            + UTM_FALSE_EASTING;
        let northing = UTM_SCALE_FACTOR
            * (m + n
                * tan_phi
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

        (easting, northing)
    }

    #[test]
    fn classifies_latitudes_by_magnitude() {
        assert_eq!(
            CoordinateSystem::classify(40.76),
            CoordinateSystem::Geographic
        );
        assert_eq!(
            CoordinateSystem::classify(4_512_586.0),
            CoordinateSystem::UtmNad83Zone12
        );
        assert_eq!(
            CoordinateSystem::classify(99.999),
            CoordinateSystem::Geographic
        );
    }

    #[test]
    fn boundary_latitude_is_projected() {
        // Exactly 100 goes to exactly one group: the projected one.
        assert_eq!(
            CoordinateSystem::classify(100.0),
            CoordinateSystem::UtmNad83Zone12
        );
    }

    #[test]
    fn mercator_origin_maps_to_origin() {
        let projected = wgs84_to_web_mercator(Point::new(0.0, 0.0)).unwrap();
        assert!(projected.x().abs() < 1e-9);
        assert!(projected.y().abs() < 1e-9);
    }

    #[test]
    fn mercator_matches_published_anchors() {
        // Antimeridian easting and the y of 45°N are fixed constants of the
        // spherical projection.
        let edge = wgs84_to_web_mercator(Point::new(180.0, 0.0)).unwrap();
        assert!((edge.x() - 20_037_508.342_789_244).abs() < 1e-3);

        let mid = wgs84_to_web_mercator(Point::new(0.0, 45.0)).unwrap();
        assert!((mid.y() - 5_621_521.486_192_335).abs() < 1e-3);
    }

    #[test]
    fn mercator_rejects_polar_latitudes() {
        assert!(wgs84_to_web_mercator(Point::new(0.0, 90.0)).is_err());
        assert!(wgs84_to_web_mercator(Point::new(0.0, -95.0)).is_err());
    }

    #[test]
    fn utm_central_meridian_inverts_exactly() {
        // On the central meridian at the equator the series collapses.
        let geographic = utm12n_to_wgs84(Point::new(UTM_FALSE_EASTING, 0.0));
        assert!((geographic.x() - ZONE_12_CENTRAL_MERIDIAN).abs() < 1e-9);
        assert!(geographic.y().abs() < 1e-9);
    }

    #[test]
    fn utm_inverse_recovers_salt_lake_city() {
        // Temple Square is roughly (424784 E, 4512586 N) in zone 12.
        let geographic = utm12n_to_wgs84(Point::new(424_784.0, 4_512_586.0));
        assert!((geographic.y() - 40.7608).abs() < 5e-4);
        assert!((geographic.x() - -111.8910).abs() < 5e-4);
    }

    #[test]
    fn utm_round_trips_through_forward_projection() {
        for &(longitude, latitude) in &[
            (-111.8910, 40.7608),
            (-113.55, 37.1),
            (-109.5, 41.9),
            (-111.0, 39.0),
        ] {
            let (easting, northing) = wgs84_to_utm12n(longitude, latitude);
            let recovered = utm12n_to_wgs84(Point::new(easting, northing));
            assert!(
                (recovered.x() - longitude).abs() < 1e-8,
                "longitude drifted for ({longitude}, {latitude})"
            );
            assert!(
                (recovered.y() - latitude).abs() < 1e-8,
                "latitude drifted for ({longitude}, {latitude})"
            );
        }
    }

    #[test]
    fn utm_to_web_mercator_composes() {
        let (easting, northing) = wgs84_to_utm12n(-111.0, 39.0);
        let via_utm = utm12n_to_web_mercator(Point::new(easting, northing)).unwrap();
        let direct = wgs84_to_web_mercator(Point::new(-111.0, 39.0)).unwrap();
        assert!((via_utm.x() - direct.x()).abs() < 1e-4);
        assert!((via_utm.y() - direct.y()).abs() < 1e-4);
    }
}
