//! Rotated-pole coordinate transforms.
//!
//! Regional climate models run on grids whose poles are relocated away from
//! the geographic poles, equalizing grid-cell area over the region of
//! interest. This module converts between geographic coordinates
//! (longitude/latitude) and such a rotated-pole system (rlon/rlat), both in
//! degrees.
//!
//! The transform treats the pole parameters as a rotation of the unit sphere:
//! coordinates are converted to Cartesian unit vectors, multiplied by a fixed
//! 3×3 orthogonal matrix built from the pole location, and converted back to
//! spherical angles. The inverse applies the negated-angle rotation in the
//! complementary order, so forward and inverse are exact inverses up to
//! floating-point precision.
//!
//! # Example
//!
//! ```
//! use res_rs::io::RotatedPole;
//!
//! let pole = RotatedPole::default();
//! let (rlon, rlat) = pole.to_rotated(6.5, 50.9);
//! let (lon, lat) = pole.to_geographic(rlon, rlat);
//! assert!((lon - 6.5).abs() < 1e-9);
//! assert!((lat - 50.9).abs() < 1e-9);
//! ```

use thiserror::Error;

/// Error type for coordinate transforms.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Paired coordinate slices of different lengths
    #[error("coordinate arrays must have equal lengths ({lons} longitudes vs {lats} latitudes)")]
    LengthMismatch { lons: usize, lats: usize },
}

/// Transform direction selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformDirection {
    /// Geographic lon/lat to rotated rlon/rlat
    ToRotated,
    /// Rotated rlon/rlat back to geographic lon/lat
    ToGeographic,
}

/// Below this magnitude the rotated vector is taken to lie on the pole axis
/// and the output longitude is defined as 0, rather than left to the
/// platform's `atan2(0, 0)`.
const POLE_AXIS_EPS: f64 = 1e-12;

/// A rotated-pole grid definition: the location of the rotated south pole in
/// geographic degrees.
///
/// The default is the conventional European rotated pole at
/// longitude 18.0, latitude -39.25.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotatedPole {
    /// Longitude of the rotated south pole in degrees
    pub lon_south_pole: f64,
    /// Latitude of the rotated south pole in degrees
    pub lat_south_pole: f64,
}

impl Default for RotatedPole {
    fn default() -> Self {
        Self {
            lon_south_pole: 18.0,
            lat_south_pole: -39.25,
        }
    }
}

impl RotatedPole {
    /// Create a rotated-pole definition from the south-pole location.
    pub fn new(lon_south_pole: f64, lat_south_pole: f64) -> Self {
        Self {
            lon_south_pole,
            lat_south_pole,
        }
    }

    /// Rotation angles in radians: tilt about the y-axis (`θ = 90° + lat`)
    /// and spin about the z-axis (`φ = lon`).
    #[inline]
    fn angles(&self) -> (f64, f64) {
        (
            (90.0 + self.lat_south_pole).to_radians(),
            self.lon_south_pole.to_radians(),
        )
    }

    /// Convert a geographic point (degrees) to rotated coordinates (degrees).
    pub fn to_rotated(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (theta, phi) = self.angles();
        let (x, y, z) = to_cartesian(lon.to_radians(), lat.to_radians());

        let xr = theta.cos() * phi.cos() * x + theta.cos() * phi.sin() * y + theta.sin() * z;
        let yr = -phi.sin() * x + phi.cos() * y;
        let zr = -theta.sin() * phi.cos() * x - theta.sin() * phi.sin() * y + theta.cos() * z;

        to_degrees(xr, yr, zr)
    }

    /// Convert a rotated point (degrees) back to geographic coordinates
    /// (degrees).
    pub fn to_geographic(&self, rlon: f64, rlat: f64) -> (f64, f64) {
        let (theta, phi) = self.angles();
        let (theta, phi) = (-theta, -phi);
        let (x, y, z) = to_cartesian(rlon.to_radians(), rlat.to_radians());

        let xr = theta.cos() * phi.cos() * x + phi.sin() * y + theta.sin() * phi.cos() * z;
        let yr = -theta.cos() * phi.sin() * x + phi.cos() * y - theta.sin() * phi.sin() * z;
        let zr = -theta.sin() * x + theta.cos() * z;

        to_degrees(xr, yr, zr)
    }

    /// Apply the transform in the given direction.
    pub fn transform(&self, direction: TransformDirection, lon: f64, lat: f64) -> (f64, f64) {
        match direction {
            TransformDirection::ToRotated => self.to_rotated(lon, lat),
            TransformDirection::ToGeographic => self.to_geographic(lon, lat),
        }
    }

    /// Convert paired coordinate slices to rotated coordinates.
    ///
    /// # Errors
    /// [`ProjectionError::LengthMismatch`] if the slices differ in length.
    pub fn to_rotated_slice(
        &self,
        lons: &[f64],
        lats: &[f64],
    ) -> Result<(Vec<f64>, Vec<f64>), ProjectionError> {
        self.transform_slice(TransformDirection::ToRotated, lons, lats)
    }

    /// Convert paired rotated slices back to geographic coordinates.
    ///
    /// # Errors
    /// [`ProjectionError::LengthMismatch`] if the slices differ in length.
    pub fn to_geographic_slice(
        &self,
        rlons: &[f64],
        rlats: &[f64],
    ) -> Result<(Vec<f64>, Vec<f64>), ProjectionError> {
        self.transform_slice(TransformDirection::ToGeographic, rlons, rlats)
    }

    fn transform_slice(
        &self,
        direction: TransformDirection,
        lons: &[f64],
        lats: &[f64],
    ) -> Result<(Vec<f64>, Vec<f64>), ProjectionError> {
        if lons.len() != lats.len() {
            return Err(ProjectionError::LengthMismatch {
                lons: lons.len(),
                lats: lats.len(),
            });
        }
        let mut out_lons = Vec::with_capacity(lons.len());
        let mut out_lats = Vec::with_capacity(lats.len());
        for (&lon, &lat) in lons.iter().zip(lats) {
            let (o_lon, o_lat) = self.transform(direction, lon, lat);
            out_lons.push(o_lon);
            out_lats.push(o_lat);
        }
        Ok((out_lons, out_lats))
    }
}

/// Spherical angles (radians) to Cartesian unit-sphere coordinates.
#[inline]
fn to_cartesian(lon: f64, lat: f64) -> (f64, f64, f64) {
    (lon.cos() * lat.cos(), lon.sin() * lat.cos(), lat.sin())
}

/// Cartesian unit-sphere coordinates back to spherical angles in degrees.
///
/// On the pole axis the longitude is defined as 0.
#[inline]
fn to_degrees(x: f64, y: f64, z: f64) -> (f64, f64) {
    let lon = if x.abs() < POLE_AXIS_EPS && y.abs() < POLE_AXIS_EPS {
        0.0
    } else {
        y.atan2(x).to_degrees()
    };
    let lat = z.clamp(-1.0, 1.0).asin().to_degrees();
    (lon, lat)
}
