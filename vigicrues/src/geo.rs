//! Conversion from the detail service's projected coordinates to WGS84.
//!
//! Vigicrues reports station positions in Lambert-93 (EPSG:2154), a Lambert
//! conformal conic projection with two standard parallels on the GRS80
//! ellipsoid (RGF93 datum). RGF93 and WGS84 agree to well under a metre, so
//! no datum shift is applied: the inverse projection alone gives WGS84
//! decimal degrees.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;
use std::sync::LazyLock;

/// Error returned when projected coordinates cannot be converted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    /// NaN or infinite input
    #[error("coordinates are not finite numbers: ({x}, {y})")]
    NotFinite { x: f64, y: f64 },

    /// Input lies outside the area the projection is defined for
    #[error("coordinates ({x}, {y}) are outside the valid area of {crs}")]
    OutOfDomain { crs: ProjectedCrs, x: f64, y: f64 },
}

/// Projected coordinate reference systems the transformer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectedCrs {
    /// RGF93 / Lambert-93, used for metropolitan France.
    Lambert93,
}

impl ProjectedCrs {
    /// EPSG code of the system.
    pub fn epsg(&self) -> u32 {
        match self {
            ProjectedCrs::Lambert93 => 2154,
        }
    }

    /// Look a system up by EPSG code.
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            2154 => Some(ProjectedCrs::Lambert93),
            _ => None,
        }
    }

    /// Projected bounds (min x, min y, max x, max y) in metres.
    fn bounds(&self) -> (f64, f64, f64, f64) {
        match self {
            ProjectedCrs::Lambert93 => (-378_305.81, 6_005_281.2, 1_320_649.57, 7_235_612.72),
        }
    }

    fn projection(&self) -> &'static LambertConic {
        match self {
            ProjectedCrs::Lambert93 => &LAMBERT_93,
        }
    }
}

impl fmt::Display for ProjectedCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Convert projected coordinates (metres) to WGS84 latitude/longitude.
///
/// # Examples
///
/// ```
/// use vigicrues::geo::{ProjectedCrs, to_wgs84};
///
/// // Projection origin: 46°30'N, 3°E
/// let p = to_wgs84(700_000.0, 6_600_000.0, ProjectedCrs::Lambert93).unwrap();
/// assert!((p.latitude - 46.5).abs() < 1e-9);
/// assert!((p.longitude - 3.0).abs() < 1e-9);
///
/// assert!(to_wgs84(f64::NAN, 6_600_000.0, ProjectedCrs::Lambert93).is_err());
/// ```
pub fn to_wgs84(x: f64, y: f64, crs: ProjectedCrs) -> Result<GeoPoint, CoordinateError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(CoordinateError::NotFinite { x, y });
    }

    let (min_x, min_y, max_x, max_y) = crs.bounds();
    if !(min_x..=max_x).contains(&x) || !(min_y..=max_y).contains(&y) {
        return Err(CoordinateError::OutOfDomain { crs, x, y });
    }

    Ok(crs.projection().inverse(x, y))
}

/// Project a WGS84 position into the given system.
///
/// Inverse of [`to_wgs84`]; returns `(x, y)` in metres.
pub fn from_wgs84(point: GeoPoint, crs: ProjectedCrs) -> (f64, f64) {
    crs.projection().forward(point)
}

/// GRS80 semi-major axis (metres).
const GRS80_A: f64 = 6_378_137.0;

/// GRS80 inverse flattening.
const GRS80_INV_F: f64 = 298.257_222_101;

/// Iterations for the latitude fixed point; converges to 1e-12 rad in ~6.
const LATITUDE_ITERATIONS: usize = 12;

static LAMBERT_93: LazyLock<LambertConic> =
    LazyLock::new(|| LambertConic::new(46.5, 3.0, 49.0, 44.0, 700_000.0, 6_600_000.0));

/// Lambert conformal conic with two standard parallels (EPSG method 9802).
#[derive(Debug)]
struct LambertConic {
    e: f64,
    n: f64,
    /// `a * F`
    scale: f64,
    rho0: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl LambertConic {
    fn new(
        lat0_deg: f64,
        lon0_deg: f64,
        lat1_deg: f64,
        lat2_deg: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let f = 1.0 / GRS80_INV_F;
        let e = (2.0 * f - f * f).sqrt();

        let lat0 = lat0_deg.to_radians();
        let lat1 = lat1_deg.to_radians();
        let lat2 = lat2_deg.to_radians();

        let m1 = m(lat1, e);
        let m2 = m(lat2, e);
        let t0 = t(lat0, e);
        let t1 = t(lat1, e);
        let t2 = t(lat2, e);

        let n = (m1.ln() - m2.ln()) / (t1.ln() - t2.ln());
        let scale = GRS80_A * m1 / (n * t1.powf(n));
        let rho0 = scale * t0.powf(n);

        Self {
            e,
            n,
            scale,
            rho0,
            lon0: lon0_deg.to_radians(),
            false_easting,
            false_northing,
        }
    }

    fn inverse(&self, x: f64, y: f64) -> GeoPoint {
        let dx = x - self.false_easting;
        let dy = self.rho0 - (y - self.false_northing);

        let rho = dx.hypot(dy).copysign(self.n);
        let t = (rho / self.scale).powf(1.0 / self.n);
        let theta = dx.atan2(dy);

        let half_e = self.e / 2.0;
        let mut lat = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..LATITUDE_ITERATIONS {
            let es = self.e * lat.sin();
            lat = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(half_e)).atan();
        }

        GeoPoint {
            latitude: lat.to_degrees(),
            longitude: (theta / self.n + self.lon0).to_degrees(),
        }
    }

    fn forward(&self, point: GeoPoint) -> (f64, f64) {
        let lat = point.latitude.to_radians();
        let lon = point.longitude.to_radians();

        let rho = self.scale * t(lat, self.e).powf(self.n);
        let theta = self.n * (lon - self.lon0);

        (
            self.false_easting + rho * theta.sin(),
            self.false_northing + self.rho0 - rho * theta.cos(),
        )
    }
}

fn m(lat: f64, e: f64) -> f64 {
    lat.cos() / (1.0 - (e * lat.sin()).powi(2)).sqrt()
}

fn t(lat: f64, e: f64) -> f64 {
    let es = e * lat.sin();
    (FRAC_PI_4 - lat / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}
