//! Geomagnetic field model used to correct magnetic headings to true north
//!
//! The field is synthesized from the World Magnetic Model 2020 spherical
//! harmonic coefficients (degree and order 12), with linear secular variation
//! from the 2020.0 epoch.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

use crate::types::GeoPoint;

/// Model epoch as a decimal year
const EPOCH: f64 = 2020.0;

/// Geomagnetic reference radius in km
const REFERENCE_RADIUS_KM: f64 = 6371.2;

/// WGS84 ellipsoid axes in km
const SEMI_MAJOR_AXIS_KM: f64 = 6378.137;
const SEMI_MINOR_AXIS_KM: f64 = 6356.752_314_2;

/// Latitudes are clamped this far from the poles, where east is undefined
const POLE_MARGIN_DEG: f64 = 1e-5;

const MAX_DEGREE: usize = 12;
const TABLE_SIZE: usize = MAX_DEGREE + 1;

/// WMM2020 coefficients: n, m, g (nT), h (nT), g-dot (nT/yr), h-dot (nT/yr)
#[rustfmt::skip]
const WMM2020: [(usize, usize, f64, f64, f64, f64); 90] = [
    (1, 0, -29404.5, 0.0, 6.7, 0.0),
    (1, 1, -1450.7, 4652.9, 7.7, -25.1),
    (2, 0, -2500.0, 0.0, -11.5, 0.0),
    (2, 1, 2982.0, -2991.6, -7.1, -30.2),
    (2, 2, 1676.8, -734.8, -2.2, -23.9),
    (3, 0, 1363.9, 0.0, 2.8, 0.0),
    (3, 1, -2381.0, -82.2, -6.2, 5.7),
    (3, 2, 1236.2, 241.8, 3.4, -1.0),
    (3, 3, 525.7, -542.9, -12.2, 1.1),
    (4, 0, 903.1, 0.0, -1.1, 0.0),
    (4, 1, 809.4, 282.0, -1.6, 0.2),
    (4, 2, 86.2, -158.4, -6.0, 6.9),
    (4, 3, -309.4, 199.8, 5.4, 3.7),
    (4, 4, 47.9, -350.1, -5.5, -5.6),
    (5, 0, -234.4, 0.0, -0.3, 0.0),
    (5, 1, 363.1, 47.7, 0.6, 0.1),
    (5, 2, 187.8, 208.4, -0.7, 2.5),
    (5, 3, -140.7, -121.3, 0.1, -0.9),
    (5, 4, -151.2, 32.2, 1.2, 3.0),
    (5, 5, 13.7, 99.1, 1.0, 0.5),
    (6, 0, 65.9, 0.0, -0.6, 0.0),
    (6, 1, 65.6, -19.1, -0.4, 0.1),
    (6, 2, 73.0, 25.0, 0.5, -1.8),
    (6, 3, -121.5, 52.7, 1.4, -1.4),
    (6, 4, -36.2, -64.4, -1.4, 0.9),
    (6, 5, 13.5, 9.0, -0.0, 0.1),
    (6, 6, -64.7, 68.1, 0.8, 1.0),
    (7, 0, 80.6, 0.0, -0.1, 0.0),
    (7, 1, -76.8, -51.4, -0.3, 0.5),
    (7, 2, -8.3, -16.8, -0.1, 0.6),
    (7, 3, 56.5, 2.3, 0.7, -0.7),
    (7, 4, 15.8, 23.5, 0.2, -0.2),
    (7, 5, 6.4, -2.2, -0.5, -1.2),
    (7, 6, -7.2, -27.2, -0.8, 0.2),
    (7, 7, 9.8, -1.9, 1.0, 0.3),
    (8, 0, 23.6, 0.0, -0.1, 0.0),
    (8, 1, 9.8, 8.4, 0.1, -0.3),
    (8, 2, -17.5, -15.3, -0.1, 0.7),
    (8, 3, -0.4, 12.8, 0.5, -0.2),
    (8, 4, -21.1, -11.8, -0.1, 0.5),
    (8, 5, 15.3, 14.9, 0.4, -0.3),
    (8, 6, 13.7, 3.6, 0.5, -0.5),
    (8, 7, -16.5, -6.9, 0.0, 0.4),
    (8, 8, -0.3, 2.8, 0.4, 0.1),
    (9, 0, 5.0, 0.0, -0.1, 0.0),
    (9, 1, 8.2, -23.3, -0.2, -0.3),
    (9, 2, 2.9, 11.1, -0.0, 0.2),
    (9, 3, -1.4, 9.8, 0.4, -0.4),
    (9, 4, -1.1, -5.1, -0.3, 0.4),
    (9, 5, -13.3, -6.2, -0.0, 0.1),
    (9, 6, 1.1, 7.8, 0.3, -0.0),
    (9, 7, 8.9, 0.4, -0.0, -0.2),
    (9, 8, -9.3, -1.5, -0.0, 0.5),
    (9, 9, -11.9, 9.7, -0.4, 0.2),
    (10, 0, -1.9, 0.0, 0.0, 0.0),
    (10, 1, -6.2, 3.4, -0.0, -0.0),
    (10, 2, -0.1, -0.2, -0.0, 0.1),
    (10, 3, 1.7, 3.5, 0.2, -0.3),
    (10, 4, -0.9, 4.8, -0.1, 0.1),
    (10, 5, 0.6, -8.6, -0.2, -0.2),
    (10, 6, -0.9, -0.1, -0.0, 0.1),
    (10, 7, 1.9, -4.2, -0.1, -0.0),
    (10, 8, 1.4, -3.4, -0.2, -0.1),
    (10, 9, -2.4, -0.1, -0.1, 0.2),
    (10, 10, -3.9, -8.8, -0.0, -0.0),
    (11, 0, 3.0, 0.0, -0.0, 0.0),
    (11, 1, -1.4, -0.0, -0.1, -0.0),
    (11, 2, -2.5, 2.6, -0.0, 0.1),
    (11, 3, 2.4, -0.5, 0.0, 0.0),
    (11, 4, -0.9, -0.4, -0.0, 0.2),
    (11, 5, 0.3, 0.6, -0.1, -0.0),
    (11, 6, -0.7, -0.2, 0.0, 0.0),
    (11, 7, -0.1, -1.7, -0.0, 0.1),
    (11, 8, 1.4, -1.6, -0.1, -0.0),
    (11, 9, -0.6, -3.0, -0.1, -0.1),
    (11, 10, 0.2, -2.0, -0.1, 0.0),
    (11, 11, 3.1, -2.6, -0.1, -0.0),
    (12, 0, -2.0, 0.0, 0.0, 0.0),
    (12, 1, -0.1, -1.2, -0.0, -0.0),
    (12, 2, 0.5, 0.5, -0.0, 0.0),
    (12, 3, 1.3, 1.3, 0.0, -0.1),
    (12, 4, -1.2, -1.8, -0.0, 0.1),
    (12, 5, 0.7, 0.1, -0.0, -0.0),
    (12, 6, 0.3, 0.7, 0.0, 0.0),
    (12, 7, 0.5, -0.1, -0.0, -0.0),
    (12, 8, -0.2, 0.6, 0.0, 0.1),
    (12, 9, -0.5, 0.2, -0.0, -0.0),
    (12, 10, 0.1, -0.9, -0.0, -0.0),
    (12, 11, -1.1, -0.0, -0.0, 0.0),
    (12, 12, -0.3, 0.5, -0.1, -0.1),
];

/// Source of magnetic declination for a position and time
///
/// [`crate::HeadingEngine`] is generic over this trait so hosts can plug in a
/// different field model, or a fixed value in tests.
pub trait DeclinationModel {
    /// Angle from true north to magnetic north in degrees, positive east
    fn declination(&self, point: &GeoPoint, time: DateTime<Utc>) -> f64;
}

/// Geomagnetic field vector at a location, in the local geodetic frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticField {
    /// Northward component in nT
    pub north: f64,
    /// Eastward component in nT
    pub east: f64,
    /// Downward component in nT
    pub down: f64,
}

impl MagneticField {
    /// Declination in degrees, positive when magnetic north is east of true north
    pub fn declination(&self) -> f64 {
        self.east.atan2(self.north).to_degrees()
    }

    /// Inclination (dip) in degrees, positive when the field points downward
    pub fn inclination(&self) -> f64 {
        self.down.atan2(self.horizontal_intensity()).to_degrees()
    }

    /// Horizontal field strength in nT
    pub fn horizontal_intensity(&self) -> f64 {
        self.north.hypot(self.east)
    }

    /// Total field strength in nT
    pub fn total_intensity(&self) -> f64 {
        (self.north * self.north + self.east * self.east + self.down * self.down).sqrt()
    }
}

/// World Magnetic Model evaluator
///
/// Coefficients are stored pre-multiplied by the Schmidt semi-normalization
/// factors so that synthesis can use Gauss-normalized Legendre functions.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use compass_tracker::{GeoPoint, GeomagneticModel};
///
/// let model = GeomagneticModel::new();
/// let new_york = GeoPoint::new(40.71, -74.01);
/// let time = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
///
/// let declination = model.declination(&new_york, time);
/// assert!(declination < -10.0 && declination > -16.0); // About 13° west
/// ```
#[derive(Debug, Clone)]
pub struct GeomagneticModel {
    g: [[f64; TABLE_SIZE]; TABLE_SIZE],
    h: [[f64; TABLE_SIZE]; TABLE_SIZE],
    g_dot: [[f64; TABLE_SIZE]; TABLE_SIZE],
    h_dot: [[f64; TABLE_SIZE]; TABLE_SIZE],
}

impl GeomagneticModel {
    /// Create a model from the WMM2020 coefficients
    pub fn new() -> Self {
        let schmidt = schmidt_factors();
        let mut model = Self {
            g: [[0.0; TABLE_SIZE]; TABLE_SIZE],
            h: [[0.0; TABLE_SIZE]; TABLE_SIZE],
            g_dot: [[0.0; TABLE_SIZE]; TABLE_SIZE],
            h_dot: [[0.0; TABLE_SIZE]; TABLE_SIZE],
        };

        for &(n, m, g, h, g_dot, h_dot) in WMM2020.iter() {
            let factor = schmidt[n][m];
            model.g[n][m] = g * factor;
            model.h[n][m] = h * factor;
            model.g_dot[n][m] = g_dot * factor;
            model.h_dot[n][m] = h_dot * factor;
        }

        model
    }

    /// Evaluate the field at `point` (altitude above the ellipsoid) and `time`
    pub fn field(&self, point: &GeoPoint, time: DateTime<Utc>) -> MagneticField {
        let latitude = point
            .latitude
            .clamp(-90.0 + POLE_MARGIN_DEG, 90.0 - POLE_MARGIN_DEG);
        let geocentric = Geocentric::from_geodetic(latitude, point.longitude, point.altitude);
        let years = decimal_year(time) - EPOCH;

        let legendre = Legendre::new(core::f64::consts::FRAC_PI_2 - geocentric.latitude);
        let inverse_cos_latitude = 1.0 / geocentric.latitude.cos();

        let mut north = 0.0;
        let mut east = 0.0;
        let mut down = 0.0;

        for n in 1..=MAX_DEGREE {
            let radius_power = (REFERENCE_RADIUS_KM / geocentric.radius_km).powi(n as i32 + 2);
            for m in 0..=n {
                let g = self.g[n][m] + years * self.g_dot[n][m];
                let h = self.h[n][m] + years * self.h_dot[n][m];
                let (sin_m_lon, cos_m_lon) = (m as f64 * geocentric.longitude).sin_cos();
                let cosine_term = g * cos_m_lon + h * sin_m_lon;

                north += radius_power * cosine_term * legendre.dp[n][m];
                east += radius_power
                    * m as f64
                    * (g * sin_m_lon - h * cos_m_lon)
                    * legendre.p[n][m]
                    * inverse_cos_latitude;
                down -= (n as f64 + 1.0) * radius_power * cosine_term * legendre.p[n][m];
            }
        }

        // Rotate from the geocentric to the geodetic frame
        let (sin_diff, cos_diff) = (latitude.to_radians() - geocentric.latitude).sin_cos();
        MagneticField {
            north: north * cos_diff + down * sin_diff,
            east,
            down: -north * sin_diff + down * cos_diff,
        }
    }

    /// Declination in degrees at `point` and `time`, positive east
    pub fn declination(&self, point: &GeoPoint, time: DateTime<Utc>) -> f64 {
        self.field(point, time).declination()
    }
}

impl Default for GeomagneticModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclinationModel for GeomagneticModel {
    fn declination(&self, point: &GeoPoint, time: DateTime<Utc>) -> f64 {
        GeomagneticModel::declination(self, point, time)
    }
}

/// Geocentric spherical coordinates
struct Geocentric {
    /// Radians
    latitude: f64,
    /// Radians
    longitude: f64,
    radius_km: f64,
}

impl Geocentric {
    fn from_geodetic(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        let altitude_km = altitude_m / 1000.0;
        let a2 = SEMI_MAJOR_AXIS_KM * SEMI_MAJOR_AXIS_KM;
        let b2 = SEMI_MINOR_AXIS_KM * SEMI_MINOR_AXIS_KM;
        let (sin_lat, cos_lat) = latitude_deg.to_radians().sin_cos();

        let weighted = a2 * cos_lat * cos_lat + b2 * sin_lat * sin_lat;
        let rho = weighted.sqrt();
        let latitude = (sin_lat * (rho * altitude_km + b2))
            .atan2(cos_lat * (rho * altitude_km + a2));

        let radius_squared = altitude_km * altitude_km
            + 2.0 * altitude_km * rho
            + (a2 * a2 * cos_lat * cos_lat + b2 * b2 * sin_lat * sin_lat) / weighted;

        Self {
            latitude,
            longitude: longitude_deg.to_radians(),
            radius_km: radius_squared.sqrt(),
        }
    }
}

/// Gauss-normalized associated Legendre functions and their derivatives
/// with respect to colatitude
struct Legendre {
    p: [[f64; TABLE_SIZE]; TABLE_SIZE],
    dp: [[f64; TABLE_SIZE]; TABLE_SIZE],
}

impl Legendre {
    fn new(colatitude: f64) -> Self {
        let (sin, cos) = colatitude.sin_cos();
        let mut p = [[0.0; TABLE_SIZE]; TABLE_SIZE];
        let mut dp = [[0.0; TABLE_SIZE]; TABLE_SIZE];
        p[0][0] = 1.0;

        for n in 1..=MAX_DEGREE {
            for m in 0..=n {
                if n == m {
                    p[n][m] = sin * p[n - 1][m - 1];
                    dp[n][m] = cos * p[n - 1][m - 1] + sin * dp[n - 1][m - 1];
                } else if n == 1 || m == n - 1 {
                    p[n][m] = cos * p[n - 1][m];
                    dp[n][m] = -sin * p[n - 1][m] + cos * dp[n - 1][m];
                } else {
                    let k = ((n - 1) * (n - 1) - m * m) as f64 / ((2 * n - 1) * (2 * n - 3)) as f64;
                    p[n][m] = cos * p[n - 1][m] - k * p[n - 2][m];
                    dp[n][m] = -sin * p[n - 1][m] + cos * dp[n - 1][m] - k * dp[n - 2][m];
                }
            }
        }

        Self { p, dp }
    }
}

/// Factors converting Gauss-normalized to Schmidt semi-normalized functions
fn schmidt_factors() -> [[f64; TABLE_SIZE]; TABLE_SIZE] {
    let mut factors = [[0.0; TABLE_SIZE]; TABLE_SIZE];
    factors[0][0] = 1.0;
    for n in 1..=MAX_DEGREE {
        factors[n][0] = factors[n - 1][0] * (2 * n - 1) as f64 / n as f64;
        for m in 1..=n {
            let delta = if m == 1 { 2.0 } else { 1.0 };
            factors[n][m] =
                factors[n][m - 1] * ((n - m + 1) as f64 * delta / (n + m) as f64).sqrt();
        }
    }
    factors
}

/// Convert a timestamp to a decimal year, e.g. 2021-07-02T12:00Z ≈ 2021.5
fn decimal_year(time: DateTime<Utc>) -> f64 {
    let year = time.year();
    let days_in_year = NaiveDate::from_ymd_opt(year, 12, 31)
        .map(|last| last.ordinal())
        .unwrap_or(365) as f64;
    let day_fraction = time.num_seconds_from_midnight() as f64 / 86_400.0;
    year as f64 + (time.ordinal0() as f64 + day_fraction) / days_in_year
}
