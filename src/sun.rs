//! # Low-precision solar ephemeris
//!
//! Analytic position of the Sun, sufficient for illumination tests and brightness estimates
//! (accuracy of the order of 0.01°), not for precision ephemerides.
//!
//! Two independent series are used:
//!
//! - [`solar_position`]: geocentric vector in km (ECI and ECEF) from the classical mean anomaly
//!   / mean longitude / equation of centre theory with a ΔET estimate and the nutation-of-node
//!   correction to the obliquity. It drives the visibility and magnitude computations.
//! - [`sun_ecliptic_longitude`] / [`sun_ra_dec`]: short series in Julian centuries since J2000
//!   used by the observer-facing helpers ([`sun_alt_az`], [`cos_zenith`],
//!   [`sun_zenith_angle`]).
//!
//! [`night_border`] samples the day/night terminator for map display.

use hifitime::Epoch;
use nalgebra::Vector3;

use crate::constants::{Degree, Radian, AU, DAYS_PER_CENTURY, DPI, RADEG, SECONDS_PER_DAY};
use crate::ref_system::eci_to_ecef;
use crate::time::{days_since_j2000, julian_day, lmst};

/// Geocentric position of the Sun in km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    pub ecef: Vector3<f64>,
    pub eci: Vector3<f64>,
}

/// Positive remainder of `a / b`.
#[inline]
fn modulus(a: f64, b: f64) -> f64 {
    a.rem_euclid(b)
}

/// Estimate of ET − UT in seconds for a (fractional) year.
fn delta_et(year: f64) -> f64 {
    26.465 + 0.747622 * (year - 1950.0) + 1.886913 * (DPI * (year - 1975.0) / 33.0).sin()
}

/// Compute the geocentric position of the Sun.
///
/// Time is counted in Julian centuries of ephemeris time from 1900 January 0.5
/// (JD 2415020), with ΔET added to the civil time. The apparent longitude `Lsa` and the
/// distance `R` come from the equation of centre of the Earth orbit; the obliquity includes the
/// 0.00256°·cos Ω nutation term.
///
/// Arguments
/// ---------
/// * `epoch`: instant (UTC).
///
/// Return
/// ------
/// * The Sun vector in ECI and ECEF, km.
pub fn solar_position(epoch: &Epoch) -> SunPosition {
    let jd = julian_day(epoch);
    let mjd = jd - 2_415_020.0;
    let year = 1900.0 + mjd / 365.25;
    let t = (mjd + delta_et(year) / SECONDS_PER_DAY) / DAYS_PER_CENTURY;

    let m = modulus(358.47583 + modulus(35999.04975 * t, 360.0) - (0.000150 + 0.0000033 * t) * t * t, 360.0) * RADEG;
    let l = modulus(279.69668 + modulus(36000.76892 * t, 360.0) + 0.0003025 * t * t, 360.0) * RADEG;
    let e = 0.01675104 - (0.0000418 + 0.000000126 * t) * t;
    let c = ((1.919460 - (0.004789 + 0.000014 * t) * t) * m.sin()
        + (0.020094 - 0.000100 * t) * (2.0 * m).sin()
        + 0.000293 * (3.0 * m).sin())
        * RADEG;
    let o = modulus(259.18 - 1934.142 * t, 360.0) * RADEG;
    let lsa = modulus(l + c - (0.00569 - 0.00479 * o.sin()) * RADEG, DPI);
    let nu = modulus(m + c, DPI);
    let r = AU * 1.0000002 * (1.0 - e * e) / (1.0 + e * nu.cos());
    let eps = (23.452294 - (0.0130125 + (0.00000164 - 0.000000503 * t) * t) * t + 0.00256 * o.cos()) * RADEG;

    let eci = Vector3::new(
        r * lsa.cos(),
        r * lsa.sin() * eps.cos(),
        r * lsa.sin() * eps.sin(),
    );

    SunPosition {
        ecef: eci_to_ecef(epoch, &eci),
        eci,
    }
}

/// Ecliptic longitude of the Sun in radians (not reduced to [0, 2π)).
pub fn sun_ecliptic_longitude(epoch: &Epoch) -> Radian {
    let t = days_since_j2000(epoch) / DAYS_PER_CENTURY;
    let ma = (357.52910 + 35999.05030 * t - 0.0001559 * t * t - 0.00000048 * t.powi(3)) * RADEG;
    let l0 = 280.46645 + 36000.76983 * t + 0.0003032 * t * t;
    let dl = (1.914600 - 0.004817 * t - 0.000014 * t * t) * ma.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * ma).sin()
        + 0.000290 * (3.0 * ma).sin();
    (l0 + dl) * RADEG
}

/// Right ascension and declination of the Sun, radians.
///
/// Return
/// ------
/// * `(right_ascension, declination)`, the right ascension within (−π, π].
pub fn sun_ra_dec(epoch: &Epoch) -> (Radian, Radian) {
    let t = days_since_j2000(epoch) / DAYS_PER_CENTURY;
    let eps = (23.0 + 26.0 / 60.0 + 21.448 / 3600.0
        - (46.8150 * t + 0.00059 * t * t - 0.001813 * t.powi(3)) / 3600.0)
        * RADEG;
    let eclon = sun_ecliptic_longitude(epoch);

    let x = eclon.cos();
    let y = eps.cos() * eclon.sin();
    let z = eps.sin() * eclon.sin();
    let r = (1.0 - z * z).sqrt();

    let declination = z.atan2(r);
    let right_ascension = 2.0 * y.atan2(x + r);
    (right_ascension, declination)
}

/// Local hour angle of the Sun (radians) at east longitude `longitude` (radians).
fn local_hour_angle(epoch: &Epoch, longitude: Radian, right_ascension: Radian) -> Radian {
    lmst(epoch, longitude) - right_ascension
}

/// Altitude and azimuth of the Sun seen from a site, radians.
///
/// The azimuth is measured from North through East, within (−π, π].
///
/// Arguments
/// ---------
/// * `epoch`: instant.
/// * `longitude`, `latitude`: site coordinates in degrees.
///
/// Return
/// ------
/// * `(altitude, azimuth)` in radians.
pub fn sun_alt_az(epoch: &Epoch, longitude: Degree, latitude: Degree) -> (Radian, Radian) {
    let (ra, dec) = sun_ra_dec(epoch);
    let lat = latitude * RADEG;
    let h = local_hour_angle(epoch, longitude * RADEG, ra);

    let alt = (lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos()).asin();
    let az = (-h.sin()).atan2(lat.cos() * dec.tan() - lat.sin() * h.cos());
    (alt, az)
}

/// Cosine of the solar zenith angle at a site (longitude, latitude in degrees).
pub fn cos_zenith(epoch: &Epoch, longitude: Degree, latitude: Degree) -> f64 {
    let (ra, dec) = sun_ra_dec(epoch);
    let lat = latitude * RADEG;
    let h = local_hour_angle(epoch, longitude * RADEG, ra);
    lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos()
}

/// Solar zenith angle at a site, degrees.
pub fn sun_zenith_angle(epoch: &Epoch, longitude: Degree, latitude: Degree) -> Degree {
    cos_zenith(epoch, longitude, latitude).clamp(-1.0, 1.0).acos() / RADEG
}

/// First-order Earth–Sun distance factor `1 − 0.0167·cos(2π (d − 3) / 365.25636)`.
///
/// `d` is the number of days since J2000; the factor is minimal near perihelion (early
/// January) and maximal near aphelion.
pub fn earth_sun_distance_correction(epoch: &Epoch) -> f64 {
    1.0 - 0.0167 * (DPI * (days_since_j2000(epoch) - 3.0) / 365.25636).cos()
}

/// One vertex of the night-side polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderPoint {
    pub longitude: Degree,
    pub latitude: Degree,
}

/// Latitude (degrees) of the terminator at `longitude`, for a subsolar point at
/// (`sun_longitude`, `sun_latitude`), all in degrees.
pub fn terminator_latitude(longitude: Degree, sun_longitude: Degree, sun_latitude: Degree) -> Degree {
    let hour_angle = (longitude - sun_longitude) * RADEG;
    (-hour_angle.cos() / (sun_latitude * RADEG).tan()).atan() / RADEG
}

/// Polygon bounding the night side of the Earth, for map display.
///
/// The subsolar point is taken from the ECEF Sun vector of [`solar_position`]. The polygon
/// starts at the dark pole at longitude −180°, follows the terminator from −180° to 180° in 1°
/// steps and closes back through the dark pole at +180°.
pub fn night_border(epoch: &Epoch) -> Vec<BorderPoint> {
    let sun = solar_position(epoch).ecef;
    let sun_lat = sun.z.atan2(sun.x.hypot(sun.y)) / RADEG;
    let sun_lon = sun.y.atan2(sun.x) / RADEG;

    let dark_pole = if sun_lat > 0.0 { -90.0 } else { 90.0 };

    let mut border = Vec::with_capacity(363);
    border.push(BorderPoint {
        longitude: -180.0,
        latitude: dark_pole,
    });
    border.extend((-180..=180).map(|lon| {
        let lon = lon as f64;
        BorderPoint {
            longitude: lon,
            latitude: terminator_latitude(lon, sun_lon, sun_lat),
        }
    }));
    border.push(BorderPoint {
        longitude: 180.0,
        latitude: dark_pole,
    });
    border
}
