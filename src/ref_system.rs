//! # Reference frames
//!
//! Conversions between the Earth-centred inertial frame (ECI, true-equator / mean-equinox of
//! date as produced by the propagator), the Earth-fixed frame (ECEF), geodetic coordinates on
//! the WGS-84 ellipsoid and the observer's topocentric South-East-Zenith (SEZ) frame.
//!
//! The only Earth orientation parameter used is GMST ([`crate::time::gmst`]): polar motion,
//! nutation and precession are ignored at this level of accuracy.
//!
//! ```text
//!   ECI --rotmt(-GMST, z)--> ECEF
//!    |
//!    +--(observer lon/lat, LMST)--> SEZ --> azimuth / elevation
//! ```

use hifitime::Epoch;
use nalgebra::{Matrix3, Rotation3, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::constants::{Degree, Kilometer, PhysicalConstants, Radian, DPI, RADEG};
use crate::kepler::wrap_pi;
use crate::time::{gmst, lmst};
use crate::vector_math::magnitude;

/// Slant ranges below this value (km) are treated as "observer coincident with the target".
pub const MIN_SLANT_RANGE: Kilometer = 1e-9;

/// Maximum number of fixed-point iterations of the geodetic latitude solve.
pub const MAX_GEODETIC_ITERATIONS: usize = 50;

/// Convergence threshold (radians) of the geodetic latitude solve.
const GEODETIC_LATITUDE_EPS: Radian = 1e-10;

/// Construct a rotation matrix around one of the principal coordinate axes.
///
/// Returns the 3×3 matrix of the active rotation of angle `alpha` about axis `k`
/// (`0 = x`, `1 = y`, `2 = z`), so that `rotmt(alpha, k) * v` rotates `v` by `alpha`
/// counter-clockwise when looking down the axis toward the origin. Expressing a fixed
/// vector in a frame rotated by `alpha` therefore uses `rotmt(-alpha, k)`.
///
/// Arguments
/// ---------
/// * `alpha`: rotation angle in radians.
/// * `k`: axis index.
///
/// Return
/// ------
/// * The rotation matrix.
///
/// Panics
/// ------
/// * If `k` is not 0, 1 or 2.
pub fn rotmt(alpha: Radian, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        2 => Vector3::z_axis(),
        _ => panic!("**** ROTMT: invalid axis index {k} (must be 0,1,2) ****"),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Rotate an ECI vector into the Earth-fixed frame (rotation by −GMST about the polar axis).
pub fn eci_to_ecef(epoch: &Epoch, v: &Vector3<f64>) -> Vector3<f64> {
    rotmt(-gmst(epoch), 2) * v
}

/// Rotate an Earth-fixed vector back into the ECI frame (rotation by +GMST).
pub fn ecef_to_eci(epoch: &Epoch, v: &Vector3<f64>) -> Vector3<f64> {
    rotmt(gmst(epoch), 2) * v
}

/// Geodetic coordinates on the reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    /// East longitude in degrees, within (−180, 180].
    pub longitude: Degree,
    /// Geodetic latitude in degrees.
    pub latitude: Degree,
    /// Height above the ellipsoid in km.
    pub altitude: Kilometer,
}

/// Compute the ECI position and velocity of a point fixed on the rotating Earth.
///
/// The point is placed on the ellipsoid described by `constants` (WGS-84 by default) at
/// local sidereal angle `θ = GMST + lon`. Its inertial velocity is `ω × r` with
/// `ω = (0, 0, earth_rotation_rate)`, hence a zero z-component.
///
/// Arguments
/// ---------
/// * `epoch`: instant (UTC).
/// * `longitude`: east longitude in degrees.
/// * `latitude`: geodetic latitude in degrees.
/// * `altitude`: height above the ellipsoid in km.
/// * `constants`: ellipsoid and Earth rotation rate.
///
/// Return
/// ------
/// * `(position, velocity)` in km and km/s.
pub fn geodetic_to_eci(
    epoch: &Epoch,
    longitude: Degree,
    latitude: Degree,
    altitude: Kilometer,
    constants: &PhysicalConstants,
) -> (Vector3<f64>, Vector3<f64>) {
    let a = constants.earth_major_axis;
    let f = constants.earth_flattening;
    let lat = latitude * RADEG;
    let theta = lmst(epoch, longitude * RADEG);

    let c = 1.0 / (1.0 + f * (f - 2.0) * lat.sin().powi(2)).sqrt();
    let sq = c * (1.0 - f).powi(2);
    let achcp = (a * c + altitude) * lat.cos();

    let position = Vector3::new(
        achcp * theta.cos(),
        achcp * theta.sin(),
        (a * sq + altitude) * lat.sin(),
    );
    let omega = constants.earth_rotation_rate;
    let velocity = Vector3::new(-omega * position.y, omega * position.x, 0.0);

    (position, velocity)
}

/// Convert an ECI position (km) to geodetic longitude, latitude and height.
///
/// The position is normalised by the ellipsoid equatorial radius, longitude is the ECI
/// right ascension minus GMST wrapped to (−π, π], and the geodetic latitude is obtained by
/// fixed-point iteration starting from the geocentric latitude. The iteration stops when two
/// successive estimates differ by less than 1e-10 rad, or after
/// [`MAX_GEODETIC_ITERATIONS`].
///
/// Arguments
/// ---------
/// * `position`: ECI position in km.
/// * `epoch`: instant of the position.
/// * `constants`: reference ellipsoid.
///
/// Return
/// ------
/// * The [`Geodetic`] coordinates (degrees, km).
pub fn eci_to_geodetic(
    position: &Vector3<f64>,
    epoch: &Epoch,
    constants: &PhysicalConstants,
) -> Geodetic {
    let a = constants.earth_major_axis;
    let e2 = constants.ellipsoid_e2();
    let p = position / a;

    let lon = wrap_pi(p.y.atan2(p.x) - gmst(epoch));

    let r = p.x.hypot(p.y);
    let mut lat = p.z.atan2(r);
    let mut c = 1.0;
    for _ in 0..MAX_GEODETIC_ITERATIONS {
        let previous = lat;
        c = 1.0 / (1.0 - e2 * previous.sin().powi(2)).sqrt();
        lat = (p.z + c * e2 * previous.sin()).atan2(r);
        if (lat - previous).abs() < GEODETIC_LATITUDE_EPS {
            break;
        }
    }

    // near the poles r / cos(lat) degenerates, use the polar component instead
    let altitude = if lat.cos().abs() >= lat.sin().abs() {
        r / lat.cos() - c
    } else {
        p.z / lat.sin() - c * (1.0 - e2)
    };

    Geodetic {
        longitude: lon / RADEG,
        latitude: lat / RADEG,
        altitude: altitude * a,
    }
}

/// Direction and distance of a target as seen from a ground observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topocentric {
    /// Azimuth in degrees within [0, 360), from North through East.
    pub azimuth: Degree,
    /// Elevation above the local horizon in degrees.
    pub elevation: Degree,
    /// Slant range in km.
    pub range: Kilometer,
    /// Observer-to-target vector in the South-East-Zenith frame (km).
    pub sez: Vector3<f64>,
}

/// Compute azimuth, elevation and slant range of a target from an observer, both in ECI.
///
/// The observer-to-target vector is rotated into the local South-East-Zenith frame using the
/// local mean sidereal angle `θ = GMST + lon` and the observer latitude:
///
/// ```text
/// S =  sin φ cos θ · rx + sin φ sin θ · ry − cos φ · rz
/// E = −sin θ · rx + cos θ · ry
/// Z =  cos φ cos θ · rx + cos φ sin θ · ry + sin φ · rz
/// ```
///
/// Azimuth is `atan2(−E, S) + π` reduced to [0, 2π) and elevation is `asin(Z / range)`.
/// When the slant range is below [`MIN_SLANT_RANGE`] the target is reported directly
/// overhead (elevation 90°, azimuth 0°).
///
/// Arguments
/// ---------
/// * `epoch`: instant of both positions.
/// * `target`: target ECI position (km).
/// * `observer`: observer ECI position (km), see [`geodetic_to_eci`].
/// * `observer_longitude`, `observer_latitude`: observer geodetic coordinates in degrees.
///
/// Return
/// ------
/// * A [`Topocentric`] record.
pub fn eci_to_topocentric(
    epoch: &Epoch,
    target: &Vector3<f64>,
    observer: &Vector3<f64>,
    observer_longitude: Degree,
    observer_latitude: Degree,
) -> Topocentric {
    let lat = observer_latitude * RADEG;
    let theta = lmst(epoch, observer_longitude * RADEG);
    let r = target - observer;

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    let sez = Vector3::new(
        sin_lat * cos_theta * r.x + sin_lat * sin_theta * r.y - cos_lat * r.z,
        -sin_theta * r.x + cos_theta * r.y,
        cos_lat * cos_theta * r.x + cos_lat * sin_theta * r.y + sin_lat * r.z,
    );

    let range = magnitude(&r);
    if range < MIN_SLANT_RANGE {
        return Topocentric {
            azimuth: 0.0,
            elevation: FRAC_PI_2 / RADEG,
            range,
            sez,
        };
    }

    let azimuth = ((-sez.y).atan2(sez.x) + PI).rem_euclid(DPI);
    let elevation = (sez.z / range).clamp(-1.0, 1.0).asin();

    Topocentric {
        azimuth: azimuth / RADEG,
        elevation: elevation / RADEG,
        range,
        sez,
    }
}
