//! # Satellite state
//!
//! [`Satellite`] wraps an [`Sgp4`] propagator with the frame conversions needed by
//! observers: Cartesian ECI state, geodetic sub-point, topocentric look angles, apparent
//! visual magnitude and illumination (sunlit / Earth shadow) classification.
//!
//! Every query is a pure function of the instant and of the fixed element set; all methods
//! take `&self`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hifitime::Epoch;
//! use skypass::constants::PhysicalConstants;
//! use skypass::elements::{load_omm_csv, OrbitalElementSet};
//! use skypass::observers::Observer;
//! use skypass::satellite::Satellite;
//!
//! let records = load_omm_csv("stations.csv")?;
//! let elements = OrbitalElementSet::try_from(&records[0])?;
//! let sat = Satellite::new(elements, PhysicalConstants::default())?;
//!
//! let site = Observer::new(-3.7038, 40.4168, 0.65, Some("Madrid".into()))?;
//! let now = Epoch::from_gregorian_utc_hms(2024, 1, 15, 20, 0, 0);
//! let snap = sat.snapshot(&now, &site)?;
//! println!("{} at az {:.1}° el {:.1}°", snap.name, snap.azimuth, snap.elevation);
//! # Ok::<(), skypass::sat_errors::SatError>(())
//! ```

use std::fmt;

use hifitime::{Duration, Epoch};
use nalgebra::Vector3;
use tracing::debug;

use crate::constants::{Degree, Kilometer, Magnitude, PhysicalConstants};
use crate::elements::{OmmRecord, OrbitalElementSet};
use crate::observers::Observer;
use crate::ref_system::eci_to_geodetic;
use crate::sat_errors::SatError;
use crate::sgp4::{KeplerianSnapshot, Sgp4};
use crate::sun::solar_position;
use crate::vector_math::{angle_between, distance_to_line, dot, magnitude};

/// Intrinsic magnitude of a typical large LEO satellite (ISS class) at 1000 km, full phase.
pub const DEFAULT_INTRINSIC_MAGNITUDE: Magnitude = -1.8;

/// Solar elevation (degrees) above which an observer is considered in daylight.
pub const DEFAULT_TWILIGHT_DEG: Degree = -6.0;

/// Position and velocity in the ECI frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianState {
    /// km, or Earth radii once normalised
    pub position: Vector3<f64>,
    /// km/s
    pub velocity: Vector3<f64>,
}

impl CartesianState {
    /// Rotate an osculating [`KeplerianSnapshot`] from the orbital frame to ECI.
    ///
    /// With `u` the argument of latitude, `i` the inclination and `Ω` the node, the radial and
    /// transverse unit vectors are
    ///
    /// ```text
    /// U = ( −sinΩ cos i sin u + cosΩ cos u,  cosΩ cos i sin u + sinΩ cos u,  sin i sin u )
    /// V = ( −sinΩ cos i cos u − cosΩ sin u,  cosΩ cos i cos u − sinΩ sin u,  sin i cos u )
    /// ```
    ///
    /// and the state is `r = radius·U`, `v = ṙ·U + r u̇·V`.
    pub fn from_snapshot(kep: &KeplerianSnapshot) -> CartesianState {
        let (sin_t, cos_t) = kep.theta.sin_cos();
        let (sin_i, cos_i) = kep.inclination.sin_cos();
        let (sin_s, cos_s) = kep.node.sin_cos();

        let xmx = -sin_s * cos_i;
        let xmy = cos_s * cos_i;

        let u = Vector3::new(xmx * sin_t + cos_s * cos_t, xmy * sin_t + sin_s * cos_t, sin_i * sin_t);
        let v = Vector3::new(xmx * cos_t - cos_s * sin_t, xmy * cos_t - sin_s * sin_t, sin_i * cos_t);

        CartesianState {
            position: u * kep.radius,
            velocity: u * kep.radial_velocity + v * kep.transverse_velocity,
        }
    }

    /// Same state with the position expressed in units of `earth_radius` (velocity unchanged).
    pub fn normalized(&self, earth_radius: Kilometer) -> CartesianState {
        CartesianState {
            position: self.position / earth_radius,
            velocity: self.velocity,
        }
    }
}

/// Geodetic sub-satellite point and scalar state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubPoint {
    /// degrees, within (−180, 180]
    pub longitude: Degree,
    /// degrees, geodetic
    pub latitude: Degree,
    /// km above the ellipsoid
    pub altitude: Kilometer,
    /// inertial speed, km/s
    pub speed: f64,
    /// ECI position, km
    pub position: Vector3<f64>,
}

/// Topocentric direction of the satellite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    /// degrees, from North through East
    pub azimuth: Degree,
    /// degrees above the horizon
    pub elevation: Degree,
    /// slant range, km
    pub range: Kilometer,
}

/// Observing condition of a satellite at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Below the horizon cutoff.
    NotVisible,
    /// Above the horizon, but the observer is in daylight.
    Daylight,
    /// Above the horizon, observer in darkness, satellite sunlit.
    Visible,
    /// Above the horizon, observer in darkness, satellite in the Earth shadow.
    InShadow,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Visibility::NotVisible => "hidden",
            Visibility::Daylight => "daylight",
            Visibility::Visible => "visible",
            Visibility::InShadow => "unlit",
        };
        write!(f, "{label}")
    }
}

/// Classify the observing condition from precomputed geometry.
///
/// Arguments
/// ---------
/// * `sat_elevation`: satellite elevation in degrees.
/// * `sun_elevation`: solar elevation at the observer in degrees.
/// * `sat_position`, `sun_position`: geocentric vectors in a common frame (km).
/// * `horizon_deg`: elevation cutoff.
/// * `twilight_deg`: solar elevation above which it is daylight.
/// * `earth_radius`: radius of the shadow cylinder (km).
///
/// Return
/// ------
/// * [`Visibility::NotVisible`] below the cutoff, [`Visibility::Daylight`] when the Sun is above
///   the twilight threshold. Otherwise the satellite is sunlit when it is on the day side of
///   the terminator plane or farther than `earth_radius` from the Earth–Sun line.
pub fn classify_visibility(
    sat_elevation: Degree,
    sun_elevation: Degree,
    sat_position: &Vector3<f64>,
    sun_position: &Vector3<f64>,
    horizon_deg: Degree,
    twilight_deg: Degree,
    earth_radius: Kilometer,
) -> Visibility {
    if sat_elevation < horizon_deg {
        return Visibility::NotVisible;
    }
    if sun_elevation > twilight_deg {
        return Visibility::Daylight;
    }
    if dot(sat_position, sun_position) > 0.0
        || distance_to_line(sun_position, sat_position) > earth_radius
    {
        Visibility::Visible
    } else {
        Visibility::InShadow
    }
}

/// Apparent visual magnitude from the satellite / Sun / observer geometry.
///
/// The phase angle `ζ` (Sun–satellite–observer) is obtained from the law of cosines on the
/// triangle of the three points, then
///
/// ```text
/// m = m0 + 5·log10(d / 1000 km) − 2.5·log10(sin ζ + (π − ζ)·cos ζ)
/// ```
///
/// with `d` the satellite–observer distance (diffuse sphere phase law).
pub fn phase_magnitude(
    intrinsic: Magnitude,
    sat_position: &Vector3<f64>,
    sun_position: &Vector3<f64>,
    observer_position: &Vector3<f64>,
) -> Magnitude {
    let sat_obs = sat_position - observer_position;
    let sun_obs = sun_position - observer_position;

    let beta = angle_between(&sat_obs, &sun_obs);
    let a = magnitude(&sun_obs);
    let b = magnitude(&sat_obs);
    let c = (a * a + b * b - 2.0 * a * b * beta.cos()).sqrt();
    let zeta = ((b * b + c * c - a * a) / (2.0 * b * c)).clamp(-1.0, 1.0).acos();

    intrinsic + 5.0 * (b / 1000.0).log10()
        - 2.5 * (zeta.sin() + (std::f64::consts::PI - zeta) * zeta.cos()).log10()
}

/// Sub-point sample of a ground track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundTrackPoint {
    pub epoch: Epoch,
    pub longitude: Degree,
    pub latitude: Degree,
}

/// Everything a live-tracking display needs at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteSnapshot {
    pub name: String,
    pub epoch: Epoch,
    pub sub_point: SubPoint,
    pub azimuth: Degree,
    pub elevation: Degree,
    pub range: Kilometer,
}

/// A satellite ready to be propagated.
#[derive(Debug, Clone)]
pub struct Satellite {
    elements: OrbitalElementSet,
    propagator: Sgp4,
    constants: PhysicalConstants,
}

impl Satellite {
    /// Build the propagator for `elements`.
    ///
    /// Return
    /// ------
    /// * The satellite, or the construction error of [`Sgp4::new`].
    pub fn new(elements: OrbitalElementSet, constants: PhysicalConstants) -> Result<Satellite, SatError> {
        let propagator = Sgp4::new(&elements, constants)?;
        Ok(Satellite {
            elements,
            propagator,
            constants,
        })
    }

    /// Build a satellite from an OMM record with the default constants.
    pub fn from_record(record: &OmmRecord) -> Result<Satellite, SatError> {
        Satellite::new(OrbitalElementSet::try_from(record)?, PhysicalConstants::default())
    }

    pub fn name(&self) -> &str {
        &self.elements.name
    }

    pub fn elements(&self) -> &OrbitalElementSet {
        &self.elements
    }

    pub fn propagator(&self) -> &Sgp4 {
        &self.propagator
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// ECI position (km) and velocity (km/s) at `epoch`.
    pub fn state(&self, epoch: &Epoch) -> Result<CartesianState, SatError> {
        let kep = self.propagator.propagate(epoch)?;
        Ok(CartesianState::from_snapshot(&kep))
    }

    /// Geodetic sub-point, altitude and speed at `epoch`.
    ///
    /// See also
    /// --------
    /// * [`eci_to_geodetic`] – longitude corrected by GMST and wrapped to (−180°, 180°].
    pub fn position(&self, epoch: &Epoch) -> Result<SubPoint, SatError> {
        let state = self.state(epoch)?;
        let geo = eci_to_geodetic(&state.position, epoch, &self.constants);
        Ok(SubPoint {
            longitude: geo.longitude,
            latitude: geo.latitude,
            altitude: geo.altitude,
            speed: magnitude(&state.velocity),
            position: state.position,
        })
    }

    /// Azimuth, elevation and range of the satellite from `observer` at `epoch`.
    pub fn observer_look(&self, epoch: &Epoch, observer: &Observer) -> Result<LookAngles, SatError> {
        let state = self.state(epoch)?;
        let topo = observer.look_at(epoch, &state.position, &self.constants);
        Ok(LookAngles {
            azimuth: topo.azimuth,
            elevation: topo.elevation,
            range: topo.range,
        })
    }

    /// Apparent visual magnitude seen from `observer`, see [`phase_magnitude`].
    pub fn apparent_magnitude(
        &self,
        epoch: &Epoch,
        observer: &Observer,
        intrinsic: Magnitude,
    ) -> Result<Magnitude, SatError> {
        let state = self.state(epoch)?;
        let site = observer.position_eci(epoch, &self.constants);
        let sun = solar_position(epoch);
        Ok(phase_magnitude(intrinsic, &state.position, &sun.eci, &site.position))
    }

    /// Observing condition of the satellite from `observer` at `epoch`.
    ///
    /// Arguments
    /// ---------
    /// * `horizon_deg`: elevation cutoff of the satellite.
    /// * `twilight_deg`: solar elevation above which the observer is in daylight
    ///   (see [`DEFAULT_TWILIGHT_DEG`]).
    ///
    /// See also
    /// --------
    /// * [`classify_visibility`] – the decision rules.
    pub fn visibility(
        &self,
        epoch: &Epoch,
        observer: &Observer,
        horizon_deg: Degree,
        twilight_deg: Degree,
    ) -> Result<Visibility, SatError> {
        let state = self.state(epoch)?;
        let sat_look = observer.look_at(epoch, &state.position, &self.constants);
        if sat_look.elevation < horizon_deg {
            return Ok(Visibility::NotVisible);
        }

        let sun = solar_position(epoch);
        let sun_look = observer.look_at(epoch, &sun.eci, &self.constants);

        Ok(classify_visibility(
            sat_look.elevation,
            sun_look.elevation,
            &state.position,
            &sun.eci,
            horizon_deg,
            twilight_deg,
            self.constants.earth_major_axis,
        ))
    }

    /// Sample the sub-satellite point from `start` to `end` (inclusive) every `step`.
    ///
    /// Instants where the element set is not valid are skipped. A non-positive `step` or an
    /// `end` before `start` yields an empty track.
    pub fn ground_track(&self, start: &Epoch, end: &Epoch, step: Duration) -> Vec<GroundTrackPoint> {
        let mut track = Vec::new();
        if step.to_seconds() <= 0.0 {
            return track;
        }

        let mut epoch = *start;
        while epoch <= *end {
            match self.position(&epoch) {
                Ok(sub) => track.push(GroundTrackPoint {
                    epoch,
                    longitude: sub.longitude,
                    latitude: sub.latitude,
                }),
                Err(err) => debug!(%epoch, %err, "ground track sample skipped"),
            }
            epoch = epoch + step;
        }
        track
    }

    /// Sub-point and look angles at `epoch` in one call.
    pub fn snapshot(&self, epoch: &Epoch, observer: &Observer) -> Result<SatelliteSnapshot, SatError> {
        let sub_point = self.position(epoch)?;
        let topo = observer.look_at(epoch, &sub_point.position, &self.constants);
        Ok(SatelliteSnapshot {
            name: self.elements.name.clone(),
            epoch: *epoch,
            sub_point,
            azimuth: topo.azimuth,
            elevation: topo.elevation,
            range: topo.range,
        })
    }
}

#[cfg(test)]
mod satellite_test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::constants::{DPI, MINUTES_PER_DAY};

    fn iss() -> Satellite {
        let elements = OrbitalElementSet {
            name: "ISS".into(),
            object_id: "1998-067A".into(),
            catalog_id: 25544,
            epoch: Epoch::from_gregorian_utc_hms(2024, 1, 15, 12, 0, 0),
            eccentricity: 0.0005,
            inclination: 51.64_f64.to_radians(),
            right_ascension: 100f64.to_radians(),
            arg_perigee: 90f64.to_radians(),
            mean_anomaly: 270f64.to_radians(),
            mean_motion: 15.5 * DPI / MINUTES_PER_DAY,
            mean_motion_dot: 0.0,
            mean_motion_ddot: 0.0,
            bstar: 2.0e-4,
            rev_number: 0,
        };
        Satellite::new(elements, PhysicalConstants::default()).unwrap()
    }

    #[test]
    fn test_state_at_epoch() {
        let sat = iss();
        let epoch = sat.elements().epoch;
        let state = sat.state(&epoch).unwrap();
        assert_abs_diff_eq!(
            state.position,
            Vector3::new(-1168.71, 6694.35, -14.52),
            epsilon = 0.05
        );
        assert_abs_diff_eq!(state.velocity.norm(), 7.6619, epsilon = 1e-3);
        // near-circular: velocity almost perpendicular to position
        assert!(state.position.normalize().dot(&state.velocity.normalize()).abs() < 1e-2);

        let n = state.normalized(6378.137);
        assert_abs_diff_eq!(n.position.norm() * 6378.137, state.position.norm(), epsilon = 1e-9);
    }

    #[test]
    fn test_sub_point() {
        let sat = iss();
        let epoch = sat.elements().epoch + Duration::from_seconds(1800.0);
        let sub = sat.position(&epoch).unwrap();
        assert!(sub.latitude.abs() <= 51.7);
        assert!(sub.longitude > -180.0 && sub.longitude <= 180.0);
        assert!((400.0..440.0).contains(&sub.altitude), "alt = {}", sub.altitude);
        assert!((7.6..7.7).contains(&sub.speed));
    }

    #[test]
    fn test_visibility_labels() {
        assert_eq!(Visibility::NotVisible.to_string(), "hidden");
        assert_eq!(Visibility::Daylight.to_string(), "daylight");
        assert_eq!(Visibility::Visible.to_string(), "visible");
        assert_eq!(Visibility::InShadow.to_string(), "unlit");
    }

    #[test]
    fn test_classify_visibility_monotonic_in_sun_elevation() {
        let sun = Vector3::new(1.5e8, 0.0, 0.0);
        let shadowed = Vector3::new(-6800.0, 100.0, 0.0);
        let lit = Vector3::new(-6800.0, 7000.0, 0.0);
        let r = 6378.137;

        for (sat, night) in [(shadowed, Visibility::InShadow), (lit, Visibility::Visible)] {
            let mut previous = night;
            for k in -90..=90 {
                let sun_el = k as f64;
                let v = classify_visibility(30.0, sun_el, &sat, &sun, 0.0, -6.0, r);
                if sun_el > -6.0 {
                    assert_eq!(v, Visibility::Daylight);
                } else {
                    assert_eq!(v, night);
                }
                // once daylight, always daylight
                if previous == Visibility::Daylight {
                    assert_eq!(v, Visibility::Daylight);
                }
                previous = v;
            }
        }

        assert_eq!(
            classify_visibility(-1.0, -30.0, &lit, &sun, 0.0, -6.0, r),
            Visibility::NotVisible
        );
        // day side of the terminator plane
        let day_side = Vector3::new(100.0, 10.0, 0.0);
        assert_eq!(
            classify_visibility(10.0, -30.0, &day_side, &sun, 0.0, -6.0, r),
            Visibility::Visible
        );
    }

    #[test]
    fn test_day_side_is_never_in_shadow() {
        // same distance from the Earth-Sun line, opposite sides of the terminator plane
        let sun = Vector3::new(1.5e8, 2.0e7, -4.0e6);
        let axis = sun.normalize();
        let offset = axis.cross(&Vector3::z()).normalize() * 1500.0;
        let r = 6378.137;

        for along in [10.0, 3000.0, 6900.0] {
            let day_side = axis * along + offset;
            let night_side = -axis * along + offset;
            assert!(distance_to_line(&sun, &day_side) < r);

            assert_eq!(
                classify_visibility(25.0, -20.0, &day_side, &sun, 0.0, -6.0, r),
                Visibility::Visible
            );
            assert_eq!(
                classify_visibility(25.0, -20.0, &night_side, &sun, 0.0, -6.0, r),
                Visibility::InShadow
            );
        }
    }

    #[test]
    fn test_magnitude_dims_with_distance() {
        let sun = Vector3::new(1.5e8, 0.0, 0.0);
        let observer = Vector3::new(0.0, 6378.0, 0.0);
        let direction = Vector3::new(0.3, 1.0, 0.2).normalize();

        let mut previous = f64::NEG_INFINITY;
        for d in [400.0, 800.0, 1200.0, 2000.0, 3000.0] {
            let sat = observer + direction * d;
            let m = phase_magnitude(DEFAULT_INTRINSIC_MAGNITUDE, &sat, &sun, &observer);
            assert!(m > previous);
            previous = m;
        }

        // full phase at 1000 km gives the intrinsic magnitude - 2.5 log10(π)
        let sat = Vector3::new(-1000.0, 6378.0, 0.0);
        let m = phase_magnitude(DEFAULT_INTRINSIC_MAGNITUDE, &sat, &sun, &observer);
        assert_abs_diff_eq!(m, -1.8 - 2.5 * std::f64::consts::PI.log10(), epsilon = 1e-3);
    }

    #[test]
    fn test_ground_track() {
        let sat = iss();
        let start = sat.elements().epoch;
        let end = start + Duration::from_seconds(92.9 * 60.0);
        let track = sat.ground_track(&start, &end, Duration::from_seconds(60.0));
        assert_eq!(track.len(), 93);
        assert_eq!(track[0].epoch, start);
        assert!(track.iter().all(|p| p.latitude.abs() < 52.0));

        assert!(sat
            .ground_track(&end, &start, Duration::from_seconds(60.0))
            .is_empty());
        assert!(sat
            .ground_track(&start, &end, Duration::from_seconds(0.0))
            .is_empty());
    }

    #[test]
    fn test_snapshot() {
        let sat = iss();
        let site = Observer::new(-3.7038, 40.4168, 0.65, None).unwrap();
        let epoch = sat.elements().epoch;
        let snap = sat.snapshot(&epoch, &site).unwrap();
        let look = sat.observer_look(&epoch, &site).unwrap();
        assert_eq!(snap.name, "ISS");
        assert_abs_diff_eq!(snap.elevation, look.elevation, epsilon = 1e-12);
        assert_abs_diff_eq!(snap.azimuth, look.azimuth, epsilon = 1e-12);
        assert!((0.0..360.0).contains(&snap.azimuth));
    }
}
