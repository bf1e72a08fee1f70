//! # Ground observer
//!
//! A ground site given by its geodetic coordinates on the WGS-84 ellipsoid, and the
//! per-instant inertial state derived from it.
//!
//! ## Units
//!
//! - Longitude: **degrees**, east positive.
//! - Latitude: **degrees**, geodetic.
//! - Altitude: **km** above the ellipsoid.
//! - ECI position / velocity: **km** and **km/s**.
//!
//! The inertial state is recomputed for every query ([`Observer::position_eci`]) since the site
//! rotates with the Earth; nothing is cached across instants.
//!
//! ## Example
//!
//! ```rust
//! use hifitime::Epoch;
//! use skypass::constants::PhysicalConstants;
//! use skypass::observers::Observer;
//!
//! let madrid = Observer::new(-3.7038, 40.4168, 0.65, Some("Madrid".into()))?;
//! let t = Epoch::from_gregorian_utc_hms(2024, 1, 15, 20, 0, 0);
//! let state = madrid.position_eci(&t, &PhysicalConstants::default());
//! assert!((state.position.norm() - 6370.0).abs() < 10.0);
//! # Ok::<(), skypass::sat_errors::SatError>(())
//! ```

use hifitime::Epoch;
use nalgebra::Vector3;

use crate::constants::{Degree, Kilometer, PhysicalConstants};
use crate::ref_system::{eci_to_topocentric, geodetic_to_eci, Topocentric};
use crate::sat_errors::SatError;

/// A ground observing site.
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    /// East longitude in degrees.
    pub longitude: Degree,
    /// Geodetic latitude in degrees.
    pub latitude: Degree,
    /// Height above the ellipsoid in km.
    pub altitude: Kilometer,
    pub name: Option<String>,
}

/// Inertial state of an [`Observer`] at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverPosition {
    pub epoch: Epoch,
    /// ECI position in km.
    pub position: Vector3<f64>,
    /// ECI velocity in km/s (Earth rotation only).
    pub velocity: Vector3<f64>,
}

impl Observer {
    /// Create a new observer from geodetic coordinates.
    ///
    /// Arguments
    /// ---------
    /// * `longitude`: east longitude in degrees.
    /// * `latitude`: geodetic latitude in degrees, within [−90, 90].
    /// * `altitude`: height above the ellipsoid in km.
    /// * `name`: optional site name.
    ///
    /// Return
    /// ------
    /// * The observer, or [`SatError::InvalidObserver`] if a coordinate is not finite or the
    ///   latitude is out of range.
    pub fn new(
        longitude: Degree,
        latitude: Degree,
        altitude: Kilometer,
        name: Option<String>,
    ) -> Result<Observer, SatError> {
        if !(longitude.is_finite() && latitude.is_finite() && altitude.is_finite()) {
            return Err(SatError::InvalidObserver(format!(
                "non-finite coordinates ({longitude}, {latitude}, {altitude})"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SatError::InvalidObserver(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        Ok(Observer {
            longitude,
            latitude,
            altitude,
            name,
        })
    }

    /// ECI position and velocity of the site at `epoch`.
    ///
    /// See also
    /// --------
    /// * [`geodetic_to_eci`] – the underlying conversion.
    pub fn position_eci(&self, epoch: &Epoch, constants: &PhysicalConstants) -> ObserverPosition {
        let (position, velocity) = geodetic_to_eci(
            epoch,
            self.longitude,
            self.latitude,
            self.altitude,
            constants,
        );
        ObserverPosition {
            epoch: *epoch,
            position,
            velocity,
        }
    }

    /// Azimuth, elevation and range of an ECI target (km) seen from this site at `epoch`.
    pub fn look_at(
        &self,
        epoch: &Epoch,
        target: &Vector3<f64>,
        constants: &PhysicalConstants,
    ) -> Topocentric {
        let site = self.position_eci(epoch, constants);
        eci_to_topocentric(
            epoch,
            target,
            &site.position,
            self.longitude,
            self.latitude,
        )
    }
}

#[cfg(test)]
mod observer_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_observer_constructor() {
        let observer = Observer::new(0.0, 0.0, 0.0, None).unwrap();
        assert_eq!(observer.longitude, 0.0);
        assert!(observer.name.is_none());

        let observer = Observer::new(-70.74, -30.2446, 2.647, Some("Rubin Observatory".into()))
            .unwrap();
        assert_eq!(observer.name.as_deref(), Some("Rubin Observatory"));
        assert_eq!(observer.latitude, -30.2446);
    }

    #[test]
    fn test_observer_rejects_invalid() {
        assert!(matches!(
            Observer::new(0.0, 91.0, 0.0, None),
            Err(SatError::InvalidObserver(_))
        ));
        assert!(matches!(
            Observer::new(f64::NAN, 10.0, 0.0, None),
            Err(SatError::InvalidObserver(_))
        ));
    }

    #[test]
    fn test_position_eci_on_ellipsoid() {
        let constants = PhysicalConstants::default();
        let t = Epoch::from_gregorian_utc_hms(2024, 1, 15, 12, 0, 0);

        let pole = Observer::new(0.0, 90.0, 0.0, None).unwrap();
        let state = pole.position_eci(&t, &constants);
        // polar radius b = a (1 - f)
        assert_abs_diff_eq!(state.position.z, 6356.752314, epsilon = 1e-5);
        assert_abs_diff_eq!(state.velocity.norm(), 0.0, epsilon = 1e-9);

        let equator = Observer::new(45.0, 0.0, 1.0, None).unwrap();
        let state = equator.position_eci(&t, &constants);
        assert_abs_diff_eq!(state.position.norm(), 6379.137, epsilon = 1e-9);
        assert_eq!(state.epoch, t);
    }

    #[test]
    fn test_look_at_zenith() {
        let constants = PhysicalConstants::default();
        let t = Epoch::from_gregorian_utc_hms(2024, 1, 15, 12, 0, 0);
        let site = Observer::new(12.0, 0.0, 0.0, None).unwrap();
        let p = site.position_eci(&t, &constants).position;
        let topo = site.look_at(&t, &(p * 1.1), &constants);
        assert_abs_diff_eq!(topo.elevation, 90.0, epsilon = 1e-6);
    }
}
