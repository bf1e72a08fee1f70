#![allow(dead_code)]

use hifitime::Epoch;
use skypass::constants::{PhysicalConstants, DPI, MINUTES_PER_DAY};
use skypass::elements::OrbitalElementSet;
use skypass::observers::Observer;
use skypass::satellite::Satellite;

pub fn fixture_epoch() -> Epoch {
    Epoch::from_gregorian_utc_hms(2024, 1, 15, 12, 0, 0)
}

/// Element set in mean elements, angles in degrees and mean motion in rev/day.
#[allow(clippy::too_many_arguments)]
pub fn element_set(
    name: &str,
    eccentricity: f64,
    inclination: f64,
    right_ascension: f64,
    arg_perigee: f64,
    mean_anomaly: f64,
    rev_per_day: f64,
    bstar: f64,
) -> OrbitalElementSet {
    OrbitalElementSet {
        name: name.to_string(),
        object_id: String::new(),
        catalog_id: 0,
        epoch: fixture_epoch(),
        eccentricity,
        inclination: inclination.to_radians(),
        right_ascension: right_ascension.to_radians(),
        arg_perigee: arg_perigee.to_radians(),
        mean_anomaly: mean_anomaly.to_radians(),
        mean_motion: rev_per_day * DPI / MINUTES_PER_DAY,
        mean_motion_dot: 0.0,
        mean_motion_ddot: 0.0,
        bstar,
        rev_number: 0,
    }
}

/// ISS-like LEO: ~93 min period, ~414 km perigee.
pub fn iss_elements() -> OrbitalElementSet {
    element_set("ISS", 0.0005, 51.64, 100.0, 90.0, 270.0, 15.50, 2.0e-4)
}

/// Sun-synchronous-like polar LEO: ~101 min period, ~800 km perigee.
pub fn polar_elements() -> OrbitalElementSet {
    element_set("POLAR", 0.0012, 98.7, 50.0, 120.0, 240.0, 14.25, 1.0e-4)
}

pub fn iss() -> Satellite {
    Satellite::new(iss_elements(), PhysicalConstants::default()).unwrap()
}

pub fn polar() -> Satellite {
    Satellite::new(polar_elements(), PhysicalConstants::default()).unwrap()
}

pub fn madrid() -> Observer {
    Observer::new(-3.7038, 40.4168, 0.65, Some("Madrid".into())).unwrap()
}
