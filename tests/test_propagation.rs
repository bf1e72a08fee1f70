mod common;

use approx::assert_abs_diff_eq;
use hifitime::{Duration, Epoch};
use nalgebra::Vector3;
use skypass::constants::PhysicalConstants;
use skypass::ref_system::{ecef_to_eci, eci_to_ecef, eci_to_geodetic, geodetic_to_eci};
use skypass::sat_errors::SatError;
use skypass::satellite::Satellite;
use skypass::sgp4::{PropagatorMode, Sgp4};
use skypass::time::add_minutes;

use crate::common::{element_set, fixture_epoch, iss, iss_elements};

#[test]
fn test_identity_at_epoch() {
    let elements = iss_elements();
    let sgp4 = Sgp4::new(&elements, PhysicalConstants::default()).unwrap();
    let kep = sgp4.propagate(&elements.epoch).unwrap();

    assert_abs_diff_eq!(kep.mean_anomaly, elements.mean_anomaly, epsilon = 1e-12);
    assert_abs_diff_eq!(kep.arg_perigee, elements.arg_perigee, epsilon = 1e-12);
    assert_abs_diff_eq!(kep.mean_node, elements.right_ascension, epsilon = 1e-12);
}

#[test]
fn test_iss_semi_major_axis_after_45_minutes() {
    let elements = iss_elements();
    let sgp4 = Sgp4::new(&elements, PhysicalConstants::default()).unwrap();
    let kep = sgp4.propagate(&add_minutes(&elements.epoch, 45.0)).unwrap();

    assert_abs_diff_eq!(kep.semi_major_axis, 6795.367, epsilon = 1.0);
    assert_abs_diff_eq!(kep.radius, 6794.707, epsilon = 1.0);
}

#[test]
fn test_published_vector_catalog_00005() {
    // 1 00005U 58002B   00179.78495062  .00000023  00000-0  28098-4 0  4753
    // 2 00005  34.2682 348.7242 1859667 331.7664  19.3264 10.82419157413667
    let mut elements = element_set(
        "00005", 0.1859667, 34.2682, 348.7242, 331.7664, 19.3264, 10.82419157, 2.8098e-5,
    );
    elements.catalog_id = 5;
    elements.epoch =
        Epoch::from_gregorian_utc_at_midnight(2000, 1, 1) + Duration::from_days(178.78495062);
    let sat = Satellite::new(elements, PhysicalConstants::default()).unwrap();
    assert_eq!(sat.propagator().mode(), PropagatorMode::NearNormal);

    for (minutes, expected) in [
        (0.0, Vector3::new(7022.46529266, -1400.08296755, 0.03995155)),
        (360.0, Vector3::new(-7154.03120202, -3783.17682504, -3536.19412294)),
        (720.0, Vector3::new(-7134.59340119, 6531.68641334, 3260.27186483)),
    ] {
        let epoch = add_minutes(&sat.elements().epoch, minutes);
        let position = sat.state(&epoch).unwrap().position;
        assert_abs_diff_eq!(position, expected, epsilon = 1e-3);
    }
}

#[test]
fn test_circular_equatorial_radius_is_constant() {
    let mut elements = element_set("CIRC", 1.0e-7, 0.0, 0.0, 0.0, 0.0, 15.0, 0.0);
    elements.inclination = 1.0e-4;
    let sat = Satellite::new(elements, PhysicalConstants::default()).unwrap();

    let start = fixture_epoch();
    let radii: Vec<f64> = (0..600)
        .map(|k| {
            let epoch = start + Duration::from_seconds(k as f64 * 7.0 * 60.0);
            sat.state(&epoch).unwrap().position.norm()
        })
        .collect();

    let min = radii.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = radii.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(max - min < 0.05, "radius spread = {} km", max - min);
    assert_abs_diff_eq!(min, 6941.87, epsilon = 0.1);
}

#[test]
fn test_unsupported_modes_are_errors() {
    let gps = element_set("GPS", 0.01, 55.0, 0.0, 0.0, 0.0, 2.005, 0.0);
    assert_eq!(
        Sgp4::new(&gps, PhysicalConstants::default()).unwrap_err(),
        SatError::UnsupportedMode(PropagatorMode::DeepSpace)
    );

    let low = element_set("LOW", 0.001, 51.6, 0.0, 0.0, 0.0, 16.3, 0.0);
    assert_eq!(
        Sgp4::new(&low, PhysicalConstants::default()).unwrap_err(),
        SatError::UnsupportedMode(PropagatorMode::NearSimplified)
    );
}

#[test]
fn test_propagation_invalid_far_from_epoch_is_recoverable() {
    let decaying = element_set("DRAG", 0.0005, 51.64, 100.0, 90.0, 270.0, 15.5, 0.5);
    let sat = Satellite::new(decaying, PhysicalConstants::default()).unwrap();

    let later = fixture_epoch() + Duration::from_seconds(60.0 * 86400.0);
    let err = sat.state(&later).unwrap_err();
    assert!(err.is_propagation_invalid(), "unexpected error {err:?}");

    // still valid close to epoch
    assert!(sat.state(&fixture_epoch()).is_ok());
}

#[test]
fn test_frame_round_trips_along_the_orbit() {
    let sat = iss();
    let constants = PhysicalConstants::default();
    for k in 0..24 {
        let epoch = fixture_epoch() + Duration::from_seconds(k as f64 * 300.0);
        let position = sat.state(&epoch).unwrap().position;

        let back = ecef_to_eci(&epoch, &eci_to_ecef(&epoch, &position));
        assert_abs_diff_eq!(back, position, epsilon = 1e-9 * position.norm());

        let geo = eci_to_geodetic(&position, &epoch, &constants);
        let (again, _) =
            geodetic_to_eci(&epoch, geo.longitude, geo.latitude, geo.altitude, &constants);
        assert_abs_diff_eq!(again, position, epsilon = 1e-3);
    }
}
