mod common;

use hifitime::Duration;
use skypass::constants::PhysicalConstants;
use skypass::passes::{find_passes, find_root, PassSearchParams};
use skypass::satellite::{Satellite, Visibility};
use skypass::time::add_minutes;

use crate::common::{fixture_epoch, iss, madrid, polar, polar_elements};

#[test]
fn test_polar_leo_over_madrid() {
    let sat = polar();
    let site = madrid();
    let params = PassSearchParams::default();

    let passes = find_passes(&sat, &fixture_epoch(), &site, &params).unwrap();

    assert!(
        (2..=7).contains(&passes.len()),
        "unexpected pass count {}",
        passes.len()
    );
    for pass in &passes {
        assert!(pass.set > pass.rise);
        assert!(pass.max_elevation > 10.0 && pass.max_elevation <= 90.0);
        assert!(pass.max_elevation_time >= pass.rise && pass.max_elevation_time <= pass.set);
        assert!(matches!(
            pass.visibility,
            Visibility::Visible | Visibility::Daylight
        ));
        // a LEO pass lasts minutes, not hours
        assert!(pass.duration() < Duration::from_seconds(20.0 * 60.0));

        let culmination = sat.observer_look(&pass.max_elevation_time, &site).unwrap();
        assert!((culmination.elevation - pass.max_elevation).abs() < 1e-9);
        for edge in [pass.rise, pass.set] {
            let look = sat.observer_look(&edge, &site).unwrap();
            assert!(look.elevation.abs() < 0.05, "edge elevation {}", look.elevation);
        }
    }
    for pair in passes.windows(2) {
        assert!(pair[0].set < pair[1].rise);
    }

    let first = &passes[0];
    assert_eq!(first.visibility, Visibility::Visible);
    if let Some(mag) = first.magnitude {
        assert!((-5.0..10.0).contains(&mag));
    }
}

#[test]
fn test_higher_cutoff_keeps_fewer_passes() {
    let sat = iss();
    let site = madrid();

    let low = find_passes(&sat, &fixture_epoch(), &site, &PassSearchParams::default()).unwrap();
    let strict = PassSearchParams::builder()
        .min_max_elevation_deg(30.0)
        .build()
        .unwrap();
    let high = find_passes(&sat, &fixture_epoch(), &site, &strict).unwrap();

    assert!(!low.is_empty());
    assert!(high.len() <= low.len());
    assert!(high.iter().all(|p| p.max_elevation > 30.0));
}

#[test]
fn test_search_continues_past_decay() {
    let mut elements = polar_elements();
    elements.bstar = 10.0;
    let sat = Satellite::new(elements, PhysicalConstants::default()).unwrap();
    let params = PassSearchParams::builder()
        .duration_hours(72.0)
        .build()
        .unwrap();

    let start = fixture_epoch();
    let first_invalid = (0..=72 * 60)
        .map(|k| add_minutes(&start, k as f64))
        .find(|epoch| sat.state(epoch).is_err())
        .expect("the orbit decays inside the search window");
    assert!(sat.state(&first_invalid).unwrap_err().is_propagation_invalid());

    let passes = find_passes(&sat, &start, &madrid(), &params).unwrap();
    assert!(passes.iter().any(|p| p.set < first_invalid));
    for pass in &passes {
        assert!(pass.set > pass.rise);
        assert!(pass.max_elevation > 10.0);
    }
}

#[test]
fn test_invalid_params_are_rejected() {
    let params = PassSearchParams {
        duration_hours: -1.0,
        ..PassSearchParams::default()
    };
    assert!(find_passes(&polar(), &fixture_epoch(), &madrid(), &params).is_err());
}

#[test]
fn test_root_without_sign_change_is_none() {
    assert!(find_root(|x| x * x + 0.5, -2.0, 2.0, 1e-9, 100).is_none());
}
