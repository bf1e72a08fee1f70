use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hifitime::Epoch;

use skypass::constants::{PhysicalConstants, DPI, MINUTES_PER_DAY};
use skypass::elements::OrbitalElementSet;
use skypass::observers::Observer;
use skypass::passes::{find_passes, PassSearchParams};
use skypass::satellite::Satellite;

fn polar() -> Satellite {
    let elements = OrbitalElementSet {
        name: "POLAR".into(),
        object_id: String::new(),
        catalog_id: 0,
        epoch: Epoch::from_gregorian_utc_hms(2024, 1, 15, 12, 0, 0),
        eccentricity: 0.0012,
        inclination: 98.7_f64.to_radians(),
        right_ascension: 50f64.to_radians(),
        arg_perigee: 120f64.to_radians(),
        mean_anomaly: 240f64.to_radians(),
        mean_motion: 14.25 * DPI / MINUTES_PER_DAY,
        mean_motion_dot: 0.0,
        mean_motion_ddot: 0.0,
        bstar: 1.0e-4,
        rev_number: 0,
    };
    Satellite::new(elements, PhysicalConstants::default()).unwrap()
}

fn bench_find_passes(c: &mut Criterion) {
    let sat = polar();
    let site = Observer::new(-3.7038, 40.4168, 0.65, None).unwrap();
    let start = sat.elements().epoch;
    let params = PassSearchParams::default();

    let mut group = c.benchmark_group("find_passes");
    group.sample_size(10);
    group.bench_function("polar_24h_madrid", |b| {
        b.iter(|| find_passes(black_box(&sat), &start, &site, &params).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_find_passes);
criterion_main!(benches);
