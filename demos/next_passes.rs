//! Print the next passes of every satellite of a CelesTrak OMM CSV file.
//!
//! ```text
//! cargo run --example next_passes -- visual.csv 40.4168 -3.7038 0.65
//! ```
//!
//! Without arguments a built-in ISS element set and a Madrid observer are used.
use std::env;

use hifitime::Epoch;
use skypass::elements::{load_omm_csv, read_omm_csv, OmmRecord};
use skypass::observers::Observer;
use skypass::passes::{find_passes, PassSearchParams};
use skypass::sat_errors::SatError;
use skypass::satellite::Satellite;

const BUILTIN: &str = "\
OBJECT_NAME,OBJECT_ID,EPOCH,MEAN_MOTION,ECCENTRICITY,INCLINATION,RA_OF_ASC_NODE,ARG_OF_PERICENTER,MEAN_ANOMALY,EPHEMERIS_TYPE,CLASSIFICATION_TYPE,NORAD_CAT_ID,ELEMENT_SET_NO,REV_AT_EPOCH,BSTAR,MEAN_MOTION_DOT,MEAN_MOTION_DDOT
ISS (ZARYA),1998-067A,2024-01-15T12:00:00.000000,15.5,.0005,51.64,100,90,270,0,U,25544,999,43515,.0002,0,0
";

fn main() -> Result<(), SatError> {
    let args: Vec<String> = env::args().skip(1).collect();

    let records: Vec<OmmRecord> = match args.first() {
        Some(path) => load_omm_csv(path)?,
        None => read_omm_csv(BUILTIN.as_bytes())?,
    };

    let coord = |i: usize, default: f64| {
        args.get(i)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(default)
    };
    let site = Observer::new(coord(2, -3.7038), coord(1, 40.4168), coord(3, 0.65), None)?;

    let params = PassSearchParams::default();
    println!("{params:#}");

    for record in &records {
        let sat = match Satellite::from_record(record) {
            Ok(sat) => sat,
            Err(err) => {
                println!("{}: skipped ({err})", record.object_name);
                continue;
            }
        };

        let start: Epoch = sat.elements().epoch;
        let snap = sat.snapshot(&start, &site)?;
        println!(
            "\n{} at {}: lon {:.2}° lat {:.2}° alt {:.1} km, az {:.1}° el {:.1}°",
            snap.name,
            snap.epoch,
            snap.sub_point.longitude,
            snap.sub_point.latitude,
            snap.sub_point.altitude,
            snap.azimuth,
            snap.elevation
        );

        for pass in find_passes(&sat, &start, &site, &params)? {
            println!("  {pass}");
        }
    }
    Ok(())
}
