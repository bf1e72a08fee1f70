//! # Mean element sets
//!
//! This module holds the input side of the propagation chain:
//!
//! - [`OmmRecord`]: one row of a CelesTrak-style Orbit Mean-Elements Message, with the
//!   upstream field names (`OBJECT_NAME`, `MEAN_MOTION`, …) and units (degrees, rev/day).
//!   Records are read from CSV ([`read_omm_csv`]) or JSON ([`read_omm_json`]) and written back
//!   to CSV ([`write_omm_csv`]).
//! - [`OrbitalElementSet`]: the same data in propagator units (radians, rad/min) with a parsed
//!   [`Epoch`]. Built with `OrbitalElementSet::try_from(&record)`.
//! - [`DerivedElements`]: the de-singularised ("Brouwer") mean motion and semi-major axis,
//!   the period and the perigee / apogee heights, computed once from an element set.
//!
//! ## Units
//!
//! | Quantity                 | [`OmmRecord`] | [`OrbitalElementSet`] |
//! |--------------------------|---------------|-----------------------|
//! | angles                   | degrees       | radians               |
//! | mean motion              | rev/day       | rad/min               |
//! | 1st derivative           | rev/day²      | rad/min²              |
//! | 2nd derivative           | rev/day³      | rad/min³              |
//! | B* drag term             | 1/Earth radii | 1/Earth radii         |
//!
//! ## Example
//!
//! ```rust
//! use skypass::elements::{read_omm_json, OrbitalElementSet, DerivedElements};
//! use skypass::constants::PhysicalConstants;
//!
//! let json = r#"[{"OBJECT_NAME":"ISS (ZARYA)","OBJECT_ID":"1998-067A",
//!   "EPOCH":"2024-01-15T12:00:00.000000","MEAN_MOTION":15.5,"ECCENTRICITY":0.0005,
//!   "INCLINATION":51.64,"RA_OF_ASC_NODE":100.0,"ARG_OF_PERICENTER":90.0,
//!   "MEAN_ANOMALY":270.0,"EPHEMERIS_TYPE":0,"CLASSIFICATION_TYPE":"U",
//!   "NORAD_CAT_ID":25544,"ELEMENT_SET_NO":999,"REV_AT_EPOCH":43000,
//!   "BSTAR":0.0002,"MEAN_MOTION_DOT":0.0001,"MEAN_MOTION_DDOT":0}]"#;
//!
//! let records = read_omm_json(json)?;
//! let elements = OrbitalElementSet::try_from(&records[0])?;
//! let derived = DerivedElements::from_element_set(&elements, &PhysicalConstants::default())?;
//! assert!((derived.period - 92.9).abs() < 0.1);
//! # Ok::<(), skypass::sat_errors::SatError>(())
//! ```

use std::io::{Read, Write};
use std::path::Path;

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::constants::{
    Kilometer, Minute, PhysicalConstants, Radian, DPI, MINUTES_PER_DAY, RADEG,
};
use crate::kepler::wrap_pi;
use crate::sat_errors::SatError;
use crate::time::gmst;

/// Upper bound on the eccentricity accepted by the propagator.
pub const ECC_LIMIT_HIGH: f64 = 1.0 - 1.0e-6;

/// Accepted mean motion range in rev/day.
pub const MEAN_MOTION_RANGE_REV_PER_DAY: (f64, f64) = (0.0035, 18.0);

/// One Orbit Mean-Elements Message record, with CelesTrak field names and units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct OmmRecord {
    pub object_name: String,
    pub object_id: String,
    /// `YYYY-MM-DDTHH:MM:SS[.ffffff]`, UTC.
    pub epoch: String,
    /// rev/day
    pub mean_motion: f64,
    pub eccentricity: f64,
    /// degrees
    pub inclination: f64,
    /// degrees
    pub ra_of_asc_node: f64,
    /// degrees
    pub arg_of_pericenter: f64,
    /// degrees
    pub mean_anomaly: f64,
    pub ephemeris_type: u8,
    pub classification_type: String,
    pub norad_cat_id: u32,
    pub element_set_no: u32,
    pub rev_at_epoch: u32,
    pub bstar: f64,
    /// rev/day²
    pub mean_motion_dot: f64,
    /// rev/day³
    pub mean_motion_ddot: f64,
}

/// Mean orbital elements of one satellite at a reference epoch, in propagator units.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalElementSet {
    pub name: String,
    pub object_id: String,
    pub catalog_id: u32,
    pub epoch: Epoch,
    pub eccentricity: f64,
    /// radians
    pub inclination: Radian,
    /// Right ascension of the ascending node, radians.
    pub right_ascension: Radian,
    /// radians
    pub arg_perigee: Radian,
    /// radians
    pub mean_anomaly: Radian,
    /// rad/min
    pub mean_motion: f64,
    /// rad/min²
    pub mean_motion_dot: f64,
    /// rad/min³
    pub mean_motion_ddot: f64,
    /// B* drag term, 1/Earth radii.
    pub bstar: f64,
    pub rev_number: u32,
}

impl OrbitalElementSet {
    /// Check the hard preconditions of the propagator.
    ///
    /// Return
    /// ------
    /// * `Ok(())` when `0 < e < 1 − 1e-6`, `0.0035·2π/1440 < n < 18·2π/1440` rad/min and
    ///   `0 < i < π`; the matching `*OutOfRange` error otherwise.
    pub fn validate(&self) -> Result<(), SatError> {
        let e = self.eccentricity;
        if !(e > 0.0 && e < ECC_LIMIT_HIGH) {
            return Err(SatError::EccentricityOutOfRange(e));
        }

        let n = self.mean_motion;
        let (n_min, n_max) = MEAN_MOTION_RANGE_REV_PER_DAY;
        if !(n > n_min * DPI / MINUTES_PER_DAY && n < n_max * DPI / MINUTES_PER_DAY) {
            return Err(SatError::MeanMotionOutOfRange(n));
        }

        let i = self.inclination;
        if !(i > 0.0 && i < std::f64::consts::PI) {
            return Err(SatError::InclinationOutOfRange(i));
        }
        Ok(())
    }
}

impl TryFrom<&OmmRecord> for OrbitalElementSet {
    type Error = SatError;

    fn try_from(record: &OmmRecord) -> Result<Self, Self::Error> {
        let rev_per_day = DPI / MINUTES_PER_DAY;

        Ok(OrbitalElementSet {
            name: record.object_name.trim().to_string(),
            object_id: record.object_id.clone(),
            catalog_id: record.norad_cat_id,
            epoch: parse_omm_epoch(&record.epoch)?,
            eccentricity: record.eccentricity,
            inclination: record.inclination * RADEG,
            right_ascension: record.ra_of_asc_node * RADEG,
            arg_perigee: record.arg_of_pericenter * RADEG,
            mean_anomaly: record.mean_anomaly * RADEG,
            mean_motion: record.mean_motion * rev_per_day,
            mean_motion_dot: record.mean_motion_dot * rev_per_day / MINUTES_PER_DAY,
            mean_motion_ddot: record.mean_motion_ddot * rev_per_day / MINUTES_PER_DAY.powi(2),
            bstar: record.bstar,
            rev_number: record.rev_at_epoch,
        })
    }
}

/// Parse an OMM epoch string (`YYYY-MM-DDTHH:MM:SS[.fffffffff][Z]`, UTC).
///
/// Fractional seconds are read up to nanosecond resolution; extra digits are truncated.
pub fn parse_omm_epoch(raw: &str) -> Result<Epoch, SatError> {
    let invalid = || SatError::InvalidEpoch(raw.to_string());

    let text = raw.trim().trim_end_matches('Z');
    let (date, time) = text.split_once('T').ok_or_else(invalid)?;

    let date_fields: Vec<&str> = date.split('-').collect();
    let time_fields: Vec<&str> = time.split(':').collect();
    if date_fields.len() != 3 || time_fields.len() != 3 {
        return Err(invalid());
    }

    let year: i32 = date_fields[0].parse().map_err(|_| invalid())?;
    let month: u8 = date_fields[1].parse().map_err(|_| invalid())?;
    let day: u8 = date_fields[2].parse().map_err(|_| invalid())?;
    let hour: u8 = time_fields[0].parse().map_err(|_| invalid())?;
    let minute: u8 = time_fields[1].parse().map_err(|_| invalid())?;

    let (whole, fraction) = time_fields[2]
        .split_once('.')
        .unwrap_or((time_fields[2], ""));
    let second: u8 = whole.parse().map_err(|_| invalid())?;

    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let nanos: u32 = if fraction.is_empty() {
        0
    } else {
        let digits: String = fraction.chars().chain(std::iter::repeat('0')).take(9).collect();
        digits.parse().map_err(|_| invalid())?
    };

    Epoch::maybe_from_gregorian_utc(year, month, day, hour, minute, second, nanos)
        .map_err(|e| SatError::InvalidEpoch(format!("{raw}: {e}")))
}

/// Read OMM records from CSV text with a header row (CelesTrak `FORMAT=csv`).
pub fn read_omm_csv<R: Read>(reader: R) -> Result<Vec<OmmRecord>, SatError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let records = csv_reader
        .deserialize::<OmmRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Read OMM records from a CSV file.
pub fn load_omm_csv<P: AsRef<Path>>(path: P) -> Result<Vec<OmmRecord>, SatError> {
    let file = std::fs::File::open(path)?;
    read_omm_csv(file)
}

/// Read OMM records from a JSON array (CelesTrak `FORMAT=json`).
pub fn read_omm_json(json: &str) -> Result<Vec<OmmRecord>, SatError> {
    Ok(serde_json::from_str(json)?)
}

/// Write OMM records as CSV with a header row, in the column order of [`OmmRecord`].
pub fn write_omm_csv<W: Write>(writer: W, records: &[OmmRecord]) -> Result<(), SatError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Quantities derived once from an [`OrbitalElementSet`].
///
/// The mean motion of an element set is a "Kozai" mean motion: the first-order J2 secular
/// effect is folded in. The original (de-singularised) mean motion `n0''` and semi-major axis
/// `a0''` are recovered with
///
/// ```text
/// a1 = (ke / n0)^(2/3)
/// δ1 = 3/2 · k2 / a1² · (3cos²i − 1) / (1 − e²)^(3/2)
/// a0 = a1 · (1 − δ1/3 − δ1² − 134/81·δ1³)
/// δ0 = 3/2 · k2 / a0² · (3cos²i − 1) / (1 − e²)^(3/2)
/// n0'' = n0 / (1 + δ0)        a0'' = a0 / (1 − δ0)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedElements {
    pub epoch: Epoch,
    /// De-singularised mean motion `n0''`, rad/min.
    pub original_mean_motion: f64,
    /// De-singularised semi-major axis `a0''`, Earth radii.
    pub semi_major_axis: f64,
    /// Anomalistic period, minutes.
    pub period: Minute,
    /// Perigee height above the gravity-model radius, km.
    pub perigee: Kilometer,
    /// Apogee height above the gravity-model radius, km.
    pub apogee: Kilometer,
    /// Right ascension of the node minus GMST at epoch, wrapped to (−π, π].
    pub right_ascension_longitude: Radian,
}

impl DerivedElements {
    /// Derive the working elements from a validated element set.
    ///
    /// Arguments
    /// ---------
    /// * `elements`: the mean element set.
    /// * `constants`: gravity model (`xke`, `ck2`, `xkmper`, `ae`).
    ///
    /// Return
    /// ------
    /// * The derived elements, or the validation error of [`OrbitalElementSet::validate`].
    pub fn from_element_set(
        elements: &OrbitalElementSet,
        constants: &PhysicalConstants,
    ) -> Result<DerivedElements, SatError> {
        elements.validate()?;

        let e0 = elements.eccentricity;
        let n0 = elements.mean_motion;
        let cos_i = elements.inclination.cos();

        let a1 = (constants.xke / n0).powf(2.0 / 3.0);
        let betao2 = 1.0 - e0 * e0;
        let temp0 = 1.5 * constants.ck2 * (3.0 * cos_i * cos_i - 1.0) / (betao2 * betao2.sqrt());

        let del1 = temp0 / (a1 * a1);
        let a0 = a1 * (1.0 - del1 * (1.0 / 3.0 + del1 * (1.0 + del1 * 134.0 / 81.0)));
        let del0 = temp0 / (a0 * a0);

        let original_mean_motion = n0 / (1.0 + del0);
        let semi_major_axis = a0 / (1.0 - del0);

        Ok(DerivedElements {
            epoch: elements.epoch,
            original_mean_motion,
            semi_major_axis,
            period: DPI / original_mean_motion,
            perigee: (semi_major_axis * (1.0 - e0) - constants.ae) * constants.xkmper,
            apogee: (semi_major_axis * (1.0 + e0) - constants.ae) * constants.xkmper,
            right_ascension_longitude: wrap_pi(elements.right_ascension - gmst(&elements.epoch)),
        })
    }

    /// Semi-major axis in km.
    pub fn semi_major_axis_km(&self, constants: &PhysicalConstants) -> Kilometer {
        self.semi_major_axis * constants.xkmper / constants.ae
    }
}
