//! Error type shared by every fallible operation of the crate.

use thiserror::Error;

use crate::constants::{Kilometer, Minute};
use crate::sgp4::PropagatorMode;

#[derive(Error, Debug)]
pub enum SatError {
    #[error("Eccentricity out of range: {0} (expected 0 < e < 1 - 1e-6)")]
    EccentricityOutOfRange(f64),

    #[error("Mean motion out of range: {0} rad/min")]
    MeanMotionOutOfRange(f64),

    #[error("Inclination out of range: {0} rad (expected 0 < i < π)")]
    InclinationOutOfRange(f64),

    #[error("Propagator mode {0:?} is not supported")]
    UnsupportedMode(PropagatorMode),

    #[error("Satellite decayed {minutes} min after epoch (semi-major axis {semi_major_axis} Earth radii)")]
    Decayed {
        minutes: Minute,
        semi_major_axis: f64,
    },

    #[error("Modified eccentricity too low {minutes} min after epoch: {eccentricity} < -1e-3")]
    EccentricityTooLow { minutes: Minute, eccentricity: f64 },

    #[error("Hyperbolic orbit {minutes} min after epoch: e² = {elsq} >= 1")]
    HyperbolicOrbit { minutes: Minute, elsq: f64 },

    #[error("Satellite below the surface {minutes} min after epoch (radius {radius} km)")]
    SubSurfaceRadius { minutes: Minute, radius: Kilometer },

    #[error("Invalid observer location: {0}")]
    InvalidObserver(String),

    #[error("Invalid pass search parameters: {0}")]
    InvalidPassSearchParams(String),

    #[error("Invalid element set epoch: {0}")]
    InvalidEpoch(String),

    #[error("CSV element record error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON element record error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl SatError {
    /// Return `true` when the error means "the element set is not valid at this instant".
    ///
    /// These errors come out of [`crate::sgp4::Sgp4::propagate`] and only invalidate a
    /// single sample: a caller iterating over time can skip the instant and continue.
    pub fn is_propagation_invalid(&self) -> bool {
        matches!(
            self,
            SatError::Decayed { .. }
                | SatError::EccentricityTooLow { .. }
                | SatError::HyperbolicOrbit { .. }
                | SatError::SubSurfaceRadius { .. }
        )
    }
}

impl PartialEq for SatError {
    fn eq(&self, other: &Self) -> bool {
        use SatError::*;
        match (self, other) {
            (EccentricityOutOfRange(a), EccentricityOutOfRange(b)) => a == b,
            (MeanMotionOutOfRange(a), MeanMotionOutOfRange(b)) => a == b,
            (InclinationOutOfRange(a), InclinationOutOfRange(b)) => a == b,
            (UnsupportedMode(a), UnsupportedMode(b)) => a == b,
            (InvalidObserver(a), InvalidObserver(b)) => a == b,
            (InvalidPassSearchParams(a), InvalidPassSearchParams(b)) => a == b,
            (InvalidEpoch(a), InvalidEpoch(b)) => a == b,

            (
                Decayed {
                    minutes: m1,
                    semi_major_axis: a1,
                },
                Decayed {
                    minutes: m2,
                    semi_major_axis: a2,
                },
            ) => m1 == m2 && a1 == a2,
            (
                EccentricityTooLow {
                    minutes: m1,
                    eccentricity: e1,
                },
                EccentricityTooLow {
                    minutes: m2,
                    eccentricity: e2,
                },
            ) => m1 == m2 && e1 == e2,
            (
                HyperbolicOrbit {
                    minutes: m1,
                    elsq: e1,
                },
                HyperbolicOrbit {
                    minutes: m2,
                    elsq: e2,
                },
            ) => m1 == m2 && e1 == e2,
            (
                SubSurfaceRadius {
                    minutes: m1,
                    radius: r1,
                },
                SubSurfaceRadius {
                    minutes: m2,
                    radius: r2,
                },
            ) => m1 == m2 && r1 == r2,

            // Wrapped library errors are not comparable: same variant is enough
            (CsvError(_), CsvError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
