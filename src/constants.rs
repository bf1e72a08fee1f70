//! # Constants and type definitions for skypass
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **unit type
//! aliases** used throughout the crate, together with [`PhysicalConstants`], the read-only
//! configuration structure injected into the propagator and the frame transforms.
//!
//! ## Overview
//!
//! - Unit conversions (degrees ↔ radians, days ↔ minutes ↔ seconds, AU ↔ km)
//! - Reference epochs (J2000.0 as a Julian Date)
//! - Unit type aliases used across the crate
//! - The gravity model (WGS-72, as used by the simplified perturbation theory) and the
//!   reference ellipsoid (WGS-84) bundled as [`PhysicalConstants`]
//!
//! The gravity model and the ellipsoid are kept apart: the propagator works in
//! Earth radii of the WGS-72 model (`XKMPER = 6378.135 km`) while every ground-related
//! conversion uses the WGS-84 semi-major axis (`A = 6378.137 km`).

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of minutes in a day
pub const MINUTES_PER_DAY: f64 = 1_440.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Julian Date of J2000.0 (2000-01-01 12:00:00)
pub const JD2000: f64 = 2_451_545.0;

/// Number of days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Equatorial radius of the WGS-84 ellipsoid in kilometers
pub const EARTH_MAJOR_AXIS: f64 = 6_378.137;

/// Flattening of the WGS-84 ellipsoid
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Earth rotation rate in rad/s
pub const EARTH_ROTATION_RATE: f64 = 7.292_115e-5;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Time offset in minutes
pub type Minute = f64;
/// Julian Date (days)
pub type JulianDay = f64;
/// Visual magnitude (smaller is brighter)
pub type Magnitude = f64;

// -------------------------------------------------------------------------------------------------
// Injected configuration
// -------------------------------------------------------------------------------------------------

/// Process-wide physical constants shared by the propagator and the frame transforms.
///
/// The values are read-only after construction: every consumer receives its own copy
/// (the struct is `Copy`) so independent propagators and pass searches never share
/// mutable state.
///
/// Units
/// -----
/// * `ck2`, `ck4`: dimensionless zonal harmonic coefficients (½·J2·ae², -⅜·J4·ae⁴).
/// * `xke`: √(GM) in (Earth radii)^1.5 / minute.
/// * `qoms2t`: (q0 - s)⁴ in Earth radii⁴, atmospheric density parameter.
/// * `s`: density function parameter in Earth radii.
/// * `xj3`: third zonal harmonic J3.
/// * `xkmper`: Earth radius of the gravity model in km.
/// * `ae`: distance unit (1 Earth radius).
/// * `earth_major_axis`, `earth_flattening`: WGS-84 ellipsoid.
/// * `earth_rotation_rate`: rad/s.
///
/// See also
/// --------
/// * [`crate::sgp4::Sgp4`] – consumes the gravity model.
/// * [`crate::ref_system::geodetic_to_eci`] – consumes the ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub ck2: f64,
    pub ck4: f64,
    pub xke: f64,
    pub qoms2t: f64,
    pub s: f64,
    pub xj3: f64,
    pub xkmper: Kilometer,
    pub ae: f64,
    pub earth_major_axis: Kilometer,
    pub earth_flattening: f64,
    pub earth_rotation_rate: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        PhysicalConstants {
            ck2: 5.413_080e-4,
            ck4: 0.620_988_75e-6,
            xke: 0.743_669_161e-1,
            qoms2t: 1.880_279_16e-9,
            s: 1.012_229_28,
            xj3: -0.253_881e-5,
            xkmper: 6_378.135,
            ae: 1.0,
            earth_major_axis: EARTH_MAJOR_AXIS,
            earth_flattening: EARTH_FLATTENING,
            earth_rotation_rate: EARTH_ROTATION_RATE,
        }
    }
}

impl PhysicalConstants {
    /// `J3 / CK2`, used by the long-period periodic terms.
    pub fn a3ovk2(&self) -> f64 {
        -self.xj3 / self.ck2 * self.ae.powi(3)
    }

    /// Perigee-height-independent density parameter `s = ae·(1 + 78 km / XKMPER)`.
    pub fn ks(&self) -> f64 {
        self.ae * (1.0 + 78.0 / self.xkmper)
    }

    /// Square of the first eccentricity of the reference ellipsoid, `e² = f·(2 - f)`.
    pub fn ellipsoid_e2(&self) -> f64 {
        self.earth_flattening * (2.0 - self.earth_flattening)
    }

    /// Conversion factor from Earth radii per minute to km/s.
    pub fn velocity_scale(&self) -> f64 {
        self.xkmper / self.ae * MINUTES_PER_DAY / SECONDS_PER_DAY
    }
}
