//! # Time scales
//!
//! Julian Date and days-since-J2000 conversions, Greenwich Mean Sidereal Time (GMST) and
//! local mean sidereal time. Instants are [`hifitime::Epoch`] values interpreted in UTC;
//! UTC stands in for UT1 (no Earth orientation parameters are applied).
//!
//! The numeric entry points ([`julian_day_from_calendar`], [`gmst_from_days`]) work on plain
//! `f64` so that NaN inputs flow through as NaN outputs.

use hifitime::{Duration, Epoch};

use crate::constants::{
    JulianDay, Minute, Radian, DAYS_PER_CENTURY, DPI, JD2000, RADEG, SECONDS_PER_DAY,
};

/// Julian Date of a proleptic Gregorian calendar date (UTC).
///
/// Uses the integer-arithmetic calendar formula (Fliegel & Van Flandern) for the day number
/// at noon, then adds the fraction of day from the time of day.
///
/// Arguments
/// ---------
/// * `year`, `month`, `day`: calendar date (month in `1..=12`).
/// * `hour`, `minute`: time of day.
/// * `second`: seconds, including the fractional part.
///
/// Return
/// ------
/// * The Julian Date in days.
pub fn julian_day_from_calendar(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: f64,
) -> JulianDay {
    let year = year as f64;
    let month = month as f64;

    let a = ((14.0 - month) / 12.0).floor();
    let y = year + 4800.0 - a;
    let m = month + 12.0 * a - 3.0;

    day as f64 + ((153.0 * m + 2.0) / 5.0).floor() + 365.0 * y + (y / 4.0).floor()
        - (y / 100.0).floor()
        + (y / 400.0).floor()
        - 32045.0
        + (hour as f64 - 12.0) / 24.0
        + minute as f64 / 1440.0
        + second / SECONDS_PER_DAY
}

/// Julian Date (UTC) of an instant.
pub fn julian_day(epoch: &Epoch) -> JulianDay {
    let (year, month, day, hour, minute, second, nanos) = epoch.to_gregorian_utc();
    julian_day_from_calendar(
        year,
        month,
        day,
        hour,
        minute,
        second as f64 + nanos as f64 * 1e-9,
    )
}

/// Fractional days elapsed since 2000-01-01 12:00:00 UTC.
pub fn days_since_j2000(epoch: &Epoch) -> f64 {
    epoch.to_jde_utc_days() - JD2000
}

/// Signed number of minutes from `origin` to `epoch`.
pub fn minutes_between(origin: &Epoch, epoch: &Epoch) -> Minute {
    (*epoch - *origin).to_seconds() / 60.0
}

/// Instant located `minutes` after `origin` (negative values go backward).
pub fn add_minutes(origin: &Epoch, minutes: Minute) -> Epoch {
    *origin + Duration::from_seconds(minutes * 60.0)
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians from a number of days
/// since J2000.0 (UT1 ≈ UTC).
///
/// This function implements the IAU 1982 polynomial expression of GMST in seconds of time,
/// written as a single polynomial in Julian centuries `T` since J2000.0:
///
/// ```text
/// θ = 67310.54841 + (876600·3600 + 8640184.812866)·T + 0.093104·T² − 6.2e-6·T³   [s]
/// ```
///
/// The angle is converted to radians (240 s of time per degree) and reduced to `[0, 2π)`
/// with a positive remainder. Callers must not assume continuity across the wrap.
///
/// Arguments
/// ---------
/// * `days`: days since 2000-01-01 12:00:00 UT1.
///
/// Return
/// ------
/// * GMST in radians within `[0, 2π)`; NaN when `days` is NaN.
pub fn gmst_from_days(days: f64) -> Radian {
    // Polynomial coefficients for GMST (in seconds of time)
    const C0: f64 = 67310.54841;
    const C1: f64 = 876600.0 * 3600.0 + 8640184.812866;
    const C2: f64 = 0.093104;
    const C3: f64 = -6.2e-6;

    let t = days / DAYS_PER_CENTURY;
    let theta = ((C3 * t + C2) * t + C1) * t + C0;

    (theta / 240.0 * RADEG).rem_euclid(DPI)
}

/// Greenwich Mean Sidereal Time of an instant, in radians within `[0, 2π)`.
///
/// See also
/// --------
/// * [`gmst_from_days`] – the underlying polynomial.
pub fn gmst(epoch: &Epoch) -> Radian {
    gmst_from_days(days_since_j2000(epoch))
}

/// Local Mean Sidereal Time at east longitude `longitude` (radians), within `[0, 2π)`.
pub fn lmst(epoch: &Epoch, longitude: Radian) -> Radian {
    (gmst(epoch) + longitude).rem_euclid(DPI)
}
