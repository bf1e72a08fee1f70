//! # Pass prediction
//!
//! This module turns the continuous elevation curve of a [`Satellite`] seen from an
//! [`Observer`] into discrete passes: rise, culmination and set instants, classified by
//! visibility.
//!
//! ## Pipeline overview
//!
//! 1. **Coarse sampling**
//!    Elevation minus horizon is sampled every minute from `start − look_back_minutes` to
//!    `start + duration_hours`. Instants where the element set cannot be propagated are treated
//!    as far below the horizon, so a single invalid sample never aborts the search.
//!
//! 2. **Event refinement**
//!    Each sign change between consecutive samples is refined with a bracketed Brent solver
//!    ([`find_root`]). A negative-to-positive crossing is a rise, positive-to-negative a set.
//!
//! 3. **Visibility gate**
//!    A rise is paired with the next set. The pair is kept only when at least one whole-minute
//!    sample inside it is [`Visibility::Visible`] or [`Visibility::Daylight`].
//!
//! 4. **Culmination**
//!    The maximum elevation is refined by successive parabolic interpolation
//!    ([`find_max_parabolic`]) around the highest coarse sample. Passes culminating at or below
//!    `min_max_elevation_deg` are discarded.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hifitime::Epoch;
//! use skypass::elements::load_omm_csv;
//! use skypass::observers::Observer;
//! use skypass::passes::{find_passes, PassSearchParams};
//! use skypass::satellite::Satellite;
//!
//! let records = load_omm_csv("visual.csv")?;
//! let sat = Satellite::from_record(&records[0])?;
//! let site = Observer::new(-3.7038, 40.4168, 0.65, None)?;
//!
//! let params = PassSearchParams::builder()
//!     .duration_hours(48.0)
//!     .horizon_deg(5.0)
//!     .build()?;
//!
//! let start = Epoch::from_gregorian_utc_hms(2024, 1, 15, 12, 0, 0);
//! for pass in find_passes(&sat, &start, &site, &params)? {
//!     println!("{pass}");
//! }
//! # Ok::<(), skypass::sat_errors::SatError>(())
//! ```
use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

use hifitime::Epoch;
use itertools::Itertools;
use roots::{find_root_brent, SimpleConvergency};
use tracing::debug;

use crate::constants::{Degree, Magnitude, Minute};
use crate::observers::Observer;
use crate::sat_errors::SatError;
use crate::satellite::{Satellite, Visibility, DEFAULT_INTRINSIC_MAGNITUDE, DEFAULT_TWILIGHT_DEG};
use crate::time::add_minutes;

/// Elevation assigned to instants where propagation is not valid.
const INVALID_SAMPLE_ELEVATION: Degree = -90.0;

/// Configuration of [`find_passes`].
///
/// Fields
/// -----------------
/// * `duration_hours` – length of the search window after the start instant.
/// * `horizon_deg` – elevation cutoff defining rise and set.
/// * `twilight_deg` – solar elevation above which the observer is in daylight.
/// * `tolerance_seconds` – time tolerance of the rise/set and culmination refinement.
/// * `look_back_minutes` – sampling starts this many minutes before the start instant so
///   that a pass already in progress is reported.
/// * `min_max_elevation_deg` – passes culminating at or below this elevation are dropped.
/// * `max_root_iterations` – iteration cap of both refinement solvers.
/// * `intrinsic_magnitude` – standard magnitude used for the brightness at culmination.
///
/// Defaults
/// -----------------
/// * `duration_hours`: 24
/// * `horizon_deg`: 0°
/// * `twilight_deg`: −6° (civil twilight)
/// * `tolerance_seconds`: 0.001 s
/// * `look_back_minutes`: 15
/// * `min_max_elevation_deg`: 10°
/// * `max_root_iterations`: 100
/// * `intrinsic_magnitude`: −1.8
#[derive(Debug, Clone, PartialEq)]
pub struct PassSearchParams {
    pub duration_hours: f64,
    pub horizon_deg: Degree,
    pub twilight_deg: Degree,
    pub tolerance_seconds: f64,
    pub look_back_minutes: Minute,
    pub min_max_elevation_deg: Degree,
    pub max_root_iterations: usize,
    pub intrinsic_magnitude: Magnitude,
}

impl PassSearchParams {
    /// Equivalent to [`PassSearchParams::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`PassSearchParamsBuilder`] initialised with the default values.
    pub fn builder() -> PassSearchParamsBuilder {
        PassSearchParamsBuilder::new()
    }

    /// Refinement tolerance expressed in minutes.
    pub fn tolerance_minutes(&self) -> Minute {
        self.tolerance_seconds / 60.0
    }
}

impl Default for PassSearchParams {
    fn default() -> Self {
        PassSearchParams {
            duration_hours: 24.0,
            horizon_deg: 0.0,
            twilight_deg: DEFAULT_TWILIGHT_DEG,
            tolerance_seconds: 1.0e-3,
            look_back_minutes: 15.0,
            min_max_elevation_deg: 10.0,
            max_root_iterations: 100,
            intrinsic_magnitude: DEFAULT_INTRINSIC_MAGNITUDE,
        }
    }
}

/// Builder for [`PassSearchParams`], with validation.
#[derive(Debug, Clone)]
pub struct PassSearchParamsBuilder {
    params: PassSearchParams,
}

impl Default for PassSearchParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PassSearchParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: PassSearchParams::default(),
        }
    }

    pub fn duration_hours(mut self, v: f64) -> Self {
        self.params.duration_hours = v;
        self
    }
    pub fn horizon_deg(mut self, v: Degree) -> Self {
        self.params.horizon_deg = v;
        self
    }
    pub fn twilight_deg(mut self, v: Degree) -> Self {
        self.params.twilight_deg = v;
        self
    }
    pub fn tolerance_seconds(mut self, v: f64) -> Self {
        self.params.tolerance_seconds = v;
        self
    }
    pub fn look_back_minutes(mut self, v: Minute) -> Self {
        self.params.look_back_minutes = v;
        self
    }
    pub fn min_max_elevation_deg(mut self, v: Degree) -> Self {
        self.params.min_max_elevation_deg = v;
        self
    }
    pub fn max_root_iterations(mut self, v: usize) -> Self {
        self.params.max_root_iterations = v;
        self
    }
    pub fn intrinsic_magnitude(mut self, v: Magnitude) -> Self {
        self.params.intrinsic_magnitude = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    #[inline]
    fn is_elevation(x: f64) -> bool {
        (-90.0..=90.0).contains(&x)
    }

    /// Finalize the builder and produce a [`PassSearchParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `duration_hours > 0` and finite.
    /// * `tolerance_seconds > 0`.
    /// * `look_back_minutes >= 0`.
    /// * `max_root_iterations >= 1`.
    /// * `horizon_deg` and `twilight_deg` within [−90, 90].
    /// * `intrinsic_magnitude` finite.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(PassSearchParams)` if all values are valid.
    /// * `Err(SatError::InvalidPassSearchParams)` naming the first rule that failed.
    pub fn build(self) -> Result<PassSearchParams, SatError> {
        let p = &self.params;

        if !Self::gt0(p.duration_hours) || !p.duration_hours.is_finite() {
            return Err(SatError::InvalidPassSearchParams(
                "duration_hours must be positive and finite".into(),
            ));
        }
        if !Self::gt0(p.tolerance_seconds) {
            return Err(SatError::InvalidPassSearchParams(
                "tolerance_seconds must be > 0".into(),
            ));
        }
        if !Self::ge0(p.look_back_minutes) || !p.look_back_minutes.is_finite() {
            return Err(SatError::InvalidPassSearchParams(
                "look_back_minutes must be non-negative".into(),
            ));
        }
        if p.max_root_iterations == 0 {
            return Err(SatError::InvalidPassSearchParams(
                "max_root_iterations must be >= 1".into(),
            ));
        }
        if !Self::is_elevation(p.horizon_deg) {
            return Err(SatError::InvalidPassSearchParams(
                "horizon_deg must be within [-90, 90]".into(),
            ));
        }
        if !Self::is_elevation(p.twilight_deg) {
            return Err(SatError::InvalidPassSearchParams(
                "twilight_deg must be within [-90, 90]".into(),
            ));
        }
        if !p.intrinsic_magnitude.is_finite() {
            return Err(SatError::InvalidPassSearchParams(
                "intrinsic_magnitude must be finite".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for PassSearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 40;
            writeln!(f, "Pass Search Parameters")?;
            writeln!(f, "----------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            line!(
                "duration_hours        = {:.2} h",
                self.duration_hours,
                "Length of the search window"
            )?;
            line!(
                "horizon_deg           = {:.2}°",
                self.horizon_deg,
                "Rise/set elevation cutoff"
            )?;
            line!(
                "twilight_deg          = {:.2}°",
                self.twilight_deg,
                "Solar elevation above which it is day"
            )?;
            line!(
                "tolerance_seconds     = {:.1e} s",
                self.tolerance_seconds,
                "Refinement tolerance"
            )?;
            line!(
                "look_back_minutes     = {:.1} min",
                self.look_back_minutes,
                "Sampling starts before the window"
            )?;
            line!(
                "min_max_elevation_deg = {:.2}°",
                self.min_max_elevation_deg,
                "Lowest accepted culmination"
            )?;
            line!(
                "max_root_iterations   = {}",
                self.max_root_iterations,
                "Iteration cap of the solvers"
            )?;
            line!(
                "intrinsic_magnitude   = {:.2}",
                self.intrinsic_magnitude,
                "Magnitude at 1000 km, full phase"
            )?;
            Ok(())
        } else {
            write!(
                f,
                "PassSearchParams(duration={:.1}h, horizon={:.1}°, twilight={:.1}°, tol={:.1e}s, look_back={:.0}min, min_max_el={:.1}°)",
                self.duration_hours,
                self.horizon_deg,
                self.twilight_deg,
                self.tolerance_seconds,
                self.look_back_minutes,
                self.min_max_elevation_deg,
            )
        }
    }
}

/// One predicted pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassRecord {
    pub rise: Epoch,
    pub set: Epoch,
    /// degrees
    pub max_elevation: Degree,
    pub max_elevation_time: Epoch,
    /// [`Visibility::Visible`] or [`Visibility::Daylight`]
    pub visibility: Visibility,
    /// Apparent magnitude at culmination, `None` unless the satellite is visible there.
    pub magnitude: Option<Magnitude>,
}

impl PassRecord {
    /// Time between rise and set.
    pub fn duration(&self) -> hifitime::Duration {
        self.set - self.rise
    }
}

impl fmt::Display for PassRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rise {} | max {:5.1}° at {} | set {} | {}",
            self.rise, self.max_elevation, self.max_elevation_time, self.set, self.visibility
        )?;
        if let Some(mag) = self.magnitude {
            write!(f, " | mag {mag:.1}")?;
        }
        Ok(())
    }
}

/// Find a root of `f` inside `[a, b]` with Brent's method.
///
/// Arguments
/// ---------
/// * `f`: continuous function.
/// * `a`, `b`: bracket bounds.
/// * `tol`: convergence tolerance on the abscissa (and on `|f|`).
/// * `max_iter`: iteration cap.
///
/// Return
/// ------
/// * `Some(x)` with `f(x) ≈ 0`, or `None` when `f(a)` and `f(b)` have the same sign, are not
///   finite, or the solver does not converge within `max_iter` iterations.
pub fn find_root<F>(f: F, a: f64, b: f64, tol: f64, max_iter: usize) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let (fa, fb) = (f(a), f(b));
    if !(fa.is_finite() && fb.is_finite()) || fa * fb > 0.0 {
        return None;
    }

    let mut convergency = SimpleConvergency {
        eps: tol,
        max_iter,
    };
    match find_root_brent(a, b, &f, &mut convergency) {
        Ok(x) => Some(x),
        Err(err) => {
            debug!(a, b, ?err, "root refinement failed");
            None
        }
    }
}

/// Locate the maximum of `f` on `[start, end]` by successive parabolic interpolation.
///
/// A parabola is fitted through the bracket ends and midpoint; its vertex `x` replaces the
/// middle point and the outer points move halfway towards it. The iteration stops when the
/// vertex moves by at most `tol`, when the fit degenerates (flat or collinear samples, the
/// middle point is returned), when the vertex is lower than the current middle point, or
/// after `max_iter` iterations.
///
/// Return
/// ------
/// * The abscissa of the estimated maximum.
pub fn find_max_parabolic<F>(f: F, start: f64, end: f64, tol: f64, max_iter: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b, mut c) = (start, 0.5 * (start + end), end);
    let (mut fa, mut fb, mut fc) = (f(a), f(b), f(c));
    let mut x = b;

    for _ in 0..max_iter {
        let den = (b - a) * (fb - fc) - (b - c) * (fb - fa);
        if den == 0.0 || !den.is_finite() {
            return b;
        }
        let num = (b - a).powi(2) * (fb - fc) - (b - c).powi(2) * (fb - fa);
        x = b - 0.5 * num / den;
        if (b - x).abs() <= tol {
            return x;
        }

        let fx = f(x);
        if fx < fb {
            return b;
        }
        a = 0.5 * (a + x);
        c = 0.5 * (x + c);
        b = x;
        fa = f(a);
        fb = fx;
        fc = f(c);
    }

    debug!(start, end, "parabolic refinement hit the iteration cap");
    x
}

/// Elevation (degrees) of `satellite` at `epoch`, or [`INVALID_SAMPLE_ELEVATION`] when the
/// element set cannot be propagated there.
fn sample_elevation(satellite: &Satellite, observer: &Observer, epoch: &Epoch) -> Degree {
    match satellite.observer_look(epoch, observer) {
        Ok(look) => look.elevation,
        Err(err) => {
            debug!(%epoch, %err, "elevation sample skipped");
            INVALID_SAMPLE_ELEVATION
        }
    }
}

/// Predict the passes of `satellite` over `observer`.
///
/// See the module documentation for the pipeline. Times inside the search are minutes from
/// `start − look_back_minutes`.
///
/// Arguments
/// ---------
/// * `satellite`: propagated object.
/// * `start`: beginning of the search window.
/// * `observer`: ground site.
/// * `params`: search configuration, see [`PassSearchParams`].
///
/// Return
/// ------
/// * The qualifying passes in chronological order. Fails only when `params` is invalid.
pub fn find_passes(
    satellite: &Satellite,
    start: &Epoch,
    observer: &Observer,
    params: &PassSearchParams,
) -> Result<Vec<PassRecord>, SatError> {
    let params = PassSearchParamsBuilder {
        params: params.clone(),
    }
    .build()?;

    let origin = add_minutes(start, -params.look_back_minutes);
    let tol = params.tolerance_minutes();
    let n_samples = (params.duration_hours * 60.0 + params.look_back_minutes).ceil() as usize + 1;

    let above_horizon = |m: Minute| -> Degree {
        sample_elevation(satellite, observer, &add_minutes(&origin, m)) - params.horizon_deg
    };

    let elevations: Vec<Degree> = (0..n_samples).map(|i| above_horizon(i as f64)).collect();

    let mut passes = Vec::new();
    let mut rise: Option<Minute> = None;

    for ((g, &e0), (_, &e1)) in elevations.iter().enumerate().tuple_windows() {
        if e0 * e1 >= 0.0 {
            continue;
        }
        let Some(crossing) = find_root(
            &above_horizon,
            g as f64,
            (g + 1) as f64,
            tol,
            params.max_root_iterations,
        ) else {
            continue;
        };

        if e0 < 0.0 {
            rise = Some(crossing);
            continue;
        }

        if let Some(rise_minute) = rise.take() {
            if let Some(pass) = qualify_pass(
                satellite,
                observer,
                &params,
                &origin,
                &elevations,
                rise_minute,
                crossing,
            ) {
                passes.push(pass);
            }
        }
    }

    Ok(passes)
}

/// Apply the visibility gate and culmination refinement to one rise/set pair.
fn qualify_pass(
    satellite: &Satellite,
    observer: &Observer,
    params: &PassSearchParams,
    origin: &Epoch,
    elevations: &[Degree],
    rise: Minute,
    set: Minute,
) -> Option<PassRecord> {
    let first = rise.floor().max(0.0) as usize;
    let last = ((set.ceil() as usize) + 1).min(elevations.len());

    let visibility = (first..last)
        .map(|i| {
            satellite
                .visibility(
                    &add_minutes(origin, i as f64),
                    observer,
                    params.horizon_deg,
                    params.twilight_deg,
                )
                .unwrap_or(Visibility::NotVisible)
        })
        .find(|v| matches!(v, Visibility::Visible | Visibility::Daylight));

    let Some(visibility) = visibility else {
        debug!(rise, set, "pass discarded: never observable");
        return None;
    };

    let middle = (first..last).max_by(|&i, &j| elevations[i].total_cmp(&elevations[j]))?;
    let elevation_at = |m: Minute| sample_elevation(satellite, observer, &add_minutes(origin, m));

    let culmination = find_max_parabolic(
        &elevation_at,
        rise.max(middle as f64 - 1.0),
        set.min(middle as f64 + 1.0),
        params.tolerance_minutes(),
        params.max_root_iterations,
    );
    let max_elevation = elevation_at(culmination);

    if max_elevation <= params.min_max_elevation_deg {
        debug!(rise, set, max_elevation, "pass discarded: culmination too low");
        return None;
    }

    let max_elevation_time = add_minutes(origin, culmination);
    let magnitude = match satellite.visibility(
        &max_elevation_time,
        observer,
        params.horizon_deg,
        params.twilight_deg,
    ) {
        Ok(Visibility::Visible) => satellite
            .apparent_magnitude(&max_elevation_time, observer, params.intrinsic_magnitude)
            .ok(),
        _ => None,
    };

    let pass = PassRecord {
        rise: add_minutes(origin, rise),
        set: add_minutes(origin, set),
        max_elevation,
        max_elevation_time,
        visibility,
        magnitude,
    };
    debug!(%pass, "pass found");
    Some(pass)
}

#[cfg(test)]
mod passes_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_params() {
        let p = PassSearchParams::default();
        assert_eq!(p, PassSearchParams::builder().build().unwrap());
        assert_eq!(p.duration_hours, 24.0);
        assert_eq!(p.look_back_minutes, 15.0);
        assert_abs_diff_eq!(p.tolerance_minutes(), 1.0e-3 / 60.0, epsilon = 1e-18);
    }

    #[test]
    fn test_builder_validation() {
        let bad = [
            PassSearchParams::builder().duration_hours(0.0),
            PassSearchParams::builder().duration_hours(f64::NAN),
            PassSearchParams::builder().tolerance_seconds(-1.0),
            PassSearchParams::builder().look_back_minutes(-5.0),
            PassSearchParams::builder().max_root_iterations(0),
            PassSearchParams::builder().horizon_deg(95.0),
            PassSearchParams::builder().twilight_deg(f64::NAN),
        ];
        for builder in bad {
            assert!(matches!(
                builder.build(),
                Err(SatError::InvalidPassSearchParams(_))
            ));
        }

        let ok = PassSearchParams::builder()
            .duration_hours(72.0)
            .horizon_deg(10.0)
            .twilight_deg(-12.0)
            .look_back_minutes(0.0)
            .build()
            .unwrap();
        assert_eq!(ok.horizon_deg, 10.0);
        assert_eq!(ok.twilight_deg, -12.0);
    }

    #[test]
    fn test_display() {
        let p = PassSearchParams::default();
        let short = format!("{p}");
        assert!(short.starts_with("PassSearchParams(duration=24.0h"));
        let long = format!("{p:#}");
        assert!(long.contains("horizon_deg"));
        assert!(long.contains("Lowest accepted culmination"));
    }

    #[test]
    fn test_find_root() {
        let r = find_root(|x| x * x - 2.0, 0.0, 2.0, 1e-12, 100).unwrap();
        assert_abs_diff_eq!(r, std::f64::consts::SQRT_2, epsilon = 1e-10);

        let r = find_root(f64::cos, 1.0, 2.0, 1e-12, 100).unwrap();
        assert_abs_diff_eq!(r, std::f64::consts::FRAC_PI_2, epsilon = 1e-10);
    }

    #[test]
    fn test_find_root_without_bracket() {
        assert_eq!(find_root(|x| x * x + 1.0, -1.0, 1.0, 1e-9, 100), None);
        assert_eq!(find_root(|x| x - 5.0, 0.0, 1.0, 1e-9, 100), None);
        assert_eq!(find_root(|_| f64::NAN, 0.0, 1.0, 1e-9, 100), None);
    }

    #[test]
    fn test_find_max_parabolic() {
        let x = find_max_parabolic(|x| -(x - 0.3).powi(2) + 4.0, -1.0, 1.0, 1e-9, 100);
        assert_abs_diff_eq!(x, 0.3, epsilon = 1e-9);

        let x = find_max_parabolic(f64::sin, 1.0, 2.5, 1e-9, 100);
        assert_abs_diff_eq!(x, std::f64::consts::FRAC_PI_2, epsilon = 1e-6);

        // flat function: the midpoint is returned
        let x = find_max_parabolic(|_| 1.0, 0.0, 2.0, 1e-9, 100);
        assert_eq!(x, 1.0);
    }
}
