use super::constants::DPI;
use std::f64::consts::PI;

/// Maximum number of Newton-Raphson steps of [`solve_kepler_equation`].
pub const KEPLER_MAX_ITER: usize = 10;

/// Residual below which [`solve_kepler_equation`] stops iterating.
pub const KEPLER_EPS: f64 = 1.0e-12;

/// Return the principal value of an angle in radians, within [0, 2π).
pub fn principal_angle(a: f64) -> f64 {
    a.rem_euclid(DPI)
}

/// Wrap an angle in radians into (−π, π].
pub fn wrap_pi(a: f64) -> f64 {
    let a = principal_angle(a);
    if a > PI {
        a - DPI
    } else {
        a
    }
}

/// Solution of Kepler's equation in the (axn, ayn) form used by the propagator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric longitude `E + ω` in radians.
    pub epw: f64,
    pub sin_epw: f64,
    pub cos_epw: f64,
    /// `e·cos E`.
    pub ecos_e: f64,
    /// `e·sin E`.
    pub esin_e: f64,
}

/// Solve Kepler's equation written with the eccentricity vector components.
///
/// With `axn = e·cos ω`, `ayn = e·sin ω` and `U = M + ω`, the eccentric longitude `Ê = E + ω`
/// solves
///
/// ```text
/// U = Ê − axn·sin Ê + ayn·cos Ê
/// ```
///
/// Newton-Raphson is started from `Ê₀ = U` and runs for at most [`KEPLER_MAX_ITER`] steps or
/// until the residual drops below [`KEPLER_EPS`]. Each correction is clamped to
/// `±√(axn² + ayn²)` so that the iteration cannot jump across several revolutions at high
/// eccentricity.
///
/// Arguments
/// ---------
/// * `capu`: mean longitude residual `U` (radians).
/// * `axn`, `ayn`: eccentricity vector components.
///
/// Return
/// ------
/// * A [`KeplerSolution`] whose trigonometric terms are evaluated at the returned `epw`.
pub fn solve_kepler_equation(capu: f64, axn: f64, ayn: f64) -> KeplerSolution {
    let max_step = (axn * axn + ayn * ayn).sqrt();
    let mut epw = capu;

    for _ in 0..KEPLER_MAX_ITER {
        let (sin_epw, cos_epw) = epw.sin_cos();
        let ecos_e = axn * cos_epw + ayn * sin_epw;
        let esin_e = axn * sin_epw - ayn * cos_epw;

        let f = capu - epw + esin_e;
        if f.abs() < KEPLER_EPS {
            break;
        }

        let step = (f / (1.0 - ecos_e)).clamp(-max_step, max_step);
        epw += step;
    }

    let (sin_epw, cos_epw) = epw.sin_cos();
    KeplerSolution {
        epw,
        sin_epw,
        cos_epw,
        ecos_e: axn * cos_epw + ayn * sin_epw,
        esin_e: axn * sin_epw - ayn * cos_epw,
    }
}

#[cfg(test)]
mod kepler_test {

    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_pi() {
        assert_eq!(wrap_pi(0.0), 0.0);
        assert_abs_diff_eq!(wrap_pi(PI), PI, epsilon = 1e-15);
        assert_abs_diff_eq!(wrap_pi(-PI), PI, epsilon = 1e-15);
        assert_abs_diff_eq!(wrap_pi(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(wrap_pi(-7.0 * PI / 2.0), PI / 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(principal_angle(-0.5), DPI - 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_circular_orbit() {
        let sol = solve_kepler_equation(1.234, 0.0, 0.0);
        assert_eq!(sol.epw, 1.234);
        assert_eq!(sol.ecos_e, 0.0);
        assert_eq!(sol.esin_e, 0.0);
    }

    #[test]
    fn test_residual() {
        for &(capu, e, w) in &[
            (0.3, 0.001, 1.2),
            (2.5, 0.05, -0.4),
            (-1.0, 0.3, 2.0),
            (5.9, 0.7, 0.1),
        ] {
            let (axn, ayn) = (e * f64::cos(w), e * f64::sin(w));
            let sol = solve_kepler_equation(capu, axn, ayn);
            let residual = sol.epw - axn * sol.sin_epw + ayn * sol.cos_epw - capu;
            assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-11);

            // E = epw - w satisfies the classical form M = E - e sin E
            let big_e = sol.epw - w;
            let m = capu - w;
            assert_abs_diff_eq!(big_e - e * big_e.sin(), m, epsilon = 1e-11);
            assert_abs_diff_eq!(sol.ecos_e, e * big_e.cos(), epsilon = 1e-12);
        }
    }
}
