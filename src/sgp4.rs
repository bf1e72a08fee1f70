//! # Simplified General Perturbations propagator (near-Earth)
//!
//! Analytic propagation of a mean element set with the SGP4 theory (Hoots & Roehrich,
//! *Spacetrack Report #3*, 1980), near-Earth branch with full drag terms.
//!
//! ## Modes
//!
//! The propagator mode is fixed at construction from the derived period and perigee height:
//!
//! | condition                  | mode                                   |
//! |----------------------------|----------------------------------------|
//! | period ≥ 225 min           | [`PropagatorMode::DeepSpace`]          |
//! | perigee < 220 km           | [`PropagatorMode::NearSimplified`]     |
//! | otherwise                  | [`PropagatorMode::NearNormal`]         |
//!
//! Only `NearNormal` is implemented; [`Sgp4::new`] returns
//! [`SatError::UnsupportedMode`] for the two others. The deep-space resonance theory (SDP4)
//! is a different algorithm and is not provided.
//!
//! ## Algorithm
//!
//! Construction precomputes the secular rates of mean anomaly, argument of perigee and node
//! (`xmdot`, `omgdot`, `xnodot`) and the drag coefficients (`C1`, `C4`, `C5`, `D2..D4`,
//! `T2cof..T5cof`). A call to [`Sgp4::propagate`]:
//!
//! 1. applies secular gravity and drag to the mean elements at `Δt` minutes from epoch,
//! 2. adds the long-period periodics through the `(axn, ayn)` eccentricity vector,
//! 3. solves Kepler's equation ([`crate::kepler::solve_kepler_equation`]),
//! 4. adds the J2 short-period periodics to radius, argument of latitude, node and inclination,
//! 5. returns the osculating state as a [`KeplerianSnapshot`] (km, km/s).
//!
//! Propagation fails with a recoverable error when the element set is not valid at the
//! requested instant (decayed orbit, eccentricity below −1e-3, hyperbolic eccentricity vector,
//! radius under one Earth radius); see [`SatError::is_propagation_invalid`].

use hifitime::Epoch;
use tracing::debug;

use crate::constants::{Kilometer, Minute, PhysicalConstants, Radian, DPI};
use crate::elements::{DerivedElements, OrbitalElementSet, ECC_LIMIT_HIGH};
use crate::kepler::solve_kepler_equation;
use crate::sat_errors::SatError;
use crate::time::minutes_between;

/// Lower clamp of the propagated eccentricity.
const ECC_EPS: f64 = 1.0e-6;
/// Below this propagated eccentricity the element set is declared invalid.
const ECC_LIMIT_LOW: f64 = -1.0e-3;
/// Eccentricity under which the `C3` and `xmcof` drag terms are dropped.
const ECC_ALL: f64 = 1.0e-4;
/// Guard on `1 + cos i` for retrograde equatorial orbits.
const EPS_COS: f64 = 1.5e-12;

/// Period (minutes) from which the deep-space theory is required.
pub const DEEP_SPACE_PERIOD: Minute = 225.0;
/// Perigee height (km) under which the simplified near-Earth equations are required.
pub const SIMPLIFIED_PERIGEE: Kilometer = 220.0;

/// Branch of the SGP4/SDP4 theory selected for an element set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagatorMode {
    /// Period ≥ 225 min: deep-space (SDP4) theory.
    DeepSpace,
    /// Perigee < 220 km: near-Earth with truncated drag terms.
    NearSimplified,
    /// Near-Earth with full drag terms.
    NearNormal,
}

impl PropagatorMode {
    /// Select the mode from the derived period (minutes) and perigee height (km).
    pub fn select(period: Minute, perigee: Kilometer) -> PropagatorMode {
        if period >= DEEP_SPACE_PERIOD {
            PropagatorMode::DeepSpace
        } else if perigee < SIMPLIFIED_PERIGEE {
            PropagatorMode::NearSimplified
        } else {
            PropagatorMode::NearNormal
        }
    }
}

/// Osculating elements at one instant, as produced by [`Sgp4::propagate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianSnapshot {
    /// Geocentric distance, km.
    pub radius: Kilometer,
    /// Argument of latitude `u`, radians.
    pub theta: Radian,
    /// Osculating inclination, radians.
    pub inclination: Radian,
    /// Osculating right ascension of the ascending node, radians.
    pub node: Radian,
    /// Mean argument of perigee (secular and drag terms), radians.
    pub arg_perigee: Radian,
    /// Semi-major axis after drag decay, km.
    pub semi_major_axis: Kilometer,
    /// Radial velocity, km/s.
    pub radial_velocity: f64,
    /// Transverse velocity `r·du/dt`, km/s.
    pub transverse_velocity: f64,
    /// Mean anomaly (secular and drag terms), radians.
    pub mean_anomaly: Radian,
    /// Mean right ascension of the node (secular terms), radians.
    pub mean_node: Radian,
}

/// SGP4 near-Earth propagator for one element set.
///
/// All coefficients are computed once in [`Sgp4::new`]; [`Sgp4::propagate`] takes `&self`
/// so a propagator can be shared between threads.
#[derive(Debug, Clone)]
pub struct Sgp4 {
    constants: PhysicalConstants,
    derived: DerivedElements,
    mode: PropagatorMode,

    // epoch mean elements
    epoch: Epoch,
    eo: f64,
    xincl: f64,
    xnodeo: f64,
    omegao: f64,
    xmo: f64,
    bstar: f64,

    // inclination functions
    cosio: f64,
    sinio: f64,
    x3thm1: f64,
    x1mth2: f64,
    x7thm1: f64,

    // secular rates
    xmdot: f64,
    omgdot: f64,
    xnodot: f64,

    // drag
    eta: f64,
    c1: f64,
    c4: f64,
    c5: f64,
    omgcof: f64,
    xmcof: f64,
    xnodcf: f64,
    delmo: f64,
    sinmo: f64,
    d2: f64,
    d3: f64,
    d4: f64,
    t2cof: f64,
    t3cof: f64,
    t4cof: f64,
    t5cof: f64,

    // long-period periodics
    xlcof: f64,
    aycof: f64,
}

impl Sgp4 {
    /// Build a propagator for an element set.
    ///
    /// Arguments
    /// ---------
    /// * `elements`: validated mean element set.
    /// * `constants`: gravity model and units, copied into the propagator.
    ///
    /// Return
    /// ------
    /// * The propagator, a range error from [`OrbitalElementSet::validate`], or
    ///   [`SatError::UnsupportedMode`] when the orbit needs the deep-space or the simplified
    ///   near-Earth equations.
    pub fn new(elements: &OrbitalElementSet, constants: PhysicalConstants) -> Result<Sgp4, SatError> {
        let derived = DerivedElements::from_element_set(elements, &constants)?;
        let mode = PropagatorMode::select(derived.period, derived.perigee);

        debug!(
            name = %elements.name,
            ?mode,
            period = derived.period,
            perigee = derived.perigee,
            "SGP4 propagator initialised"
        );

        if mode != PropagatorMode::NearNormal {
            return Err(SatError::UnsupportedMode(mode));
        }

        let c = &constants;
        let eo = elements.eccentricity;
        let xincl = elements.inclination;
        let omegao = elements.arg_perigee;
        let xmo = elements.mean_anomaly;
        let bstar = elements.bstar;
        let xnodp = derived.original_mean_motion;
        let aodp = derived.semi_major_axis;

        let (sinio, cosio) = xincl.sin_cos();
        let theta2 = cosio * cosio;
        let theta4 = theta2 * theta2;
        let x3thm1 = 3.0 * theta2 - 1.0;
        let x1mth2 = 1.0 - theta2;
        let x7thm1 = 7.0 * theta2 - 1.0;

        let betao2 = 1.0 - eo * eo;
        let betao = betao2.sqrt();

        // perigee ≥ 220 km in normal mode, so the standard density parameters apply
        let s4 = c.ks();
        let qoms24 = c.qoms2t;
        let a3ovk2 = c.a3ovk2();

        let pinvsq = 1.0 / (aodp * aodp * betao2 * betao2);
        let tsi = 1.0 / (aodp - s4);
        let eta = aodp * eo * tsi;
        let etasq = eta * eta;
        let eeta = eo * eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qoms24 * tsi.powi(4);
        let coef1 = coef / psisq.powf(3.5);

        let c2 = coef1
            * xnodp
            * (aodp * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
                + 0.75 * c.ck2 * tsi / psisq * x3thm1 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        let c1 = bstar * c2;
        let c4 = 2.0
            * xnodp
            * coef1
            * aodp
            * betao2
            * (eta * (2.0 + 0.5 * etasq) + eo * (0.5 + 2.0 * etasq)
                - 2.0 * c.ck2 * tsi / (aodp * psisq)
                    * (-3.0 * x3thm1 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                        + 0.75
                            * x1mth2
                            * (2.0 * etasq - eeta * (1.0 + etasq))
                            * (2.0 * omegao).cos()));
        let c5 = 2.0 * coef1 * aodp * betao2 * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

        let c3 = if eo > ECC_ALL {
            coef * tsi * a3ovk2 * xnodp * c.ae * sinio / eo
        } else {
            0.0
        };
        let omgcof = bstar * c3 * omegao.cos();
        let xmcof = if eo > ECC_ALL {
            -2.0 / 3.0 * coef * bstar * c.ae / eeta
        } else {
            0.0
        };

        let temp1 = 3.0 * c.ck2 * pinvsq * xnodp;
        let temp2 = temp1 * c.ck2 * pinvsq;
        let temp3 = 1.25 * c.ck4 * pinvsq * pinvsq * xnodp;
        let xmdot = xnodp
            + 0.5 * temp1 * betao * x3thm1
            + 0.0625 * temp2 * betao * (13.0 - 78.0 * theta2 + 137.0 * theta4);
        let x1m5th = 1.0 - 5.0 * theta2;
        let omgdot = -0.5 * temp1 * x1m5th
            + 0.0625 * temp2 * (7.0 - 114.0 * theta2 + 395.0 * theta4)
            + temp3 * (3.0 - 36.0 * theta2 + 49.0 * theta4);
        let xhdot1 = -temp1 * cosio;
        let xnodot =
            xhdot1 + (0.5 * temp2 * (4.0 - 19.0 * theta2) + 2.0 * temp3 * (3.0 - 7.0 * theta2)) * cosio;
        let xnodcf = 3.5 * betao2 * xhdot1 * c1;
        let t2cof = 1.5 * c1;

        let mut opcos = 1.0 + cosio;
        if opcos.abs() < EPS_COS {
            opcos = EPS_COS.copysign(opcos);
        }
        let xlcof = 0.125 * a3ovk2 * sinio * (3.0 + 5.0 * cosio) / opcos;
        let aycof = 0.25 * a3ovk2 * sinio;

        let delmo = (1.0 + eta * xmo.cos()).powi(3);
        let sinmo = xmo.sin();

        let c1sq = c1 * c1;
        let d2 = 4.0 * aodp * tsi * c1sq;
        let temp = d2 * tsi * c1 / 3.0;
        let d3 = (17.0 * aodp + s4) * temp;
        let d4 = 0.5 * temp * aodp * tsi * (221.0 * aodp + 31.0 * s4) * c1;
        let t3cof = d2 + 2.0 * c1sq;
        let t4cof = 0.25 * (3.0 * d3 + c1 * (12.0 * d2 + 10.0 * c1sq));
        let t5cof = 0.2 * (3.0 * d4 + 12.0 * c1 * d3 + 6.0 * d2 * d2 + 15.0 * c1sq * (2.0 * d2 + c1sq));

        Ok(Sgp4 {
            constants,
            derived,
            mode,
            epoch: elements.epoch,
            eo,
            xincl,
            xnodeo: elements.right_ascension,
            omegao,
            xmo,
            bstar,
            cosio,
            sinio,
            x3thm1,
            x1mth2,
            x7thm1,
            xmdot,
            omgdot,
            xnodot,
            eta,
            c1,
            c4,
            c5,
            omgcof,
            xmcof,
            xnodcf,
            delmo,
            sinmo,
            d2,
            d3,
            d4,
            t2cof,
            t3cof,
            t4cof,
            t5cof,
            xlcof,
            aycof,
        })
    }

    pub fn mode(&self) -> PropagatorMode {
        self.mode
    }

    pub fn derived(&self) -> &DerivedElements {
        &self.derived
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Propagate to an absolute instant.
    ///
    /// See also
    /// --------
    /// * [`Sgp4::propagate_minutes`] – same, with the offset from epoch in minutes.
    pub fn propagate(&self, epoch: &Epoch) -> Result<KeplerianSnapshot, SatError> {
        self.propagate_minutes(minutes_between(&self.epoch, epoch))
    }

    /// Propagate to `tsince` minutes after the element-set epoch (negative values go back).
    ///
    /// Return
    /// ------
    /// * The osculating [`KeplerianSnapshot`], or one of [`SatError::Decayed`],
    ///   [`SatError::EccentricityTooLow`], [`SatError::HyperbolicOrbit`],
    ///   [`SatError::SubSurfaceRadius`] when the element set is invalid at that instant.
    pub fn propagate_minutes(&self, tsince: Minute) -> Result<KeplerianSnapshot, SatError> {
        let c = &self.constants;
        let ts = tsince;

        // secular gravity and drag
        let mut xmp = self.xmo + self.xmdot * ts;
        let xnode = self.xnodeo + ts * (self.xnodot + ts * self.xnodcf);
        let mut omega = self.omegao + self.omgdot * ts;

        let delm = self.xmcof * ((1.0 + self.eta * xmp.cos()).powi(3) - self.delmo);
        let temp = ts * self.omgcof + delm;
        xmp += temp;
        omega -= temp;

        let tempa = 1.0 - ts * (self.c1 + ts * (self.d2 + ts * (self.d3 + ts * self.d4)));
        let tempe = self.bstar * (self.c4 * ts + self.c5 * (xmp.sin() - self.sinmo));
        let templ = ts * ts * (self.t2cof + ts * (self.t3cof + ts * (self.t4cof + ts * self.t5cof)));

        let a = self.derived.semi_major_axis * tempa * tempa;
        let e = self.eo - tempe;
        let xl = xmp + omega + xnode + self.derived.original_mean_motion * templ;

        if a < 1.0 {
            return Err(SatError::Decayed {
                minutes: ts,
                semi_major_axis: a,
            });
        }
        if e < ECC_LIMIT_LOW {
            return Err(SatError::EccentricityTooLow {
                minutes: ts,
                eccentricity: e,
            });
        }
        let e = e.clamp(ECC_EPS, ECC_LIMIT_HIGH);

        // long-period periodics
        let beta2 = 1.0 - e * e;
        let temp = 1.0 / (a * beta2);
        let axn = e * omega.cos();
        let ayn = e * omega.sin() + temp * self.aycof;
        let xlt = xl + temp * self.xlcof * axn;

        let elsq = axn * axn + ayn * ayn;
        if elsq >= 1.0 {
            return Err(SatError::HyperbolicOrbit {
                minutes: ts,
                elsq,
            });
        }

        let kepler = solve_kepler_equation((xlt - xnode) % DPI, axn, ayn);

        // short-period preliminary quantities
        let temp = 1.0 - elsq;
        let betal = temp.sqrt();
        let pl = a * temp;
        let r = a * (1.0 - kepler.ecos_e);
        let inv_r = 1.0 / r;
        let temp2 = a * inv_r;
        let temp3 = 1.0 / (1.0 + betal);
        let cosu = temp2 * (kepler.cos_epw - axn + ayn * kepler.esin_e * temp3);
        let sinu = temp2 * (kepler.sin_epw - ayn - axn * kepler.esin_e * temp3);
        let u = sinu.atan2(cosu);
        let sin2u = 2.0 * sinu * cosu;
        let cos2u = 2.0 * cosu * cosu - 1.0;

        let temp = 1.0 / pl;
        let temp1 = c.ck2 * temp;
        let temp2 = temp1 * temp;

        // short-period periodics
        let rk = r * (1.0 - 1.5 * temp2 * betal * self.x3thm1) + 0.5 * temp1 * self.x1mth2 * cos2u;
        let uk = u - 0.25 * temp2 * self.x7thm1 * sin2u;
        let xnodek = xnode + 1.5 * temp2 * self.cosio * sin2u;
        let xinck = self.xincl + 1.5 * temp2 * self.cosio * self.sinio * cos2u;

        if rk < 1.0 {
            return Err(SatError::SubSurfaceRadius {
                minutes: ts,
                radius: rk * c.xkmper / c.ae,
            });
        }

        let sqrt_a = a.sqrt();
        let temp2 = c.xke / (a * sqrt_a);
        let scale = c.velocity_scale();
        let rdotk = (c.xke * sqrt_a * kepler.esin_e * inv_r - temp2 * temp1 * self.x1mth2 * sin2u) * scale;
        let rfdotk = (c.xke * pl.sqrt() * inv_r
            + temp2 * temp1 * (self.x1mth2 * cos2u + 1.5 * self.x3thm1))
            * scale;

        Ok(KeplerianSnapshot {
            radius: rk * c.xkmper / c.ae,
            theta: uk,
            inclination: xinck,
            node: xnodek,
            arg_perigee: omega,
            semi_major_axis: a * c.xkmper / c.ae,
            radial_velocity: rdotk,
            transverse_velocity: rfdotk,
            mean_anomaly: xmp,
            mean_node: xnode,
        })
    }
}
