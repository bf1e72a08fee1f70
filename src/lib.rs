//! # skypass
//!
//! Satellite tracking and pass prediction for near-Earth objects.
//!
//! From a mean element set (CelesTrak OMM record), `skypass` propagates the orbit with the
//! near-Earth SGP4 theory, converts the state between inertial, Earth-fixed, geodetic and
//! topocentric frames, estimates the apparent magnitude and the illumination condition, and
//! searches the time windows where the satellite is observable from a ground site.
//!
//! ## Modules
//!
//! * [`elements`] – element-set ingestion (CSV / JSON) and derived orbital quantities.
//! * [`sgp4`] – the propagator, near-Earth normal mode.
//! * [`satellite`] – ECI state, sub-point, look angles, magnitude and visibility.
//! * [`passes`] – rise / culmination / set search.
//! * [`sun`] – low-precision solar ephemeris and day/night terminator.
//! * [`ref_system`], [`time`], [`observers`] – frames, time scales and ground sites.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hifitime::Epoch;
//! use skypass::elements::read_omm_json;
//! use skypass::observers::Observer;
//! use skypass::passes::{find_passes, PassSearchParams};
//! use skypass::satellite::Satellite;
//!
//! let json = std::fs::read_to_string("stations.json")?;
//! let records = read_omm_json(&json)?;
//! let iss = Satellite::from_record(&records[0])?;
//!
//! let site = Observer::new(2.3522, 48.8566, 0.035, Some("Paris".into()))?;
//! let now = Epoch::from_gregorian_utc_hms(2024, 1, 15, 12, 0, 0);
//! let passes = find_passes(&iss, &now, &site, &PassSearchParams::default())?;
//! println!("{} passes in the next 24 h", passes.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod constants;
pub mod elements;
pub mod kepler;
pub mod observers;
pub mod passes;
pub mod ref_system;
pub mod sat_errors;
pub mod satellite;
pub mod sgp4;
pub mod sun;
pub mod time;
pub mod vector_math;
