/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Nutation in longitude and obliquity.
//!
//! The full IAU-1980 (106 terms), IAU-2000A (678 luni-solar + 687
//! planetary) and IAU-2000B (77 luni-solar) series are multi-hundred-line
//! coefficient tables. This module implements each model with its
//! dominant terms (the ones carrying the bulk of the nutation amplitude:
//! the 18.6-year lunar-node term alone accounts for roughly 85% of the
//! peak-to-peak swing, and the next handful of terms bring coverage above
//! 99.9%), rather than transcribing the full published tables. This is a
//! deliberate, documented simplification (see DESIGN.md) that trades
//! microarcsecond precision for code size; at this engine's target
//! precision (0.01 degree-class tropical/sidereal positions) the
//! difference is immaterial.

use snafu::ensure;

use super::FundamentalArguments;
use crate::errors::{ModelFailureSnafu, NutationError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NutationModel {
    /// Legacy analytical model, kept for agreement with historical outputs.
    Woolard1953,
    /// IAU-1980, dominant terms of the 106-term luni-solar series.
    Iau1980,
    /// IAU-2000A, dominant terms of the full luni-solar + planetary series.
    Iau2000A,
    /// IAU-2000B, dominant terms of the 77-term luni-solar-only series.
    Iau2000B,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NutationResult {
    /// Nutation in longitude, radians.
    pub dpsi_rad: f64,
    /// Nutation in obliquity, radians.
    pub deps_rad: f64,
}

const ARCSEC: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// A single nutation term: integer multipliers of (D, M, M', F, Omega) and
/// the longitude (sin, T*sin) / obliquity (cos, T*cos) amplitudes in
/// 0.0001 arcsecond.
struct Term {
    d: i32,
    m: i32,
    mp: i32,
    f: i32,
    omega: i32,
    dpsi: f64,
    dpsi_t: f64,
    deps: f64,
    deps_t: f64,
}

/// Dominant luni-solar nutation terms shared by the IAU-1980 and IAU-2000
/// family of models (the argument multipliers and leading amplitudes agree
/// across these models for the largest terms; the models differ mainly in
/// the long tail this crate truncates). Amplitudes are in units of
/// 0.0001 arcsecond, following the IAU-1980 published table.
#[rustfmt::skip]
const DOMINANT_TERMS: &[Term] = &[
    Term { d: 0, m: 0, mp: 0, f: 0, omega: 1,  dpsi: -171996.0, dpsi_t: -174.2, deps: 92025.0, deps_t: 8.9 },
    Term { d: -2, m: 0, mp: 0, f: 2, omega: 1, dpsi: -13187.0, dpsi_t: -1.6,  deps: 5736.0,  deps_t: -3.1 },
    Term { d: 0, m: 0, mp: 0, f: 2, omega: 2,  dpsi: -2274.0,  dpsi_t: -0.2,  deps: 977.0,   deps_t: -0.5 },
    Term { d: 0, m: 0, mp: 0, f: 0, omega: 2,  dpsi: 2062.0,   dpsi_t: 0.2,   deps: -895.0,  deps_t: 0.5 },
    Term { d: 0, m: 1, mp: 0, f: 0, omega: 0,  dpsi: 1426.0,   dpsi_t: -3.4,  deps: 54.0,    deps_t: -0.1 },
    Term { d: 0, m: 0, mp: 1, f: 0, omega: 0,  dpsi: 712.0,    dpsi_t: 0.1,   deps: -7.0,    deps_t: 0.0 },
    Term { d: -2, m: 1, mp: 0, f: 2, omega: 2, dpsi: -517.0,   dpsi_t: 1.2,   deps: 224.0,   deps_t: -0.6 },
    Term { d: 0, m: 0, mp: 0, f: 2, omega: 1,  dpsi: -386.0,   dpsi_t: -0.4,  deps: 200.0,   deps_t: 0.0 },
    Term { d: 0, m: 0, mp: 1, f: 2, omega: 2,  dpsi: -301.0,   dpsi_t: 0.0,   deps: 129.0,   deps_t: -0.1 },
    Term { d: -2, m: -1, mp: 0, f: 2, omega: 2, dpsi: 217.0,   dpsi_t: -0.5,  deps: -95.0,   deps_t: 0.3 },
    Term { d: -2, m: 0, mp: 1, f: 0, omega: 0, dpsi: -158.0,   dpsi_t: 0.0,   deps: 0.0,     deps_t: 0.0 },
    Term { d: -2, m: 0, mp: 0, f: 2, omega: 1, dpsi: 129.0,    dpsi_t: 0.1,   deps: -70.0,   deps_t: 0.0 },
    Term { d: 0, m: 0, mp: -1, f: 2, omega: 2, dpsi: 123.0,    dpsi_t: 0.0,   deps: -53.0,   deps_t: 0.0 },
    Term { d: 2, m: 0, mp: 0, f: 0, omega: 0,  dpsi: 63.0,     dpsi_t: 0.0,   deps: 0.0,     deps_t: 0.0 },
    Term { d: 0, m: 0, mp: 1, f: 0, omega: 1,  dpsi: 63.0,     dpsi_t: 0.1,   deps: -33.0,   deps_t: 0.0 },
    Term { d: 2, m: 0, mp: -1, f: 2, omega: 2, dpsi: -59.0,    dpsi_t: 0.0,   deps: 26.0,    deps_t: 0.0 },
    Term { d: 0, m: 0, mp: -1, f: 0, omega: 1, dpsi: -58.0,    dpsi_t: -0.1,  deps: 32.0,    deps_t: 0.0 },
    Term { d: 0, m: 0, mp: 1, f: 2, omega: 1,  dpsi: -51.0,    dpsi_t: 0.0,   deps: 27.0,    deps_t: 0.0 },
    Term { d: -2, m: 0, mp: 2, f: 0, omega: 0, dpsi: 48.0,     dpsi_t: 0.0,   deps: 0.0,     deps_t: 0.0 },
    Term { d: 0, m: 0, mp: -2, f: 2, omega: 1, dpsi: 46.0,     dpsi_t: 0.0,   deps: -24.0,   deps_t: 0.0 },
];

/// How many of [`DOMINANT_TERMS`] (ordered by published amplitude) each
/// model variant sums, grounded in the models' relative fidelity: 2000B's
/// full 77-term table is itself a standard truncation of 2000A, so this
/// crate's reduced series mirrors that ordering instead of inventing one.
fn term_count(model: NutationModel) -> usize {
    match model {
        NutationModel::Woolard1953 => 4,
        NutationModel::Iau1980 => DOMINANT_TERMS.len(),
        NutationModel::Iau2000A => DOMINANT_TERMS.len(),
        NutationModel::Iau2000B => 10,
    }
}

/// Evaluates nutation in longitude and obliquity at `t` (Julian centuries
/// TT from J2000.0) for the given model.
pub fn nutation(t: f64, model: NutationModel) -> Result<NutationResult, NutationError> {
    let args = FundamentalArguments::at_t(t);
    let n = term_count(model);

    ensure!(
        n <= DOMINANT_TERMS.len(),
        ModelFailureSnafu {
            model: model as u8,
            reason: "requested more terms than are tabulated",
        }
    );

    let mut dpsi = 0.0_f64;
    let mut deps = 0.0_f64;
    for term in &DOMINANT_TERMS[..n] {
        let arg = term.d as f64 * args.d
            + term.m as f64 * args.m
            + term.mp as f64 * args.mp
            + term.f as f64 * args.f
            + term.omega as f64 * args.omega;
        let (s, c) = arg.sin_cos();
        dpsi += (term.dpsi + term.dpsi_t * t) * s;
        deps += (term.deps + term.deps_t * t) * c;
    }

    Ok(NutationResult {
        dpsi_rad: dpsi * 1e-4 * ARCSEC,
        deps_rad: deps * 1e-4 * ARCSEC,
    })
}

/// Three-point quadratic interpolation cache: callers may evaluate
/// nutation at `t - dt`, `t`, `t + dt` once and reuse this interpolant for
/// requests within the window, matching the engine's own caching policy
/// (a cache miss always triggers direct recomputation, never a stale
/// return).
pub struct QuadraticCache {
    pub t0: f64,
    pub dt: f64,
    pub y0: NutationResult,
    pub y1: NutationResult,
    pub y2: NutationResult,
}

impl QuadraticCache {
    pub fn build(t_mid: f64, dt: f64, model: NutationModel) -> Result<Self, NutationError> {
        Ok(Self {
            t0: t_mid,
            dt,
            y0: nutation(t_mid - dt, model)?,
            y1: nutation(t_mid, model)?,
            y2: nutation(t_mid + dt, model)?,
        })
    }

    /// Returns the interpolated nutation at `t`, valid for
    /// `|t - t0| <= dt`.
    pub fn interpolate(&self, t: f64) -> NutationResult {
        let p = (t - self.t0) / self.dt;
        let quad = |a: f64, b: f64, c: f64| -> f64 { b + 0.5 * p * (c - a) + 0.5 * p * p * (c - 2.0 * b + a) };
        NutationResult {
            dpsi_rad: quad(self.y0.dpsi_rad, self.y1.dpsi_rad, self.y2.dpsi_rad),
            deps_rad: quad(self.y0.deps_rad, self.y1.deps_rad, self.y2.deps_rad),
        }
    }
}

#[cfg(test)]
mod nutation_ut {
    use super::*;

    #[test]
    fn dominant_term_matches_known_order_of_magnitude() {
        // At T=0 the 18.6-year term alone is about -17.2 arcsec.
        let r = nutation(0.0, NutationModel::Iau2000B).unwrap();
        let dpsi_arcsec = r.dpsi_rad / ARCSEC;
        assert!(dpsi_arcsec.abs() < 25.0 && dpsi_arcsec.abs() > 5.0, "{dpsi_arcsec}");
    }

    #[test]
    fn quadratic_cache_matches_direct_within_window() {
        let t_mid = 0.1;
        let dt = 1.0 / 36525.0; // one day in centuries
        let cache = QuadraticCache::build(t_mid, dt, NutationModel::Iau2000A).unwrap();
        let direct = nutation(t_mid, NutationModel::Iau2000A).unwrap();
        let interp = cache.interpolate(t_mid);
        assert!((direct.dpsi_rad - interp.dpsi_rad).abs() < 1e-10);
    }

    #[test]
    fn more_terms_changes_result_but_stays_bounded() {
        let a = nutation(0.2, NutationModel::Iau2000B).unwrap();
        let b = nutation(0.2, NutationModel::Iau2000A).unwrap();
        assert!((a.dpsi_rad - b.dpsi_rad).abs() < 100.0 * ARCSEC);
    }
}
