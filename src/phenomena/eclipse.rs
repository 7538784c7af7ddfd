/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Solar/lunar eclipse and lunar-occultation search (spec.md section 4.7):
//! step forward in whole-day increments tracking the Sun-Moon (or
//! Moon-occulted-body) geocentric elongation, find the parabolic
//! extremum around its local minimum (the conjunction/opposition
//! instant), then classify the event from the two discs' angular sizes
//! and separation at that instant.
//!
//! The disc geometry at the extremum is the shared
//! [`super::disc_overlap_percentage`]/[`super::angular_radius_rad`]
//! helpers, generalized from the teacher's `Occultation` percentage
//! result (`src/astro/occultation.rs`) and its `line_of_sight_obstructed`
//! tau-parameter test (`src/almanac/eclipse.rs`) to this engine's plain
//! apparent RA/Dec rather than SPICE frames, with the occulted body a
//! first-class parameter instead of a `(planet, starname)` branch.
//!
//! If the engine has a topocentric observer configured (`Engine::set_topo`),
//! the RA/Dec this module reads already include the parallax shift, which
//! is what the source's separate "local eclipse" variants add on top of
//! the geocentric search -- no separate local/global code path is needed
//! here.

use crate::constants::celestial_objects::{EARTH, MOON, SUN};
use crate::constants::{body_radii, AU_KM};
use crate::engine::Engine;
use crate::errors::{EclipseError, EngineError};
use crate::BodyId;

/// Coarse scan step while searching for the next conjunction/opposition.
const SCAN_STEP_DAYS: f64 = 1.0;
/// Upper bound on scan steps per extremum search (comfortably more than a
/// synodic month so a single search always finds at least one extremum).
const MAX_SCAN_STEPS: usize = 60;
/// How many lunations to examine before giving up on finding an eclipse.
const MAX_LUNATIONS: usize = 15;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolarEclipseClass {
    /// Umbral axis passes through Earth and the umbra is narrower than the
    /// Moon-Earth distance needs for annularity: Moon's disc exceeds the
    /// Sun's.
    Total,
    /// Umbral axis passes through Earth, Moon's disc smaller than the Sun's.
    Annular,
    /// Switches between total and annular along the path; approximated here
    /// as "radii nearly equal at maximum eclipse" since the shadow path
    /// itself is not traced.
    Hybrid,
    /// Discs overlap but the umbral axis misses Earth (grazing/partial only).
    Partial,
    /// Discs do not overlap at all at the point of closest approach found.
    NonCentral,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LunarEclipseClass {
    Total,
    Partial,
    Penumbral,
}

/// Saros cycle/member, approximated from elapsed time since a reference
/// epoch rather than the true 223-synodic-month family lookup table: this
/// crate has no saros catalog, so the member index is a best-effort
/// position-within-cycle count, documented as approximate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SarosEstimate {
    pub cycle: i32,
    pub member: i32,
}

const SAROS_PERIOD_DAYS: f64 = 6_585.321_34;
/// Arbitrary saros-cycle zero epoch (a new moon near 1900-01-01), used only
/// to anchor the approximate cycle/member counters.
const SAROS_EPOCH_JD: f64 = 2_415_020.759_72;

fn saros_estimate(jd_tt: f64) -> SarosEstimate {
    let elapsed = jd_tt - SAROS_EPOCH_JD;
    let cycle = (elapsed / SAROS_PERIOD_DAYS).floor() as i32;
    let phase = elapsed.rem_euclid(SAROS_PERIOD_DAYS) / SAROS_PERIOD_DAYS;
    SarosEstimate {
        cycle,
        member: (phase * 223.0) as i32,
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolarEclipse {
    pub jd_max_tt: f64,
    pub classification: SolarEclipseClass,
    /// Fraction of the Sun's diameter covered at maximum eclipse.
    pub magnitude: f64,
    /// Fraction of the Sun's apparent area covered at maximum eclipse.
    pub area_fraction: f64,
    /// First and fourth contact, Julian Day TT (discs first/last touching).
    pub contact_1_tt: f64,
    pub contact_4_tt: f64,
    pub saros: SarosEstimate,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LunarEclipse {
    pub jd_max_tt: f64,
    pub classification: LunarEclipseClass,
    pub magnitude: f64,
    pub saros: SarosEstimate,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Occultation {
    pub jd_max_tt: f64,
    /// Percentage of the occulted body's apparent disc covered by the Moon.
    pub percentage: f64,
    pub separation_deg: f64,
}

/// Three equally-spaced samples `(x, y)` around a local extremum; returns
/// the parabola's vertex `(x, y)`. Meeus, *Astronomical Algorithms* ch. 3.
fn parabolic_vertex(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> (f64, f64) {
    let h = x2 - x1;
    let denom = y1 - 2.0 * y2 + y3;
    if denom.abs() < 1e-15 {
        return (x2, y2);
    }
    let nm = (y1 - y3) / (2.0 * denom);
    let x_m = x2 + nm * h;
    let y_m = y2 - (y1 - y3) * nm / 4.0;
    (x_m, y_m)
}

/// Scans forward (or backward) from `start_jd_tt` for the next local
/// minimum of `eval`, refining it parabolically. Stops after
/// [`MAX_SCAN_STEPS`] steps without finding one.
fn next_extremum<F>(start_jd_tt: f64, backward: bool, mut eval: F) -> Result<(f64, f64), EngineError>
where
    F: FnMut(f64) -> Result<f64, EngineError>,
{
    let step = if backward { -SCAN_STEP_DAYS } else { SCAN_STEP_DAYS };

    let mut x1 = start_jd_tt;
    let mut y1 = eval(x1)?;
    let mut x2 = x1 + step;
    let mut y2 = eval(x2)?;

    for _ in 0..MAX_SCAN_STEPS {
        let x3 = x2 + step;
        let y3 = eval(x3)?;
        if y2 <= y1 && y2 <= y3 {
            return Ok(parabolic_vertex(x1, y1, x2, y2, x3, y3));
        }
        x1 = x2;
        y1 = y2;
        x2 = x3;
        y2 = y3;
    }

    Err(EngineError::Eclipse {
        action: "scanning for the next conjunction/opposition extremum",
        source: EclipseError::Convergence { iter: MAX_SCAN_STEPS },
    })
}

/// Apparent angular radius of `body` at `jd_tt`, geocentric, radians.
fn angular_radius_of(engine: &mut Engine, jd_tt: f64, body: BodyId) -> Result<f64, EngineError> {
    let eq = engine.calc_equatorial(jd_tt, body)?;
    let radius_km = body_radii::of(body).unwrap_or(0.0);
    Ok(super::angular_radius_rad(radius_km, eq.dist_au))
}

fn elongation_deg(engine: &mut Engine, jd_tt: f64, a: BodyId, b: BodyId) -> Result<f64, EngineError> {
    let eq_a = engine.calc_equatorial(jd_tt, a)?;
    let eq_b = engine.calc_equatorial(jd_tt, b)?;
    Ok(super::angular_separation_rad(
        eq_a.lon_deg.to_radians(),
        eq_a.lat_deg.to_radians(),
        eq_b.lon_deg.to_radians(),
        eq_b.lat_deg.to_radians(),
    )
    .to_degrees())
}

/// First/last contact estimate: fits the local curvature of the
/// separation curve around its minimum `(jd_max, sep_min_deg)` (the
/// separation is well approximated by a parabola this close to its
/// vertex) and solves for where it crosses `threshold_deg` on either
/// side.
fn contact_times<F>(jd_max: f64, sep_min_deg: f64, threshold_deg: f64, mut sep_at: F) -> (f64, f64)
where
    F: FnMut(f64) -> f64,
{
    const H: f64 = 0.5;
    let s_minus = sep_at(jd_max - H);
    let s_plus = sep_at(jd_max + H);
    let curvature = (s_minus - 2.0 * sep_min_deg + s_plus) / (H * H);
    if curvature <= 1e-12 {
        return (jd_max, jd_max);
    }
    let dt = ((threshold_deg - sep_min_deg) / curvature).max(0.0).sqrt();
    (jd_max - dt, jd_max + dt)
}

/// Next solar eclipse (geocentric) at or after `jd_tt_start`, searching
/// backward in time when `backward` is set.
pub fn sol_eclipse_when_glob(engine: &mut Engine, jd_tt_start: f64, backward: bool) -> Result<SolarEclipse, EngineError> {
    let mut search_start = jd_tt_start;

    for _ in 0..MAX_LUNATIONS {
        let (jd_max, sep_min_deg) = next_extremum(search_start, backward, |jd| elongation_deg(engine, jd, SUN, MOON))?;

        let r_sun = angular_radius_of(engine, jd_max, SUN)?.to_degrees();
        let r_moon = angular_radius_of(engine, jd_max, MOON)?.to_degrees();

        if sep_min_deg < r_sun + r_moon {
            let pct = super::disc_overlap_percentage(r_moon, r_sun, sep_min_deg);
            let magnitude = ((r_sun + r_moon - sep_min_deg) / (2.0 * r_sun)).clamp(0.0, 2.0);

            let classification = if sep_min_deg <= (r_moon - r_sun).abs() {
                if (r_moon - r_sun).abs() / r_sun < 0.003 {
                    SolarEclipseClass::Hybrid
                } else if r_moon >= r_sun {
                    SolarEclipseClass::Total
                } else {
                    SolarEclipseClass::Annular
                }
            } else {
                SolarEclipseClass::Partial
            };

            let (contact_1_tt, contact_4_tt) = contact_times(jd_max, sep_min_deg, r_sun + r_moon, |jd| {
                elongation_deg(engine, jd, SUN, MOON).unwrap_or(sep_min_deg)
            });

            return Ok(SolarEclipse {
                jd_max_tt: jd_max,
                classification,
                magnitude,
                area_fraction: pct / 100.0,
                contact_1_tt,
                contact_4_tt,
                saros: saros_estimate(jd_max),
            });
        }

        search_start = if backward { jd_max - 20.0 } else { jd_max + 20.0 };
    }

    Err(EngineError::Eclipse {
        action: "searching for the next solar eclipse",
        source: EclipseError::NotFound,
    })
}

/// Next lunar eclipse (geocentric) at or after `jd_tt_start`.
pub fn lun_eclipse_when_glob(engine: &mut Engine, jd_tt_start: f64, backward: bool) -> Result<LunarEclipse, EngineError> {
    let mut search_start = jd_tt_start;

    for _ in 0..MAX_LUNATIONS {
        // Opposition: minimize |elongation - 180|, which is a local
        // minimum of (180 - elongation) near full moon.
        let (jd_max, anti_elong_deg) =
            next_extremum(search_start, backward, |jd| Ok(180.0 - elongation_deg(engine, jd, SUN, MOON)?))?;

        let moon_dist_au = engine.calc_equatorial(jd_max, MOON)?.dist_au;
        let sun_dist_au = engine.calc_equatorial(jd_max, SUN)?.dist_au;
        let earth_radius_au = body_radii::EARTH_KM / AU_KM;

        let parallax_moon_deg = (earth_radius_au / moon_dist_au).asin().to_degrees();
        let parallax_sun_deg = (earth_radius_au / sun_dist_au).asin().to_degrees();
        let r_sun_deg = angular_radius_of(engine, jd_max, SUN)?.to_degrees();
        let r_moon_deg = angular_radius_of(engine, jd_max, MOON)?.to_degrees();

        // Danjon/Meeus shadow-cone angular radii at the Moon's distance,
        // with the usual ~1% atmospheric-enlargement factor.
        const ENLARGEMENT: f64 = 1.01;
        let r_umbra_deg = ENLARGEMENT * (parallax_moon_deg + parallax_sun_deg - r_sun_deg);
        let r_penumbra_deg = ENLARGEMENT * (parallax_moon_deg + parallax_sun_deg + r_sun_deg);

        let sep_deg = anti_elong_deg;

        if sep_deg < r_penumbra_deg + r_moon_deg {
            let classification = if sep_deg + r_moon_deg <= r_umbra_deg {
                LunarEclipseClass::Total
            } else if sep_deg < r_umbra_deg + r_moon_deg {
                LunarEclipseClass::Partial
            } else {
                LunarEclipseClass::Penumbral
            };

            let magnitude = ((r_umbra_deg + r_moon_deg - sep_deg) / (2.0 * r_moon_deg)).clamp(0.0, 2.0);

            return Ok(LunarEclipse {
                jd_max_tt: jd_max,
                classification,
                magnitude,
                saros: saros_estimate(jd_max),
            });
        }

        search_start = if backward { jd_max - 20.0 } else { jd_max + 20.0 };
    }

    Err(EngineError::Eclipse {
        action: "searching for the next lunar eclipse",
        source: EclipseError::NotFound,
    })
}

/// Next lunar occultation of `occulted_body` at or after `jd_tt_start`,
/// where `occulted_radius_km` is the occulted body's physical radius
/// (pass `0.0` for a point source).
pub fn lun_occult_when_glob(
    engine: &mut Engine,
    occulted_body: BodyId,
    occulted_radius_km: f64,
    jd_tt_start: f64,
    backward: bool,
) -> Result<Occultation, EngineError> {
    let mut search_start = jd_tt_start;

    for _ in 0..MAX_LUNATIONS {
        let (jd_max, sep_min_deg) =
            next_extremum(search_start, backward, |jd| elongation_deg(engine, jd, MOON, occulted_body))?;

        let r_moon_deg = angular_radius_of(engine, jd_max, MOON)?.to_degrees();
        let dist_au = engine.calc_equatorial(jd_max, occulted_body)?.dist_au;
        let r_body_deg = super::angular_radius_rad(occulted_radius_km, dist_au).to_degrees();

        if sep_min_deg < r_moon_deg + r_body_deg {
            let pct = super::disc_overlap_percentage(r_moon_deg, r_body_deg.max(f64::EPSILON), sep_min_deg);
            return Ok(Occultation {
                jd_max_tt: jd_max,
                percentage: pct,
                separation_deg: sep_min_deg,
            });
        }

        search_start = if backward { jd_max - 20.0 } else { jd_max + 20.0 };
    }

    Err(EngineError::Eclipse {
        action: "searching for the next lunar occultation",
        source: EclipseError::NotFound,
    })
}

#[cfg(test)]
mod eclipse_ut {
    use super::*;

    #[test]
    fn solar_eclipse_2024_04_08_is_found_near_the_expected_date() {
        let mut engine = Engine::new();
        let eclipse = sol_eclipse_when_glob(&mut engine, 2_460_400.5, false).unwrap();
        assert!(
            (2_460_408.6..2_460_409.5).contains(&eclipse.jd_max_tt),
            "jd_max={}",
            eclipse.jd_max_tt
        );
        assert_ne!(eclipse.classification, SolarEclipseClass::NonCentral);
    }

    #[test]
    fn lunar_eclipse_search_finds_a_future_opposition() {
        let mut engine = Engine::new();
        let result = lun_eclipse_when_glob(&mut engine, crate::constants::J2000_JD, false);
        // Not every search window starting at an arbitrary JD contains an
        // eclipse within MAX_LUNATIONS; a concrete date is used in the
        // solar test above. Here we only assert the search terminates with
        // either a found eclipse or a well-typed NotFound.
        match result {
            Ok(eclipse) => assert!(eclipse.jd_max_tt > crate::constants::J2000_JD),
            Err(EngineError::Eclipse { source: EclipseError::NotFound, .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn occultation_search_terminates() {
        let mut engine = Engine::new();
        let result = lun_occult_when_glob(&mut engine, crate::constants::celestial_objects::VENUS, body_radii::VENUS_KM, crate::constants::J2000_JD, false);
        match result {
            Ok(occ) => assert!(occ.percentage >= 0.0 && occ.percentage <= 100.0),
            Err(EngineError::Eclipse { source: EclipseError::NotFound, .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
        let _ = EARTH;
    }
}
