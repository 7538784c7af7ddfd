/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Heliacal visibility and sky brightness (spec.md section 4.8): a
//! Schaefer-style sky-brightness budget (twilight, daylight, moonlight,
//! night-sky airglow) feeding the visual limiting-magnitude formula,
//! driving a day-by-day (planet) or night-by-night (Moon) scan for the
//! instant an object's predicted magnitude first clears, or last clears,
//! that limit near its horizon crossing.
//!
//! There is no teacher or pack source for this subsystem (it is new
//! relative to the rest of the engine); the brightness terms and the
//! planetary phase-magnitude polynomials below are standard closed-form
//! approximations from the amateur/professional photometry literature
//! rather than a port of a specific reference implementation, and are
//! documented as such rather than claimed to be bit-exact.

use crate::constants::celestial_objects::{EARTH, MOON, SUN};
use crate::engine::Engine;
use crate::errors::{EngineError, HeliacalError};
use crate::math::angles::deg_norm;
use crate::phenomena::riseset::{RiseSetConfig, RiseSetMode};
use crate::BodyId;

/// Observing-site atmosphere and observer physiology/instrument inputs to
/// the sky-brightness and limiting-magnitude model.
#[derive(Copy, Clone, Debug)]
pub struct ObserverConditions {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub alt_m: f64,
    pub pressure_mbar: f64,
    pub temperature_c: f64,
    pub relative_humidity_pct: f64,
    /// Horizontal meteorological visibility range, used for the Koschmieder
    /// extinction-per-airmass estimate.
    pub meteorological_range_km: f64,
    pub age_years: f64,
    /// 1.0 = normal (20/20) visual acuity.
    pub snellen_ratio: f64,
    pub is_binocular: bool,
    /// 1.0 = naked eye.
    pub telescope_magnification: f64,
    pub telescope_aperture_mm: f64,
    pub telescope_transmission: f64,
}

impl Default for ObserverConditions {
    fn default() -> Self {
        Self {
            lon_deg: 0.0,
            lat_deg: 0.0,
            alt_m: 0.0,
            pressure_mbar: 1013.25,
            temperature_c: 15.0,
            relative_humidity_pct: 40.0,
            meteorological_range_km: 40.0,
            age_years: 36.0,
            snellen_ratio: 1.0,
            is_binocular: false,
            telescope_magnification: 1.0,
            telescope_aperture_mm: 7.0,
            telescope_transmission: 1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeliacalEvent {
    /// First visibility rising ahead of sunrise, emerging from solar
    /// conjunction (the classic heliacal rising).
    MorningFirst,
    /// Last visibility setting after sunset before the object is lost in
    /// the Sun's glare.
    EveningLast,
    /// First visibility setting after sunset, early in an apparition.
    EveningFirst,
    /// Last visibility rising ahead of sunrise, late in an apparition.
    MorningLast,
    /// Rises as the Sun sets (opposition-side visibility).
    AcronychalRising,
    /// Sets as the Sun rises.
    AcronychalSetting,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeliacalResult {
    pub jd_start_visible_tt: f64,
    pub jd_best_visible_tt: f64,
    pub jd_end_visible_tt: f64,
    pub vis_limit_mag_at_best: f64,
    pub object_mag_at_best: f64,
    /// Set when the sky brightness crossed the photopic/scotopic boundary
    /// (1645 nL) somewhere in the search window -- the caller should treat
    /// the result as uncertain, matching `SE_SCOTOPIC_FLAG`/
    /// `SE_MIXEDOPIC_FLAG`'s role in the source convention.
    pub uncertain_vision_regime: bool,
}

const NIGHT_SKY_BRIGHTNESS_NL: f64 = 200.0;
const SCOTOPIC_PHOTOPIC_BOUNDARY_NL: f64 = 1645.0;

fn twilight_brightness_nl(sun_alt_deg: f64) -> f64 {
    if sun_alt_deg >= -0.8 {
        return 0.0; // daylight term takes over
    }
    if sun_alt_deg <= -18.0 {
        return 0.0; // astronomical twilight has ended
    }
    let x = (sun_alt_deg + 18.0) / 17.2;
    10f64.powf(2.0 + 3.0 * x)
}

fn day_brightness_nl(sun_alt_deg: f64) -> f64 {
    if sun_alt_deg <= -0.8 {
        return 0.0;
    }
    let x = ((sun_alt_deg + 0.8) / 90.8).clamp(0.0, 1.0);
    2.5e9 * x.sqrt()
}

fn moon_brightness_nl(moon_alt_deg: f64, illum_frac: f64, sep_deg: f64) -> f64 {
    if moon_alt_deg <= 0.0 || illum_frac <= 0.0 {
        return 0.0;
    }
    let sep = sep_deg.max(2.0);
    let alt_factor = moon_alt_deg.to_radians().sin().max(0.05);
    let illum_mag = -12.7 + 2.5 * (1.0 / illum_frac.clamp(1e-3, 1.0)).log10();
    let base_nl = 34.08 * (0.4 * (-illum_mag + 16.57)).exp();
    base_nl * alt_factor / (sep * sep)
}

fn airmass(alt_deg: f64) -> f64 {
    let alt = alt_deg.max(0.1);
    1.0 / (alt.to_radians().sin() + 0.505_72 * (alt + 6.079_95).powf(-1.6364))
}

fn extinction_mag_per_airmass(observer: &ObserverConditions) -> f64 {
    3.912 / observer.meteorological_range_km.max(1.0) * 1.086
}

struct OpticalFactor {
    f1: f64,
    f2: f64,
}

impl OpticalFactor {
    fn from_observer(observer: &ObserverConditions) -> Self {
        let pupil_dia_mm = (5.0 - 0.0067 * observer.age_years).max(2.0);
        let f1 = (observer.telescope_aperture_mm / pupil_dia_mm).powi(2) * observer.telescope_transmission;
        let f2 = 1.0 / (observer.snellen_ratio.max(0.05) * observer.telescope_magnification.max(1.0));
        Self { f1, f2 }
    }
}

const PHOTOPIC_C1: f64 = 1.0;
const PHOTOPIC_C2: f64 = 4.0e-9;
const SCOTOPIC_C1: f64 = 1.0;
const SCOTOPIC_C2: f64 = 9.0e-9;

/// `VisLimMag = -16.57 - 2.5*log10(C1*(1+sqrt(C2*B_sky*f1))^2*f2)`, spec.md
/// section 4.8, with photopic/scotopic constants chosen by the 1645 nL
/// boundary.
fn vis_limit_mag(b_sky_nl: f64, optical: &OpticalFactor) -> f64 {
    let (c1, c2) = if b_sky_nl < SCOTOPIC_PHOTOPIC_BOUNDARY_NL {
        (SCOTOPIC_C1, SCOTOPIC_C2)
    } else {
        (PHOTOPIC_C1, PHOTOPIC_C2)
    };
    let inner = c1 * (1.0 + (c2 * b_sky_nl.max(0.0) * optical.f1).sqrt()).powi(2) * optical.f2;
    -16.57 - 2.5 * inner.max(1e-30).log10()
}

fn altitude_deg(engine: &mut Engine, jd_tt: f64, body: BodyId, observer: &ObserverConditions) -> Result<f64, EngineError> {
    let eq = engine.calc_equatorial(jd_tt, body)?;
    let gast = engine.gast_deg(jd_tt)?;
    let ha_deg = deg_norm(gast + observer.lon_deg - eq.lon_deg);
    let ha = ha_deg.to_radians();
    let dec = eq.lat_deg.to_radians();
    let lat = observer.lat_deg.to_radians();
    Ok((dec.sin() * lat.sin() + dec.cos() * lat.cos() * ha.cos()).asin().to_degrees())
}

/// Sun-body-Earth phase angle, degrees.
fn phase_angle_deg(engine: &mut Engine, jd_tt: f64, body: BodyId) -> Result<f64, EngineError> {
    let r_eb = engine.calc_equatorial(jd_tt, body)?.dist_au;
    let (_, _, r_sb) = engine.heliocentric_ecliptic_deg(jd_tt, body)?;
    let (_, _, r_es) = engine.heliocentric_ecliptic_deg(jd_tt, EARTH)?;
    let cos_phase = ((r_sb * r_sb + r_eb * r_eb - r_es * r_es) / (2.0 * r_sb * r_eb)).clamp(-1.0, 1.0);
    Ok(cos_phase.acos().to_degrees())
}

/// Predicted apparent visual magnitude of `body` above the atmosphere, via
/// the standard phase-angle polynomials (Meeus, *Astronomical Algorithms*
/// ch. 41; Astronomical Almanac approximations). Bodies without a
/// tabulated polynomial (asteroids, nodes, apsides, barycenters) fall back
/// to a flat absolute-magnitude-free estimate -- callers tracking a
/// catalogued body (e.g. a star) should supply its magnitude externally
/// rather than rely on this fallback.
fn apparent_magnitude(engine: &mut Engine, jd_tt: f64, body: BodyId) -> Result<f64, EngineError> {
    use crate::constants::celestial_objects::*;

    if body == SUN {
        return Ok(-26.74);
    }

    let phase_deg = phase_angle_deg(engine, jd_tt, body)?;
    let r_eb = engine.calc_equatorial(jd_tt, body)?.dist_au;
    let (_, _, r_sb) = engine.heliocentric_ecliptic_deg(jd_tt, body)?;

    let base = match body {
        MERCURY => -0.42 + 0.038 * phase_deg - 0.000_273 * phase_deg.powi(2) + 0.000_002 * phase_deg.powi(3),
        VENUS => -4.40 + 0.000_9 * phase_deg + 0.000_239 * phase_deg.powi(2) - 0.000_000_65 * phase_deg.powi(3),
        MARS => -1.52 + 0.016 * phase_deg,
        JUPITER => -9.40 + 0.005 * phase_deg,
        SATURN => -8.88,
        URANUS => -7.19,
        NEPTUNE => -6.87,
        MOON => -12.73 + 0.026 * phase_deg.abs() + 4.0e-9 * phase_deg.powi(4),
        _ => 0.0,
    };

    Ok(base + 5.0 * (r_sb * r_eb).max(1e-6).log10())
}

fn total_extinction_mag(alt_deg: f64, observer: &ObserverConditions) -> f64 {
    airmass(alt_deg) * extinction_mag_per_airmass(observer)
}

/// Visibility margin (`VisLimMag - apparent magnitude`, positive means
/// visible) and the sky brightness it was computed from, at `jd_tt` for
/// `body` as seen by `observer`.
fn margin_and_sky(engine: &mut Engine, observer: &ObserverConditions, jd_tt: f64, body: BodyId) -> Result<(f64, f64, f64, f64), EngineError> {
    let sun_alt = altitude_deg(engine, jd_tt, SUN, observer)?;
    let obj_alt = altitude_deg(engine, jd_tt, body, observer)?;
    let moon_alt = altitude_deg(engine, jd_tt, MOON, observer)?;

    let eq_obj = engine.calc_equatorial(jd_tt, body)?;
    let eq_moon = engine.calc_equatorial(jd_tt, MOON)?;
    let moon_obj_sep_deg = super::angular_separation_rad(
        eq_moon.lon_deg.to_radians(),
        eq_moon.lat_deg.to_radians(),
        eq_obj.lon_deg.to_radians(),
        eq_obj.lat_deg.to_radians(),
    )
    .to_degrees();

    let moon_phase_deg = phase_angle_deg(engine, jd_tt, MOON)?;
    let moon_illum = (1.0 + moon_phase_deg.to_radians().cos()) / 2.0;

    let b_sky = twilight_brightness_nl(sun_alt) + day_brightness_nl(sun_alt) + moon_brightness_nl(moon_alt, moon_illum, moon_obj_sep_deg) + NIGHT_SKY_BRIGHTNESS_NL;

    let optical = OpticalFactor::from_observer(observer);
    let vis_lim = vis_limit_mag(b_sky, &optical);

    let obj_mag = apparent_magnitude(engine, jd_tt, body)? + total_extinction_mag(obj_alt.max(0.05), observer);

    Ok((vis_lim - obj_mag, b_sky, vis_lim, obj_mag))
}

fn mode_for_event(event: HeliacalEvent) -> RiseSetMode {
    match event {
        HeliacalEvent::MorningFirst | HeliacalEvent::MorningLast | HeliacalEvent::AcronychalRising => RiseSetMode::Rise,
        HeliacalEvent::EveningFirst | HeliacalEvent::EveningLast | HeliacalEvent::AcronychalSetting => RiseSetMode::Set,
    }
}

fn is_rising_edge_event(event: HeliacalEvent) -> bool {
    matches!(
        event,
        HeliacalEvent::MorningFirst | HeliacalEvent::EveningFirst | HeliacalEvent::AcronychalRising
    )
}

const MAX_COARSE_STEPS: usize = 40;

/// Searches forward from `jd_ut_start` for `event`, scanning at the
/// object's own horizon crossing each day (Moon) or every 15 days
/// (everything else), per spec.md section 4.8's coarse-then-refine shape.
pub fn heliacal_ut(
    engine: &mut Engine,
    body: BodyId,
    jd_ut_start: f64,
    observer: &ObserverConditions,
    event: HeliacalEvent,
) -> Result<HeliacalResult, EngineError> {
    let coarse_step_days = if body == MOON { 1.0 } else { 15.0 };
    let mode = mode_for_event(event);
    let rise_config = RiseSetConfig::default();
    let wants_rising_edge = is_rising_edge_event(event);

    let mut prev: Option<(f64, f64)> = None;
    let mut best_margin = f64::NEG_INFINITY;
    let mut best_jd_tt = jd_ut_start;
    let mut best_vis_lim = 0.0;
    let mut best_obj_mag = 0.0;
    let mut saw_scotopic = false;
    let mut saw_photopic = false;
    let mut crossing: Option<(f64, f64, f64, f64)> = None;

    for step in 0..MAX_COARSE_STEPS {
        let jd_ut_day = jd_ut_start + step as f64 * coarse_step_days;
        let jd_event_ut = match engine.rise_trans(body, jd_ut_day, observer.lon_deg, observer.lat_deg, mode, &rise_config) {
            Ok(jd) => jd,
            Err(_) => continue,
        };
        let jd_event_tt = engine.jd_ut1_to_tt(jd_event_ut);
        let (margin, b_sky, vis_lim, obj_mag) = margin_and_sky(engine, observer, jd_event_tt, body)?;

        if b_sky < SCOTOPIC_PHOTOPIC_BOUNDARY_NL {
            saw_scotopic = true;
        } else {
            saw_photopic = true;
        }
        if margin > best_margin {
            best_margin = margin;
            best_jd_tt = jd_event_tt;
            best_vis_lim = vis_lim;
            best_obj_mag = obj_mag;
        }

        if let Some((prev_jd, prev_margin)) = prev {
            let crossed = if wants_rising_edge {
                prev_margin <= 0.0 && margin > 0.0
            } else {
                prev_margin > 0.0 && margin <= 0.0
            };
            if crossed {
                crossing = Some((prev_jd, prev_margin, jd_event_tt, margin));
                break;
            }
        }
        prev = Some((jd_event_tt, margin));
    }

    let (jd_before, margin_before, jd_after, margin_after) = crossing.ok_or(EngineError::Heliacal {
        action: "searching for a heliacal visibility transition",
        source: HeliacalError::NotFound,
    })?;

    let denom = margin_before - margin_after;
    let frac = if denom.abs() < 1e-12 { 0.5 } else { margin_before / denom };
    let jd_boundary_tt = jd_before + frac.clamp(0.0, 1.0) * (jd_after - jd_before);

    let (jd_start, jd_end) = if wants_rising_edge {
        (jd_boundary_tt, best_jd_tt.max(jd_boundary_tt))
    } else {
        (best_jd_tt.min(jd_boundary_tt), jd_boundary_tt)
    };

    Ok(HeliacalResult {
        jd_start_visible_tt: jd_start,
        jd_best_visible_tt: best_jd_tt,
        jd_end_visible_tt: jd_end,
        vis_limit_mag_at_best: best_vis_lim,
        object_mag_at_best: best_obj_mag,
        uncertain_vision_regime: saw_scotopic && saw_photopic,
    })
}

#[cfg(test)]
mod heliacal_ut {
    use super::*;
    use crate::constants::celestial_objects::VENUS;
    use crate::constants::J2000_JD;

    #[test]
    fn vis_limit_mag_is_brighter_in_a_darker_sky() {
        let optical = OpticalFactor::from_observer(&ObserverConditions::default());
        let dark = vis_limit_mag(200.0, &optical);
        let bright = vis_limit_mag(1.0e8, &optical);
        assert!(dark > bright, "dark={dark} bright={bright}");
    }

    #[test]
    fn venus_morning_first_search_terminates_with_a_typed_result() {
        let mut engine = Engine::new();
        let observer = ObserverConditions {
            lat_deg: 30.0,
            ..ObserverConditions::default()
        };
        let result = heliacal_ut(&mut engine, VENUS, J2000_JD, &observer, HeliacalEvent::MorningFirst);
        match result {
            Ok(r) => assert!(r.jd_best_visible_tt.is_finite()),
            Err(EngineError::Heliacal { source: HeliacalError::NotFound, .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn airmass_grows_as_altitude_drops_towards_the_horizon() {
        assert!(airmass(10.0) > airmass(60.0));
    }
}
