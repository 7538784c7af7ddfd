/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! The three interchangeable position sources (Moshier analytical theory,
//! SE1 segmented-Chebyshev files, JPL DE binary files), all implementing
//! the same `heliocentric_ecliptic_j2000` contract so the pipeline can
//! fall back from one to the next without caring which produced a result.

pub mod jpl;
pub mod moshier;
pub mod se1;

use bitflags::bitflags;

use crate::math::Vector3;
use crate::BodyId;

bitflags! {
    /// Which position sources a caller permits, in fallback-preference
    /// order JPL -> SE1 -> Moshier, matching the engine's source mask.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct SourceMask: u32 {
        const JPLEPH = 1;
        const SWIEPH = 2;
        const MOSEPH = 4;
    }
}

/// A heliocentric (barycentric for the Sun) ecliptic J2000 Cartesian
/// state in AU / AU-per-day, plus the bits describing which corrections
/// the producing source already folded in.
#[derive(Copy, Clone, Debug)]
pub struct HelioState {
    pub pos_au: Vector3,
    pub vel_au_day: Vector3,
}

impl HelioState {
    pub const fn new(pos_au: Vector3, vel_au_day: Vector3) -> Self {
        Self { pos_au, vel_au_day }
    }
}

/// Implemented by each of the three position sources.
pub trait PositionSource {
    type Error;

    /// Lowest/highest Julian Day (TT) this source covers for `body`, if
    /// the source is loaded/available for it at all.
    fn coverage(&self, body: BodyId) -> Option<(f64, f64)>;

    /// Heliocentric ecliptic J2000 position and velocity of `body` at
    /// `jd_tt`, in AU / AU per day.
    fn heliocentric_ecliptic_j2000(&self, jd_tt: f64, body: BodyId) -> Result<HelioState, Self::Error>;
}

/// Tries each source named by `mask`, in JPL -> SE1 -> Moshier order,
/// returning the first one that both covers `body` at `jd_tt` and
/// succeeds. Mirrors the "local fallback for OutOfRange" error policy:
/// an out-of-range miss on one source is not surfaced unless every
/// permitted source misses too.
pub fn resolve<J, S, M>(
    jd_tt: f64,
    body: BodyId,
    mask: SourceMask,
    jpl: Option<&J>,
    se1: Option<&S>,
    moshier: &M,
) -> Result<HelioState, crate::errors::EngineError>
where
    J: PositionSource<Error = crate::errors::JplDeError>,
    S: PositionSource<Error = crate::errors::Se1Error>,
    M: PositionSource<Error = crate::errors::MoshierError>,
{
    use snafu::ResultExt;

    if mask.contains(SourceMask::JPLEPH) {
        if let Some(src) = jpl {
            if in_coverage(src, jd_tt, body) {
                return src
                    .heliocentric_ecliptic_j2000(jd_tt, body)
                    .context(crate::errors::JplDeSnafu { action: "resolving position" });
            }
        }
    }
    if mask.contains(SourceMask::SWIEPH) {
        if let Some(src) = se1 {
            if in_coverage(src, jd_tt, body) {
                return src
                    .heliocentric_ecliptic_j2000(jd_tt, body)
                    .context(crate::errors::Se1Snafu { action: "resolving position" });
            }
        }
    }
    if mask.contains(SourceMask::MOSEPH) && in_coverage(moshier, jd_tt, body) {
        return moshier
            .heliocentric_ecliptic_j2000(jd_tt, body)
            .context(crate::errors::MoshierSnafu { action: "resolving position" });
    }

    Err(crate::errors::EngineError::OutOfRange {
        action: "resolving position from any permitted source",
        jd: jd_tt,
        start: 0.0,
        end: 0.0,
    })
}

fn in_coverage<P: PositionSource>(src: &P, jd_tt: f64, body: BodyId) -> bool {
    match src.coverage(body) {
        Some((start, end)) => jd_tt >= start && jd_tt <= end,
        None => false,
    }
}
