/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Moshier analytical theory: a self-contained, no-external-data
//! position source built from truncated Fourier-polynomial series fitted
//! to DE404 (planets) and ELP-2000/85 (Moon). No file I/O, no loaded
//! state -- a pure function of `(jd_tt, body)`.

pub mod lunar;
pub mod planetary;

use crate::constants::celestial_objects;
use crate::ephemeris::{HelioState, PositionSource};
use crate::errors::MoshierError;
use crate::math::Vector3;
use crate::BodyId;

/// Lower bound of Moshier planetary coverage, JD TT.
pub const MOSHPLEPH_START: f64 = 625_000.5;
/// Upper bound of Moshier planetary coverage, JD TT.
pub const MOSHPLEPH_END: f64 = 2_818_000.5;
/// Extra acceptance margin applied at the coverage boundary, days.
pub const BOUNDARY_MARGIN_DAYS: f64 = 0.3;
/// Lunar theory shares the same nominal window with a tighter margin.
pub const BOUNDARY_MARGIN_DAYS_MOON: f64 = 0.2;

/// Finite-difference step used for velocity-by-differencing, days.
pub const PLAN_SPEED_INTV: f64 = 1e-4;

/// Earth/Moon mass ratio used to split the EMB Moshier solution into
/// separate Earth and Moon states.
const EARTH_MOON_MASS_RATIO: f64 = celestial_objects::EARTH_MOON_MASS_RATIO;

/// Self-contained, stateless Moshier position source.
#[derive(Copy, Clone, Debug, Default)]
pub struct MoshierTheory;

impl MoshierTheory {
    pub const fn new() -> Self {
        Self
    }

    fn jd_in_range(jd_tt: f64, body: BodyId) -> bool {
        let margin = if body == celestial_objects::MOON {
            BOUNDARY_MARGIN_DAYS_MOON
        } else {
            BOUNDARY_MARGIN_DAYS
        };
        jd_tt >= MOSHPLEPH_START - margin && jd_tt <= MOSHPLEPH_END + margin
    }

    /// Heliocentric ecliptic-of-date J2000 state by central difference:
    /// evaluate position at `jd_tt - h`, `jd_tt`, `jd_tt + h` and use the
    /// centered difference for velocity, matching spec's `PLAN_SPEED_INTV`
    /// policy for planets and the Moon's own parabolic-fit policy.
    fn state_for(jd_tt: f64, body: BodyId) -> Result<HelioState, MoshierError> {
        if body == celestial_objects::SUN {
            // Heliocentric Sun is the origin of its own frame, by definition.
            return Ok(HelioState::new(Vector3::zeros(), Vector3::zeros()));
        }
        if body == celestial_objects::MOON {
            return lunar::lunar_state(jd_tt);
        }
        if body == celestial_objects::EARTH {
            let emb = planetary::position(jd_tt, celestial_objects::EARTH_MOON_BARYCENTER)?;
            let moon = lunar::lunar_state(jd_tt)?;
            let earth_pos = emb.pos_au - moon.pos_au / (EARTH_MOON_MASS_RATIO + 1.0);
            let earth_vel = emb.vel_au_day - moon.vel_au_day / (EARTH_MOON_MASS_RATIO + 1.0);
            return Ok(HelioState::new(earth_pos, earth_vel));
        }
        planetary::position(jd_tt, body)
    }
}

impl PositionSource for MoshierTheory {
    type Error = MoshierError;

    fn coverage(&self, body: BodyId) -> Option<(f64, f64)> {
        let margin = if body == celestial_objects::MOON {
            BOUNDARY_MARGIN_DAYS_MOON
        } else {
            BOUNDARY_MARGIN_DAYS
        };
        Some((MOSHPLEPH_START - margin, MOSHPLEPH_END + margin))
    }

    fn heliocentric_ecliptic_j2000(&self, jd_tt: f64, body: BodyId) -> Result<HelioState, MoshierError> {
        if !Self::jd_in_range(jd_tt, body) {
            return Err(MoshierError::OutOfRange {
                jd: jd_tt,
                start: MOSHPLEPH_START,
                end: MOSHPLEPH_END,
                theory: "moshier",
            });
        }
        Self::state_for(jd_tt, body)
    }
}

/// Shared helper: central-difference velocity for a position function
/// that does not itself return a velocity (used by the planetary series,
/// whose published coefficients are position-only).
pub(crate) fn finite_difference_velocity<F>(jd_tt: f64, h: f64, pos_fn: F) -> Vector3
where
    F: Fn(f64) -> Vector3,
{
    let plus = pos_fn(jd_tt + h);
    let minus = pos_fn(jd_tt - h);
    (plus - minus) / (2.0 * h)
}

#[cfg(test)]
mod moshier_ut {
    use super::*;

    #[test]
    fn sun_is_within_range_at_j2000() {
        let theory = MoshierTheory::new();
        let state = theory
            .heliocentric_ecliptic_j2000(crate::constants::J2000_JD, celestial_objects::SUN)
            .unwrap();
        assert!(state.pos_au.norm() < 0.1); // heliocentric Sun is near the origin
    }

    #[test]
    fn rejects_jd_outside_coverage() {
        let theory = MoshierTheory::new();
        let err = theory.heliocentric_ecliptic_j2000(0.0, celestial_objects::SUN);
        assert!(err.is_err());
    }
}
