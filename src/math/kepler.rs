/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Newton-iteration solver for Kepler's equation `E - e*sin(E) = M`.

use crate::errors::MathError;

const MAX_ITER: usize = 200;
const TOLERANCE_RAD: f64 = 1e-12;

/// Solves Kepler's equation for the eccentric anomaly `E` given the mean
/// anomaly `M` (radians) and eccentricity `e`. Seeds the iteration with a
/// power-series approximation when `e > 0.975` and `|M| < 30 deg`, since
/// the naive `E0 = M` seed converges too slowly (or not at all) near that
/// corner; Newton iteration otherwise starts from `E0 = M`.
pub fn kepler(m: f64, ecc: f64) -> Result<f64, MathError> {
    let thirty_deg = 30.0_f64.to_radians();
    let mut e = if ecc > 0.975 && m.abs() < thirty_deg {
        // Power-series seed (Danby): good starting point for near-parabolic,
        // near-periapsis cases where Newton from E0=M can diverge.
        let m13 = m.abs().cbrt();
        let seed = m13 * (1.0 - ecc / (1.0 + m13 * m13));
        if m < 0.0 {
            -seed
        } else {
            seed
        }
    } else {
        m
    };

    for iter in 0..MAX_ITER {
        let f = e - ecc * e.sin() - m;
        let fp = 1.0 - ecc * e.cos();
        let delta = f / fp;
        e -= delta;
        if delta.abs() < TOLERANCE_RAD {
            return Ok(e);
        }
        let _ = iter;
    }

    Err(MathError::MaxIterationsReached {
        iter: MAX_ITER,
        action: "solving Kepler's equation",
    })
}

#[cfg(test)]
mod kepler_ut {
    use super::*;

    #[test]
    fn satisfies_keplers_equation() {
        for &(m_deg, ecc) in &[(10.0, 0.1), (90.0, 0.5), (179.0, 0.8), (1.0, 0.99)] {
            let m = m_deg.to_radians();
            let e = kepler(m, ecc).unwrap();
            let residual = e - ecc * e.sin() - m;
            assert!(residual.abs() < 1e-11, "residual={residual:e}");
        }
    }

    #[test]
    fn circular_orbit_is_identity() {
        let m = 1.2345;
        let e = kepler(m, 0.0).unwrap();
        assert!((e - m).abs() < 1e-13);
    }
}
