/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Frame bias between the Geocentric Celestial Reference System (GCRS)
//! and the dynamical J2000 mean equator/equinox, plus the historical
//! time-dependent right-ascension offset some ephemerides carry.

use crate::math::rotation::Dcm;

/// Fixed frame-bias Euler angles (IAU-2000/2006), in arcseconds.
const XI_BIAS_ARCSEC: f64 = -0.016_617;
const ETA_BIAS_ARCSEC: f64 = -0.006_819_2;
const DA_BIAS_ARCSEC: f64 = -0.014_6;

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// The fixed GCRS-to-J2000 frame bias rotation, IAU-2000/2006 definition.
/// Independent of epoch: the bias is a one-time offset, not a rate.
pub fn frame_bias_dcm() -> Dcm {
    let xi = XI_BIAS_ARCSEC * ARCSEC_TO_RAD;
    let eta = ETA_BIAS_ARCSEC * ARCSEC_TO_RAD;
    let da = DA_BIAS_ARCSEC * ARCSEC_TO_RAD;
    Dcm::r3(-da) * Dcm::r2(xi) * Dcm::r1(-eta)
}

/// A handful of historical catalog-tie right-ascension offsets (JPL
/// Horizons-style), in arcseconds, linearly interpolated between entries.
/// Supplements the fixed bias for callers who need agreement with older
/// ephemerides that carried a time-dependent RA zero point; outside the
/// tabulated span the nearest endpoint value is held constant.
const RA_OFFSET_TABLE: &[(f64, f64)] = &[
    (1900.0, -0.0226),
    (1950.0, -0.0182),
    (2000.0, -0.0146),
    (2050.0, -0.0110),
    (2100.0, -0.0074),
];

/// Interpolated RA bias offset, in radians, at the given Julian year.
pub fn ra_offset_rad(year: f64) -> f64 {
    if year <= RA_OFFSET_TABLE[0].0 {
        return RA_OFFSET_TABLE[0].1 * ARCSEC_TO_RAD;
    }
    let last = RA_OFFSET_TABLE.len() - 1;
    if year >= RA_OFFSET_TABLE[last].0 {
        return RA_OFFSET_TABLE[last].1 * ARCSEC_TO_RAD;
    }
    for w in RA_OFFSET_TABLE.windows(2) {
        let (y0, v0) = w[0];
        let (y1, v1) = w[1];
        if year >= y0 && year <= y1 {
            let frac = (year - y0) / (y1 - y0);
            return (v0 + frac * (v1 - v0)) * ARCSEC_TO_RAD;
        }
    }
    unreachable!("table bounds checked above")
}

#[cfg(test)]
mod bias_ut {
    use super::*;

    #[test]
    fn frame_bias_is_near_identity() {
        let dcm = frame_bias_dcm();
        for i in 0..3 {
            assert!((dcm.rot_mat[(i, i)] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn ra_offset_matches_table_at_anchor() {
        let off = ra_offset_rad(2000.0);
        assert!((off - (-0.0146 * ARCSEC_TO_RAD)).abs() < 1e-12);
    }

    #[test]
    fn ra_offset_clamps_outside_table() {
        let below = ra_offset_rad(1800.0);
        let above = ra_offset_rad(2200.0);
        assert_eq!(below, RA_OFFSET_TABLE[0].1 * ARCSEC_TO_RAD);
        assert_eq!(above, RA_OFFSET_TABLE[RA_OFFSET_TABLE.len() - 1].1 * ARCSEC_TO_RAD);
    }
}
