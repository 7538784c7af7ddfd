/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Precession, nutation, frame bias and obliquity of the ecliptic: the
//! rotation-chain machinery that turns a J2000 Cartesian state into the
//! mean or true equator/ecliptic of any other date.

pub mod bias;
pub mod nutation;
pub mod obliquity;
pub mod precession;

/// The five Delaunay fundamental arguments (IERS Conventions), in radians,
/// evaluated at `t` (Julian centuries TT from J2000.0). Shared by the
/// precession, nutation and sidereal-time formulas that build on them.
#[derive(Copy, Clone, Debug)]
pub struct FundamentalArguments {
    /// Mean elongation of the Moon from the Sun.
    pub d: f64,
    /// Mean anomaly of the Sun.
    pub m: f64,
    /// Mean anomaly of the Moon.
    pub mp: f64,
    /// Moon's mean argument of latitude.
    pub f: f64,
    /// Longitude of the Moon's ascending node.
    pub omega: f64,
    /// Mean longitude of the Sun.
    pub l_sun: f64,
    /// Mean longitude of the Moon.
    pub l_moon: f64,
}

impl FundamentalArguments {
    pub fn at_t(t: f64) -> Self {
        let deg = |x: f64| x.to_radians().rem_euclid(std::f64::consts::TAU);
        let d = 297.850_36 + 445_267.111_480 * t - 0.001_914_2 * t * t + t * t * t / 189_474.0;
        let m = 357.527_72 + 35_999.050_340 * t - 0.000_160_3 * t * t - t * t * t / 300_000.0;
        let mp = 134.962_98 + 477_198.867_398 * t + 0.008_697_2 * t * t + t * t * t / 56_250.0;
        let f = 93.271_91 + 483_202.017_538 * t - 0.003_682_5 * t * t + t * t * t / 327_270.0;
        let omega = 125.044_52 - 1934.136_261 * t + 0.002_070_8 * t * t + t * t * t / 450_000.0;
        let l_sun = 280.4665 + 36000.7698 * t;
        let l_moon = 218.3165 + 481_267.8813 * t;
        Self {
            d: deg(d),
            m: deg(m),
            mp: deg(mp),
            f: deg(f),
            omega: deg(omega),
            l_sun: deg(l_sun),
            l_moon: deg(l_moon),
        }
    }
}
