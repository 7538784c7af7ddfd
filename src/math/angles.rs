/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Angle normalization, Cartesian/polar conversions and the sexagesimal
//! splitter used throughout the position pipeline and the display layer.

use super::Vector3;

/// Returns the provided angle (in degrees) bounded to `[0, 360)`.
pub fn deg_norm(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Returns the provided angle (in radians) bounded to `[0, 2*pi)`.
pub fn rad_norm(angle: f64) -> f64 {
    angle.rem_euclid(std::f64::consts::TAU)
}

/// Returns `a - b` normalized to `[-180, 180)` degrees: the signed angular
/// distance from `b` to `a`, shortest way around the circle.
pub fn dif_deg_2n(a: f64, b: f64) -> f64 {
    between_pm_x(a - b, 180.0)
}

/// Returns the provided angle bounded to `[-x, x)`.
fn between_pm_x(angle: f64, x: f64) -> f64 {
    let mut bounded = angle.rem_euclid(2.0 * x);
    if bounded >= x {
        bounded -= 2.0 * x;
    }
    bounded
}

/// Converts `[lon, lat, r]` (radians, radians, any unit) into Cartesian
/// `[x, y, z]` in the same distance unit. The zero vector maps to itself.
pub fn polar_to_cart(lon: f64, lat: f64, r: f64) -> Vector3 {
    let (slon, clon) = lon.sin_cos();
    let (slat, clat) = lat.sin_cos();
    Vector3::new(r * clat * clon, r * clat * slon, r * slat)
}

/// Inverse of [`polar_to_cart`]. A zero-length input returns `(0, 0, 0)`
/// rather than propagating a NaN through `atan2`/`asin`.
pub fn cart_to_polar(v: Vector3) -> (f64, f64, f64) {
    let r = v.norm();
    if r < f64::EPSILON {
        return (0.0, 0.0, 0.0);
    }
    let lon = rad_norm(v.y.atan2(v.x));
    let lat = (v.z / r).asin();
    (lon, lat, r)
}

/// Speed variant of [`polar_to_cart`]: also transforms `[lon_spd, lat_spd,
/// r_spd]` into a Cartesian velocity consistent with the position.
pub fn polar_to_cart_speed(lon: f64, lat: f64, r: f64, lon_spd: f64, lat_spd: f64, r_spd: f64) -> Vector3 {
    let (slon, clon) = lon.sin_cos();
    let (slat, clat) = lat.sin_cos();
    let dx = r_spd * clat * clon - r * lat_spd * slat * clon - r * lon_spd * clat * slon;
    let dy = r_spd * clat * slon - r * lat_spd * slat * slon + r * lon_spd * clat * clon;
    let dz = r_spd * slat + r * lat_spd * clat;
    Vector3::new(dx, dy, dz)
}

/// Speed variant of [`cart_to_polar`]: given position and velocity in
/// Cartesian coordinates, returns `(lon, lat, r, lon_spd, lat_spd, r_spd)`.
pub fn cart_to_polar_speed(pos: Vector3, vel: Vector3) -> (f64, f64, f64, f64, f64, f64) {
    let (lon, lat, r) = cart_to_polar(pos);
    if r < f64::EPSILON {
        return (lon, lat, r, 0.0, 0.0, 0.0);
    }
    let rxy2 = pos.x * pos.x + pos.y * pos.y;
    let rxy = rxy2.sqrt();
    let r_spd = pos.dot(&vel) / r;
    let lon_spd = if rxy2 > f64::EPSILON {
        (pos.x * vel.y - pos.y * vel.x) / rxy2
    } else {
        0.0
    };
    let lat_spd = if rxy > f64::EPSILON {
        (vel.z * rxy2 - pos.z * (pos.x * vel.x + pos.y * vel.y)) / (r * r * rxy)
    } else {
        0.0
    };
    (lon, lat, r, lon_spd, lat_spd, r_spd)
}

/// Rotates a Cartesian vector around the X axis by `eps` radians. The sign
/// of `eps` selects the rotation direction (used both to go from equatorial
/// to ecliptic, `+eps`, and back, `-eps`).
pub fn coortrf(v: Vector3, eps: f64) -> Vector3 {
    let (s, c) = eps.sin_cos();
    Vector3::new(v.x, c * v.y + s * v.z, -s * v.y + c * v.z)
}

bitflags::bitflags! {
    /// Rounding/formatting flags for [`split_deg`].
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct SplitDegFlag: u32 {
        const ROUND_SEC = 1;
        const ROUND_MIN = 2;
        const ROUND_DEG = 4;
        const ZODIACAL = 8;
        const NAKSHATRA = 16;
        const KEEP_DEG = 32;
        const KEEP_SIGN = 64;
    }
}

/// Result of splitting a decimal-degree value into sexagesimal components.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitDeg {
    pub deg: i32,
    pub min: i32,
    pub sec: i32,
    pub sec_fr: f64,
    pub sign: i32,
}

/// Splits `value` (decimal degrees) into `{deg, min, sec, sec_fr, sign}`
/// per `flags`. Rounding carries through minutes/seconds/degrees normally;
/// when [`SplitDegFlag::KEEP_SIGN`] is set, a carry that would cross 0 or
/// 360 is clamped at the boundary instead of flipping the sign.
pub fn split_deg(value: f64, flags: SplitDegFlag) -> SplitDeg {
    let sign = if value < 0.0 { -1 } else { 1 };
    let mut x = value.abs();

    if flags.contains(SplitDegFlag::ZODIACAL) || flags.contains(SplitDegFlag::NAKSHATRA) {
        let unit = if flags.contains(SplitDegFlag::NAKSHATRA) {
            360.0 / 27.0
        } else {
            30.0
        };
        x %= unit;
    }

    let mut deg = x.trunc();
    let mut frac_deg = (x - deg) * 60.0;
    let mut min = frac_deg.trunc();
    let mut frac_min = (frac_deg - min) * 60.0;
    let mut sec = frac_min.trunc();
    let mut sec_fr = frac_min - sec;

    if flags.contains(SplitDegFlag::ROUND_SEC) {
        sec_fr = 0.0;
        if frac_min - sec >= 0.5 {
            sec += 1.0;
        }
    }
    if sec >= 60.0 {
        sec -= 60.0;
        min += 1.0;
    }
    if flags.contains(SplitDegFlag::ROUND_MIN) {
        if frac_deg - min >= 0.5 {
            min += 1.0;
        }
        sec = 0.0;
        sec_fr = 0.0;
    }
    if min >= 60.0 {
        min -= 60.0;
        deg += 1.0;
        frac_deg = 0.0;
    }
    if flags.contains(SplitDegFlag::ROUND_DEG) {
        if frac_deg >= 30.0 {
            deg += 1.0;
        }
        min = 0.0;
        sec = 0.0;
        sec_fr = 0.0;
    }

    let mut out_sign = sign;
    if !flags.contains(SplitDegFlag::KEEP_SIGN) && !flags.contains(SplitDegFlag::KEEP_DEG) {
        // A carry past the 0/360 boundary on an unsigned display quantity
        // is absorbed here rather than left to the caller.
        if deg >= 360.0 {
            deg -= 360.0;
        }
    } else if flags.contains(SplitDegFlag::KEEP_SIGN) && deg >= 360.0 {
        deg -= 360.0;
        out_sign = sign;
    }

    SplitDeg {
        deg: deg as i32,
        min: min as i32,
        sec: sec as i32,
        sec_fr,
        sign: out_sign,
    }
}

#[cfg(test)]
mod angles_ut {
    use super::*;

    #[test]
    fn deg_norm_wraps_negative() {
        assert!((deg_norm(-90.0) - 270.0).abs() < 1e-12);
        assert!((deg_norm(370.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn dif_deg_wraps_shortest_path() {
        assert!((dif_deg_2n(350.0, 10.0) - (-20.0)).abs() < 1e-9);
        assert!((dif_deg_2n(10.0, 350.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn polar_cart_round_trip() {
        let lon = 1.234_f64;
        let lat = -0.4_f64;
        let r = 2.5_f64;
        let v = polar_to_cart(lon, lat, r);
        let (lon2, lat2, r2) = cart_to_polar(v);
        assert!((lon - lon2).abs() < 1e-13);
        assert!((lat - lat2).abs() < 1e-13);
        assert!((r - r2).abs() < 1e-13);
    }

    #[test]
    fn polar_cart_zero_vector() {
        assert_eq!(cart_to_polar(Vector3::zeros()), (0.0, 0.0, 0.0));
    }

    #[test]
    fn coortrf_round_trip() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let eps = 0.40909280422232897;
        let rotated = coortrf(coortrf(v, eps), -eps);
        assert!((rotated - v).norm() < 1e-13);
    }

    #[test]
    fn split_deg_basic() {
        let s = split_deg(280.375, SplitDegFlag::empty());
        assert_eq!(s.deg, 280);
        assert_eq!(s.min, 22);
        assert_eq!(s.sign, 1);
    }

    #[test]
    fn split_deg_round_sec_carries_into_minute() {
        let s = split_deg(10.0 + 1.0 / 60.0 + 59.6 / 3600.0, SplitDegFlag::ROUND_SEC);
        assert_eq!(s.deg, 10);
        assert_eq!(s.min, 2);
        assert_eq!(s.sec, 0);
    }
}
