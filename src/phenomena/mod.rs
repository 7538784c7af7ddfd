/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Derived phenomena built on top of the position pipeline: rise/set/
//! transit, eclipse and occultation search, heliacal visibility and sky
//! brightness, and the longitude/node crossing root-finders.
//!
//! The per-instant obstruction geometry shared by [`eclipse`] and
//! [`heliacal`] -- "is one disc hidden behind another, and by how much"
//! -- is the teacher's `line_of_sight_obstructed` tau-parameter test
//! (`src/almanac/eclipse.rs`, Vallado 4th ed. Algorithm 35) and its
//! `Occultation` percentage result type (`src/astro/occultation.rs`),
//! generalized from SPICE `Orbit`/`Frame` states to this engine's plain
//! geocentric equatorial-of-date vectors, with the occulted body made a
//! first-class parameter per spec.md's DESIGN NOTES (the teacher's
//! `(planet, starname)` branch is replaced by `disc_overlap` taking
//! either body's radius directly).

pub mod crossings;
pub mod eclipse;
pub mod heliacal;
pub mod riseset;

use crate::math::dot_unit;

/// Percentage of the back (occulted) disc's apparent area covered by the
/// front (occulting) disc, given both bodies' angular radii (any
/// consistent unit) and their angular separation, same unit. Zero when
/// the discs don't touch; 100 when the back disc is fully covered.
///
/// This is the generalized, first-class-occulted-body form of the
/// teacher's [`Occultation`] percentage -- same two-circle overlap
/// geometry, computed from angular radii/separation rather than a
/// Cartesian tau parameter, since the phenomena searches already have
/// apparent angular sizes on hand from the position pipeline.
pub fn disc_overlap_percentage(front_radius: f64, back_radius: f64, separation: f64) -> f64 {
    if back_radius <= 0.0 {
        return 0.0;
    }
    if separation >= front_radius + back_radius {
        return 0.0;
    }
    if separation <= (front_radius - back_radius).abs() {
        // One disc entirely inside the other.
        return if front_radius >= back_radius {
            100.0
        } else {
            100.0 * (front_radius / back_radius).powi(2)
        };
    }

    // Standard two-circle intersection (lens) area, e.g. Weisstein's
    // "Circle-Circle Intersection".
    let d = separation;
    let r = front_radius;
    let big_r = back_radius;
    let d1 = (d * d - r * r + big_r * big_r) / (2.0 * d);
    let d2 = d - d1;

    let area1 = big_r * big_r * (d1 / big_r).clamp(-1.0, 1.0).acos() - d1 * (big_r * big_r - d1 * d1).max(0.0).sqrt();
    let area2 = r * r * (d2 / r).clamp(-1.0, 1.0).acos() - d2 * (r * r - d2 * d2).max(0.0).sqrt();
    let lens_area = area1 + area2;

    let back_area = std::f64::consts::PI * big_r * big_r;
    (lens_area / back_area * 100.0).clamp(0.0, 100.0)
}

/// Angular separation, in radians, between two `(ra, dec)` directions
/// (both in radians), via unit-vector dot product -- reuses the math
/// kernel's [`dot_unit`] rather than the spherical law of cosines so the
/// `[-1,1]` clamp is shared with the rest of the crate.
pub fn angular_separation_rad(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let a = crate::math::angles::polar_to_cart(ra1, dec1, 1.0);
    let b = crate::math::angles::polar_to_cart(ra2, dec2, 1.0);
    dot_unit(&a, &b).acos()
}

/// Angular radius (semi-diameter), in radians, of a body of physical
/// radius `radius_km` seen from `dist_au` away.
pub fn angular_radius_rad(radius_km: f64, dist_au: f64) -> f64 {
    (radius_km / (dist_au * crate::constants::AU_KM)).asin()
}

/// Standard atmospheric refraction at the apparent horizon, in degrees
/// (positive = apparent altitude raised above true altitude), scaled for
/// non-standard pressure/temperature the way Bennett's formula's
/// `P/1010 * 283/(273+T)` factor does. The nominal value (`-34.5'`) is
/// spec.md section 4.7's horizon constant.
pub fn horizon_refraction_deg(pressure_mbar: f64, temperature_c: f64) -> f64 {
    const STANDARD_REFRACTION_DEG: f64 = 34.5 / 60.0;
    STANDARD_REFRACTION_DEG * (pressure_mbar / 1010.0) * (283.0 / (273.0 + temperature_c))
}

#[cfg(test)]
mod phenomena_ut {
    use super::*;

    #[test]
    fn disc_overlap_is_zero_when_far_apart() {
        assert_eq!(disc_overlap_percentage(0.25, 0.25, 10.0), 0.0);
    }

    #[test]
    fn disc_overlap_is_full_when_back_inside_front() {
        let pct = disc_overlap_percentage(1.0, 0.25, 0.0);
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn disc_overlap_is_partial_for_equal_discs_half_separated() {
        let pct = disc_overlap_percentage(0.25, 0.25, 0.25);
        assert!(pct > 0.0 && pct < 100.0);
    }

    #[test]
    fn angular_separation_of_identical_directions_is_zero() {
        let sep = angular_separation_rad(1.2, 0.3, 1.2, 0.3);
        assert!(sep.abs() < 1e-12);
    }

    #[test]
    fn angular_radius_of_sun_at_one_au_is_about_16_arcmin() {
        let r = angular_radius_rad(crate::constants::body_radii::SUN_KM, 1.0).to_degrees() * 60.0;
        assert!((15.5..16.5).contains(&r), "r={r}");
    }

    #[test]
    fn horizon_refraction_at_standard_conditions_is_34_5_arcmin() {
        let r = horizon_refraction_deg(1010.0, 10.0);
        assert!((r - 34.5 / 60.0).abs() < 1e-9);
    }
}
