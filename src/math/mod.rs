/*
 * ANISE Toolkit
 * Copyright (C) 2021-2023 Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

// Vector3 is nalgebra's Vector3 with a 64-bit floating point representation.
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Vector6 = nalgebra::Vector6<f64>;
pub type Matrix3 = nalgebra::Matrix3<f64>;

pub mod angles;
pub mod crc32;
pub mod interpolation;
pub mod kepler;
pub mod rotation;
pub mod units;

/// Returns the projection of a onto b
/// Converted from NAIF SPICE's `projv`
pub fn project_vector(a: &Vector3, b: &Vector3) -> Vector3 {
    b * a.dot(b) / b.dot(b)
}

/// Returns the components of vector a orthogonal to b
/// Converted from NAIF SPICE's `prepv`
pub fn perp_vector(a: &Vector3, b: &Vector3) -> Vector3 {
    let big_a = a[0].abs().max(a[1].abs().max(a[2].abs()));
    let big_b = b[0].abs().max(b[1].abs().max(b[2].abs()));
    if big_a < f64::EPSILON {
        Vector3::zeros()
    } else if big_b < f64::EPSILON {
        *a
    } else {
        let a_scl = a / big_a;
        let b_scl = b / big_b;
        let v = project_vector(&a_scl, &b_scl);
        big_a * (a_scl - v)
    }
}

/// Rotate the vector a around the provided axis by angle theta.
/// Converted from NAIF SPICE's `vrotv`
pub fn rotate_vector(a: &Vector3, axis: &Vector3, theta_rad: f64) -> Vector3 {
    let x = axis.normalize();
    let p = project_vector(a, &x);
    let v1 = a - p;
    let v2 = a.cross(&v1);
    let r_plane = v1 * theta_rad.cos() + v2 * theta_rad.sin();
    r_plane + p
}

/// Dot product of two unit vectors, clamped to `[-1, 1]` to absorb rounding
/// noise before an `acos`.
pub fn dot_unit(a: &Vector3, b: &Vector3) -> f64 {
    (a.normalize().dot(&b.normalize())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod math_ut {
    use super::*;

    #[test]
    fn perp_of_parallel_is_zero() {
        let a = Vector3::new(2.0, 0.0, 0.0);
        let b = Vector3::new(5.0, 0.0, 0.0);
        assert!(perp_vector(&a, &b).norm() < 1e-12);
    }

    #[test]
    fn rotate_full_turn_is_identity() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let axis = Vector3::new(0.0, 0.0, 1.0);
        let r = rotate_vector(&a, &axis, std::f64::consts::TAU);
        assert!((r - a).norm() < 1e-9);
    }

    #[test]
    fn dot_unit_is_bounded() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 1.0, 0.0);
        let d = dot_unit(&a, &b);
        assert!((-1.0..=1.0).contains(&d));
        assert!((d - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }
}
