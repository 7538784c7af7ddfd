/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Elementary rotation matrices and a small composable direction-cosine
//! matrix wrapper, used by precession/nutation/obliquity to build the
//! equator-of-date <-> ecliptic-of-date <-> J2000 rotation chain.

use core::ops::Mul;

use super::{Matrix3, Vector3};

/// Build a 3x3 rotation matrix around the X axis
pub fn r1(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Build a 3x3 rotation matrix around the Y axis
pub fn r2(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Build a 3x3 rotation matrix around the Z axis
pub fn r3(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// A direction cosine matrix composing the rotation chain between two
/// named, time-tagged frames (e.g. "J2000" -> "mean equator of date").
/// Thin wrapper so precession/nutation/bias compose with `*` the same way
/// regardless of which elementary rotations built them.
#[derive(Copy, Clone, Debug)]
pub struct Dcm {
    pub rot_mat: Matrix3,
}

impl Dcm {
    pub const fn new(rot_mat: Matrix3) -> Self {
        Self { rot_mat }
    }

    pub fn r1(angle_rad: f64) -> Self {
        Self::new(r1(angle_rad))
    }

    pub fn r2(angle_rad: f64) -> Self {
        Self::new(r2(angle_rad))
    }

    pub fn r3(angle_rad: f64) -> Self {
        Self::new(r3(angle_rad))
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn transpose(&self) -> Self {
        Self::new(self.rot_mat.transpose())
    }
}

impl Mul for Dcm {
    type Output = Dcm;
    fn mul(self, rhs: Dcm) -> Dcm {
        Dcm::new(self.rot_mat * rhs.rot_mat)
    }
}

impl Mul<Vector3> for Dcm {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        self.rot_mat * rhs
    }
}

#[cfg(test)]
mod rotation_ut {
    use super::*;

    #[test]
    fn r3_then_r3_negative_is_identity() {
        let angle = 0.6;
        let composed = Dcm::r3(angle) * Dcm::r3(-angle);
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert!(((composed * v) - v).norm() < 1e-13);
    }

    #[test]
    fn transpose_is_inverse_for_orthogonal_matrix() {
        let d = Dcm::r1(1.234);
        let identity = d * d.transpose();
        assert!((identity.rot_mat - Matrix3::identity()).norm() < 1e-13);
    }
}
