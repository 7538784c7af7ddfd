/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

/// Re-export hifitime's duration units, reused wherever the engine needs a
/// span of time rather than an instant (light-time iteration step sizes,
/// finite-difference intervals).
pub use hifitime::Unit as TimeUnit;

/// Conversion factor from arcseconds to radians.
pub const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Conversion factor from radians to arcseconds.
pub const RAD_TO_ARCSEC: f64 = 1.0 / ARCSEC_TO_RAD;
