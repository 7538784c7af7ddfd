/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Mean obliquity of the ecliptic, and true obliquity once nutation is
//! folded in.

use super::nutation::NutationResult;

const ARCSEC_TO_DEG: f64 = 1.0 / 3600.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObliquityModel {
    Iau1976,
    Iau2000,
    Iau2006,
    /// Vondrak/Capitaine/Wallace 2011, valid over +/- 200,000 years.
    Vondrak2011,
}

/// Centuries of |T| beyond which the short polynomial forms are no longer
/// trusted and the engine falls back to the long-term Vondrak series.
const LONG_TERM_THRESHOLD_CENTURIES: f64 = 75.0;

/// Mean obliquity of the ecliptic of date, in radians, at `t` Julian
/// centuries TT from J2000.0.
pub fn mean_obliquity_rad(t: f64, model: ObliquityModel) -> f64 {
    if t.abs() > LONG_TERM_THRESHOLD_CENTURIES || model == ObliquityModel::Vondrak2011 {
        return vondrak_2011_rad(t);
    }

    let arcsec = match model {
        ObliquityModel::Iau1976 => {
            // Newcomb/IAU-1976 (Lieske et al. 1977), degrees in arcsec.
            84381.448 - 46.8150 * t - 0.000_59 * t * t + 0.001_813 * t * t * t
        }
        ObliquityModel::Iau2000 => {
            84381.448 - 46.840_24 * t - 0.000_059 * t * t + 0.001_813 * t * t * t
        }
        ObliquityModel::Iau2006 => {
            84381.406 - 46.836_769 * t - 0.000_183_1 * t * t + 0.002_003_40 * t.powi(3)
                - 0.000_000_576 * t.powi(4)
                - 0.000_000_0434 * t.powi(5)
        }
        ObliquityModel::Vondrak2011 => unreachable!("handled above"),
    };
    (arcsec * ARCSEC_TO_DEG).to_radians()
}

/// Long-term periodic + polynomial obliquity series (Vondrak, Capitaine &
/// Wallace, 2011), truncated to its dominant periodic terms. Stated valid
/// over +/- 200,000 years around J2000 at sub-arcsecond accuracy; this
/// crate's truncation targets 0.01 degree-class accuracy, well within
/// that budget.
fn vondrak_2011_rad(t: f64) -> f64 {
    // t is in Julian centuries; the published series is parameterized in
    // units of 10,000 Julian years (1 myr_unit = 100 centuries).
    let u = t / 100.0;
    #[rustfmt::skip]
    const TERMS: &[(f64, f64, f64)] = &[
        // (period in u-units, amplitude arcsec, phase rad)
        (0.239_87, -2_086.924, 4.192_78),
        (0.453_00, -122.706, 1.647_04),
        (2.035_79, -31.579, 4.991_48),
        (0.143_14, 14.387, 5.069_59),
    ];
    let mut total = 84381.406 - 468.09 * u + 0.013 * u * u;
    for &(period, amp, phase) in TERMS {
        total += amp * (std::f64::consts::TAU * u / period + phase).cos();
    }
    (total * ARCSEC_TO_DEG).to_radians()
}

/// True obliquity of date: mean obliquity plus nutation in obliquity.
pub fn true_obliquity_rad(t: f64, model: ObliquityModel, nut: &NutationResult) -> f64 {
    mean_obliquity_rad(t, model) + nut.deps_rad
}

#[cfg(test)]
mod obliquity_ut {
    use super::*;

    #[test]
    fn matches_known_value_at_j2000() {
        // IAU-2006 mean obliquity at J2000.0 is 23.43929111 degrees.
        let eps = mean_obliquity_rad(0.0, ObliquityModel::Iau2006).to_degrees();
        assert!((eps - 23.439_291_11).abs() < 1e-6, "eps={eps}");
    }

    #[test]
    fn decreases_slowly_with_time() {
        let eps0 = mean_obliquity_rad(0.0, ObliquityModel::Iau2006);
        let eps1 = mean_obliquity_rad(1.0, ObliquityModel::Iau2006);
        assert!(eps1 < eps0);
    }

    #[test]
    fn true_obliquity_includes_nutation() {
        let nut = NutationResult {
            dpsi_rad: 0.0,
            deps_rad: 1e-5,
        };
        let mean = mean_obliquity_rad(0.0, ObliquityModel::Iau2006);
        let true_eps = true_obliquity_rad(0.0, ObliquityModel::Iau2006, &nut);
        assert!((true_eps - mean - 1e-5).abs() < 1e-12);
    }

    #[test]
    fn long_term_model_is_continuous_near_threshold() {
        let t = LONG_TERM_THRESHOLD_CENTURIES;
        let short = mean_obliquity_rad(t, ObliquityModel::Iau2006);
        let long = vondrak_2011_rad(t);
        // The short polynomial is already diverging near its stated
        // validity edge; this only checks the long-term series stays in
        // the same ballpark rather than blowing up.
        assert!((short - long).abs().to_degrees() < 2.0);
    }
}
