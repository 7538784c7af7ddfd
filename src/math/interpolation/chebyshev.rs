/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

use crate::errors::MathError;

/// Evaluates a Chebyshev series `sum(c_k * T_k(tau))` at `tau in [-1, 1]`
/// using Broucke's ACM 446 Clenshaw-style recurrence.
///
/// `tau_radius` is the half-width (in the same unit as the original
/// independent variable, e.g. seconds or days) that `tau` was normalized
/// against; it is only needed to scale the derivative back out of `tau`
/// space, so pass `1.0` if only the value is needed (the derivative
/// returned will then be d/d(tau) instead of d/d(time)).
pub fn cheb_eval(tau: f64, coeffs: &[f64]) -> Result<f64, MathError> {
    if coeffs.is_empty() {
        return Err(MathError::DomainError {
            value: 0.0,
            msg: "chebyshev series has no coefficients",
        });
    }
    let degree = coeffs.len() - 1;
    let mut w = [0.0_f64; 3];
    for j in (1..=degree).rev() {
        w[2] = w[1];
        w[1] = w[0];
        w[0] = coeffs[j] + 2.0 * tau * w[1] - w[2];
    }
    Ok(coeffs[0] + tau * w[0] - w[1])
}

/// Evaluates both the value and the derivative (with respect to the
/// original, unnormalized variable) of a Chebyshev series at `tau`.
pub fn cheb_deriv(tau: f64, coeffs: &[f64], tau_radius: f64) -> Result<(f64, f64), MathError> {
    if tau_radius.abs() < f64::EPSILON {
        return Err(MathError::DivisionByZero {
            action: "chebyshev derivative scaling (tau_radius is zero)",
        });
    }
    if coeffs.is_empty() {
        return Err(MathError::DomainError {
            value: 0.0,
            msg: "chebyshev series has no coefficients",
        });
    }
    let degree = coeffs.len() - 1;
    let mut w = [0.0_f64; 3];
    let mut dw = [0.0_f64; 3];
    for j in (1..=degree).rev() {
        w[2] = w[1];
        w[1] = w[0];
        w[0] = coeffs[j] + 2.0 * tau * w[1] - w[2];

        dw[2] = dw[1];
        dw[1] = dw[0];
        dw[0] = 2.0 * w[1] + 2.0 * tau * dw[1] - dw[2];
    }
    let val = coeffs[0] + tau * w[0] - w[1];
    let deriv = (w[0] + tau * dw[0] - dw[1]) / tau_radius;
    Ok((val, deriv))
}

#[cfg(test)]
mod chebyshev_ut {
    use super::*;

    #[test]
    fn constant_series_is_constant() {
        let coeffs = [3.5];
        assert!((cheb_eval(0.7, &coeffs).unwrap() - 3.5).abs() < 1e-14);
    }

    #[test]
    fn eval_matches_direct_polynomial_at_t0_and_t1() {
        // T_0(tau)=1, T_1(tau)=tau, T_2(tau)=2tau^2-1
        let coeffs = [1.0, 2.0, 0.5];
        let direct = |tau: f64| 1.0 + 2.0 * tau + 0.5 * (2.0 * tau * tau - 1.0);
        for &tau in &[-1.0, -0.3, 0.0, 0.6, 1.0] {
            let got = cheb_eval(tau, &coeffs).unwrap();
            assert!((got - direct(tau)).abs() < 1e-12, "tau={tau}");
        }
    }

    #[test]
    fn deriv_matches_finite_difference() {
        let coeffs = [1.0, 2.0, 0.5, -0.3];
        let tau_radius = 1.0;
        let h = 1e-5;
        for &tau in &[-0.8, -0.1, 0.4, 0.9] {
            let (_, d) = cheb_deriv(tau, &coeffs, tau_radius).unwrap();
            let f_plus = cheb_eval(tau + h, &coeffs).unwrap();
            let f_minus = cheb_eval(tau - h, &coeffs).unwrap();
            let fd = (f_plus - f_minus) / (2.0 * h);
            assert!((d - fd).abs() < 1e-5, "tau={tau} d={d} fd={fd}");
        }
    }
}
