/*
 * ANISE Toolkit
 * Copyright (C) 2021-2023 Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

mod chebyshev;

pub use chebyshev::{cheb_deriv, cheb_eval};

/// Defines the maximum Chebyshev degree an SE1/JPL-DE segment may carry.
pub(crate) const MAX_SAMPLES: usize = 32;
