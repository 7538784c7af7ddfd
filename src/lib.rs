/*
 * ANISE Toolkit
 * Copyright (C) 2021-2023 Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

extern crate hifitime;
extern crate log;

pub mod constants;
pub mod engine;
pub mod ephemeris;
pub mod errors;
pub mod houses;
pub mod math;
pub mod phenomena;
pub mod pipeline;

/// Re-export of hifitime: this crate leans on it for the TAI/UTC/TT/TDB
/// scale graph and leap seconds instead of reimplementing one.
pub mod time {
    pub use core::str::FromStr;
    pub use hifitime::*;

    pub mod delta_t;
    pub mod earth_orientation;
    pub mod sidereal;
}

pub mod prelude {
    pub use crate::constants::celestial_objects::*;
    pub use crate::engine::Engine;
    pub use crate::errors::EngineError;
    pub use crate::math::units::*;
    pub use crate::math::{Matrix3, Vector3, Vector6};
    pub use crate::time::*;
    pub use std::fs::File;
}

/// Defines the number of bytes in a double (prevents magic numbers)
pub(crate) const DBL_SIZE: usize = 8;

/// Internal body index used throughout the engine's catalog and caches.
pub(crate) type BodyId = i32;

/// Memory maps a file and **copies** the data on the heap prior to returning a pointer to this heap data.
#[macro_export]
macro_rules! file2heap {
    ($filename:tt) => {
        match File::open($filename) {
            Err(e) => Err(InputOutputError::IOError { kind: e.kind() }),
            Ok(file) => unsafe {
                use bytes::Bytes;
                use memmap2::MmapOptions;
                match MmapOptions::new().map(&file) {
                    Err(_) => Err(InputOutputError::IOUnknownError),
                    Ok(mmap) => {
                        let bytes = Bytes::copy_from_slice(&mmap);
                        Ok(bytes)
                    }
                }
            },
        }
    };
}
