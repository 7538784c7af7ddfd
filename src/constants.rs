/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

/// Speed of light in kilometers per second (km/s)
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Astronomical unit, in kilometers (IAU 2012 exact definition).
pub const AU_KM: f64 = 149_597_870.7;

/// Gaussian gravitational constant, used for the two-body Kepler solver's
/// GM of the Sun in AU^3/day^2 (k^2).
pub const GAUSS_GM_SUN_AU3_DAY2: f64 = 0.000_295_912_208_284_119_5;

/// Julian day number of the J2000.0 epoch (2000-01-01T12:00:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

/// Julian days in one Julian century.
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;

pub mod celestial_objects {
    use crate::BodyId;

    /// Internal body index catalog. Indices mirror the small-integer
    /// convention of a position(jd, body, flags) call: the Sun is 0, the
    /// Moon is 1, Mercury..Pluto are 2..9, and the remaining slots are
    /// derived points rather than physical bodies.
    pub const SUN: BodyId = 0;
    pub const MOON: BodyId = 1;
    pub const MERCURY: BodyId = 2;
    pub const VENUS: BodyId = 3;
    pub const EARTH: BodyId = 4;
    pub const MARS: BodyId = 5;
    pub const JUPITER: BodyId = 6;
    pub const SATURN: BodyId = 7;
    pub const URANUS: BodyId = 8;
    pub const NEPTUNE: BodyId = 9;
    pub const PLUTO: BodyId = 10;
    /// Mean lunar node (ascending).
    pub const MEAN_NODE: BodyId = 11;
    /// True (osculating) lunar node (ascending).
    pub const TRUE_NODE: BodyId = 12;
    /// Mean lunar apogee ("Black Moon Lilith").
    pub const MEAN_APOGEE: BodyId = 13;
    /// Osculating lunar apogee.
    pub const OSCU_APOGEE: BodyId = 14;
    /// Earth-Moon barycenter.
    pub const EARTH_MOON_BARYCENTER: BodyId = 15;
    pub const CHIRON: BodyId = 16;
    pub const CERES: BodyId = 17;
    pub const PALLAS: BodyId = 18;
    pub const JUNO: BodyId = 19;
    pub const VESTA: BodyId = 20;
    /// Solar system barycenter.
    pub const SOLAR_SYSTEM_BARYCENTER: BodyId = -1;

    pub const fn body_name(id: BodyId) -> Option<&'static str> {
        match id {
            SUN => Some("Sun"),
            MOON => Some("Moon"),
            MERCURY => Some("Mercury"),
            VENUS => Some("Venus"),
            EARTH => Some("Earth"),
            MARS => Some("Mars"),
            JUPITER => Some("Jupiter"),
            SATURN => Some("Saturn"),
            URANUS => Some("Uranus"),
            NEPTUNE => Some("Neptune"),
            PLUTO => Some("Pluto"),
            MEAN_NODE => Some("Mean Node"),
            TRUE_NODE => Some("True Node"),
            MEAN_APOGEE => Some("Mean Apogee"),
            OSCU_APOGEE => Some("Osculating Apogee"),
            EARTH_MOON_BARYCENTER => Some("Earth-Moon Barycenter"),
            CHIRON => Some("Chiron"),
            CERES => Some("Ceres"),
            PALLAS => Some("Pallas"),
            JUNO => Some("Juno"),
            VESTA => Some("Vesta"),
            SOLAR_SYSTEM_BARYCENTER => Some("Solar System Barycenter"),
            _ => None,
        }
    }

    /// Ratio of the Earth's mass to the Moon's mass, used to split an
    /// Earth-Moon barycenter state into Earth and Moon states.
    pub const EARTH_MOON_MASS_RATIO: f64 = 81.300_569;
}

/// Mean body radii, in kilometers, used by the rise/set semi-diameter
/// correction and the eclipse/occultation disc-overlap geometry. IAU
/// 2015 Resolution B3 nominal values where defined; Moon and Earth from
/// the same source.
pub mod body_radii {
    use crate::BodyId;
    use crate::constants::celestial_objects::*;

    pub const SUN_KM: f64 = 696_000.0;
    pub const MOON_KM: f64 = 1_737.4;
    pub const MERCURY_KM: f64 = 2_439.7;
    pub const VENUS_KM: f64 = 6_051.8;
    pub const EARTH_KM: f64 = 6_371.0;
    pub const MARS_KM: f64 = 3_389.5;
    pub const JUPITER_KM: f64 = 69_911.0;
    pub const SATURN_KM: f64 = 58_232.0;
    pub const URANUS_KM: f64 = 25_362.0;
    pub const NEPTUNE_KM: f64 = 24_622.0;
    pub const PLUTO_KM: f64 = 1_188.3;

    /// Mean radius of `body`, or `None` for point-like bodies (nodes,
    /// apsides, barycenters, asteroids without a tabulated radius here).
    pub const fn of(body: BodyId) -> Option<f64> {
        match body {
            SUN => Some(SUN_KM),
            MOON => Some(MOON_KM),
            MERCURY => Some(MERCURY_KM),
            VENUS => Some(VENUS_KM),
            EARTH => Some(EARTH_KM),
            MARS => Some(MARS_KM),
            JUPITER => Some(JUPITER_KM),
            SATURN => Some(SATURN_KM),
            URANUS => Some(URANUS_KM),
            NEPTUNE => Some(NEPTUNE_KM),
            PLUTO => Some(PLUTO_KM),
            _ => None,
        }
    }
}

/// WGS-84 geodetic reference ellipsoid, used for the topocentric observer
/// shift in the position pipeline.
pub mod wgs84 {
    /// Equatorial radius, in meters.
    pub const SEMI_MAJOR_AXIS_M: f64 = 6_378_136.6;
    /// Flattening factor (1/f = 298.25642).
    pub const FLATTENING: f64 = 1.0 / 298.256_42;
}

/// Fixed sidereal-mode ayanamsa table: {mode, t0 (JD), ayan_t0 (deg at
/// t0), t0_is_ut}. Subset of the full 47-mode table covering the modes
/// exercised by the engine's test scenarios and documentation examples;
/// additional modes can be appended without changing the lookup contract.
pub mod ayanamsa {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum SiderealMode {
        Fagan,
        Lahiri,
        DeLuce,
        Raman,
        Krishnamurti,
        J2000,
        J1900,
        B1950,
    }

    pub struct AyanamsaEntry {
        pub mode: SiderealMode,
        /// Reference epoch, Julian Day (TT unless `t0_is_ut`).
        pub t0: f64,
        /// Ayanamsa value at `t0`, in degrees.
        pub ayan_t0: f64,
        pub t0_is_ut: bool,
    }

    pub const TABLE: &[AyanamsaEntry] = &[
        AyanamsaEntry {
            mode: SiderealMode::Fagan,
            t0: 2_433_282.5,
            ayan_t0: 24.042_044_4,
            t0_is_ut: false,
        },
        AyanamsaEntry {
            mode: SiderealMode::Lahiri,
            t0: 2_435_553.5,
            ayan_t0: 23.250_182_778,
            t0_is_ut: false,
        },
        AyanamsaEntry {
            mode: SiderealMode::DeLuce,
            t0: 2_433_282.5,
            ayan_t0: 24.042_044_4,
            t0_is_ut: false,
        },
        AyanamsaEntry {
            mode: SiderealMode::Raman,
            t0: 2_415_020.0,
            ayan_t0: 21.100_000,
            t0_is_ut: false,
        },
        AyanamsaEntry {
            mode: SiderealMode::Krishnamurti,
            t0: 2_435_553.5,
            ayan_t0: 23.250_182_778,
            t0_is_ut: false,
        },
        AyanamsaEntry {
            mode: SiderealMode::J2000,
            t0: crate::constants::J2000_JD,
            ayan_t0: 0.0,
            t0_is_ut: false,
        },
        AyanamsaEntry {
            mode: SiderealMode::J1900,
            t0: 2_415_020.0,
            ayan_t0: 0.0,
            t0_is_ut: false,
        },
        AyanamsaEntry {
            mode: SiderealMode::B1950,
            t0: 2_433_282.423,
            ayan_t0: 0.0,
            t0_is_ut: false,
        },
    ];

    pub fn entry(mode: SiderealMode) -> &'static AyanamsaEntry {
        TABLE
            .iter()
            .find(|e| e.mode == mode)
            .expect("every SiderealMode variant has a TABLE entry")
    }
}

#[cfg(test)]
mod constants_ut {
    use super::celestial_objects::*;

    #[test]
    fn body_name_round_trip() {
        assert_eq!(body_name(SUN).unwrap(), "Sun");
        assert_eq!(body_name(MOON).unwrap(), "Moon");
        assert_eq!(body_name(PLUTO).unwrap(), "Pluto");
        assert!(body_name(42).is_none());
    }
}
