/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! The position pipeline: heliocentric J2000 state in, apparent
//! geocentric/topocentric polar coordinates of date out, in eight steps.
//!
//! Stellar aberration is the teacher's `stellar_aberration`
//! (`src/astro/aberration.rs`) rotate-by-angle-about-cross-product
//! algorithm (NAIF `stelab`), generalized from its `Aberration`-enum
//! dispatch to this pipeline's plain before/after steps; light-time
//! iteration and gravitational deflection are new since the teacher's
//! aberration module does not implement either.

use bitflags::bitflags;

use crate::constants::{wgs84, AU_KM, SPEED_OF_LIGHT_KM_S};
use crate::errors::EngineError;
use crate::ephemeris::HelioState;
use crate::math::angles::{cart_to_polar_speed, coortrf};
use crate::math::rotation::Dcm;
use crate::math::{rotate_vector, Vector3};
use crate::time::earth_orientation::bias::frame_bias_dcm;
use crate::time::earth_orientation::nutation::{nutation, NutationModel};
use crate::time::earth_orientation::obliquity::{mean_obliquity_rad, true_obliquity_rad, ObliquityModel};
use crate::time::earth_orientation::precession::{precession_dcm, PrecessionModel};
use crate::time::sidereal::{gast_deg, SiderealModel};

bitflags! {
    /// Per-call pipeline switches, mirroring the calculation bits of the
    /// source convention's flag surface.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct PipelineFlags: u32 {
        const NOABERR = 1;
        const NOGDEFL = 2;
        const TOPOCENTRIC = 4;
        const TRUE_EQUATOR_OF_DATE = 8;
        const ECLIPTIC_OF_DATE = 16;
    }
}

/// Which sidereal projection (if any) step 7 applies; mutually exclusive,
/// per spec's invariant on the ECL_T0/SSY_PLANE/ECL_DATE bits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SiderealProjection {
    /// Tropical: no ayanamsa subtraction.
    Tropical,
    /// Default sidereal: subtract the ayanamsa, latitude unchanged.
    Default(crate::constants::ayanamsa::SiderealMode),
    /// Rotate into the ecliptic of date; subtract the ayanamsa afterwards.
    EclDate(crate::constants::ayanamsa::SiderealMode),
    /// Rotate into the ecliptic of a reference epoch t0 (latitude changes).
    EclT0(crate::constants::ayanamsa::SiderealMode),
    /// Rotate into the solar-system invariable plane.
    SolarSystemPlane,
}

/// Geodetic observer location for the topocentric shift (step 2).
#[derive(Copy, Clone, Debug)]
pub struct Observer {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub alt_m: f64,
}

/// Models + switches governing one pipeline evaluation; every field has a
/// sensible IAU-2006-era default via [`PipelineConfig::default`].
#[derive(Copy, Clone, Debug)]
pub struct PipelineConfig {
    pub precession_model: PrecessionModel,
    pub nutation_model: NutationModel,
    pub obliquity_model: ObliquityModel,
    pub sidereal_time_model: SiderealModel,
    pub sidereal: SiderealProjection,
    pub observer: Option<Observer>,
    pub flags: PipelineFlags,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            precession_model: PrecessionModel::Iau2006,
            nutation_model: NutationModel::Iau2000B,
            obliquity_model: ObliquityModel::Iau2006,
            sidereal_time_model: SiderealModel::Iau2006,
            sidereal: SiderealProjection::Tropical,
            observer: None,
            // Ecliptic-of-date zodiacal longitude/latitude is the engine's
            // default output (spec.md section 8's "longitude in [0,360)"
            // scenarios); callers that want RA/Dec clear this flag via
            // `Engine::calc_equatorial`.
            flags: PipelineFlags::ECLIPTIC_OF_DATE,
        }
    }
}

/// Final apparent position, polar coordinates of date (or of the sidereal
/// reference frame selected), degrees/AU/day.
#[derive(Copy, Clone, Debug)]
pub struct ApparentPosition {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub dist_au: f64,
    pub lon_spd_deg_day: f64,
    pub lat_spd_deg_day: f64,
    pub dist_spd_au_day: f64,
}

const LIGHT_TIME_MAX_ITER: usize = 4;
const LIGHT_TIME_CONVERGENCE_DAYS: f64 = 1e-9;

/// Julian centuries TT from J2000.0.
fn centuries(jd_tt: f64) -> f64 {
    (jd_tt - crate::constants::J2000_JD) / crate::constants::DAYS_PER_JULIAN_CENTURY
}

fn ecliptic_to_equatorial_j2000(v: Vector3, eps0_rad: f64) -> Vector3 {
    coortrf(v, -eps0_rad)
}

fn equatorial_to_ecliptic(v: Vector3, eps_rad: f64) -> Vector3 {
    coortrf(v, eps_rad)
}

/// Observer's geocentric Cartesian position/velocity in the true equator
/// of date frame, from WGS-84 geodetic coordinates and Greenwich apparent
/// sidereal time. Velocity is the pure rotational term `omega x r`.
fn observer_geocentric(observer: &Observer, gast_rad: f64) -> (Vector3, Vector3) {
    let lat = observer.lat_deg.to_radians();
    let a = wgs84::SEMI_MAJOR_AXIS_M / 1000.0;
    let f = wgs84::FLATTENING;
    let e2 = f * (2.0 - f);
    let sin_lat = lat.sin();
    let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let alt_km = observer.alt_m / 1000.0;
    let rho_cos = (n + alt_km) * lat.cos();
    let rho_sin = (n * (1.0 - e2) + alt_km) * sin_lat;

    let local_sidereal = gast_rad + observer.lon_deg.to_radians();
    let pos_km = Vector3::new(
        rho_cos * local_sidereal.cos(),
        rho_cos * local_sidereal.sin(),
        rho_sin,
    );

    let omega_earth_rad_day = std::f64::consts::TAU * 1.002_737_909_35;
    let vel_km_day = Vector3::new(-pos_km.y, pos_km.x, 0.0) * omega_earth_rad_day;

    (pos_km / AU_KM, vel_km_day / AU_KM)
}

/// Stellar aberration: rotates `target_pos` towards the apparent direction
/// implied by `observer_vel` (NAIF `stelab`, unchanged algorithm).
fn stellar_aberration(target_pos: Vector3, observer_vel_au_day: Vector3) -> Vector3 {
    let c_au_day = SPEED_OF_LIGHT_KM_S * 86400.0 / AU_KM;
    let u = target_pos.normalize();
    let vbyc = observer_vel_au_day / c_au_day;
    if vbyc.dot(&vbyc) >= 1.0 {
        return target_pos;
    }
    let h = u.cross(&vbyc);
    let sin_phi = h.norm();
    if sin_phi <= f64::EPSILON {
        return target_pos;
    }
    let phi = sin_phi.asin();
    rotate_vector(&target_pos, &h, phi)
}

/// Gravitational light deflection by the Sun, the classical PPN formula
/// `dxi = 2 GM / (c^2 r) . f(e, q, p)` (SOFA's `iauLd` shape): `target_pos`
/// is the observer-to-body vector (AU), `observer_pos_wrt_sun` is the
/// Sun-to-observer vector (AU).
fn gravitational_deflection(target_pos: Vector3, observer_pos_wrt_sun: Vector3) -> Vector3 {
    use crate::constants::GAUSS_GM_SUN_AU3_DAY2;

    let em = observer_pos_wrt_sun.norm();
    let p_dist = target_pos.norm();
    if em < f64::EPSILON || p_dist < f64::EPSILON {
        return target_pos;
    }
    let e_hat = observer_pos_wrt_sun / em;
    let p_hat = target_pos / p_dist;

    let sun_to_target = observer_pos_wrt_sun + target_pos;
    let q_dist = sun_to_target.norm();
    if q_dist < f64::EPSILON {
        return target_pos;
    }
    let q_hat = sun_to_target / q_dist;

    let c_au_day = SPEED_OF_LIGHT_KM_S * 86400.0 / AU_KM;
    let denom = 1.0 + q_hat.dot(&e_hat);
    if denom.abs() < 1e-12 {
        return target_pos;
    }

    let factor = 2.0 * GAUSS_GM_SUN_AU3_DAY2 / (c_au_day * c_au_day * em * denom);
    let correction = factor * (p_hat.dot(&q_hat) * e_hat - e_hat.dot(&p_hat) * q_hat);
    target_pos + correction * p_dist
}

/// Runs the full eight-step pipeline. `target_at` re-evaluates the
/// target's heliocentric ecliptic J2000 state at an arbitrary `jd_tt`,
/// for the light-time iteration in step 3; callers thread this back into
/// whichever [`crate::ephemeris::PositionSource`] resolved the initial
/// state.
pub fn apparent_position<F>(
    jd_tt: f64,
    jd_ut1: f64,
    earth: HelioState,
    target_initial: HelioState,
    target_at: F,
    config: &PipelineConfig,
) -> Result<ApparentPosition, EngineError>
where
    F: Fn(f64) -> Result<HelioState, EngineError>,
{
    let t = centuries(jd_tt);
    let eps0 = mean_obliquity_rad(0.0, config.obliquity_model);

    // Step 1: heliocentric J2000 states are the inputs; rotate ecliptic
    // -> equatorial J2000 so precession/nutation/bias compose naturally.
    let earth_pos_eq = ecliptic_to_equatorial_j2000(earth.pos_au, eps0);
    let earth_vel_eq = ecliptic_to_equatorial_j2000(earth.vel_au_day, eps0);

    let nut = nutation(t, config.nutation_model).map_err(|source| EngineError::Nutation {
        action: "computing true-of-date nutation for the pipeline",
        source,
    })?;
    let eps_mean = mean_obliquity_rad(t, config.obliquity_model);
    let gast = if config.observer.is_some() {
        gast_deg(jd_ut1, config.sidereal_time_model, &nut, true_obliquity_rad(t, config.obliquity_model, &nut)).to_radians()
    } else {
        0.0
    };

    let mut observer_pos_eq = Vector3::zeros();
    let mut observer_vel_eq = Vector3::zeros();
    if let Some(observer) = &config.observer {
        let (pos, vel) = observer_geocentric(observer, gast);
        observer_pos_eq = pos;
        observer_vel_eq = vel;
    }

    // Step 2: topocentric subtract (no-op geocentrically: pos/vel are zero).
    let observer_wrt_sun = earth_pos_eq + observer_pos_eq;
    let observer_vel_wrt_sun = earth_vel_eq + observer_vel_eq;

    // Step 3: light-time iteration, barycentric-frame per the invariant
    // that light-time always precedes frame transforms.
    let mut dt_days = 0.0;
    let mut target = target_initial;
    for _ in 0..LIGHT_TIME_MAX_ITER {
        let target_pos_eq = ecliptic_to_equatorial_j2000(target.pos_au, eps0);
        let geocentric = target_pos_eq - observer_wrt_sun;
        let light_dist_au = geocentric.norm();
        let c_au_day = SPEED_OF_LIGHT_KM_S * 86400.0 / AU_KM;
        let dt_new = light_dist_au / c_au_day;
        if (dt_new - dt_days).abs() < LIGHT_TIME_CONVERGENCE_DAYS {
            dt_days = dt_new;
            break;
        }
        dt_days = dt_new;
        target = target_at(jd_tt - dt_days)?;
    }

    let target_pos_eq = ecliptic_to_equatorial_j2000(target.pos_au, eps0);
    let target_vel_eq = ecliptic_to_equatorial_j2000(target.vel_au_day, eps0);
    let mut geocentric_pos = target_pos_eq - observer_wrt_sun;
    let geocentric_vel = target_vel_eq - observer_vel_wrt_sun;

    // Step 4: aberration.
    if !config.flags.contains(PipelineFlags::NOABERR) {
        geocentric_pos = stellar_aberration(geocentric_pos, observer_vel_wrt_sun);
    }

    // Step 5: gravitational deflection (Sun only).
    if !config.flags.contains(PipelineFlags::NOGDEFL) {
        geocentric_pos = gravitational_deflection(geocentric_pos, observer_wrt_sun);
    }

    // Step 6: frame transforms, J2000 -> mean equator of date -> true
    // equator of date -> (optionally) ecliptic of date.
    let precession = precession_dcm(t, config.precession_model).map_err(|source| EngineError::Precession {
        action: "rotating into the mean equator of date",
        source,
    })?;
    let bias = frame_bias_dcm();
    let nutation_dcm = Dcm::r1(nut.deps_rad) * Dcm::r3(nut.dpsi_rad) * Dcm::r1(-eps_mean);
    let to_true_of_date = nutation_dcm * precession * bias;

    let mut pos_true_of_date = to_true_of_date * geocentric_pos;
    let mut vel_true_of_date = to_true_of_date * geocentric_vel;

    let eps_true = true_obliquity_rad(t, config.obliquity_model, &nut);
    if config.flags.contains(PipelineFlags::ECLIPTIC_OF_DATE) || !matches!(config.sidereal, SiderealProjection::Tropical) {
        pos_true_of_date = equatorial_to_ecliptic(pos_true_of_date, eps_true);
        vel_true_of_date = equatorial_to_ecliptic(vel_true_of_date, eps_true);
    }

    // Step 7: sidereal-mode projection.
    let (mut pos_final, mut vel_final) = (pos_true_of_date, vel_true_of_date);
    if let SiderealProjection::SolarSystemPlane = config.sidereal {
        const SSY_INCL_DEG: f64 = 1.578_701;
        const SSY_NODE_DEG: f64 = 107.589;
        let dcm = Dcm::r3(-SSY_NODE_DEG.to_radians()) * Dcm::r1(-SSY_INCL_DEG.to_radians()) * Dcm::r3(SSY_NODE_DEG.to_radians());
        pos_final = dcm * pos_final;
        vel_final = dcm * vel_final;
    } else if let SiderealProjection::EclT0(mode) = config.sidereal {
        let entry = crate::constants::ayanamsa::entry(mode);
        let t0 = centuries(entry.t0);
        let prec_to_t0 = precession_dcm(t0, config.precession_model)
            .map_err(|source| EngineError::Precession {
                action: "rotating into the reference-epoch ecliptic for ECL_T0",
                source,
            })?
            .transpose()
            * precession;
        pos_final = prec_to_t0 * pos_final;
        vel_final = prec_to_t0 * vel_final;
    }

    let (lon, lat, dist, lon_spd, lat_spd, dist_spd) = cart_to_polar_speed(pos_final, vel_final);
    let mut lon_deg = lon.to_degrees();
    let lon_spd_deg = lon_spd.to_degrees();

    match config.sidereal {
        SiderealProjection::Default(mode) | SiderealProjection::EclDate(mode) => {
            let ayan = ayanamsa_deg(jd_tt, mode, config.precession_model)?;
            lon_deg = crate::math::angles::deg_norm(lon_deg - ayan);
        }
        _ => {}
    }

    Ok(ApparentPosition {
        lon_deg,
        lat_deg: lat.to_degrees(),
        dist_au: dist,
        lon_spd_deg_day: lon_spd_deg,
        lat_spd_deg_day: lat_spd.to_degrees(),
        dist_spd_au_day: dist_spd,
    })
}

/// Ayanamsa at `jd_tt` for `mode`: the reference point's precession since
/// `t0` plus the mode's `ayan_t0` offset.
pub fn ayanamsa_deg(jd_tt: f64, mode: crate::constants::ayanamsa::SiderealMode, model: PrecessionModel) -> Result<f64, EngineError> {
    let entry = crate::constants::ayanamsa::entry(mode);
    let t0 = centuries(entry.t0);
    let t = centuries(jd_tt);
    let precession_since_t0 = precession_dcm(t, model)
        .map_err(|source| EngineError::Precession {
            action: "computing ayanamsa precession offset",
            source,
        })?
        .transpose()
        * precession_dcm(t0, model).map_err(|source| EngineError::Precession {
            action: "computing ayanamsa reference epoch rotation",
            source,
        })?;

    // Amount by which the vernal-equinox direction has precessed since t0,
    // read off the rotation's effect on the X axis.
    let x0 = Vector3::new(1.0, 0.0, 0.0);
    let rotated = precession_since_t0 * x0;
    let prec_offset_deg = rotated.y.atan2(rotated.x).to_degrees();

    Ok(crate::math::angles::deg_norm(entry.ayan_t0 + prec_offset_deg))
}

#[cfg(test)]
mod pipeline_ut {
    use super::*;
    use crate::constants::celestial_objects;

    fn sun_like_earth_state(jd_tt: f64) -> HelioState {
        let t = centuries(jd_tt);
        let lon = (100.46 + 35999.37 * t).to_radians();
        HelioState::new(
            crate::math::angles::polar_to_cart(lon, 0.0, 1.0),
            Vector3::new(-lon.sin(), lon.cos(), 0.0) * 0.0172,
        )
    }

    #[test]
    fn geocentric_sun_is_about_one_au_away() {
        let jd_tt = crate::constants::J2000_JD;
        let earth = sun_like_earth_state(jd_tt);
        let sun = HelioState::new(Vector3::zeros(), Vector3::zeros());
        let config = PipelineConfig::default();
        let result = apparent_position(
            jd_tt,
            jd_tt,
            earth,
            sun,
            |_| Ok(HelioState::new(Vector3::zeros(), Vector3::zeros())),
            &config,
        )
        .unwrap();
        assert!((0.9..1.1).contains(&result.dist_au));
        let _ = celestial_objects::SUN;
    }

    #[test]
    fn ayanamsa_is_small_and_positive_near_j2000() {
        let deg = ayanamsa_deg(
            crate::constants::J2000_JD,
            crate::constants::ayanamsa::SiderealMode::Lahiri,
            PrecessionModel::Iau2006,
        )
        .unwrap();
        assert!((15.0..30.0).contains(&deg), "lahiri={deg}");
    }
}
