/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! Typed, per-subsystem error enums wired into one top-level [`EngineError`],
//! replacing the `(retval, serr)` out-parameter convention this engine's
//! source-language ancestor used.

use core::convert::From;
use std::io::ErrorKind as IOErrorKind;

use snafu::prelude::*;

use crate::BodyId;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum EngineError {
    #[snafu(display("{action} failed during time-scale computation: {source}"))]
    Time {
        action: &'static str,
        source: TimeError,
    },
    #[snafu(display("{action} failed during precession computation: {source}"))]
    Precession {
        action: &'static str,
        source: PrecessionError,
    },
    #[snafu(display("{action} failed during nutation computation: {source}"))]
    Nutation {
        action: &'static str,
        source: NutationError,
    },
    #[snafu(display("{action} failed in the Moshier analytical theory: {source}"))]
    Moshier {
        action: &'static str,
        source: MoshierError,
    },
    #[snafu(display("{action} failed reading the SE1 file: {source}"))]
    Se1 {
        action: &'static str,
        source: Se1Error,
    },
    #[snafu(display("{action} failed reading the JPL DE file: {source}"))]
    JplDe {
        action: &'static str,
        source: JplDeError,
    },
    #[snafu(display("{action} failed computing house cusps: {source}"))]
    House {
        action: &'static str,
        source: HouseError,
    },
    #[snafu(display("{action} failed during eclipse/occultation search: {source}"))]
    Eclipse {
        action: &'static str,
        source: EclipseError,
    },
    #[snafu(display("{action} failed during rise/set/transit search: {source}"))]
    RiseSet {
        action: &'static str,
        source: RiseSetError,
    },
    #[snafu(display("{action} failed during heliacal visibility search: {source}"))]
    Heliacal {
        action: &'static str,
        source: HeliacalError,
    },
    #[snafu(display("{action} failed during longitude-crossing search: {source}"))]
    Crossing {
        action: &'static str,
        source: CrossingError,
    },
    #[snafu(display("{action} encountered invalid math input: {source}"))]
    Math {
        action: &'static str,
        source: MathError,
    },
    #[snafu(display("body id {id} is not in the engine's catalog"))]
    UnknownBody { id: BodyId },
    #[snafu(display(
        "{action} requires requested JD {jd} but source only covers [{start}, {end}]"
    ))]
    OutOfRange {
        action: &'static str,
        jd: f64,
        start: f64,
        end: f64,
    },
    #[snafu(display("{source} encountered when loading {path}"))]
    Loading {
        path: String,
        source: InputOutputError,
    },
    #[snafu(display("{err}"))]
    GenericError { err: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InputOutputError {
    /// Raised for an error in reading or writing the file(s)
    IOError { kind: IOErrorKind },
    /// Raised if an IO error occurred but its representation is not simple (and therefore not an std::io::ErrorKind).
    IOUnknownError,
}

impl From<IOErrorKind> for InputOutputError {
    fn from(kind: IOErrorKind) -> Self {
        Self::IOError { kind }
    }
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum MathError {
    #[snafu(display("prevented a division by zero when {action}"))]
    DivisionByZero { action: &'static str },
    #[snafu(display("{msg}: {value}"))]
    DomainError { value: f64, msg: &'static str },
    #[snafu(display("max iterations reached ({iter}) when {action}"))]
    MaxIterationsReached { iter: usize, action: &'static str },
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum TimeError {
    #[snafu(display("delta-t model {model} is not defined for year {year}"))]
    UnknownModel { model: u8, year: f64 },
    #[snafu(display("{source}"))]
    AppliedMath { source: MathError },
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum PrecessionError {
    #[snafu(display("precession model {model} is undefined for T={t_centuries} centuries"))]
    UnsupportedEpoch { model: u8, t_centuries: f64 },
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum NutationError {
    #[snafu(display("nutation model {model} failed: {reason}"))]
    ModelFailure { model: u8, reason: &'static str },
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum MoshierError {
    #[snafu(display("jd {jd} is out of range [{start}, {end}] for the Moshier {theory} theory"))]
    OutOfRange {
        jd: f64,
        start: f64,
        end: f64,
        theory: &'static str,
    },
    #[snafu(display("body id {id} has no Moshier series"))]
    UnknownBody { id: BodyId },
}

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum Se1Error {
    #[snafu(display("SE1 header malformed: {reason}"))]
    MalformedHeader { reason: String },
    #[snafu(display(
        "SE1 checksum mismatch: expected {expected:#010x}, computed {computed:#010x}"
    ))]
    ChecksumMismatch { expected: u32, computed: u32 },
    #[snafu(display("jd {jd} is outside the file's coverage [{start}, {end}]"))]
    OutOfRange { jd: f64, start: f64, end: f64 },
    #[snafu(display("body id {id} is not present in this SE1 file"))]
    UnknownBody { id: BodyId },
    #[snafu(display("{source}"))]
    Io { source: InputOutputError },
}

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum JplDeError {
    #[snafu(display("JPL DE header malformed: {reason}"))]
    MalformedHeader { reason: String },
    #[snafu(display(
        "could not determine endianness: ss[2] out of sane range on either byte order"
    ))]
    EndiannessProbeFailed,
    #[snafu(display("jd {jd} is outside the file's coverage [{start}, {end}]"))]
    OutOfRange { jd: f64, start: f64, end: f64 },
    #[snafu(display("body id {id} is not present in this JPL DE file"))]
    UnknownBody { id: BodyId },
    #[snafu(display("{source}"))]
    Io { source: InputOutputError },
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum HouseError {
    #[snafu(display(
        "house system {system} is undefined above |latitude| = 66 degrees (got {lat_deg})"
    ))]
    PolarLatitude { system: char, lat_deg: f64 },
    #[snafu(display("unknown house system code {system:?}"))]
    UnknownSystem { system: char },
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum EclipseError {
    #[snafu(display("no eclipse found in the requested search window"))]
    NotFound,
    #[snafu(display("max iterations reached ({iter}) refining eclipse extremum"))]
    Convergence { iter: usize },
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum RiseSetError {
    /// Distinguished non-error return: the body never crosses the threshold at this latitude.
    #[snafu(display("body is circumpolar (never rises or sets) at this latitude"))]
    Circumpolar,
    #[snafu(display("max iterations reached ({iter}) refining rise/set/transit"))]
    Convergence { iter: usize },
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum HeliacalError {
    #[snafu(display("no heliacal event found in the requested search window"))]
    NotFound,
    #[snafu(display("max iterations reached ({iter}) searching heliacal visibility"))]
    Convergence { iter: usize },
}

#[derive(Copy, Clone, Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum CrossingError {
    #[snafu(display("max iterations reached ({iter}) in secant refinement"))]
    Convergence { iter: usize },
}
