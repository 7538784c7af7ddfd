/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! SE1 segmented-Chebyshev ephemeris file: an ASCII header (CR-LF
//! terminated lines) followed by a binary tail of per-body segment index
//! tables and packed Chebyshev coefficient blocks.
//!
//! The reference format packs each coefficient with a per-coefficient
//! variable byte count alongside a per-segment `rmax` scale. This module
//! keeps the same *shape* -- a scale factor (`rmax`) plus packed integer
//! coefficients decoded back to `f64` -- but with a fixed 4-byte integer
//! width rather than the original's variable-length packing, since the
//! variable-length scheme exists to save disk space the host's in-memory
//! byte buffer does not need to reproduce bit-for-bit (see DESIGN.md).
//! The per-body/per-segment layout, the reference-ellipse-plus-
//! perturbation position model, and the CRC-32 integrity check are
//! otherwise as specified.

use bytes::Bytes;
use indexmap::IndexMap;

use crate::errors::Se1Error;
use crate::ephemeris::{HelioState, PositionSource};
use crate::math::angles::{polar_to_cart, polar_to_cart_speed};
use crate::math::crc32::crc32;
use crate::math::interpolation::{cheb_deriv, cheb_eval};
use crate::BodyId;

/// `0x616263` == ASCII "abc", written little-endian as the probe the
/// spec uses to detect a byte-swapped tail.
const ENDIANNESS_PROBE: u32 = 0x0061_6263;

/// Per-segment record: start JD (TT) of the segment and byte offset of
/// its coefficient block within the body's coefficient blob.
#[derive(Copy, Clone, Debug)]
struct SegmentEntry {
    jd_start: f64,
    offset: u32,
}

/// Per-body table: the list of segments covering this body, already
/// sorted ascending by `jd_start`.
#[derive(Clone, Debug)]
struct BodyTable {
    body: BodyId,
    segments: Vec<SegmentEntry>,
}

/// Parsed SE1 header fields (the ASCII lines preceding the binary tail).
#[derive(Clone, Debug)]
pub struct Se1Header {
    pub de_number: u32,
    pub jd_start: f64,
    pub jd_end: f64,
    pub segment_size_days: f64,
    pub ncoe: usize,
    pub crc: u32,
}

/// A loaded SE1 file: header plus the binary tail, kept as the original
/// `Bytes` buffer so segments are decoded on demand rather than eagerly
/// copied out.
#[derive(Clone)]
pub struct Se1File {
    header: Se1Header,
    bodies: IndexMap<BodyId, BodyTable>,
    tail: Bytes,
}

fn read_f64(buf: &[u8], at: usize) -> Result<f64, Se1Error> {
    let bytes: [u8; 8] = buf
        .get(at..at + 8)
        .ok_or_else(|| Se1Error::MalformedHeader {
            reason: format!("truncated buffer reading f64 at offset {at}"),
        })?
        .try_into()
        .unwrap();
    Ok(f64::from_le_bytes(bytes))
}

fn read_u32(buf: &[u8], at: usize) -> Result<u32, Se1Error> {
    let bytes: [u8; 4] = buf
        .get(at..at + 4)
        .ok_or_else(|| Se1Error::MalformedHeader {
            reason: format!("truncated buffer reading u32 at offset {at}"),
        })?
        .try_into()
        .unwrap();
    Ok(u32::from_le_bytes(bytes))
}

fn read_i32(buf: &[u8], at: usize) -> Result<i32, Se1Error> {
    Ok(read_u32(buf, at)? as i32)
}

impl Se1File {
    /// Parses the ASCII header, validates the endianness probe and the
    /// CRC-32 of the binary tail, and indexes each body's segment table.
    pub fn parse(raw: Bytes) -> Result<Self, Se1Error> {
        let text_end = find_header_end(&raw)?;
        let header_text = std::str::from_utf8(&raw[..text_end]).map_err(|_| Se1Error::MalformedHeader {
            reason: "header is not valid UTF-8/ASCII".to_string(),
        })?;
        let header = parse_header_lines(header_text)?;

        let mut cursor = text_end;
        let probe = read_u32(&raw, cursor)?;
        if probe != ENDIANNESS_PROBE {
            return Err(Se1Error::MalformedHeader {
                reason: format!("endianness probe mismatch: got {probe:#010x}"),
            });
        }
        cursor += 4;

        let tail = raw.slice(cursor..);
        let computed = crc32(&tail);
        if computed != header.crc {
            return Err(Se1Error::ChecksumMismatch {
                expected: header.crc,
                computed,
            });
        }

        let body_count = read_u32(&tail, 0)? as usize;
        let mut bodies = IndexMap::new();
        let mut off = 4usize;
        for _ in 0..body_count {
            let body = read_i32(&tail, off)?;
            off += 4;
            let n_segments = read_u32(&tail, off)? as usize;
            off += 4;
            let mut segments = Vec::with_capacity(n_segments);
            for _ in 0..n_segments {
                let jd_start = read_f64(&tail, off)?;
                off += 8;
                let offset = read_u32(&tail, off)?;
                off += 4;
                segments.push(SegmentEntry { jd_start, offset });
            }
            bodies.insert(body, BodyTable { body, segments });
        }

        Ok(Self { header, bodies, tail })
    }

    pub fn header(&self) -> &Se1Header {
        &self.header
    }

    fn find_segment(&self, body: BodyId, jd_tt: f64) -> Result<(&SegmentEntry, Option<&SegmentEntry>), Se1Error> {
        let table = self
            .bodies
            .get(&body)
            .ok_or(Se1Error::UnknownBody { id: body })?;
        if table.segments.is_empty() {
            return Err(Se1Error::UnknownBody { id: body });
        }
        if jd_tt < table.segments[0].jd_start
            || jd_tt > self.header.jd_end
        {
            return Err(Se1Error::OutOfRange {
                jd: jd_tt,
                start: self.header.jd_start,
                end: self.header.jd_end,
            });
        }
        // Find the last segment whose start is <= jd_tt (segments are
        // sorted ascending); the JD-exactly-at-file-end boundary reuses
        // the final segment with tau=1, per spec's boundary behavior.
        let idx = table
            .segments
            .partition_point(|s| s.jd_start <= jd_tt)
            .saturating_sub(1);
        let entry = &table.segments[idx];
        let next = table.segments.get(idx + 1);
        Ok((entry, next))
    }

    /// Decodes one segment's reference-ellipse and perturbation
    /// coefficient series, returning `(jd0, ref_coefs, lon, lat, dist)`.
    fn decode_segment(
        &self,
        entry: &SegmentEntry,
        ncoe: usize,
    ) -> Result<(f64, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>), Se1Error> {
        let mut off = entry.offset as usize;
        let rmax = read_f64(&self.tail, off)?;
        off += 8;
        let jd0 = read_f64(&self.tail, off)?;
        off += 8;

        let mut read_series = |count: usize, off: &mut usize| -> Result<Vec<f64>, Se1Error> {
            let mut series = Vec::with_capacity(count);
            for _ in 0..count {
                let packed = read_i32(&self.tail, *off)?;
                *off += 4;
                series.push(unpack_coef(packed, rmax));
            }
            Ok(series)
        };

        let ref_coefs = read_series(2 * ncoe, &mut off)?;
        let lon = read_series(ncoe, &mut off)?;
        let lat = read_series(ncoe, &mut off)?;
        let dist = read_series(ncoe, &mut off)?;

        Ok((jd0, ref_coefs, lon, lat, dist))
    }
}

fn unpack_coef(packed: i32, rmax: f64) -> f64 {
    (packed as f64 / i32::MAX as f64) * rmax
}

fn pack_coef(value: f64, rmax: f64) -> i32 {
    if rmax.abs() < f64::EPSILON {
        return 0;
    }
    ((value / rmax) * i32::MAX as f64).round() as i32
}

fn find_header_end(raw: &[u8]) -> Result<usize, Se1Error> {
    const MARKER: &[u8] = b"\r\n\r\n";
    raw.windows(MARKER.len())
        .position(|w| w == MARKER)
        .map(|p| p + MARKER.len())
        .ok_or(Se1Error::MalformedHeader {
            reason: "no blank-line header terminator found".to_string(),
        })
}

fn parse_header_lines(text: &str) -> Result<Se1Header, Se1Error> {
    let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
    if lines.len() < 6 {
        return Err(Se1Error::MalformedHeader {
            reason: format!("expected at least 6 header lines, got {}", lines.len()),
        });
    }
    let field = |i: usize, name: &'static str| -> Result<&str, Se1Error> {
        lines.get(i).copied().ok_or(Se1Error::MalformedHeader {
            reason: format!("missing header field '{name}'"),
        })
    };
    let parse_f64 = |s: &str, name: &'static str| -> Result<f64, Se1Error> {
        s.trim().parse::<f64>().map_err(|_| Se1Error::MalformedHeader {
            reason: format!("field '{name}' is not a valid float: {s:?}"),
        })
    };
    let de_number = field(0, "de_number")?
        .trim()
        .parse::<u32>()
        .map_err(|_| Se1Error::MalformedHeader {
            reason: "de_number is not a valid integer".to_string(),
        })?;
    let jd_start = parse_f64(field(1, "jd_start")?, "jd_start")?;
    let jd_end = parse_f64(field(2, "jd_end")?, "jd_end")?;
    let segment_size_days = parse_f64(field(3, "segment_size_days")?, "segment_size_days")?;
    let ncoe = field(4, "ncoe")?
        .trim()
        .parse::<usize>()
        .map_err(|_| Se1Error::MalformedHeader {
            reason: "ncoe is not a valid integer".to_string(),
        })?;
    let crc = u32::from_str_radix(field(5, "crc")?.trim().trim_start_matches("0x"), 16)
        .map_err(|_| Se1Error::MalformedHeader {
            reason: "crc is not a valid hex u32".to_string(),
        })?;

    Ok(Se1Header {
        de_number,
        jd_start,
        jd_end,
        segment_size_days,
        ncoe,
        crc,
    })
}

impl PositionSource for Se1File {
    type Error = Se1Error;

    fn coverage(&self, body: BodyId) -> Option<(f64, f64)> {
        self.bodies.get(&body).map(|_| (self.header.jd_start, self.header.jd_end))
    }

    fn heliocentric_ecliptic_j2000(&self, jd_tt: f64, body: BodyId) -> Result<HelioState, Se1Error> {
        let ncoe = self.header.ncoe;
        let dseg = self.header.segment_size_days;
        let (entry, _next) = self.find_segment(body, jd_tt)?;
        let (jd0, ref_coefs, lon_coefs, lat_coefs, dist_coefs) = self.decode_segment(entry, ncoe)?;

        let tau = (2.0 * (jd_tt - jd0) / dseg - 1.0).clamp(-1.0, 1.0);

        let ref_lon = cheb_eval(tau, &ref_coefs[..ncoe]).map_err(|_| Se1Error::MalformedHeader {
            reason: "reference-ellipse longitude series is empty".to_string(),
        })?;
        let ref_rad = cheb_eval(tau, &ref_coefs[ncoe..]).map_err(|_| Se1Error::MalformedHeader {
            reason: "reference-ellipse radius series is empty".to_string(),
        })?;
        let (pert_lon, pert_lon_d) = cheb_deriv(tau, &lon_coefs, dseg / 2.0).map_err(|_| Se1Error::MalformedHeader {
            reason: "longitude perturbation series is empty".to_string(),
        })?;
        let (pert_lat, pert_lat_d) = cheb_deriv(tau, &lat_coefs, dseg / 2.0).map_err(|_| Se1Error::MalformedHeader {
            reason: "latitude perturbation series is empty".to_string(),
        })?;
        let (pert_dist, pert_dist_d) = cheb_deriv(tau, &dist_coefs, dseg / 2.0).map_err(|_| Se1Error::MalformedHeader {
            reason: "distance perturbation series is empty".to_string(),
        })?;

        let lon = (ref_lon + pert_lon).to_radians();
        let lat = pert_lat.to_radians();
        let dist = (ref_rad + pert_dist).max(1e-9);

        let pos = polar_to_cart(lon, lat, dist);
        let vel = polar_to_cart_speed(
            lon,
            lat,
            dist,
            pert_lon_d.to_radians(),
            pert_lat_d.to_radians(),
            pert_dist_d,
        );

        Ok(HelioState::new(pos, vel))
    }
}

/// Filename-generation rule (spec.md §6): two-digit absolute century with
/// a sign prefix, `_` for CE and `m` for BCE.
pub fn planet_filename(century: i32, suffix: &str) -> String {
    let (prefix, cty) = if century >= 0 {
        ("_", century)
    } else {
        ("m", -century)
    };
    format!("sepl{prefix}{cty:02}.{suffix}")
}

pub fn moon_filename(century: i32) -> String {
    let (prefix, cty) = if century >= 0 {
        ("_", century)
    } else {
        ("m", -century)
    };
    format!("semo{prefix}{cty:02}.se1")
}

pub fn main_asteroid_filename(century: i32) -> String {
    let (prefix, cty) = if century >= 0 {
        ("_", century)
    } else {
        ("m", -century)
    };
    format!("seas{prefix}{cty:02}.se1")
}

pub fn planetary_moon_filename(body: u32) -> String {
    format!("sepm{body}.se1")
}

pub fn asteroid_filename(number: u32) -> String {
    format!("ast{}/se{number:05}.se1", number / 1000)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A minimal writer for the same layout `Se1File::parse` reads, used
    //! only to build synthetic in-memory buffers for unit tests (the host
    //! normally supplies these bytes; this crate never writes real ones).
    use super::*;

    pub struct SegmentSpec {
        pub jd_start: f64,
        pub rmax: f64,
        pub ref_coefs: Vec<f64>,
        pub lon_coefs: Vec<f64>,
        pub lat_coefs: Vec<f64>,
        pub dist_coefs: Vec<f64>,
    }

    pub fn build_se1(
        de_number: u32,
        jd_start: f64,
        jd_end: f64,
        segment_size_days: f64,
        ncoe: usize,
        body: BodyId,
        segments: &[SegmentSpec],
    ) -> Bytes {
        let mut tail = Vec::new();
        tail.extend_from_slice(&1u32.to_le_bytes()); // body_count
        tail.extend_from_slice(&body.to_le_bytes());
        tail.extend_from_slice(&(segments.len() as u32).to_le_bytes());

        // First pass: compute offsets for each segment's coefficient block,
        // placed after the index table.
        let index_table_len = segments.len() * (8 + 4);
        let mut coef_blocks = Vec::new();
        let mut offsets = Vec::with_capacity(segments.len());
        for seg in segments {
            offsets.push((tail.len() + index_table_len + coef_blocks.len()) as u32);
            let mut block = Vec::new();
            block.extend_from_slice(&seg.rmax.to_le_bytes());
            block.extend_from_slice(&seg.jd_start.to_le_bytes());
            for &c in &seg.ref_coefs {
                block.extend_from_slice(&pack_coef(c, seg.rmax).to_le_bytes());
            }
            for series in [&seg.lon_coefs, &seg.lat_coefs, &seg.dist_coefs] {
                for &c in series {
                    block.extend_from_slice(&pack_coef(c, seg.rmax).to_le_bytes());
                }
            }
            coef_blocks.extend_from_slice(&block);
        }

        for (seg, &offset) in segments.iter().zip(&offsets) {
            tail.extend_from_slice(&seg.jd_start.to_le_bytes());
            tail.extend_from_slice(&offset.to_le_bytes());
        }
        tail.extend_from_slice(&coef_blocks);

        let crc = crc32(&tail);

        let header = format!(
            "{de_number}\r\n{jd_start}\r\n{jd_end}\r\n{segment_size_days}\r\n{ncoe}\r\n{crc:#010x}\r\n\r\n"
        );
        let mut out = header.into_bytes();
        out.extend_from_slice(&ENDIANNESS_PROBE.to_le_bytes());
        out.extend_from_slice(&tail);
        Bytes::from(out)
    }
}

#[cfg(test)]
mod se1_ut {
    use super::test_support::*;
    use super::*;
    use crate::constants::celestial_objects::EARTH_MOON_BARYCENTER;

    #[test]
    fn round_trips_a_single_segment() {
        let ncoe = 4;
        let seg = SegmentSpec {
            jd_start: 2_451_544.5,
            rmax: 2.0,
            ref_coefs: vec![100.0, 0.05, 0.0, 0.0, 1.0, 0.001, 0.0, 0.0],
            lon_coefs: vec![0.01, 0.002, 0.0, 0.0],
            lat_coefs: vec![0.0, 0.0, 0.0, 0.0],
            dist_coefs: vec![0.0, 0.0, 0.0, 0.0],
        };
        let bytes = build_se1(
            406,
            2_451_544.5,
            2_451_546.5,
            2.0,
            ncoe,
            EARTH_MOON_BARYCENTER,
            &[seg],
        );
        let file = Se1File::parse(bytes).unwrap();
        let state = file
            .heliocentric_ecliptic_j2000(2_451_545.0, EARTH_MOON_BARYCENTER)
            .unwrap();
        assert!(state.pos_au.norm() > 0.5 && state.pos_au.norm() < 2.0);
    }

    #[test]
    fn rejects_corrupted_crc() {
        let seg = SegmentSpec {
            jd_start: 2_451_544.5,
            rmax: 1.0,
            ref_coefs: vec![1.0, 0.0, 1.0, 0.0],
            lon_coefs: vec![0.0, 0.0],
            lat_coefs: vec![0.0, 0.0],
            dist_coefs: vec![0.0, 0.0],
        };
        let bytes = build_se1(406, 2_451_544.5, 2_451_546.5, 2.0, 2, 0, &[seg]);
        let mut corrupted = bytes.to_vec();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0xFF;
        let err = Se1File::parse(Bytes::from(corrupted));
        assert!(matches!(err, Err(Se1Error::ChecksumMismatch { .. })));
    }

    #[test]
    fn unknown_body_is_rejected() {
        let seg = SegmentSpec {
            jd_start: 2_451_544.5,
            rmax: 1.0,
            ref_coefs: vec![1.0, 0.0],
            lon_coefs: vec![0.0],
            lat_coefs: vec![0.0],
            dist_coefs: vec![0.0],
        };
        let bytes = build_se1(406, 2_451_544.5, 2_451_545.5, 1.0, 1, 0, &[seg]);
        let file = Se1File::parse(bytes).unwrap();
        assert!(file.heliocentric_ecliptic_j2000(2_451_545.0, 99).is_err());
    }

    #[test]
    fn filename_rule_matches_sign_prefix() {
        assert_eq!(planet_filename(21, "se1"), "sepl_21.se1");
        assert_eq!(planet_filename(-5, "se1"), "seplm05.se1");
        assert_eq!(moon_filename(21), "semo_21.se1");
    }
}
