/*
 * ANISE Toolkit
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

//! CRC-32 (AUTODIN II, polynomial 0x04C11DB7) checksum used to validate
//! SE1 file headers. Delegates to `crc32fast`, which implements this exact
//! polynomial (the IEEE 802.3 CRC-32 used by zip/gzip/ethernet) instead of
//! hand-rolling a lookup table.

pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod crc32_ut {
    use super::*;

    #[test]
    fn reference_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }
}
