// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Galileo broadcast ephemeris: F/NAV (1045) and I/NAV (1046), spec §4.I.
//!
//! Both messages share the same Keplerian/clock layout up to the group
//! delay and health fields, where they diverge: F/NAV carries one group
//! delay (E5a/E1) and a 3-bit E5a health/validity pair; I/NAV carries two
//! group delays (E5a/E1 and E5b/E1) and two 3-bit health/validity pairs
//! (E5b, E1B).

use super::Ephemeris;
use crate::bits::{get_signed, get_unsigned};
use crate::error::FrameError;
use crate::satellite::{System, sat_of};
use crate::time::GpsTime;
use crate::time::consts::GAL_WEEK_TO_GPS_WEEK;

struct CommonFields {
    sat: u16,
    toc_raw: f64,
    af2: f64,
    af1: f64,
    af0: f64,
    iode: i32,
    crs: f64,
    deln: f64,
    m0: f64,
    cuc: f64,
    e: f64,
    cus: f64,
    sqrta: f64,
    toe_raw: f64,
    cic: f64,
    omg0: f64,
    cis: f64,
    i0: f64,
    crc: f64,
    omg: f64,
    omgd: f64,
    idot: f64,
    week: i16,
}

/// The Keplerian/clock portion common to 1045 and 1046, up to (but not
/// including) the group-delay and health fields where the two diverge.
/// Returns the new bit position alongside the parsed fields.
fn decode_common(buf: &[u8]) -> Result<(CommonFields, usize), FrameError> {
    let min_bits = 24 + 12 + 6 + 12 + 10 + 8 + 14 + 14 + 6 + 21 + 31 + 16 + 16 + 32 + 16 + 32 + 16
        + 32 + 14 + 16 + 32 + 16 + 32 + 16 + 32 + 24;
    if buf.len() * 8 < min_bits {
        return Err(FrameError::FramingShort);
    }
    let mut pos = 36;
    let prn = get_unsigned(buf, pos, 6) as u16;
    pos += 6;
    let sat = sat_of(System::Gal, prn);
    if sat == 0 {
        return Err(FrameError::InvalidSatellite);
    }
    let week_gal = get_unsigned(buf, pos, 12) as i16;
    pos += 12;
    let iode = get_unsigned(buf, pos, 10) as i32;
    pos += 10;
    pos += 8; // SISA, not separately modeled
    let idot = get_signed(buf, pos, 14) as f64 * 2f64.powi(-43) * std::f64::consts::PI;
    pos += 14;
    let toc_raw = get_unsigned(buf, pos, 14) as f64 * 60.0;
    pos += 14;
    let af2 = get_signed(buf, pos, 6) as f64 * 2f64.powi(-59);
    pos += 6;
    let af1 = get_signed(buf, pos, 21) as f64 * 2f64.powi(-46);
    pos += 21;
    let af0 = get_signed(buf, pos, 31) as f64 * 2f64.powi(-34);
    pos += 31;
    let crs = get_signed(buf, pos, 16) as f64 * 2f64.powi(-5);
    pos += 16;
    let deln = get_signed(buf, pos, 16) as f64 * 2f64.powi(-43) * std::f64::consts::PI;
    pos += 16;
    let m0 = get_signed(buf, pos, 32) as f64 * 2f64.powi(-31) * std::f64::consts::PI;
    pos += 32;
    let cuc = get_signed(buf, pos, 16) as f64 * 2f64.powi(-29);
    pos += 16;
    let e = get_unsigned(buf, pos, 32) as f64 * 2f64.powi(-33);
    pos += 32;
    let cus = get_signed(buf, pos, 16) as f64 * 2f64.powi(-29);
    pos += 16;
    let sqrta = get_unsigned(buf, pos, 32) as f64 * 2f64.powi(-19);
    pos += 32;
    let toe_raw = get_unsigned(buf, pos, 14) as f64 * 60.0;
    pos += 14;
    let cic = get_signed(buf, pos, 16) as f64 * 2f64.powi(-29);
    pos += 16;
    let omg0 = get_signed(buf, pos, 32) as f64 * 2f64.powi(-31) * std::f64::consts::PI;
    pos += 32;
    let cis = get_signed(buf, pos, 16) as f64 * 2f64.powi(-29);
    pos += 16;
    let i0 = get_signed(buf, pos, 32) as f64 * 2f64.powi(-31) * std::f64::consts::PI;
    pos += 32;
    let crc = get_signed(buf, pos, 16) as f64 * 2f64.powi(-5);
    pos += 16;
    let omg = get_signed(buf, pos, 32) as f64 * 2f64.powi(-31) * std::f64::consts::PI;
    pos += 32;
    let omgd = get_signed(buf, pos, 24) as f64 * 2f64.powi(-43) * std::f64::consts::PI;
    pos += 24;

    Ok((
        CommonFields {
            sat,
            toc_raw,
            af2,
            af1,
            af0,
            iode,
            crs,
            deln,
            m0,
            cuc,
            e,
            cus,
            sqrta,
            toe_raw,
            cic,
            omg0,
            cis,
            i0,
            crc,
            omg,
            omgd,
            idot,
            week: week_gal + GAL_WEEK_TO_GPS_WEEK,
        },
        pos,
    ))
}

fn finish(c: CommonFields, tgd: [f64; 2], svh: u32, code: u8) -> Result<Ephemeris, FrameError> {
    let toe = GpsTime::new(c.week, c.toe_raw).map_err(|_| FrameError::FramingShort)?;
    let toc = GpsTime::new(c.week, c.toc_raw).map_err(|_| FrameError::FramingShort)?;
    Ok(Ephemeris {
        sat: c.sat,
        toe,
        toc,
        iode: c.iode,
        iodc: c.iode,
        sva: 0,
        svh,
        code,
        sqrta: c.sqrta,
        e: c.e,
        i0: c.i0,
        omg0: c.omg0,
        omg: c.omg,
        m0: c.m0,
        deln: c.deln,
        omgd: c.omgd,
        idot: c.idot,
        cuc: c.cuc,
        cus: c.cus,
        crc: c.crc,
        crs: c.crs,
        cic: c.cic,
        cis: c.cis,
        af0: c.af0,
        af1: c.af1,
        af2: c.af2,
        tgd,
    })
}

/// Message 1045: Galileo F/NAV (E5a). `code = 1` per spec §4.I.
pub fn decode_fnav(buf: &[u8]) -> Result<Ephemeris, FrameError> {
    let (common, mut pos) = decode_common(buf)?;
    if buf.len() * 8 < pos + 10 + 2 + 1 {
        return Err(FrameError::FramingShort);
    }
    let bgd_e5a_e1 = get_signed(buf, pos, 10) as f64 * 2f64.powi(-32);
    pos += 10;
    let e5a_hs = get_unsigned(buf, pos, 2);
    pos += 2;
    let e5a_dvs = get_unsigned(buf, pos, 1);
    let svh = (e5a_hs << 4) | (e5a_dvs << 3);
    finish(common, [bgd_e5a_e1, 0.0], svh, 1)
}

/// Message 1046: Galileo I/NAV (E1B/E5b). `code = 0` per spec §4.I.
pub fn decode_inav(buf: &[u8]) -> Result<Ephemeris, FrameError> {
    let (common, mut pos) = decode_common(buf)?;
    if buf.len() * 8 < pos + 10 + 10 + 2 + 1 + 2 + 1 {
        return Err(FrameError::FramingShort);
    }
    let bgd_e5a_e1 = get_signed(buf, pos, 10) as f64 * 2f64.powi(-32);
    pos += 10;
    let bgd_e5b_e1 = get_signed(buf, pos, 10) as f64 * 2f64.powi(-32);
    pos += 10;
    let e5b_hs = get_unsigned(buf, pos, 2);
    pos += 2;
    let e5b_dvs = get_unsigned(buf, pos, 1);
    pos += 1;
    let e1b_hs = get_unsigned(buf, pos, 2);
    pos += 2;
    let e1b_dvs = get_unsigned(buf, pos, 1);
    let svh = (e5b_hs << 7) | (e5b_dvs << 6) | (e1b_hs << 1) | e1b_dvs;
    finish(common, [bgd_e5a_e1, bgd_e5b_e1], svh, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_unsigned(buf: &mut [u8], pos: usize, len: u32, value: u64) {
        for i in 0..len as usize {
            let bit_index = pos + i;
            let bit = (value >> (len as usize - 1 - i)) & 1;
            let byte_index = bit_index / 8;
            let shift = 7 - (bit_index % 8);
            if bit != 0 {
                buf[byte_index] |= 1 << shift;
            } else {
                buf[byte_index] &= !(1 << shift);
            }
        }
    }

    #[test]
    fn fnav_week_offset_by_1024() {
        let total_bits = 24 + 12 + 6 + 12 + 10 + 8 + 14 + 14 + 6 + 21 + 31 + 16 + 16 + 32 + 16
            + 32 + 16 + 32 + 14 + 16 + 32 + 16 + 32 + 16 + 32 + 24 + 10 + 2 + 1;
        let mut buf = vec![0u8; total_bits.div_ceil(8)];
        set_unsigned(&mut buf, 24, 12, 1045);
        set_unsigned(&mut buf, 36, 6, 11); // PRN
        set_unsigned(&mut buf, 42, 12, 500); // GAL week
        // e5a_hs (2 bits) and e5a_dvs (1 bit) sit right after the 10-bit
        // BGD, at the very end of the frame.
        let svh_pos = total_bits - 2 - 1;
        set_unsigned(&mut buf, svh_pos, 2, 2); // e5a_hs = 0b10
        set_unsigned(&mut buf, svh_pos + 2, 1, 1); // e5a_dvs = 1
        let eph = decode_fnav(&buf).unwrap();
        assert_eq!(eph.sat, sat_of(System::Gal, 11));
        assert_eq!(eph.toe.wn(), 500 + GAL_WEEK_TO_GPS_WEEK);
        assert_eq!(eph.code, 1);
        // spec.md: SVH = (E5a_hs<<4)|(E5a_dvs<<3)
        assert_eq!(eph.svh, (2 << 4) | (1 << 3));
    }

    #[test]
    fn inav_code_flag_is_zero() {
        let total_bits = 24 + 12 + 6 + 12 + 10 + 8 + 14 + 14 + 6 + 21 + 31 + 16 + 16 + 32 + 16
            + 32 + 16 + 32 + 14 + 16 + 32 + 16 + 32 + 16 + 32 + 24 + 10 + 10 + 2 + 1 + 2 + 1;
        let mut buf = vec![0u8; total_bits.div_ceil(8)];
        set_unsigned(&mut buf, 24, 12, 1046);
        set_unsigned(&mut buf, 36, 6, 11);
        let eph = decode_inav(&buf).unwrap();
        assert_eq!(eph.code, 0);
    }
}
