// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! BeiDou broadcast ephemeris, messages 1042 and its early-draft alias 63
//! (spec §4.I).

use super::Ephemeris;
use crate::bits::{get_signed, get_unsigned};
use crate::error::FrameError;
use crate::satellite::{System, sat_of};
use crate::time::{BdsTime, rollover};

const MIN_BITS: usize = 24
    + 12
    + 6
    + 13
    + 4
    + 14
    + 5
    + 17
    + 11
    + 22
    + 24
    + 5
    + 18
    + 16
    + 32
    + 18
    + 32
    + 18
    + 32
    + 17
    + 18
    + 32
    + 18
    + 32
    + 18
    + 32
    + 24
    + 10
    + 10
    + 1;

/// Decode message 1042 (or its alias 63). `current_bdt_week` anchors the
/// 13-bit broadcast week, which RTCM still transmits modulo 1024 (spec
/// §4.C's BDT week adjustment).
pub fn decode(buf: &[u8], current_bdt_week: i16) -> Result<Ephemeris, FrameError> {
    if buf.len() * 8 < MIN_BITS {
        return Err(FrameError::FramingShort);
    }
    let mut pos = 36;
    let prn = get_unsigned(buf, pos, 6) as u16;
    pos += 6;
    let sat = sat_of(System::Cmp, prn);
    if sat == 0 {
        return Err(FrameError::InvalidSatellite);
    }

    let week_raw = get_unsigned(buf, pos, 13) as i16;
    pos += 13;
    let sva = get_unsigned(buf, pos, 4) as u8;
    pos += 4;
    let idot = get_signed(buf, pos, 14) as f64 * 2f64.powi(-43) * std::f64::consts::PI;
    pos += 14;
    let aode = get_unsigned(buf, pos, 5) as i32;
    pos += 5;
    let toc_raw = get_unsigned(buf, pos, 17) as f64 * 8.0;
    pos += 17;
    let af2 = get_signed(buf, pos, 11) as f64 * 2f64.powi(-66);
    pos += 11;
    let af1 = get_signed(buf, pos, 22) as f64 * 2f64.powi(-50);
    pos += 22;
    let af0 = get_signed(buf, pos, 24) as f64 * 2f64.powi(-33);
    pos += 24;
    let aodc = get_unsigned(buf, pos, 5) as i32;
    pos += 5;
    let crs = get_signed(buf, pos, 18) as f64 * 2f64.powi(-6);
    pos += 18;
    let deln = get_signed(buf, pos, 16) as f64 * 2f64.powi(-43) * std::f64::consts::PI;
    pos += 16;
    let m0 = get_signed(buf, pos, 32) as f64 * 2f64.powi(-31) * std::f64::consts::PI;
    pos += 32;
    let cuc = get_signed(buf, pos, 18) as f64 * 2f64.powi(-31);
    pos += 18;
    let e = get_unsigned(buf, pos, 32) as f64 * 2f64.powi(-33);
    pos += 32;
    let cus = get_signed(buf, pos, 18) as f64 * 2f64.powi(-31);
    pos += 18;
    let sqrta = get_unsigned(buf, pos, 32) as f64 * 2f64.powi(-19);
    pos += 32;
    let toe_raw = get_unsigned(buf, pos, 17) as f64 * 8.0;
    pos += 17;
    let cic = get_signed(buf, pos, 18) as f64 * 2f64.powi(-31);
    pos += 18;
    let omg0 = get_signed(buf, pos, 32) as f64 * 2f64.powi(-31) * std::f64::consts::PI;
    pos += 32;
    let cis = get_signed(buf, pos, 18) as f64 * 2f64.powi(-31);
    pos += 18;
    let i0 = get_signed(buf, pos, 32) as f64 * 2f64.powi(-31) * std::f64::consts::PI;
    pos += 32;
    let crc = get_signed(buf, pos, 18) as f64 * 2f64.powi(-6);
    pos += 18;
    let omg = get_signed(buf, pos, 32) as f64 * 2f64.powi(-31) * std::f64::consts::PI;
    pos += 32;
    let omgd = get_signed(buf, pos, 24) as f64 * 2f64.powi(-43) * std::f64::consts::PI;
    pos += 24;
    let tgd1 = get_signed(buf, pos, 10) as f64 * 1e-10;
    pos += 10;
    let tgd2 = get_signed(buf, pos, 10) as f64 * 1e-10;
    pos += 10;
    let svh = get_unsigned(buf, pos, 1);

    let week_mod = week_raw.rem_euclid(1024);
    let bdt_week = rollover::resolve_week_mod_1024(week_mod, current_bdt_week);
    let toe_bdt = BdsTime::new(bdt_week, toe_raw).map_err(|_| FrameError::FramingShort)?;
    let toc_bdt = BdsTime::new(bdt_week, toc_raw).map_err(|_| FrameError::FramingShort)?;

    Ok(Ephemeris {
        sat,
        toe: toe_bdt.to_gps(),
        toc: toc_bdt.to_gps(),
        iode: aode,
        iodc: aodc,
        sva,
        svh,
        code: 0,
        sqrta,
        e,
        i0,
        omg0,
        omg,
        m0,
        deln,
        omgd,
        idot,
        cuc,
        cus,
        crc,
        crs,
        cic,
        cis,
        af0,
        af1,
        af2,
        tgd: [tgd1, tgd2],
    })
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
    fn decodes_aode_aodc_as_iode_iodc() {
        let mut buf = vec![0u8; MIN_BITS.div_ceil(8)];
        set_unsigned(&mut buf, 24, 12, 1042);
        set_unsigned(&mut buf, 36, 6, 5); // PRN
        let mut pos = 42 + 13 + 4 + 14;
        set_unsigned(&mut buf, pos, 5, 3); // AODE
        pos += 5 + 17 + 11 + 22 + 24;
        set_unsigned(&mut buf, pos, 5, 7); // AODC

        let eph = decode(&buf, 800).unwrap();
        assert_eq!(eph.sat, sat_of(System::Cmp, 5));
        assert_eq!(eph.iode, 3);
        assert_eq!(eph.iodc, 7);
    }
}
