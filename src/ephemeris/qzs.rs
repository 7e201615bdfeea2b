// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! QZSS broadcast ephemeris, message 1044 (spec §4.I).
//!
//! Same Keplerian elements as GPS (1019) and the same 16 s `toe`/`toc`
//! scale, but the clock terms come before the orbital terms on the wire,
//! the PRN field is only 4 bits wide, and PRNs carry a +192 offset into the
//! QZSS PRN range.

use super::Ephemeris;
use crate::bits::{get_signed, get_unsigned};
use crate::error::FrameError;
use crate::satellite::{System, sat_of};
use crate::time::{GpsTime, rollover};

const HEADER_BITS: usize = 24 + 12;
const BODY_BITS: usize = 473;
const PRN_OFFSET: u16 = 192;

pub fn decode(buf: &[u8], current_full_week: i16) -> Result<Ephemeris, FrameError> {
    if buf.len() * 8 < HEADER_BITS + BODY_BITS {
        return Err(FrameError::FramingShort);
    }
    let mut pos = 36;
    let prn = get_unsigned(buf, pos, 4) as u16 + PRN_OFFSET;
    pos += 4;
    let sat = sat_of(System::Qzs, prn);
    if sat == 0 {
        return Err(FrameError::InvalidSatellite);
    }

    let toc_raw = get_unsigned(buf, pos, 16) as f64 * 16.0;
    pos += 16;
    let af2 = get_signed(buf, pos, 8) as f64 * 2f64.powi(-55);
    pos += 8;
    let af1 = get_signed(buf, pos, 16) as f64 * 2f64.powi(-43);
    pos += 16;
    let af0 = get_signed(buf, pos, 22) as f64 * 2f64.powi(-31);
    pos += 22;
    let iode = get_unsigned(buf, pos, 8) as i32;
    pos += 8;
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
    let toe_raw = get_unsigned(buf, pos, 16) as f64 * 16.0;
    pos += 16;
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
    let idot = get_signed(buf, pos, 14) as f64 * 2f64.powi(-43) * std::f64::consts::PI;
    pos += 14;
    pos += 2; // code on L2, not separately modeled
    let week_mod = get_unsigned(buf, pos, 10) as i16;
    pos += 10;
    let sva = get_unsigned(buf, pos, 4) as u8;
    pos += 4;
    let svh = get_unsigned(buf, pos, 6);
    pos += 6;
    let tgd = get_signed(buf, pos, 8) as f64 * 2f64.powi(-31);
    pos += 8;
    let iodc = get_unsigned(buf, pos, 10) as i32;
    pos += 10;
    pos += 1; // fit interval, not separately modeled

    let week = rollover::resolve_week_mod_1024(week_mod, current_full_week);
    let toe = GpsTime::new(week, toe_raw).map_err(|_| FrameError::FramingShort)?;
    let toc = GpsTime::new(week, toc_raw).map_err(|_| FrameError::FramingShort)?;

    Ok(Ephemeris {
        sat,
        toe,
        toc,
        iode,
        iodc,
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
        tgd: [tgd, 0.0],
    })
}
