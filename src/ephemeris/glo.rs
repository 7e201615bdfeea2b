// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! GLONASS broadcast ephemeris, message 1020 (spec §4.I).
//!
//! Unlike the Keplerian constellations, GLONASS broadcasts a PZ-90
//! position/velocity/acceleration state vector in sign-magnitude form, and
//! its time-of-ephemeris is a UTC-day-based 15-minute index (`tb`) rather
//! than a week/TOW pair, so it needs the current epoch as a day anchor
//! rather than a week anchor.

use super::GloEphemeris;
use crate::bits::{get_sign_magnitude, get_unsigned};
use crate::error::FrameError;
use crate::satellite::{System, sat_of};
use crate::time::consts::DAY_SECS;
use crate::time::{GpsTime, UtcTime};
use std::time::Duration;

const MIN_BITS: usize = 24
    + 12
    + 6
    + 5
    + 1
    + 2
    + 12
    + 1
    + 1
    + 7
    + 24
    + 27
    + 5
    + 24
    + 27
    + 5
    + 24
    + 27
    + 5
    + 1
    + 11
    + 2
    + 1
    + 22
    + 5
    + 5;

/// Reconstruct GLONASS `toe` from the broadcast `tb` (15-minute-of-day
/// index): `tb * 900 - 10800` seconds (spec §4.I), anchored to the UTC
/// calendar day of `reference_epoch` with day rollover if the result falls
/// outside `[0, DAY_SECS)`.
fn reconstruct_toe(tb: u32, reference_epoch: &GpsTime) -> GpsTime {
    let utc_ref = reference_epoch.to_utc_hardcoded();
    let day_start = UtcTime::from_parts(
        utc_ref.year(),
        utc_ref.month(),
        utc_ref.day_of_month(),
        0,
        0,
        0.0,
    )
    .to_gps_hardcoded();
    let mut seconds = tb as f64 * 900.0 - 10800.0;
    if seconds < 0.0 {
        seconds += f64::from(DAY_SECS);
    } else if seconds >= f64::from(DAY_SECS) {
        seconds -= f64::from(DAY_SECS);
    }
    day_start + Duration::from_secs_f64(seconds)
}

/// Decode message 1020. `reference_epoch` anchors the UTC day `tb` is
/// relative to (normally the most recently buffered observation epoch).
pub fn decode(buf: &[u8], reference_epoch: &GpsTime) -> Result<GloEphemeris, FrameError> {
    if buf.len() * 8 < MIN_BITS {
        return Err(FrameError::FramingShort);
    }
    let mut pos = 36;
    let prn = get_unsigned(buf, pos, 6) as u16;
    pos += 6;
    let sat = sat_of(System::Glo, prn);
    if sat == 0 {
        return Err(FrameError::InvalidSatellite);
    }

    let freq_raw = get_unsigned(buf, pos, 5) as i8;
    pos += 5;
    let freq_num = freq_raw - 7;
    pos += 1; // almanac health availability indicator, not separately modeled
    pos += 2; // P1 (time interval indicator), not separately modeled
    pos += 12; // tk (frame start time), not separately modeled
    let health_msb = get_unsigned(buf, pos, 1) as u8;
    pos += 1;
    pos += 1; // P2
    let tb = get_unsigned(buf, pos, 7);
    pos += 7;

    let xn_dot = get_sign_magnitude(buf, pos, 24) as f64 * 2f64.powi(-20) * 1000.0;
    pos += 24;
    let xn = get_sign_magnitude(buf, pos, 27) as f64 * 2f64.powi(-11) * 1000.0;
    pos += 27;
    let xn_ddot = get_sign_magnitude(buf, pos, 5) as f64 * 2f64.powi(-30) * 1000.0;
    pos += 5;
    let yn_dot = get_sign_magnitude(buf, pos, 24) as f64 * 2f64.powi(-20) * 1000.0;
    pos += 24;
    let yn = get_sign_magnitude(buf, pos, 27) as f64 * 2f64.powi(-11) * 1000.0;
    pos += 27;
    let yn_ddot = get_sign_magnitude(buf, pos, 5) as f64 * 2f64.powi(-30) * 1000.0;
    pos += 5;
    let zn_dot = get_sign_magnitude(buf, pos, 24) as f64 * 2f64.powi(-20) * 1000.0;
    pos += 24;
    let zn = get_sign_magnitude(buf, pos, 27) as f64 * 2f64.powi(-11) * 1000.0;
    pos += 27;
    let zn_ddot = get_sign_magnitude(buf, pos, 5) as f64 * 2f64.powi(-30) * 1000.0;
    pos += 5;

    pos += 1; // P3 (number of satellites in almanac), not separately modeled
    let gamman = get_sign_magnitude(buf, pos, 11) as f64 * 2f64.powi(-40);
    pos += 11;
    pos += 2; // Mp, not separately modeled
    let health_lsb = get_unsigned(buf, pos, 1) as u8;
    pos += 1;
    let taun = get_sign_magnitude(buf, pos, 22) as f64 * 2f64.powi(-30);
    pos += 22;
    pos += 5; // delta_tau_n, not separately modeled (single-frequency receivers only)
    let age = get_unsigned(buf, pos, 5) as u8;

    let toe = reconstruct_toe(tb, reference_epoch);

    Ok(GloEphemeris {
        sat,
        freq_num,
        toe,
        iode: (tb & 0x7F) as u8,
        pos: [xn, yn, zn],
        vel: [xn_dot, yn_dot, zn_dot],
        acc: [xn_ddot, yn_ddot, zn_ddot],
        taun: -taun, // broadcast as -tau_n per ICD sign convention
        gamman,
        health: (health_msb << 1) | health_lsb,
        age,
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
    fn freq_num_offset_and_iode_from_tb() {
        let mut buf = vec![0u8; MIN_BITS.div_ceil(8)];
        set_unsigned(&mut buf, 24, 12, 1020);
        set_unsigned(&mut buf, 36, 6, 3); // slot/PRN
        set_unsigned(&mut buf, 42, 5, 10); // freq_raw = 10 -> freq_num = 3
        let tb_pos = 42 + 5 + 1 + 2 + 12 + 1 + 1;
        set_unsigned(&mut buf, tb_pos, 7, 50); // tb

        let reference = GpsTime::new_unchecked(2100, 12345.0);
        let eph = decode(&buf, &reference).unwrap();
        assert_eq!(eph.sat, sat_of(System::Glo, 3));
        assert_eq!(eph.freq_num, 3);
        assert_eq!(eph.iode, 50 & 0x7F);
    }
}
