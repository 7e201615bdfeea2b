// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Legacy RTK observation decoders, message types 1001-1012 (spec §4.G).
//!
//! The eight legacy types are one layout with three independent flags:
//! whether the satellite block carries L2 fields, whether it carries the
//! integer-ambiguity/CNR fields ("extended" form), and whether the
//! constellation is GLONASS (day-based time, extra frequency-number field,
//! different wavelength constants).

use crate::bits::{get_signed, get_unsigned};
use crate::code::Code;
use crate::consts::{DFRQ1_GLO, DFRQ2_GLO, FREQ1_GLO, FREQ2_GLO, PRUNIT_GLO, PRUNIT_GPS};
use crate::consts::nominal_freq;
use crate::error::{DecodeOutcome, FrameError};
use crate::obs::{ContinuationTable, ObsEpoch};
use crate::options::Options;
use crate::satellite::{System, sat_of_gps_glo_field};
use crate::time::{GpsTime, rollover};

/// Which fields a given message type's per-satellite block carries.
#[derive(Debug, Clone, Copy)]
struct Format {
    glonass: bool,
    l2: bool,
    extended: bool,
}

impl Format {
    fn for_type(msg_type: u16) -> Option<Format> {
        match msg_type {
            1001 => Some(Format { glonass: false, l2: false, extended: false }),
            1002 => Some(Format { glonass: false, l2: false, extended: true }),
            1003 => Some(Format { glonass: false, l2: true, extended: false }),
            1004 => Some(Format { glonass: false, l2: true, extended: true }),
            1009 => Some(Format { glonass: true, l2: false, extended: false }),
            1010 => Some(Format { glonass: true, l2: false, extended: true }),
            1011 => Some(Format { glonass: true, l2: true, extended: false }),
            1012 => Some(Format { glonass: true, l2: true, extended: true }),
            _ => None,
        }
    }
}

/// Sentinel for an absent 20-bit signed phaserange field (`0xFFF80000`
/// sign-extended from 20 bits, i.e. the field's minimum value).
const PPR_ABSENT: i32 = -(1 << 19);
/// Sentinel for an absent 14-bit signed L2-L1 pseudorange-difference field
/// (`0xFFFFE000` sign-extended from 14 bits).
const PR21_ABSENT: i32 = -(1 << 13);

/// L2 code-indicator lookup (spec §4.G): `{X, P, D, W}` indexed by the 2-bit
/// field.
const L2_CODE_TABLE: [Code; 4] = [Code::L2X, Code::L2P, Code::L2D, Code::L2W];

fn l1_code(indicator: u32, glonass: bool) -> Code {
    if glonass {
        if indicator == 0 { Code::L1C } else { Code::L1P }
    } else if indicator == 0 {
        Code::L1C
    } else {
        Code::L1P
    }
}

fn wavelength(glonass: bool, band: u8, freq_num: i8) -> f64 {
    let freq = if glonass {
        match band {
            1 => FREQ1_GLO + f64::from(freq_num) * DFRQ1_GLO,
            _ => FREQ2_GLO + f64::from(freq_num) * DFRQ2_GLO,
        }
    } else {
        nominal_freq(band).unwrap_or(0.0)
    };
    if freq <= 0.0 { 0.0 } else { crate::consts::CLIGHT / freq }
}

/// Reconstruct the absolute epoch for this frame's time field.
///
/// For GPS-family messages the field is a 30-bit TOW in ms; for GLONASS it
/// is a 27-bit time-of-day in ms. `reference` anchors both the week (GPS)
/// and the UTC calendar day (GLONASS).
fn reconstruct_time(raw_ms: u32, glonass: bool, reference: &GpsTime) -> GpsTime {
    let raw_secs = f64::from(raw_ms) * 0.001;
    if glonass {
        rollover::reconstruct_glo_time(raw_secs, reference)
    } else {
        let tow = rollover::adjust_gps_tow(raw_secs, reference.tow());
        GpsTime::new_unchecked(reference.wn(), tow)
    }
}

/// Decode one legacy observation frame. `reference` is the most recently
/// buffered epoch (or a clock-derived fallback if none is buffered yet),
/// used to anchor the time-field rollover.
pub fn decode(
    buf: &[u8],
    msg_type: u16,
    reference: &GpsTime,
    epoch: &mut ObsEpoch,
    continuation: &mut ContinuationTable,
    opt: &Options,
) -> Result<DecodeOutcome, FrameError> {
    let format = Format::for_type(msg_type).ok_or(FrameError::UnknownType)?;
    let time_width: usize = if format.glonass { 27 } else { 30 };
    let header_bits = 36 + 12 + time_width + 1 + 5 + 1 + 3;
    if buf.len() * 8 < header_bits {
        return Err(FrameError::FramingShort);
    }

    let mut pos = 36;
    let station_id = get_unsigned(buf, pos, 12) as u16;
    pos += 12;
    if !opt.accepts_station(station_id) {
        return Err(FrameError::StationMismatch);
    }
    match epoch.station_id {
        Some(expected) if expected != station_id => {
            epoch.station_id = None;
            return Err(FrameError::StationMismatch);
        }
        _ => epoch.station_id = Some(station_id),
    }

    let raw_time = get_unsigned(buf, pos, time_width as u32) as u32;
    pos += time_width;
    let sync = get_unsigned(buf, pos, 1) != 0;
    pos += 1;
    let nsat = get_unsigned(buf, pos, 5);
    pos += 5 + 1 + 3; // nsat, smoothing indicator, smoothing interval

    let time = reconstruct_time(raw_time, format.glonass, reference);
    if epoch.is_new_epoch(&time) || !epoch.sync {
        epoch.clear();
    }
    epoch.time = Some(time);
    epoch.sync = sync;

    let base_system = if format.glonass { System::Glo } else { System::Gps };
    let l1_band = 1u8;
    let l2_band = if format.glonass { 7 } else { 2 };
    let pr_unit = if format.glonass { PRUNIT_GLO } else { PRUNIT_GPS };

    for _ in 0..nsat {
        let need_bits = 6
            + 1
            + if format.glonass { 5 } else { 0 }
            + 24
            + 20
            + 7
            + if format.extended { 16 } else { 0 }
            + if format.l2 { 2 + 14 + 20 + 7 + if format.extended { 8 } else { 0 } } else { 0 };
        if buf.len() * 8 < pos + need_bits {
            return Err(FrameError::FramingShort);
        }

        let prn = get_unsigned(buf, pos, 6) as u16;
        pos += 6;
        let sat = sat_of_gps_glo_field(base_system, prn);
        if sat == 0 {
            log::debug!("legacy obs: dropping unrecognized {base_system:?} PRN {prn}");
            pos += need_bits - 6;
            continue;
        }

        let l1_code_ind = get_unsigned(buf, pos, 1);
        pos += 1;
        let freq_num = if format.glonass {
            let raw = get_unsigned(buf, pos, 5) as i8;
            pos += 5;
            raw - 7
        } else {
            0
        };
        let l1_pr_raw = get_unsigned(buf, pos, 24);
        pos += 24;
        let l1_ppr_raw = get_signed(buf, pos, 20);
        pos += 20;
        let l1_lock = get_unsigned(buf, pos, 7) as u16;
        pos += 7;
        let (amb, cnr1_raw) = if format.extended {
            let amb = get_unsigned(buf, pos, 8);
            pos += 8;
            let cnr = get_unsigned(buf, pos, 8);
            pos += 8;
            (amb, cnr)
        } else {
            (0, 0)
        };

        let index = match epoch.obsindex(sat) {
            Some(i) => i,
            None => {
                if format.l2 {
                    pos += 2 + 14 + 20 + 7 + if format.extended { 8 } else { 0 };
                }
                continue;
            }
        };

        let l1_lambda = wavelength(format.glonass, l1_band, freq_num);
        let l1_pr = l1_pr_raw as f64 * 0.02 + amb as f64 * pr_unit;
        let data = &mut epoch.data[index];
        data.code[0] = l1_code(l1_code_ind, format.glonass);
        data.pseudorange[0] = Some(l1_pr);
        data.lli[0] = continuation.lossoflock(sat, 0, l1_lock);
        if format.extended {
            data.snr[0] = crate::obs::snratio(cnr1_raw as f64 * 0.25);
        }
        if l1_ppr_raw != PPR_ABSENT && l1_lambda > 0.0 {
            let relative_cycles = l1_pr / l1_lambda + l1_ppr_raw as f64 * 0.0005 / l1_lambda;
            data.carrier_phase[0] = Some(continuation.adjcp(sat, 0, relative_cycles));
        }

        if format.l2 {
            let l2_code_ind = get_unsigned(buf, pos, 2) as usize;
            pos += 2;
            let l2_pr_diff = get_signed(buf, pos, 14);
            pos += 14;
            let l2_ppr_raw = get_signed(buf, pos, 20);
            pos += 20;
            let l2_lock = get_unsigned(buf, pos, 7) as u16;
            pos += 7;
            let cnr2_raw = if format.extended {
                let v = get_unsigned(buf, pos, 8);
                pos += 8;
                v
            } else {
                0
            };

            let l2_lambda = wavelength(format.glonass, l2_band, freq_num);
            data.code[1] = L2_CODE_TABLE[l2_code_ind];
            data.lli[1] = continuation.lossoflock(sat, 1, l2_lock);
            if format.extended {
                data.snr[1] = crate::obs::snratio(cnr2_raw as f64 * 0.25);
            }
            if l2_pr_diff != PR21_ABSENT {
                data.pseudorange[1] = Some(l1_pr + l2_pr_diff as f64 * 0.02);
            }
            if l2_ppr_raw != PPR_ABSENT && l2_lambda > 0.0 {
                // The L2-L1 phaserange field is relative to the L1 pseudorange
                // base, not an L2 pseudorange (spec §4.G).
                let relative_cycles = l1_pr / l2_lambda + l2_ppr_raw as f64 * 0.0005 / l2_lambda;
                data.carrier_phase[1] = Some(continuation.adjcp(sat, 1, relative_cycles));
            }
        }
    }

    Ok(DecodeOutcome::Observation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::satellite::sat_of;

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

    fn set_signed(buf: &mut [u8], pos: usize, len: u32, value: i64) {
        let mask = if len == 64 { u64::MAX } else { (1u64 << len) - 1 };
        set_unsigned(buf, pos, len, (value as u64) & mask);
    }

    #[test]
    fn decodes_mt1004_single_satellite() {
        let header_bits = 36 + 12 + 30 + 1 + 5 + 1 + 3;
        let body_bits = 6 + 1 + 24 + 20 + 7 + 8 + 8 + 2 + 14 + 20 + 7 + 8;
        let total = header_bits + body_bits;
        let mut buf = vec![0u8; total.div_ceil(8)];
        set_unsigned(&mut buf, 24, 12, 1004);
        let mut pos = 36;
        set_unsigned(&mut buf, pos, 12, 123); // station id
        pos += 12;
        set_unsigned(&mut buf, pos, 30, 100_000); // tow ms
        pos += 30;
        set_unsigned(&mut buf, pos, 1, 1); // sync
        pos += 1;
        set_unsigned(&mut buf, pos, 5, 1); // nsat
        pos += 1 + 5 + 3;

        set_unsigned(&mut buf, pos, 6, 7); // PRN
        pos += 6;
        set_unsigned(&mut buf, pos, 1, 0); // L1 code = C/A
        pos += 1;
        set_unsigned(&mut buf, pos, 24, 100_000_000); // L1 PR raw
        pos += 24;
        set_signed(&mut buf, pos, 20, 1000); // L1 PPR
        pos += 20;
        set_unsigned(&mut buf, pos, 7, 10); // lock
        pos += 7;
        set_unsigned(&mut buf, pos, 8, 0); // ambiguity
        pos += 8;
        set_unsigned(&mut buf, pos, 8, 160); // CNR = 40 dB-Hz
        pos += 8;
        set_unsigned(&mut buf, pos, 2, 3); // L2 code ind -> W
        pos += 2;
        set_signed(&mut buf, pos, 14, 50); // L2-L1 PR diff
        pos += 14;
        set_signed(&mut buf, pos, 20, PPR_ABSENT as i64); // L2 phase absent (sentinel is i32)
        pos += 20;
        set_unsigned(&mut buf, pos, 7, 9); // L2 lock
        pos += 7;
        set_unsigned(&mut buf, pos, 8, 120); // L2 CNR

        let reference = GpsTime::new(2100, 99_900.0).unwrap();
        let mut epoch = ObsEpoch::new();
        let mut continuation = ContinuationTable::new();
        let opt = Options::parse("");

        let outcome =
            decode(&buf, 1004, &reference, &mut epoch, &mut continuation, &opt).unwrap();
        assert_eq!(outcome, DecodeOutcome::Observation);
        assert_eq!(epoch.data.len(), 1);
        let sat = sat_of(System::Gps, 7);
        let data = &epoch.data[0];
        assert_eq!(data.sat, sat);
        assert_eq!(data.code[0], Code::L1C);
        assert_eq!(data.code[1], Code::L2W);
        assert!((data.pseudorange[0].unwrap() - 2_000_000.0).abs() < 1e-6);
        assert_eq!(data.pseudorange[1], Some(2_000_000.0 + 1.0));
        assert_eq!(data.carrier_phase[1], None);
        assert_eq!(epoch.station_id, Some(123));
    }

    #[test]
    fn station_mismatch_mid_batch_drops_frame() {
        let header_bits = 36 + 12 + 30 + 1 + 5 + 1 + 3;
        let mut buf = vec![0u8; header_bits.div_ceil(8)];
        set_unsigned(&mut buf, 24, 12, 1001);
        set_unsigned(&mut buf, 36, 12, 5); // station id
        set_unsigned(&mut buf, 36 + 12, 30, 0);
        set_unsigned(&mut buf, 36 + 12 + 30, 1, 1);
        set_unsigned(&mut buf, 36 + 12 + 30 + 1, 5, 0); // nsat = 0

        let reference = GpsTime::new(2100, 0.0).unwrap();
        let mut epoch = ObsEpoch::new();
        epoch.station_id = Some(9);
        let mut continuation = ContinuationTable::new();
        let opt = Options::parse("");

        let err =
            decode(&buf, 1001, &reference, &mut epoch, &mut continuation, &opt).unwrap_err();
        assert_eq!(err, FrameError::StationMismatch);
        assert_eq!(epoch.station_id, None);
    }

    #[test]
    fn station_option_rejects_other_ids() {
        let header_bits = 36 + 12 + 30 + 1 + 5 + 1 + 3;
        let mut buf = vec![0u8; header_bits.div_ceil(8)];
        set_unsigned(&mut buf, 24, 12, 1001);
        set_unsigned(&mut buf, 36, 12, 7);
        set_unsigned(&mut buf, 36 + 12 + 30 + 1, 5, 0);

        let reference = GpsTime::new(2100, 0.0).unwrap();
        let mut epoch = ObsEpoch::new();
        let mut continuation = ContinuationTable::new();
        let opt = Options::parse("-STA=123");

        let err =
            decode(&buf, 1001, &reference, &mut epoch, &mut continuation, &opt).unwrap_err();
        assert_eq!(err, FrameError::StationMismatch);
    }
}
