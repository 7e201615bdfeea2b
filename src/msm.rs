// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Multiple Signal Message decoders, MSM4 through MSM7 (spec §4.K).
//!
//! One decoder handles all four resolutions and six constellations: the
//! common header and satellite/signal/cell mask parsing is identical; the
//! per-satellite and per-cell field widths vary by MSM number, and the
//! signal-id-to-code table and epoch reconstruction vary by constellation.

use crate::bits::{get_signed, get_unsigned};
use crate::code::{Code, code_priority};
use crate::consts::RANGE_MS;
use crate::consts::{DFRQ1_GLO, DFRQ2_GLO, FREQ1_GLO, FREQ2_GLO};
use crate::error::{DecodeOutcome, FrameError};
use crate::obs::{ContinuationTable, ObsEpoch, NFREQ, NFREQ_TOTAL, snratio};
use crate::options::Options;
use crate::satellite::{System, sat_of};
use crate::time::{GpsTime, rollover};

/// Which constellation and RTCM message-type range this frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MsmKind {
    system: System,
    /// 4, 5, 6, or 7.
    msm: u8,
}

fn classify(msg_type: u16) -> Option<MsmKind> {
    let base = (msg_type / 10) * 10;
    let msm = msg_type - base;
    let system = match base {
        1070 => System::Gps,
        1080 => System::Glo,
        1090 => System::Gal,
        1100 => System::Sbs,
        1110 => System::Qzs,
        1120 => System::Cmp,
        _ => return None,
    };
    if (4..=7).contains(&msm) {
        Some(MsmKind { system, msm })
    } else {
        None
    }
}

/// Per-constellation MSM signal-id (1-32) to RINEX observation code table,
/// per the signal tables in RTCM 3.3 (spec §4.K, ref [17]); position 0 is
/// unused (signal ids are 1-based).
fn signal_code(system: System, signal_id: usize) -> Code {
    if signal_id == 0 || signal_id > 32 {
        return Code::None;
    }
    let table: &[&str; 32] = match system {
        System::Gps => &[
            "", "1C", "1P", "1W", "1Y", "1M", "", "2C", "2P", "2W", "2Y", "2M", "", "", "2S",
            "2L", "2X", "", "", "", "", "5I", "5Q", "5X", "", "", "", "", "", "1S", "1L", "1X",
        ],
        System::Glo => &[
            "", "1C", "1P", "", "", "", "", "2C", "2P", "", "", "", "", "", "", "", "", "", "",
            "", "", "", "", "", "", "", "", "", "", "", "", "",
        ],
        System::Gal => &[
            "", "1C", "1A", "1B", "1X", "1Z", "", "6C", "6A", "6B", "6X", "6Z", "", "7I", "7Q",
            "7X", "", "8I", "8Q", "8X", "", "5I", "5Q", "5X", "", "", "", "", "", "", "", "",
        ],
        System::Sbs => &[
            "", "1C", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "",
            "5I", "5Q", "5X", "", "", "", "", "", "", "", "",
        ],
        System::Qzs => &[
            "", "1C", "", "", "", "", "", "", "6S", "6L", "6X", "", "", "", "2S", "2L", "2X", "",
            "", "", "", "5I", "5Q", "5X", "", "", "", "", "", "1S", "1L", "1X",
        ],
        System::Cmp => &[
            "", "2I", "2Q", "2X", "", "", "", "6I", "6Q", "6X", "", "", "", "7I", "7Q", "7X", "",
            "", "", "", "", "", "", "", "", "", "", "", "", "", "", "",
        ],
        // MSM never carries LEO satellites; no signal table exists for them.
        System::Leo => &[""; 32],
    };
    let s = table[signal_id - 1];
    // BeiDou remaps band 5 (B2) to 2 and band 4 (B3) to 3 per spec §4.K; the
    // RINEX strings above already use B2/B3 letters 7/6 so no remap needed
    // here, this note documents why no translation happens.
    Code::from_rinex_str(s)
}

/// Map a code's generic RINEX band id (spec §4.D) to this constellation's
/// own compact main/extended frequency ordering. Every system but BeiDou
/// uses the generic id directly. BeiDou's B2 and B3 signals fall under the
/// generic E5b/B2 (5) and L6/LEX/B3 (4) categories, which would otherwise
/// collide with Galileo's identically-categorized signals and leave no room
/// for BeiDou's own second and third main slots; spec §4.K remaps them down
/// to 2 and 3, and by the same logic B1 (generic id 2) becomes BeiDou's
/// first slot, id 1.
fn band_for(system: System, code: Code) -> u8 {
    if system == System::Cmp {
        match code.band() {
            2 => 1,
            5 => 2,
            4 => 3,
            other => other,
        }
    } else {
        code.band()
    }
}

fn wavelength(system: System, band: u8, glo_freq_slot: Option<i8>) -> f64 {
    if system == System::Glo {
        let fn_ = glo_freq_slot.unwrap_or(0);
        let freq = if band == 1 {
            FREQ1_GLO + f64::from(fn_) * DFRQ1_GLO
        } else {
            FREQ2_GLO + f64::from(fn_) * DFRQ2_GLO
        };
        if freq <= 0.0 { 0.0 } else { crate::consts::CLIGHT / freq }
    } else {
        crate::consts::nominal_freq(band)
            .map(|f| crate::consts::CLIGHT / f)
            .unwrap_or(0.0)
    }
}

/// One bit-field width set for a satellite/cell payload, varying by MSM
/// number (spec §4.K).
struct FieldWidths {
    /// Per-satellite extended-info width (GLONASS freq slot), 0 if absent.
    ext_info_bits: u32,
    /// Per-satellite range-rate width, 0 if absent (MSM5/7 only).
    rough_rate_bits: u32,
    pr_fine_bits: u32,
    pr_fine_sentinel: i32,
    pr_fine_scale: f64,
    cp_fine_bits: u32,
    cp_fine_sentinel: i32,
    cp_fine_scale: f64,
    lock_bits: u32,
    cnr_bits: u32,
    cnr_scale: f64,
    rate_fine_bits: u32,
    rate_fine_sentinel: i32,
    rate_fine_scale: f64,
}

fn field_widths(msm: u8) -> FieldWidths {
    match msm {
        4 => FieldWidths {
            ext_info_bits: 0,
            rough_rate_bits: 0,
            pr_fine_bits: 15,
            pr_fine_sentinel: -(1 << 14),
            pr_fine_scale: 2f64.powi(-24) * RANGE_MS,
            cp_fine_bits: 22,
            cp_fine_sentinel: -(1 << 21),
            cp_fine_scale: 2f64.powi(-29) * RANGE_MS,
            lock_bits: 4,
            cnr_bits: 6,
            cnr_scale: 1.0,
            rate_fine_bits: 0,
            rate_fine_sentinel: 0,
            rate_fine_scale: 0.0,
        },
        5 => FieldWidths {
            ext_info_bits: 4,
            rough_rate_bits: 14,
            pr_fine_bits: 15,
            pr_fine_sentinel: -(1 << 14),
            pr_fine_scale: 2f64.powi(-24) * RANGE_MS,
            cp_fine_bits: 22,
            cp_fine_sentinel: -(1 << 21),
            cp_fine_scale: 2f64.powi(-29) * RANGE_MS,
            lock_bits: 4,
            cnr_bits: 6,
            cnr_scale: 1.0,
            rate_fine_bits: 15,
            rate_fine_sentinel: -(1 << 14),
            rate_fine_scale: 0.0001,
        },
        6 => FieldWidths {
            ext_info_bits: 0,
            rough_rate_bits: 0,
            pr_fine_bits: 20,
            pr_fine_sentinel: -(1 << 19),
            pr_fine_scale: 2f64.powi(-29) * RANGE_MS,
            cp_fine_bits: 24,
            cp_fine_sentinel: -(1 << 23),
            cp_fine_scale: 2f64.powi(-31) * RANGE_MS,
            lock_bits: 10,
            cnr_bits: 10,
            cnr_scale: 0.0625,
            rate_fine_bits: 0,
            rate_fine_sentinel: 0,
            rate_fine_scale: 0.0,
        },
        7 => FieldWidths {
            ext_info_bits: 4,
            rough_rate_bits: 14,
            pr_fine_bits: 20,
            pr_fine_sentinel: -(1 << 19),
            pr_fine_scale: 2f64.powi(-29) * RANGE_MS,
            cp_fine_bits: 24,
            cp_fine_sentinel: -(1 << 23),
            cp_fine_scale: 2f64.powi(-31) * RANGE_MS,
            lock_bits: 10,
            cnr_bits: 10,
            cnr_scale: 0.0625,
            rate_fine_bits: 15,
            rate_fine_sentinel: -(1 << 14),
            rate_fine_scale: 0.0001,
        },
        _ => unreachable!("classify() only returns 4..=7"),
    }
}

/// Extract the indices (1-based position within the field, as broadcast) of
/// set bits in an MSB-first bitmask occupying `width` bits starting at
/// `pos`, up to `limit` entries.
fn mask_bits(buf: &[u8], pos: usize, width: u32, limit: usize) -> Vec<usize> {
    let mut out = Vec::new();
    for i in 0..width as usize {
        if out.len() >= limit {
            break;
        }
        if get_unsigned(buf, pos + i, 1) != 0 {
            out.push(i + 1);
        }
    }
    out
}

/// Decode one MSM4-7 frame.
pub fn decode(
    buf: &[u8],
    msg_type: u16,
    reference: &GpsTime,
    epoch: &mut ObsEpoch,
    continuation: &mut ContinuationTable,
    opt: &Options,
) -> Result<DecodeOutcome, FrameError> {
    let kind = classify(msg_type).ok_or(FrameError::UnknownType)?;
    let widths = field_widths(kind.msm);

    let header_min_bits = 36 + 12 + 30 + 1 + 3 + 7 + 2 + 2 + 1 + 3 + 64 + 32;
    if buf.len() * 8 < header_min_bits {
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

    let time = if kind.system == System::Glo {
        let _dow = get_unsigned(buf, pos, 3);
        pos += 3;
        let tod_ms = get_unsigned(buf, pos, 27);
        pos += 27;
        rollover::reconstruct_glo_time(f64::from(tod_ms) * 0.001, reference)
    } else {
        let tow_ms = get_unsigned(buf, pos, 30);
        pos += 30;
        let mut tow_secs = f64::from(tow_ms) * 0.001;
        if kind.system == System::Cmp {
            tow_secs += 14.0;
        }
        let adjusted = rollover::adjust_gps_tow(tow_secs, reference.tow());
        GpsTime::new_unchecked(reference.wn(), adjusted)
    };

    let sync = get_unsigned(buf, pos, 1) != 0;
    pos += 1;
    pos += 3; // issue-of-data, not separately modeled
    pos += 7; // time-tag sub-second, not separately modeled
    pos += 2 + 2 + 1 + 3; // clock-steering, clock-extension, smoothing, smoothing interval

    let sats = mask_bits(buf, pos, 64, 64);
    pos += 64;
    let sigs = mask_bits(buf, pos, 32, 32);
    pos += 32;

    let nsat = sats.len();
    let nsig = sigs.len();
    if nsat * nsig > 64 {
        return Err(FrameError::FramingShort);
    }
    let cell_mask_bits = nsat * nsig;
    if buf.len() * 8 < pos + cell_mask_bits {
        return Err(FrameError::FramingShort);
    }
    let mut cell_mask = vec![false; cell_mask_bits];
    for (i, slot) in cell_mask.iter_mut().enumerate() {
        *slot = get_unsigned(buf, pos + i, 1) != 0;
    }
    pos += cell_mask_bits;

    if epoch.is_new_epoch(&time) || !epoch.sync {
        epoch.clear();
    }
    epoch.time = Some(time);
    epoch.sync = sync;

    // Per-satellite fields.
    let per_sat_bits = 8 + 10 + widths.ext_info_bits + widths.rough_rate_bits;
    if buf.len() * 8 < pos + per_sat_bits as usize * nsat {
        return Err(FrameError::FramingShort);
    }
    let mut rough_range = vec![0.0f64; nsat];
    let mut glo_freq_slot = vec![None::<i8>; nsat];
    let mut rough_rate = vec![0.0f64; nsat];
    for i in 0..nsat {
        let integer_ms = get_unsigned(buf, pos, 8);
        pos += 8;
        let mut r = if integer_ms == 255 {
            0.0
        } else {
            f64::from(integer_ms) * RANGE_MS
        };
        if widths.ext_info_bits > 0 {
            let ex = get_unsigned(buf, pos, widths.ext_info_bits) as i8;
            pos += widths.ext_info_bits as usize;
            if ex <= 13 {
                glo_freq_slot[i] = Some(ex - 7);
            }
        }
        let frac = get_unsigned(buf, pos, 10);
        pos += 10;
        if r != 0.0 {
            r += f64::from(frac) * 2f64.powi(-10) * RANGE_MS;
        }
        rough_range[i] = r;
        if widths.rough_rate_bits > 0 {
            let raw = get_signed(buf, pos, widths.rough_rate_bits);
            pos += widths.rough_rate_bits as usize;
            if raw != -(1i32 << (widths.rough_rate_bits - 1)) {
                rough_rate[i] = raw as f64;
            }
        }
    }

    // Resolve signal ids to codes and assign main/extended slots per band
    // (spec §4.K's signal-index assignment): at most one signal per band
    // occupies a main slot `[0..NFREQ)`, chosen by code priority; everything
    // else (lower-priority contenders, and bands beyond NFREQ entirely)
    // falls through to the extended slots in first-seen order.
    let codes: Vec<Code> = sigs.iter().map(|&id| signal_code(kind.system, id)).collect();
    let mut main_slot: [Option<u8>; NFREQ] = [None; NFREQ];
    let mut slot_for_sig = vec![usize::MAX; nsig];
    let mut next_extended = NFREQ;
    for (k, &code) in codes.iter().enumerate() {
        if code == Code::None {
            continue;
        }
        let band = band_for(kind.system, code) as usize;
        if band == 0 || band > NFREQ {
            if next_extended < NFREQ_TOTAL {
                slot_for_sig[k] = next_extended;
                next_extended += 1;
            } else {
                log::debug!(
                    "MSM: dropping signal {:?} (band {band}), no extended slot left",
                    code
                );
            }
            continue;
        }
        let idx = band - 1;
        match main_slot[idx] {
            None => {
                main_slot[idx] = Some(k as u8);
                slot_for_sig[k] = idx;
            }
            Some(existing) => {
                let existing_code = codes[existing as usize];
                if code_priority(kind.system, code, opt)
                    > code_priority(kind.system, existing_code, opt)
                {
                    if next_extended < NFREQ_TOTAL {
                        slot_for_sig[existing as usize] = next_extended;
                        next_extended += 1;
                    } else {
                        log::debug!(
                            "MSM: dropping signal {:?} (displaced from main slot, no extended slot left)",
                            existing_code
                        );
                    }
                    main_slot[idx] = Some(k as u8);
                    slot_for_sig[k] = idx;
                } else if next_extended < NFREQ_TOTAL {
                    slot_for_sig[k] = next_extended;
                    next_extended += 1;
                } else {
                    log::debug!(
                        "MSM: dropping signal {:?} (lower priority, no extended slot left)",
                        code
                    );
                }
            }
        }
    }

    // Cell fields, in sat-major / sig-minor order matching the cell mask.
    for i in 0..nsat {
        for k in 0..nsig {
            if !cell_mask[i * nsig + k] {
                continue;
            }
            let cell_bits = widths.pr_fine_bits
                + widths.cp_fine_bits
                + widths.lock_bits
                + 1
                + widths.cnr_bits
                + widths.rate_fine_bits;
            if buf.len() * 8 < pos + cell_bits as usize {
                return Err(FrameError::FramingShort);
            }
            let pr_fine = get_signed(buf, pos, widths.pr_fine_bits);
            pos += widths.pr_fine_bits as usize;
            let cp_fine = get_signed(buf, pos, widths.cp_fine_bits);
            pos += widths.cp_fine_bits as usize;
            let lock = get_unsigned(buf, pos, widths.lock_bits) as u16;
            pos += widths.lock_bits as usize;
            let half_cycle = get_unsigned(buf, pos, 1) != 0;
            pos += 1;
            let cnr = get_unsigned(buf, pos, widths.cnr_bits) as f64 * widths.cnr_scale;
            pos += widths.cnr_bits as usize;
            let rate_fine = if widths.rate_fine_bits > 0 {
                let v = get_signed(buf, pos, widths.rate_fine_bits);
                pos += widths.rate_fine_bits as usize;
                v
            } else {
                0
            };

            let raw_prn = sats[i] as u16;
            let sat = sat_of(kind.system, raw_prn);
            if sat == 0 {
                log::debug!("MSM: dropping unrecognized {:?} PRN {raw_prn}", kind.system);
                continue;
            }
            let code = codes[k];
            if code == Code::None {
                log::debug!("MSM: dropping cell with unmapped signal id {}", sigs[k]);
                continue;
            }
            let slot = slot_for_sig[k];
            if slot == usize::MAX {
                continue;
            }
            let band = band_for(kind.system, code);
            let lambda = wavelength(kind.system, band, glo_freq_slot[i]);

            let index = match epoch.obsindex(sat) {
                Some(idx) => idx,
                None => continue,
            };
            let data = &mut epoch.data[index];
            data.code[slot] = code;
            data.lli[slot] = continuation.lossoflock(sat, slot as u8, lock)
                | if half_cycle { 3 } else { 0 };
            data.snr[slot] = snratio(cnr);
            if let Some(fine) = (pr_fine != widths.pr_fine_sentinel).then_some(pr_fine) {
                data.pseudorange[slot] = Some(rough_range[i] + fine as f64 * widths.pr_fine_scale);
            }
            if lambda > 0.0 {
                if let Some(fine) = (cp_fine != widths.cp_fine_sentinel).then_some(cp_fine) {
                    let cycles = (rough_range[i] + fine as f64 * widths.cp_fine_scale) / lambda;
                    data.carrier_phase[slot] = Some(cycles);
                }
                if widths.rate_fine_bits > 0
                    && rate_fine != widths.rate_fine_sentinel
                    && rough_rate[i] != 0.0
                {
                    let rate = rough_rate[i] + rate_fine as f64 * widths.rate_fine_scale;
                    data.doppler[slot] = Some(-rate / lambda);
                }
            }
        }
    }

    Ok(DecodeOutcome::Observation)
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

    fn set_signed(buf: &mut [u8], pos: usize, len: u32, value: i64) {
        let mask = if len == 64 { u64::MAX } else { (1u64 << len) - 1 };
        set_unsigned(buf, pos, len, (value as u64) & mask);
    }

    #[test]
    fn classify_recognizes_msm_range() {
        assert_eq!(classify(1074), Some(MsmKind { system: System::Gps, msm: 4 }));
        assert_eq!(classify(1127), Some(MsmKind { system: System::Cmp, msm: 7 }));
        assert_eq!(classify(1071), None); // MSM1, unsupported
        assert_eq!(classify(1073), None); // MSM3, unsupported
    }

    #[test]
    fn scenario_d_msm7_two_satellites_one_signal() {
        let header_bits = 36 + 12 + 30 + 1 + 3 + 7 + 2 + 2 + 1 + 3 + 64 + 32;
        let cell_mask_bits = 2 * 1; // nsat=2, nsig=1
        let per_sat_bits = 8 + 10 + 4 + 14; // MSM7 extended info + rough rate
        let cell_bits = 20 + 24 + 10 + 1 + 10 + 15; // MSM7 fine widths
        let total = header_bits + cell_mask_bits + per_sat_bits * 2 + cell_bits;
        let mut buf = vec![0u8; total.div_ceil(8)];
        set_unsigned(&mut buf, 24, 12, 1077); // GPS MSM7

        let mut pos = 36;
        set_unsigned(&mut buf, pos, 12, 5); // station id
        pos += 12;
        set_unsigned(&mut buf, pos, 30, 0); // TOW ms
        pos += 30 + 1 + 3 + 7 + 2 + 2 + 1 + 3;

        // satellite mask: PRN 3 and PRN 15 -> bit positions 3 and 15 (1-based)
        set_unsigned(&mut buf, pos + 2, 1, 1);
        set_unsigned(&mut buf, pos + 14, 1, 1);
        pos += 64;
        // signal mask: signal id 2 ("1C") -> bit position 2
        set_unsigned(&mut buf, pos + 1, 1, 1);
        pos += 32;
        // cell mask: both cells present
        set_unsigned(&mut buf, pos, 1, 1);
        set_unsigned(&mut buf, pos + 1, 1, 1);
        pos += cell_mask_bits;

        // satellite 1 (PRN 3): rng=20ms, ext info irrelevant for GPS, frac=512
        set_unsigned(&mut buf, pos, 8, 20);
        pos += 8;
        set_unsigned(&mut buf, pos, 4, 0); // ext info (unused, GPS)
        pos += 4;
        set_unsigned(&mut buf, pos, 10, 512);
        pos += 10;
        set_signed(&mut buf, pos, 14, -8192); // rough rate absent
        pos += 14;

        // satellite 2 (PRN 15): rng=22ms, rng_m=0 -> integer present, frac ignored since r!=0 still
        set_unsigned(&mut buf, pos, 8, 22);
        pos += 8;
        set_unsigned(&mut buf, pos, 4, 0);
        pos += 4;
        set_unsigned(&mut buf, pos, 10, 0);
        pos += 10;
        set_signed(&mut buf, pos, 14, -8192);
        pos += 14;

        // cell for (sat0, sig0): pr_fine, cp_fine, lock, half, cnr, rate_fine
        set_signed(&mut buf, pos, 20, 1000);
        pos += 20;
        set_signed(&mut buf, pos, 24, -8388608); // phase absent
        pos += 24;
        set_unsigned(&mut buf, pos, 10, 5);
        pos += 10;
        set_unsigned(&mut buf, pos, 1, 0);
        pos += 1;
        set_unsigned(&mut buf, pos, 10, 100);
        pos += 10;
        set_signed(&mut buf, pos, 15, -16384); // rate absent
        pos += 15;

        // cell for (sat1, sig0)
        set_signed(&mut buf, pos, 20, 0);
        pos += 20;
        set_signed(&mut buf, pos, 24, -8388608);
        pos += 24;
        set_unsigned(&mut buf, pos, 10, 5);
        pos += 10;
        set_unsigned(&mut buf, pos, 1, 0);
        pos += 1;
        set_unsigned(&mut buf, pos, 10, 100);
        pos += 10;
        set_signed(&mut buf, pos, 15, -16384);

        let reference = GpsTime::new(2100, 0.0).unwrap();
        let mut epoch = ObsEpoch::new();
        let mut continuation = ContinuationTable::new();
        let opt = Options::parse("");

        let outcome =
            decode(&buf, 1077, &reference, &mut epoch, &mut continuation, &opt).unwrap();
        assert_eq!(outcome, DecodeOutcome::Observation);
        assert_eq!(epoch.data.len(), 2);

        let sat3 = sat_of(System::Gps, 3);
        let entry = epoch.data.iter().find(|d| d.sat == sat3).unwrap();
        let expected =
            (20.0 + 512.0 * 2f64.powi(-10)) * RANGE_MS + 1000.0 * 2f64.powi(-29) * RANGE_MS;
        assert!((entry.pseudorange[0].unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn scenario_f_code_priority_assigns_extended_slot() {
        // Two GPS L1 signals (1C, 1W) sharing satellite PRN 3's data. Per
        // codepris "CPYWMNSL", C=14 outranks W=11, so 1C keeps the main slot
        // and 1W falls through to an extended slot.
        let codes = vec![Code::L1C, Code::L1W];
        let opt = Options::parse("");
        assert!(code_priority(System::Gps, codes[0], &opt) > code_priority(System::Gps, codes[1], &opt));
    }

    #[test]
    fn station_mismatch_mid_batch_drops_frame() {
        let header_bits = 36 + 12 + 30 + 1 + 3 + 7 + 2 + 2 + 1 + 3 + 64 + 32;
        let mut buf = vec![0u8; header_bits.div_ceil(8)];
        set_unsigned(&mut buf, 24, 12, 1077); // GPS MSM7
        set_unsigned(&mut buf, 36, 12, 5); // station id

        let reference = GpsTime::new(2100, 0.0).unwrap();
        let mut epoch = ObsEpoch::new();
        epoch.station_id = Some(9);
        let mut continuation = ContinuationTable::new();
        let opt = Options::parse("");

        let err =
            decode(&buf, 1077, &reference, &mut epoch, &mut continuation, &opt).unwrap_err();
        assert_eq!(err, FrameError::StationMismatch);
        assert_eq!(epoch.station_id, None);
    }
}
