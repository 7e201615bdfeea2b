// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! State-space representation (SSR) correction decoders, spec §4.J.
//!
//! Six subkinds (orbit, clock, code-bias, combined orbit+clock, URA, and
//! high-rate clock) share two header shapes and a per-constellation
//! satellite field layout. Each subkind stamps its own epoch time, update
//! interval, and issue-of-data independently, so the table below tracks them
//! as six independent per-satellite slots rather than one merged record.

use crate::bits::{get_signed, get_unsigned};
use crate::code::Code;
use crate::error::{DecodeOutcome, FrameError};
use crate::satellite::{System, sat_of};
use crate::time::{rollover, GpsTime};
use std::collections::HashMap;

/// Update-interval index (4 bits) to seconds, spec §4.J.
const UPDATE_INTERVALS: [f64; 16] = [
    1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 240.0, 300.0, 600.0, 900.0, 1800.0, 3600.0,
    7200.0, 10800.0,
];

/// Which correction a frame carries (SSR1 through SSR6, spec §4.J).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Orbit,
    Clock,
    CodeBias,
    Combined,
    Ura,
    HighRateClock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SsrKind {
    system: System,
    kind: Kind,
}

/// Each constellation occupies a contiguous run of six message types in the
/// order orbit/clock/code-bias/combined/URA/high-rate-clock.
fn classify(msg_type: u16) -> Option<SsrKind> {
    let (system, base) = match msg_type {
        1057..=1062 => (System::Gps, 1057),
        1063..=1068 => (System::Glo, 1063),
        1240..=1245 => (System::Gal, 1240),
        1246..=1251 => (System::Qzs, 1246),
        1252..=1257 => (System::Sbs, 1252),
        1258..=1263 => (System::Cmp, 1258),
        _ => return None,
    };
    let kind = match msg_type - base {
        0 => Kind::Orbit,
        1 => Kind::Clock,
        2 => Kind::CodeBias,
        3 => Kind::Combined,
        4 => Kind::Ura,
        5 => Kind::HighRateClock,
        _ => unreachable!("msg_type - base is always 0..=5 for a matched range"),
    };
    Some(SsrKind { system, kind })
}

/// Per-constellation per-satellite field widths and PRN offset, spec §4.J.
struct SatFields {
    prn_bits: u32,
    iode_bits: u32,
    iodcrc_bits: u32,
    prn_offset: u16,
    nsat_bits: u32,
}

fn sat_fields(system: System) -> SatFields {
    match system {
        System::Gps => SatFields { prn_bits: 6, iode_bits: 8, iodcrc_bits: 0, prn_offset: 0, nsat_bits: 6 },
        System::Glo => SatFields { prn_bits: 5, iode_bits: 8, iodcrc_bits: 0, prn_offset: 0, nsat_bits: 6 },
        System::Gal => SatFields { prn_bits: 6, iode_bits: 10, iodcrc_bits: 0, prn_offset: 0, nsat_bits: 6 },
        // QZSS's satellite count is broadcast in 4 bits, not 6, spec §4.J.
        System::Qzs => SatFields { prn_bits: 4, iode_bits: 8, iodcrc_bits: 0, prn_offset: 192, nsat_bits: 4 },
        System::Cmp => SatFields { prn_bits: 6, iode_bits: 10, iodcrc_bits: 24, prn_offset: 1, nsat_bits: 6 },
        System::Sbs => SatFields { prn_bits: 6, iode_bits: 9, iodcrc_bits: 24, prn_offset: 120, nsat_bits: 6 },
        System::Leo => unreachable!("classify() never yields System::Leo"),
    }
}

struct Header {
    t0: GpsTime,
    udi: f64,
    sync: bool,
    iod: u8,
    nsat: usize,
}

/// Parse the shared `ssr1_head`/`ssr2_head` prefix (spec §4.J); `has_refd`
/// selects the extra satellite-reference-datum bit carried by orbit and
/// combined messages only.
fn decode_header(
    buf: &[u8],
    pos: &mut usize,
    system: System,
    reference: &GpsTime,
    has_refd: bool,
    nsat_bits: u32,
) -> Header {
    let t0 = if system == System::Glo {
        let tod = get_unsigned(buf, *pos, 17);
        *pos += 17;
        rollover::reconstruct_glo_time(f64::from(tod), reference)
    } else {
        let tow = get_unsigned(buf, *pos, 20);
        *pos += 20;
        let adjusted = rollover::adjust_gps_tow(f64::from(tow), reference.tow());
        GpsTime::new_unchecked(reference.wn(), adjusted)
    };
    let udi_idx = (get_unsigned(buf, *pos, 4) as usize).min(UPDATE_INTERVALS.len() - 1);
    *pos += 4;
    let udi = UPDATE_INTERVALS[udi_idx];
    let sync = get_unsigned(buf, *pos, 1) != 0;
    *pos += 1;
    if has_refd {
        *pos += 1; // satellite reference datum, not separately modeled
    }
    let iod = get_unsigned(buf, *pos, 4) as u8;
    *pos += 4;
    *pos += 16; // SSR provider id, not separately modeled
    *pos += 4; // SSR solution id, not separately modeled
    let nsat = get_unsigned(buf, *pos, nsat_bits) as usize;
    *pos += nsat_bits as usize;
    Header { t0, udi, sync, iod, nsat }
}

/// Orbit correction, spec §4.J SSR1. Rates are metres/second.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCorr {
    pub iode: u16,
    pub iodcrc: u32,
    pub deph: [f64; 3],
    pub ddeph: [f64; 3],
    pub t0: GpsTime,
    pub udi: f64,
    pub iod: u8,
}

fn read_orbit(buf: &[u8], pos: &mut usize) -> ([f64; 3], [f64; 3]) {
    let radial = get_signed(buf, *pos, 22) as f64 * 1e-4;
    *pos += 22;
    let along = get_signed(buf, *pos, 20) as f64 * 4e-4;
    *pos += 20;
    let cross = get_signed(buf, *pos, 20) as f64 * 4e-4;
    *pos += 20;
    let dradial = get_signed(buf, *pos, 21) as f64 * 1e-6;
    *pos += 21;
    let dalong = get_signed(buf, *pos, 19) as f64 * 4e-6;
    *pos += 19;
    let dcross = get_signed(buf, *pos, 19) as f64 * 4e-6;
    *pos += 19;
    ([radial, along, cross], [dradial, dalong, dcross])
}

const ORBIT_FIELD_BITS: usize = 22 + 20 + 20 + 21 + 19 + 19;

/// Clock correction, spec §4.J SSR2. `c0` metres, `c1` m/s, `c2` m/s².
#[derive(Debug, Clone, Copy)]
pub struct ClockCorr {
    pub dclk: [f64; 3],
    pub t0: GpsTime,
    pub udi: f64,
    pub iod: u8,
}

fn read_clock(buf: &[u8], pos: &mut usize) -> [f64; 3] {
    let c0 = get_signed(buf, *pos, 22) as f64 * 1e-4;
    *pos += 22;
    let c1 = get_signed(buf, *pos, 21) as f64 * 1e-6;
    *pos += 21;
    let c2 = get_signed(buf, *pos, 27) as f64 * 2e-8;
    *pos += 27;
    [c0, c1, c2]
}

const CLOCK_FIELD_BITS: usize = 22 + 21 + 27;

/// Code bias, spec §4.J SSR3. Values are metres.
#[derive(Debug, Clone)]
pub struct CodeBiasCorr {
    pub biases: Vec<(Code, f64)>,
    pub t0: GpsTime,
    pub udi: f64,
    pub iod: u8,
}

/// Tracking-mode id to observation code, per constellation (spec §4.J names
/// these `codes_gps`, `codes_glo`, ... in the source). Ids with no matching
/// code in [`Code`] map to `None` and are skipped with a warning rather than
/// failing the frame.
fn code_bias_table(system: System, mode: u32) -> Option<Code> {
    let table: &[Code] = match system {
        System::Gps => &[
            Code::L1C, Code::L1P, Code::L1W, Code::L1S, Code::L1L, Code::L1X, Code::L1X,
            Code::L1X, Code::L2C, Code::L2D, Code::L2S, Code::L2L, Code::L2X, Code::L2X,
            Code::L2X, Code::L2P, Code::L2W, Code::L2W, Code::L2W, Code::None, Code::None,
            Code::L5I, Code::L5Q, Code::L5X,
        ],
        System::Glo => &[Code::L1C, Code::L1P, Code::L2C, Code::L2P],
        System::Gal => &[
            Code::L1A, Code::L1B, Code::L1C, Code::L1X, Code::L1Z, Code::L7I, Code::L7Q,
            Code::L7X, Code::L8I, Code::L8Q, Code::L8X, Code::L6A, Code::L6B, Code::L6C,
            Code::L6X, Code::L6Z, Code::L5I, Code::L5Q, Code::L5X,
        ],
        System::Qzs => &[
            Code::L1C, Code::L1S, Code::L1L, Code::L2S, Code::L2L, Code::L2X, Code::L5I,
            Code::L5Q, Code::L5X, Code::L6S, Code::L6L, Code::L6X, Code::L1X, Code::L1Z,
        ],
        System::Cmp => &[
            Code::L2I, Code::L2Q, Code::L2X, Code::L6I, Code::L6Q, Code::L6X, Code::L7I,
            Code::L7Q, Code::L7X,
        ],
        System::Sbs => &[Code::L1C, Code::L5I, Code::L5Q, Code::L5X],
        System::Leo => &[],
    };
    table.get(mode as usize).copied().filter(|&c| c != Code::None)
}

/// URA class, spec §4.J SSR5.
#[derive(Debug, Clone, Copy)]
pub struct UraCorr {
    pub ura: u8,
    pub t0: GpsTime,
    pub udi: f64,
    pub iod: u8,
}

/// High-rate clock correction, spec §4.J SSR6. Metres.
#[derive(Debug, Clone, Copy)]
pub struct HighRateClockCorr {
    pub hrclk: f64,
    pub t0: GpsTime,
    pub udi: f64,
    pub iod: u8,
}

/// Everything the control record holds for one satellite's SSR corrections.
/// Each field is independently `None` until its subkind has been decoded at
/// least once.
#[derive(Debug, Clone, Default)]
pub struct SsrEntry {
    pub orbit: Option<OrbitCorr>,
    pub clock: Option<ClockCorr>,
    pub code_bias: Option<CodeBiasCorr>,
    pub ura: Option<UraCorr>,
    pub high_rate_clock: Option<HighRateClockCorr>,
}

/// The SSR table: one [`SsrEntry`] per opaque satellite index (spec §3).
#[derive(Debug, Clone, Default)]
pub struct SsrTable {
    entries: HashMap<u16, SsrEntry>,
}

impl SsrTable {
    pub fn new() -> Self {
        SsrTable::default()
    }

    pub fn entry(&self, sat: u16) -> Option<&SsrEntry> {
        self.entries.get(&sat)
    }

    fn entry_mut(&mut self, sat: u16) -> &mut SsrEntry {
        self.entries.entry(sat).or_default()
    }
}

/// Decode one SSR frame (any of the six subkinds, any constellation) into
/// `table`. Returns [`DecodeOutcome::Ssr`] when `sync` is clear (the batch is
/// complete) and [`DecodeOutcome::NoUpdate`] when more frames are expected,
/// per spec §4.J's batch protocol.
pub fn decode(
    buf: &[u8],
    msg_type: u16,
    reference: &GpsTime,
    table: &mut SsrTable,
) -> Result<DecodeOutcome, FrameError> {
    let ssr_kind = classify(msg_type).ok_or(FrameError::UnknownType)?;
    let fields = sat_fields(ssr_kind.system);
    let has_refd = matches!(ssr_kind.kind, Kind::Orbit | Kind::Combined);
    let carries_iode = matches!(ssr_kind.kind, Kind::Orbit | Kind::Combined);

    let epoch_bits = if ssr_kind.system == System::Glo { 17 } else { 20 };
    let header_bits = epoch_bits + 4 + 1 + usize::from(has_refd) + 4 + 16 + 4 + fields.nsat_bits as usize;
    if buf.len() * 8 < 36 + header_bits {
        return Err(FrameError::FramingShort);
    }
    let mut pos = 36;
    let header = decode_header(buf, &mut pos, ssr_kind.system, reference, has_refd, fields.nsat_bits);

    for _ in 0..header.nsat {
        let fixed_bits = fields.prn_bits as usize
            + if carries_iode { fields.iode_bits as usize + fields.iodcrc_bits as usize } else { 0 };
        if buf.len() * 8 < pos + fixed_bits {
            return Err(FrameError::FramingShort);
        }
        let prn_field = get_unsigned(buf, pos, fields.prn_bits) as u16;
        pos += fields.prn_bits as usize;
        let sat = sat_of(ssr_kind.system, prn_field + fields.prn_offset);

        let (iode, iodcrc) = if carries_iode {
            let iode = get_unsigned(buf, pos, fields.iode_bits) as u16;
            pos += fields.iode_bits as usize;
            let iodcrc = if fields.iodcrc_bits > 0 {
                let v = get_unsigned(buf, pos, fields.iodcrc_bits);
                pos += fields.iodcrc_bits as usize;
                v
            } else {
                0
            };
            (iode, iodcrc)
        } else {
            (0, 0)
        };

        match ssr_kind.kind {
            Kind::Orbit => {
                if buf.len() * 8 < pos + ORBIT_FIELD_BITS {
                    return Err(FrameError::FramingShort);
                }
                let (deph, ddeph) = read_orbit(buf, &mut pos);
                if sat != 0 {
                    table.entry_mut(sat).orbit = Some(OrbitCorr {
                        iode,
                        iodcrc,
                        deph,
                        ddeph,
                        t0: header.t0,
                        udi: header.udi,
                        iod: header.iod,
                    });
                }
            }
            Kind::Clock => {
                if buf.len() * 8 < pos + CLOCK_FIELD_BITS {
                    return Err(FrameError::FramingShort);
                }
                let dclk = read_clock(buf, &mut pos);
                if sat != 0 {
                    table.entry_mut(sat).clock = Some(ClockCorr {
                        dclk,
                        t0: header.t0,
                        udi: header.udi,
                        iod: header.iod,
                    });
                }
            }
            Kind::CodeBias => {
                if buf.len() * 8 < pos + 5 {
                    return Err(FrameError::FramingShort);
                }
                let nbias = get_unsigned(buf, pos, 5) as usize;
                pos += 5;
                let mut biases = Vec::with_capacity(nbias);
                for _ in 0..nbias {
                    if buf.len() * 8 < pos + 5 + 14 {
                        return Err(FrameError::FramingShort);
                    }
                    let mode = get_unsigned(buf, pos, 5);
                    pos += 5;
                    let value = get_signed(buf, pos, 14) as f64 * 0.01;
                    pos += 14;
                    match code_bias_table(ssr_kind.system, mode) {
                        Some(code) => biases.push((code, value)),
                        None => log::warn!(
                            "SSR code bias: unmapped tracking-mode id {} for {:?}",
                            mode,
                            ssr_kind.system
                        ),
                    }
                }
                if sat != 0 {
                    table.entry_mut(sat).code_bias = Some(CodeBiasCorr {
                        biases,
                        t0: header.t0,
                        udi: header.udi,
                        iod: header.iod,
                    });
                }
            }
            Kind::Combined => {
                if buf.len() * 8 < pos + ORBIT_FIELD_BITS + CLOCK_FIELD_BITS {
                    return Err(FrameError::FramingShort);
                }
                let (deph, ddeph) = read_orbit(buf, &mut pos);
                let dclk = read_clock(buf, &mut pos);
                if sat != 0 {
                    let entry = table.entry_mut(sat);
                    entry.orbit = Some(OrbitCorr {
                        iode,
                        iodcrc,
                        deph,
                        ddeph,
                        t0: header.t0,
                        udi: header.udi,
                        iod: header.iod,
                    });
                    entry.clock = Some(ClockCorr {
                        dclk,
                        t0: header.t0,
                        udi: header.udi,
                        iod: header.iod,
                    });
                }
            }
            Kind::Ura => {
                if buf.len() * 8 < pos + 6 {
                    return Err(FrameError::FramingShort);
                }
                let ura = get_unsigned(buf, pos, 6) as u8;
                pos += 6;
                if sat != 0 {
                    table.entry_mut(sat).ura = Some(UraCorr {
                        ura,
                        t0: header.t0,
                        udi: header.udi,
                        iod: header.iod,
                    });
                }
            }
            Kind::HighRateClock => {
                if buf.len() * 8 < pos + 22 {
                    return Err(FrameError::FramingShort);
                }
                let hrclk = get_signed(buf, pos, 22) as f64 * 1e-4;
                pos += 22;
                if sat != 0 {
                    table.entry_mut(sat).high_rate_clock = Some(HighRateClockCorr {
                        hrclk,
                        t0: header.t0,
                        udi: header.udi,
                        iod: header.iod,
                    });
                }
            }
        }
    }

    if header.sync {
        Ok(DecodeOutcome::NoUpdate)
    } else {
        Ok(DecodeOutcome::Ssr)
    }
}
