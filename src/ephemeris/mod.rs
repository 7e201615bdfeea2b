// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Broadcast ephemeris decoders and storage (spec §4.I).
//!
//! Every constellation but GLONASS shares one Keplerian [`Ephemeris`] record
//! shape; GLONASS broadcasts a position/velocity/acceleration state vector
//! instead and is kept in its own [`GloEphemeris`] record, indexed by slot
//! number rather than satellite index.

pub mod bds;
pub mod gal;
pub mod glo;
pub mod gps;
pub mod qzs;

use crate::satellite::System;
use crate::time::GpsTime;
use std::collections::HashMap;

/// Keplerian broadcast ephemeris, shared by GPS, QZSS, Galileo, and BeiDou.
///
/// Field names follow the ICD convention (`sqrta`, `m0`, `omg0`, ...) rather
/// than spelling out "square root of semi-major axis" everywhere; this
/// mirrors how the teacher names geodetic quantities in `coords/llh.rs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ephemeris {
    pub sat: u16,
    pub toe: GpsTime,
    pub toc: GpsTime,
    pub iode: i32,
    pub iodc: i32,
    /// URA index (GPS/QZSS), SISA index (Galileo), or the BeiDou/QZSS
    /// accuracy encoding; kept as the raw broadcast value rather than the
    /// decoded metre figure, since downstream consumers want the class.
    pub sva: u8,
    /// Signal health bits; meaning is constellation-specific (spec §4.I).
    pub svh: u32,
    /// Galileo only: 0 = I/NAV (1046), 1 = F/NAV (1045). Unused elsewhere.
    pub code: u8,
    pub sqrta: f64,
    pub e: f64,
    pub i0: f64,
    pub omg0: f64,
    pub omg: f64,
    pub m0: f64,
    pub deln: f64,
    pub omgd: f64,
    pub idot: f64,
    pub cuc: f64,
    pub cus: f64,
    pub crc: f64,
    pub crs: f64,
    pub cic: f64,
    pub cis: f64,
    pub af0: f64,
    pub af1: f64,
    pub af2: f64,
    /// Group delay(s). Galileo carries two (E5a/E1, E5b/E1); everyone else
    /// uses only `tgd[0]`.
    pub tgd: [f64; 2],
}

/// GLONASS broadcast ephemeris: a PZ-90 position/velocity/acceleration
/// state vector plus clock terms, spec §4.I.
#[derive(Debug, Clone, PartialEq)]
pub struct GloEphemeris {
    pub sat: u16,
    /// Frequency slot number (`-7..=13` nominally, though the wire field is
    /// unsigned `1..=31` with an offset; see [`glo::decode`]).
    pub freq_num: i8,
    pub toe: GpsTime,
    /// `tb & 0x7F`, spec §4.I.
    pub iode: u8,
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    pub acc: [f64; 3],
    pub taun: f64,
    pub gamman: f64,
    pub health: u8,
    pub age: u8,
}

/// Whether a newly decoded ephemeris should replace what's already stored,
/// per spec §4.I's write policy: replace when the issue-of-data (or
/// issue-of-data-clock, where the constellation carries one) differs, or,
/// for BeiDou specifically, when `toe` also differs. `-EPHALL` forces
/// unconditional replacement.
pub fn should_replace(
    existing: Option<&Ephemeris>,
    new: &Ephemeris,
    has_iodc: bool,
    is_beidou: bool,
    eph_all: bool,
) -> bool {
    if eph_all {
        return true;
    }
    let Some(old) = existing else {
        return true;
    };
    let iode_changed = old.iode != new.iode;
    let iodc_changed = has_iodc && old.iodc != new.iodc;
    let toe_changed = is_beidou
        && (old.toe.wn() != new.toe.wn() || (old.toe.tow() - new.toe.tow()).abs() > 1e-9);
    iode_changed || iodc_changed || toe_changed
}

/// The navigation table: one Keplerian ephemeris slot per satellite index,
/// plus GLONASS slots keyed by frequency/orbital slot number (spec §3).
#[derive(Debug, Clone, Default)]
pub struct NavTable {
    eph: HashMap<u16, Ephemeris>,
    /// Keyed by slot number (the opaque GLONASS satellite index), not by
    /// frequency channel — two satellites can share a frequency channel
    /// but never a slot.
    glo_eph: HashMap<u16, GloEphemeris>,
}

impl NavTable {
    pub fn new() -> Self {
        NavTable::default()
    }

    pub fn ephemeris(&self, sat: u16) -> Option<&Ephemeris> {
        self.eph.get(&sat)
    }

    pub fn glo_ephemeris(&self, slot: u16) -> Option<&GloEphemeris> {
        self.glo_eph.get(&slot)
    }

    /// Apply the write policy and store `new` if it replaces what's there.
    /// Returns `true` if the table changed.
    pub fn update_ephemeris(&mut self, new: Ephemeris, has_iodc: bool, eph_all: bool) -> bool {
        let is_beidou = crate::satellite::sys_prn_of(new.sat)
            .map(|(sys, _)| sys == System::Cmp)
            .unwrap_or(false);
        let replace = should_replace(self.eph.get(&new.sat), &new, has_iodc, is_beidou, eph_all);
        if replace {
            self.eph.insert(new.sat, new);
        }
        replace
    }

    /// GLONASS has no issue-of-data-clock and no BeiDou-style double check;
    /// it replaces on `iode` change alone (or unconditionally under
    /// `-EPHALL`).
    pub fn update_glo_ephemeris(&mut self, new: GloEphemeris, eph_all: bool) -> bool {
        let replace = eph_all
            || match self.glo_eph.get(&new.sat) {
                None => true,
                Some(old) => old.iode != new.iode,
            };
        if replace {
            self.glo_eph.insert(new.sat, new);
        }
        replace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::satellite::{System, sat_of};

    fn sample(sat: u16, iode: i32, iodc: i32, toe_tow: f64) -> Ephemeris {
        Ephemeris {
            sat,
            toe: GpsTime::new_unchecked(2100, toe_tow),
            toc: GpsTime::new_unchecked(2100, toe_tow),
            iode,
            iodc,
            sva: 0,
            svh: 0,
            code: 0,
            sqrta: 0.0,
            e: 0.0,
            i0: 0.0,
            omg0: 0.0,
            omg: 0.0,
            m0: 0.0,
            deln: 0.0,
            omgd: 0.0,
            idot: 0.0,
            cuc: 0.0,
            cus: 0.0,
            crc: 0.0,
            crs: 0.0,
            cic: 0.0,
            cis: 0.0,
            af0: 0.0,
            af1: 0.0,
            af2: 0.0,
            tgd: [0.0, 0.0],
        }
    }

    #[test]
    fn scenario_c_fresh_then_duplicate() {
        let sat = sat_of(System::Gps, 7);
        let mut table = NavTable::new();
        assert!(table.update_ephemeris(sample(sat, 42, 42, 432_000.0), true, false));
        let stored = table.ephemeris(sat).cloned().unwrap();
        assert!(!table.update_ephemeris(sample(sat, 42, 42, 432_000.0), true, false));
        assert_eq!(table.ephemeris(sat), Some(&stored));
    }

    #[test]
    fn eph_all_forces_replacement() {
        let sat = sat_of(System::Gps, 7);
        let mut table = NavTable::new();
        table.update_ephemeris(sample(sat, 42, 42, 432_000.0), true, false);
        assert!(table.update_ephemeris(sample(sat, 42, 42, 432_000.0), true, true));
    }

    #[test]
    fn beidou_replaces_on_toe_change_even_with_same_iode() {
        let sat = sat_of(System::Cmp, 5);
        let mut table = NavTable::new();
        table.update_ephemeris(sample(sat, 3, 3, 100.0), false, false);
        assert!(table.update_ephemeris(sample(sat, 3, 3, 200.0), false, false));
    }
}
