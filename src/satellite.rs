// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Satellite system and opaque satellite-index registry.
//!
//! Observation and navigation records are addressed by an opaque `u16`
//! satellite index rather than by `(system, PRN)` directly, so the control
//! record can use dense arrays instead of per-system maps. Indices are
//! assigned contiguously in [`System::ALL`] order, 1-based; index 0 means
//! "invalid satellite".

use strum::{AsRefStr, EnumIter};

/// A GNSS constellation, plus the two pseudo-constellations RTCM3 carries
/// in the same PRN-keyed tables: low-earth-orbit satellites and SBAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[repr(u8)]
pub enum System {
    Gps,
    Glo,
    Gal,
    Qzs,
    Cmp,
    Leo,
    Sbs,
}

impl System {
    /// All systems, in the order the opaque satellite index space assigns
    /// them blocks.
    pub const ALL: [System; 7] = [
        System::Gps,
        System::Glo,
        System::Gal,
        System::Qzs,
        System::Cmp,
        System::Leo,
        System::Sbs,
    ];

    /// Inclusive PRN range `[min, max]` for this system.
    pub const fn prn_range(self) -> (u16, u16) {
        match self {
            System::Gps => (1, 32),
            System::Glo => (1, 27),
            System::Gal => (1, 36),
            System::Qzs => (193, 202),
            System::Cmp => (1, 63),
            System::Leo => (1, 10),
            System::Sbs => (120, 158),
        }
    }

    /// Number of satellite-index slots this system occupies, `N_sys`.
    pub const fn sat_count(self) -> u16 {
        let (min, max) = self.prn_range();
        max - min + 1
    }

    /// First satellite index (1-based) this system's block starts at.
    fn index_base(self) -> u16 {
        let mut base = 1u16;
        for sys in System::ALL {
            if sys == self {
                return base;
            }
            base += sys.sat_count();
        }
        unreachable!("System::ALL must contain every variant")
    }

    /// Total number of satellite-index slots across all systems.
    pub fn total_sat_count() -> u16 {
        System::ALL.iter().map(|s| s.sat_count()).sum()
    }
}

/// Map `(system, PRN)` to an opaque satellite index. Returns 0 ("invalid")
/// if `prn` is outside `system`'s range.
pub fn sat_of(system: System, prn: u16) -> u16 {
    let (min, max) = system.prn_range();
    if prn < min || prn > max {
        return 0;
    }
    system.index_base() + (prn - min)
}

/// Inverse of [`sat_of`]: map an opaque satellite index back to
/// `(system, PRN)`. Returns `None` for index 0 or an index past the end of
/// the assigned space.
pub fn sys_prn_of(sat: u16) -> Option<(System, u16)> {
    if sat == 0 {
        return None;
    }
    let mut base = 1u16;
    for sys in System::ALL {
        let count = sys.sat_count();
        if sat >= base && sat < base + count {
            let (min, _max) = sys.prn_range();
            return Some((sys, min + (sat - base)));
        }
        base += count;
    }
    None
}

/// A GPS/GLONASS legacy-message PRN of 40 or above denotes an SBAS
/// satellite reported in the GPS/GLO PRN slot; the actual SBAS PRN is the
/// field value shifted by +80 (spec §4.G).
pub const SBAS_PRN_SHIFT: u16 = 80;

/// Resolve a raw PRN field from a GPS/GLONASS legacy observation block,
/// applying the SBAS reinterpretation when the field is >= 40.
pub fn sat_of_gps_glo_field(base_system: System, raw_prn: u16) -> u16 {
    if raw_prn >= 40 {
        sat_of(System::Sbs, raw_prn + SBAS_PRN_SHIFT)
    } else {
        sat_of(base_system, raw_prn)
    }
}
