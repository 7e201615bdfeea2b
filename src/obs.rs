// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! The sliding observation epoch and per-(satellite, frequency)
//! continuation state (spec §3, §4.L).

use crate::code::Code;
use crate::time::GpsTime;
use std::collections::HashMap;

/// Number of "main" frequency slots, selected by code priority.
pub const NFREQ: usize = 3;
/// Number of "extended" frequency slots, filled in first-seen order once
/// the main slots are assigned.
pub const NEXOBS: usize = 3;
/// Total per-satellite frequency slots.
pub const NFREQ_TOTAL: usize = NFREQ + NEXOBS;
/// Maximum number of satellites held in one observation epoch.
pub const MAXOBS: usize = 64;

/// One satellite's observations for the current epoch, one entry per
/// frequency slot.
#[derive(Debug, Clone)]
pub struct ObsData {
    pub sat: u16,
    pub pseudorange: [Option<f64>; NFREQ_TOTAL],
    pub carrier_phase: [Option<f64>; NFREQ_TOTAL],
    pub doppler: [Option<f64>; NFREQ_TOTAL],
    pub snr: [u8; NFREQ_TOTAL],
    pub lli: [u8; NFREQ_TOTAL],
    pub code: [Code; NFREQ_TOTAL],
}

impl ObsData {
    fn new(sat: u16) -> Self {
        ObsData {
            sat,
            pseudorange: [None; NFREQ_TOTAL],
            carrier_phase: [None; NFREQ_TOTAL],
            doppler: [None; NFREQ_TOTAL],
            snr: [0; NFREQ_TOTAL],
            lli: [0; NFREQ_TOTAL],
            code: [Code::None; NFREQ_TOTAL],
        }
    }
}

/// The sliding, one-epoch observation buffer.
#[derive(Debug, Clone, Default)]
pub struct ObsEpoch {
    pub time: Option<GpsTime>,
    /// `true` while the current batch has not yet been terminated by a
    /// frame with `sync = 0`.
    pub sync: bool,
    /// Station ID observed so far in this (non-terminated) batch.
    pub station_id: Option<u16>,
    pub data: Vec<ObsData>,
}

impl ObsEpoch {
    pub fn new() -> Self {
        ObsEpoch::default()
    }

    /// Clear the buffer, as happens when a new epoch is detected (spec §3
    /// invariant: time differs from the buffered epoch by more than 1 ns,
    /// or the previous `sync` flag was clear).
    pub fn clear(&mut self) {
        self.data.clear();
        self.station_id = None;
    }

    /// Whether `time` represents a different epoch than the one currently
    /// buffered (more than 1 ns apart), or there is no buffered epoch yet.
    pub fn is_new_epoch(&self, time: &GpsTime) -> bool {
        match &self.time {
            None => true,
            Some(buffered) => buffered.diff(time).abs() > 1e-9,
        }
    }

    /// Find the existing entry for `sat`, or allocate a new one. Returns
    /// `None` if the epoch is already full (`MAXOBS` reached).
    pub fn obsindex(&mut self, sat: u16) -> Option<usize> {
        if let Some(index) = self.data.iter().position(|d| d.sat == sat) {
            return Some(index);
        }
        if self.data.len() >= MAXOBS {
            return None;
        }
        self.data.push(ObsData::new(sat));
        Some(self.data.len() - 1)
    }
}

/// Per-(satellite, frequency) carrier-phase continuation and lock-time
/// state, used for §4.L's `adjcp`/`lossoflock` rollover reconstruction.
#[derive(Debug, Clone, Copy, Default)]
struct ContinuationEntry {
    prev_cp: Option<f64>,
    prev_lock: Option<u16>,
}

/// Holds the continuation state across epochs, for every `(sat, freq)` pair
/// seen so far.
#[derive(Debug, Clone, Default)]
pub struct ContinuationTable {
    entries: HashMap<(u16, u8), ContinuationEntry>,
}

impl ContinuationTable {
    pub fn new() -> Self {
        ContinuationTable::default()
    }

    /// Reconcile a relative legacy carrier-phase value (modulo 1500 cycles)
    /// against the last value stored for `(sat, freq)`.
    pub fn adjcp(&mut self, sat: u16, freq: u8, cp: f64) -> f64 {
        let entry = self.entries.entry((sat, freq)).or_default();
        let adjusted = match entry.prev_cp {
            None => cp,
            Some(prev) => {
                if cp < prev - 750.0 {
                    cp + 1500.0
                } else if cp > prev + 750.0 {
                    cp - 1500.0
                } else {
                    cp
                }
            }
        };
        entry.prev_cp = Some(adjusted);
        adjusted
    }

    /// Loss-of-lock detection: returns 1 (bit 0 of the LLI set) iff the lock
    /// counter didn't advance (both zero, or the new value is lower than
    /// the previous one), else 0. Always records `lock` for next time.
    pub fn lossoflock(&mut self, sat: u16, freq: u8, lock: u16) -> u8 {
        let entry = self.entries.entry((sat, freq)).or_default();
        let lost = match entry.prev_lock {
            Some(prev) => (lock == 0 && prev == 0) || lock < prev,
            None => false,
        };
        entry.prev_lock = Some(lock);
        if lost {
            1
        } else {
            0
        }
    }
}

/// `snratio(snr)`: scale a dB-Hz carrier-to-noise ratio into the 0..255
/// integer range the observation record stores, clipping out-of-range
/// values instead of wrapping.
pub fn snratio(snr: f64) -> u8 {
    let scaled = (snr * 4.0).round();
    if scaled < 0.0 {
        0
    } else if scaled > 255.0 {
        255
    } else {
        scaled as u8
    }
}
