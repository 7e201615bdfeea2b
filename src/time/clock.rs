// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! An injectable source of "now", used only to anchor GPS/GAL/BDS week
//! rollover disambiguation (spec §4.C, §5).
//!
//! The core never reads the OS clock directly; every call site takes a
//! `&dyn Clock` so tests can replay fixed wall-clock times deterministically.

use crate::time::{consts, GpsTime};
use std::time::{SystemTime, UNIX_EPOCH};

/// A minimum plausible GPS week to fall back on when the host has no usable
/// clock yet. Chosen the way the source does: a week number recent enough
/// that the half-week/1024-week rollover math still lands in the right
/// neighborhood, not an actual time reference.
pub const FALLBACK_GPS_WEEK: i16 = 1560;

/// Minimum plausible BeiDou week for the same fallback purpose.
pub const FALLBACK_BDS_WEEK: i16 = 1;

/// Source of the current time, in the GPS time scale, used to anchor week
/// rollover disambiguation.
pub trait Clock: std::fmt::Debug {
    /// The current time, approximately, as a GPS time. Does not need to be
    /// exact to the second: only the week number is used by the rollover
    /// logic in [`crate::time::rollover`].
    fn now_gps(&self) -> GpsTime;
}

/// Reads the host's wall clock. Treats the host clock as UTC-close-enough to
/// GPS time for week-anchoring purposes: the few leap seconds of difference
/// never change which week we land in.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_gps(&self) -> GpsTime {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => unix_to_gps(since_epoch.as_secs_f64()),
            Err(_) => GpsTime::new_unchecked(FALLBACK_GPS_WEEK, 0.0),
        }
    }
}

fn unix_to_gps(unix_secs: f64) -> GpsTime {
    let elapsed = unix_secs - consts::GPS_EPOCH as f64;
    if elapsed < 0.0 {
        return GpsTime::new_unchecked(FALLBACK_GPS_WEEK, 0.0);
    }
    let week_secs = f64::from(consts::WEEK_SECS);
    let wn = (elapsed / week_secs).floor();
    let tow = elapsed - wn * week_secs;
    GpsTime::new_unchecked(wn as i16, tow)
}

/// A fixed point in time, for deterministic tests of rollover logic and of
/// `-RT_INP` behavior.
#[derive(Debug, Clone, Copy)]
pub struct FrozenClock(GpsTime);

impl FrozenClock {
    pub fn new(time: GpsTime) -> Self {
        FrozenClock(time)
    }
}

impl Clock for FrozenClock {
    fn now_gps(&self) -> GpsTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_clock_returns_fixed_time() {
        let t = GpsTime::new_unchecked(2100, 12345.0);
        let clock = FrozenClock::new(t);
        assert_eq!(clock.now_gps().wn(), 2100);
    }

    #[test]
    fn system_clock_lands_after_fallback_week() {
        // Sanity check only: today is long after GPS week 1560.
        let clock = SystemClock;
        assert!(clock.now_gps().wn() >= FALLBACK_GPS_WEEK);
    }
}
