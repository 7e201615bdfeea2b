// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Week and time-of-week/day rollover disambiguation (spec §4.C).
//!
//! RTCM3 broadcasts several time fields modulo a shorter period than the
//! full time scale: GPS/Galileo/BeiDou week numbers arrive modulo 1024, and
//! legacy observation messages carry a time-of-week/day that can wrap
//! without warning relative to the previously buffered epoch. Both need an
//! external anchor to resolve unambiguously; this module supplies the
//! arithmetic, callers supply the anchor (either the previous epoch or a
//! [`Clock`](crate::time::clock::Clock)).

use crate::time::{consts, GpsTime, UtcTime};
use std::time::Duration;

/// Resolve a week number broadcast modulo 1024 (GPS, Galileo, and BeiDou all
/// share this rollover period) against the current full week number.
///
/// This is the same adjustment spec §4.C gives for BeiDou specifically; it
/// applies identically to GPS and Galileo week fields that arrive
/// pre-reduced modulo 1024.
pub fn resolve_week_mod_1024(week_mod: i16, current_full_week: i16) -> i16 {
    week_mod + ((current_full_week - week_mod + 512) / 1024) * 1024
}

/// GPS time-of-week adjustment: nudge `tow` by a whole week if it differs
/// from the previously buffered time-of-week by more than half a week, so
/// that the reconstructed epoch is always the value nearest `tow_prev`.
pub fn adjust_gps_tow(tow: f64, tow_prev: f64) -> f64 {
    let week_secs = f64::from(consts::WEEK_SECS);
    if tow < tow_prev - week_secs / 2.0 {
        tow + week_secs
    } else if tow > tow_prev + week_secs / 2.0 {
        tow - week_secs
    } else {
        tow
    }
}

/// GLONASS time-of-day adjustment. GLONASS broadcasts time-of-day in the
/// Moscow-time day, so both the new value and the previous buffered epoch
/// are shifted by the 3-hour Moscow offset before the half-day rollover
/// test, then shifted back.
pub fn adjust_glo_tod(tod_secs: f64, prev_epoch: &GpsTime) -> f64 {
    const MOSCOW_OFFSET_SECS: f64 = 3.0 * 3600.0;
    let day_secs = f64::from(consts::DAY_SECS);
    let tod_prev = (prev_epoch.tow() + MOSCOW_OFFSET_SECS).rem_euclid(day_secs);
    let mut adjusted = tod_secs;
    if adjusted < tod_prev - day_secs / 2.0 {
        adjusted += day_secs;
    } else if adjusted > tod_prev + day_secs / 2.0 {
        adjusted -= day_secs;
    }
    adjusted
}

/// Reconstruct an absolute epoch from a GLONASS time-of-day field (legacy
/// observations and MSM both carry one): resolve the half-day rollover
/// against `reference` via [`adjust_glo_tod`], then re-anchor it to
/// `reference`'s UTC calendar day in the Moscow-time frame the field is
/// broadcast in.
pub fn reconstruct_glo_time(tod_secs: f64, reference: &GpsTime) -> GpsTime {
    const MOSCOW_OFFSET_SECS: f64 = 3.0 * 3600.0;
    let adjusted_tod = adjust_glo_tod(tod_secs, reference);
    let moscow_ref = *reference + Duration::from_secs_f64(MOSCOW_OFFSET_SECS);
    let utc_ref = moscow_ref.to_utc_hardcoded();
    let day_start = UtcTime::from_parts(
        utc_ref.year(),
        utc_ref.month(),
        utc_ref.day_of_month(),
        0,
        0,
        0.0,
    )
    .to_gps_hardcoded();
    (day_start + Duration::from_secs_f64(adjusted_tod)) - Duration::from_secs_f64(MOSCOW_OFFSET_SECS)
}
