// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Wire-format constants that must match exactly, not approximate physical
//! constants (spec §6).

/// Speed of light, m/s. Exact, per the RTCM3 ICD.
pub const CLIGHT: f64 = 299_792_458.0;

/// Metres per millisecond of range, used throughout MSM decoding.
pub const RANGE_MS: f64 = CLIGHT * 0.001;

/// Integer-ambiguity unit for legacy GPS/SBAS/QZSS/Galileo/BeiDou RTK
/// messages, metres.
pub const PRUNIT_GPS: f64 = 299_792.458;

/// Integer-ambiguity unit for legacy GLONASS RTK messages, metres.
pub const PRUNIT_GLO: f64 = 599_584.916;

/// GLONASS L1 nominal frequency and channel spacing, Hz.
pub const FREQ1_GLO: f64 = 1.602e9;
pub const DFRQ1_GLO: f64 = 0.5625e6;

/// GLONASS L2 nominal frequency and channel spacing, Hz.
pub const FREQ2_GLO: f64 = 1.246e9;
pub const DFRQ2_GLO: f64 = 0.4375e6;

/// GPS/QZSS/Galileo/BeiDou/SBAS nominal carrier frequencies, Hz, indexed by
/// the frequency-band id from [`crate::code::Band`] (`1..=7`).
pub fn nominal_freq(band: u8) -> Option<f64> {
    match band {
        1 => Some(1.57542e9),  // L1/E1
        2 => Some(1.22760e9),  // L2/B1
        3 => Some(1.17645e9),  // L5/E5a
        4 => Some(1.26852e9),  // L6/LEX/B3
        5 => Some(1.20714e9),  // E5b/B2
        6 => Some(1.191795e9), // E5a+b
        7 => Some(1.202025e9), // GLONASS L3 (G3)
        _ => None,
    }
}
