// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! RINEX-3 observation code registry and code-priority selection.
//!
//! Every signal an MSM or legacy observation message carries resolves to one
//! of these codes. A code carries both its two-character RINEX string (e.g.
//! `"1C"`, `"2W"`, `"5I"`) and a frequency-band id in `1..=7`.

use crate::satellite::System;
use crate::options::Options;
use strum::{AsRefStr, EnumIter};

/// Frequency-band id: 1 = L1/E1, 2 = L2/B1, 3 = L5/E5a, 4 = L6/LEX/B3,
/// 5 = E5b/B2, 6 = E5a+b, 7 = GLONASS L3.
pub type Band = u8;

/// One RINEX-3 observation code. `None` stands in for `CODE_NONE`, the "no
/// code" sentinel used when a table lookup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
pub enum Code {
    None,
    #[strum(to_string = "1C")]
    L1C,
    #[strum(to_string = "1P")]
    L1P,
    #[strum(to_string = "1W")]
    L1W,
    #[strum(to_string = "1Y")]
    L1Y,
    #[strum(to_string = "1M")]
    L1M,
    #[strum(to_string = "1N")]
    L1N,
    #[strum(to_string = "1S")]
    L1S,
    #[strum(to_string = "1L")]
    L1L,
    #[strum(to_string = "1X")]
    L1X,
    #[strum(to_string = "1A")]
    L1A,
    #[strum(to_string = "1B")]
    L1B,
    #[strum(to_string = "1Z")]
    L1Z,
    #[strum(to_string = "2C")]
    L2C,
    #[strum(to_string = "2D")]
    L2D,
    #[strum(to_string = "2S")]
    L2S,
    #[strum(to_string = "2L")]
    L2L,
    #[strum(to_string = "2X")]
    L2X,
    #[strum(to_string = "2P")]
    L2P,
    #[strum(to_string = "2W")]
    L2W,
    #[strum(to_string = "2Y")]
    L2Y,
    #[strum(to_string = "2M")]
    L2M,
    #[strum(to_string = "2N")]
    L2N,
    #[strum(to_string = "2I")]
    L2I,
    #[strum(to_string = "2Q")]
    L2Q,
    #[strum(to_string = "5I")]
    L5I,
    #[strum(to_string = "5Q")]
    L5Q,
    #[strum(to_string = "5X")]
    L5X,
    #[strum(to_string = "6A")]
    L6A,
    #[strum(to_string = "6B")]
    L6B,
    #[strum(to_string = "6C")]
    L6C,
    #[strum(to_string = "6X")]
    L6X,
    #[strum(to_string = "6Z")]
    L6Z,
    #[strum(to_string = "6S")]
    L6S,
    #[strum(to_string = "6L")]
    L6L,
    #[strum(to_string = "6I")]
    L6I,
    #[strum(to_string = "6Q")]
    L6Q,
    #[strum(to_string = "7I")]
    L7I,
    #[strum(to_string = "7Q")]
    L7Q,
    #[strum(to_string = "7X")]
    L7X,
    #[strum(to_string = "8I")]
    L8I,
    #[strum(to_string = "8Q")]
    L8Q,
    #[strum(to_string = "8X")]
    L8X,
    #[strum(to_string = "3I")]
    L3I,
    #[strum(to_string = "3Q")]
    L3Q,
    #[strum(to_string = "3X")]
    L3X,
}

impl Code {
    /// Look up the code whose two-character RINEX string is `s`. Returns
    /// [`Code::None`] if no code matches.
    pub fn from_rinex_str(s: &str) -> Code {
        use strum::IntoEnumIterator;
        Code::iter()
            .find(|c| *c != Code::None && c.as_ref() == s)
            .unwrap_or(Code::None)
    }

    /// The frequency-band id this code belongs to, or 0 for [`Code::None`].
    pub fn band(self) -> Band {
        match self {
            Code::None => 0,
            Code::L1C
            | Code::L1P
            | Code::L1W
            | Code::L1Y
            | Code::L1M
            | Code::L1N
            | Code::L1S
            | Code::L1L
            | Code::L1X
            | Code::L1A
            | Code::L1B
            | Code::L1Z => 1,
            Code::L2C
            | Code::L2D
            | Code::L2S
            | Code::L2L
            | Code::L2X
            | Code::L2P
            | Code::L2W
            | Code::L2Y
            | Code::L2M
            | Code::L2N
            | Code::L2I
            | Code::L2Q => 2,
            Code::L5I | Code::L5Q | Code::L5X => 3,
            Code::L6A
            | Code::L6B
            | Code::L6C
            | Code::L6X
            | Code::L6Z
            | Code::L6S
            | Code::L6L
            | Code::L6I
            | Code::L6Q => 4,
            Code::L7I | Code::L7Q | Code::L7X => 5,
            Code::L8I | Code::L8Q | Code::L8X => 6,
            Code::L3I | Code::L3Q | Code::L3X => 7,
        }
    }

    /// The RINEX attribute letter (the second character of the code
    /// string), used to index the per-system priority strings below.
    fn letter(self) -> Option<char> {
        if self == Code::None {
            return None;
        }
        self.as_ref().chars().nth(1)
    }
}

/// Per-system, per-band preferred-code letter strings. Position within the
/// string yields priority `14..1`; a letter absent from the table gets
/// priority 0.
fn priority_table(sys: System, band: Band) -> &'static str {
    match (sys, band) {
        (System::Gps, 1) => "CPYWMNSL",
        (System::Gps, 2) => "PYWCMNDSLX",
        (System::Gps, 3) => "IQX",
        (System::Glo, 1) => "PC",
        (System::Glo, 2) => "PC",
        (System::Glo, 7) => "IQX",
        (System::Gal, 1) => "CABXZ",
        (System::Gal, 5) => "IQX",
        (System::Gal, 3) => "IQX",
        (System::Gal, 6) => "ABCXZ",
        (System::Qzs, 1) => "CSLXZ",
        (System::Qzs, 2) => "SLX",
        (System::Qzs, 3) => "IQX",
        (System::Qzs, 4) => "SLX",
        (System::Cmp, 2) => "IQX",
        (System::Cmp, 5) => "IQX",
        (System::Cmp, 4) => "IQX",
        (System::Sbs, 1) => "C",
        (System::Sbs, 3) => "IQX",
        _ => "",
    }
}

/// Return the selection priority of `code` for `sys`, in `0..=15`.
///
/// Priority 14 down to 1 comes from position within the per-system,
/// per-band preferred-code string; `-GLxx`/`-RLxx`/`-ELxx`/`-JLxx`/`-CLxx`/
/// `-SLxx` options (§6) override this: when an override names a two-char
/// code on the same band, that code gets priority 15 and every other code
/// on the band is disabled (priority 0).
pub fn code_priority(sys: System, code: Code, opt: &Options) -> u8 {
    if code == Code::None {
        return 0;
    }
    let band = code.band();
    if let Some(forced) = opt.forced_code(sys) {
        if forced.band() == band {
            return if forced == code { 15 } else { 0 };
        }
    }
    let table = priority_table(sys, band);
    let letter = match code.letter() {
        Some(l) => l,
        None => return 0,
    };
    match table.find(letter) {
        Some(index) if index < 14 => 14 - index as u8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    #[test]
    fn rinex_string_roundtrip() {
        assert_eq!(Code::L1C.as_ref(), "1C");
        assert_eq!(Code::from_rinex_str("1C"), Code::L1C);
        assert_eq!(Code::from_rinex_str("2W"), Code::L2W);
        assert_eq!(Code::from_rinex_str("5I"), Code::L5I);
        assert_eq!(Code::from_rinex_str("??"), Code::None);
    }

    #[test]
    fn band_assignment() {
        assert_eq!(Code::L1C.band(), 1);
        assert_eq!(Code::L2W.band(), 2);
        assert_eq!(Code::L5I.band(), 3);
        assert_eq!(Code::L3Q.band(), 7);
    }

    #[test]
    fn gps_l1_priority_matches_scenario_f() {
        // codepris[GPS][L1] = "CPYWMNSL": C=14, P=13, Y=12, W=11.
        let opt = Options::parse("");
        assert_eq!(code_priority(System::Gps, Code::L1C, &opt), 14);
        assert_eq!(code_priority(System::Gps, Code::L1P, &opt), 13);
        assert_eq!(code_priority(System::Gps, Code::L1Y, &opt), 12);
        assert_eq!(code_priority(System::Gps, Code::L1W, &opt), 11);
    }

    #[test]
    fn forced_code_option_overrides_table() {
        let opt = Options::parse("-GL1W");
        assert_eq!(code_priority(System::Gps, Code::L1W, &opt), 15);
        assert_eq!(code_priority(System::Gps, Code::L1C, &opt), 0);
        // different band is unaffected
        assert_eq!(code_priority(System::Gps, Code::L2W, &opt), 10);
    }
}
