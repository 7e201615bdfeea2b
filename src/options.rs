// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Decoder options (§6).
//!
//! The options string is parsed once, up front, into this typed struct
//! rather than re-parsed per frame. It is read-only for the lifetime of a
//! [`ControlRecord`](crate::control::ControlRecord); nothing in the core
//! ever mutates it while decoding.

use crate::code::Code;
use crate::satellite::System;

/// Parsed decoder options, built from the whitespace-separated token string
/// described in spec §6.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// `-EPHALL`: store every ephemeris update, including ones with an
    /// unchanged issue-of-data.
    pub eph_all: bool,
    /// `-STA=N`: reject frames whose station ID isn't `N`.
    pub station_id: Option<u16>,
    /// `-RT_INP`: every frame resets the buffered epoch to the host's
    /// current GPS time.
    pub real_time_input: bool,
    gps_force: Option<Code>,
    glo_force: Option<Code>,
    gal_force: Option<Code>,
    qzs_force: Option<Code>,
    cmp_force: Option<Code>,
    sbs_force: Option<Code>,
}

impl Options {
    /// Parse a whitespace-separated options string. Unrecognized tokens are
    /// ignored, matching the source's tolerant token-at-a-time parsing.
    pub fn parse(s: &str) -> Options {
        let mut opt = Options::default();
        for token in s.split_whitespace() {
            opt.apply_token(token);
        }
        opt
    }

    fn apply_token(&mut self, token: &str) {
        if token == "-EPHALL" {
            self.eph_all = true;
        } else if token == "-RT_INP" {
            self.real_time_input = true;
        } else if let Some(rest) = token.strip_prefix("-STA=") {
            self.station_id = rest.parse().ok();
        } else if let Some(code_str) = token.strip_prefix("-GL") {
            self.gps_force = Some(Code::from_rinex_str(code_str));
        } else if let Some(code_str) = token.strip_prefix("-RL") {
            self.glo_force = Some(Code::from_rinex_str(code_str));
        } else if let Some(code_str) = token.strip_prefix("-EL") {
            self.gal_force = Some(Code::from_rinex_str(code_str));
        } else if let Some(code_str) = token.strip_prefix("-JL") {
            self.qzs_force = Some(Code::from_rinex_str(code_str));
        } else if let Some(code_str) = token.strip_prefix("-CL") {
            self.cmp_force = Some(Code::from_rinex_str(code_str));
        } else if let Some(code_str) = token.strip_prefix("-SL") {
            self.sbs_force = Some(Code::from_rinex_str(code_str));
        }
    }

    /// The code forced to top priority for `sys`, if an override option for
    /// it was present.
    pub fn forced_code(&self, sys: System) -> Option<Code> {
        match sys {
            System::Gps => self.gps_force,
            System::Glo => self.glo_force,
            System::Gal => self.gal_force,
            System::Qzs => self.qzs_force,
            System::Cmp => self.cmp_force,
            System::Sbs => self.sbs_force,
            System::Leo => None,
        }
        .filter(|c| *c != Code::None)
    }

    /// Whether frames with this station ID should be accepted.
    pub fn accepts_station(&self, id: u16) -> bool {
        match self.station_id {
            Some(required) => required == id,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_overrides() {
        let opt = Options::parse("");
        assert!(!opt.eph_all);
        assert!(!opt.real_time_input);
        assert_eq!(opt.station_id, None);
        assert!(opt.forced_code(System::Gps).is_none());
    }

    #[test]
    fn parses_combined_tokens() {
        let opt = Options::parse("-EPHALL -STA=123 -GL1W -RT_INP");
        assert!(opt.eph_all);
        assert!(opt.real_time_input);
        assert_eq!(opt.station_id, Some(123));
        assert_eq!(opt.forced_code(System::Gps), Some(Code::L1W));
        assert!(opt.accepts_station(123));
        assert!(!opt.accepts_station(124));
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let opt = Options::parse("-UNKNOWN=7 garbage");
        assert!(!opt.eph_all);
        assert_eq!(opt.station_id, None);
    }
}
