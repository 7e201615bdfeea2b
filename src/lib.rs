// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! `swiftnav` is a library that decodes RTCM 3.x differential GNSS
//! correction messages into the observation, ephemeris, station, and SSR
//! records they carry. It reads a raw byte stream (from a serial port, a
//! network socket, or a file) and maintains the decoded state incrementally,
//! one frame at a time; it does not itself estimate a position, format
//! RINEX, or talk to any particular receiver.
//!
//! Feed bytes to a [`control::ControlRecord`] and read the decoded state back
//! off it; everything else is support code that record leans on.
//!
//! ## [Control](`control`)
//! The single mutable state object: framer, options, observation epoch,
//! navigation table, station descriptor, SSR table, and the clock used to
//! anchor week-rollover decisions. This is the crate's entry point.
//!
//! ## [Dispatch](`dispatch`)
//! Reads a frame's 12-bit message type and classifies it by decoder family.
//!
//! ## [Framer](`framer`)
//! The byte-level state machine that finds RTCM3 preambles, reassembles
//! frames, and validates their CRC-24Q trailer.
//!
//! ## [Bits](`bits`)
//! MSB-first bit-field extraction: unsigned, two's-complement signed, and
//! the extended/sign-magnitude encodings a few message types use.
//!
//! ## [CRC-24Q](`crc24q`)
//! The parity check RTCM3 trails every frame with.
//!
//! ## [Error](`error`)
//! The per-frame error taxonomy and the status codes it maps to.
//!
//! ## [Options](`options`)
//! Parses the `rnxopt`-style option string (`-EPHALL`, `-STA=N`, per-system
//! signal preferences) that tunes decoding behavior.
//!
//! ## [Satellite](`satellite`)
//! The opaque satellite index space spanning every constellation.
//!
//! ## [Code](`code`)
//! RINEX-3 observation codes, their frequency bands, and the per-system
//! priority tables used to assign a decoded signal to an observation slot.
//!
//! ## [Obs](`obs`)
//! The observation epoch buffer, its carrier-phase continuation table, and
//! the legacy and MSM decoders' shared record shapes.
//!
//! ## [Legacy observations](`legacy_obs`)
//! Decoders for the original RTK observation messages (1001-1012).
//!
//! ## [MSM](`msm`)
//! Decoders for the Multiple Signal Message observation formats (MSM4-7).
//!
//! ## [Station](`station`)
//! Decoders for the antenna reference point and receiver/antenna descriptor
//! messages (1005-1008, 1033).
//!
//! ## [Ephemeris](`ephemeris`)
//! Broadcast ephemeris decoders and storage for every constellation.
//!
//! ## [SSR](`ssr`)
//! State-space representation correction decoders and storage.
//!
//! ## [Time](`time`)
//! Time is a very important aspect of GNSS. `swiftnav` defaults to representing
//! all times as GPS times. It provides the ability to manipulate GPS time stamps,
//! as well as means to convert a GPS time stamp into various other time bases
//! (GLONASS time, Galileo time, BeiDou time, UTC, MJD), and to anchor the
//! week/time-of-week rollover disambiguation RTCM3's compact time fields need.

pub mod bits;
pub mod code;
pub mod consts;
pub mod control;
pub mod crc24q;
pub mod dispatch;
pub mod ephemeris;
pub mod error;
pub mod framer;
pub mod legacy_obs;
pub mod msm;
pub mod obs;
pub mod options;
pub mod satellite;
pub mod ssr;
pub mod station;
pub mod time;

pub use control::ControlRecord;
