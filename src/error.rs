// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Error taxonomy for framing and decoding.
//!
//! All of these are local to one frame: the framer always resumes at
//! [`crate::framer::State::Idle`], and a decoder either commits every field
//! update or none of them. [`ControlRecord::feed_byte`](crate::control::ControlRecord::feed_byte)
//! maps each variant onto the status codes of §6/§7.

use thiserror::Error;

/// Errors a single frame can fail with. These never propagate across frame
/// boundaries; they exist to let decoders report *why* a frame produced no
/// update, for logging, without resorting to bare status integers internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The declared length field implied fewer bytes than the message type
    /// requires to decode its fixed header.
    #[error("frame length too short for its message type")]
    FramingShort,
    /// The trailing 24-bit CRC did not match the computed CRC-24Q.
    #[error("CRC-24Q mismatch")]
    CrcMismatch,
    /// The message type is a recognized field layout but not one this crate
    /// implements a decoder for.
    #[error("unsupported message type")]
    UnknownType,
    /// A PRN fell outside its constellation's valid range.
    #[error("satellite PRN out of range")]
    InvalidSatellite,
    /// An MSM signal id had no entry in the constellation's signal table.
    #[error("signal id not in table")]
    InvalidSignal,
    /// The decoded ephemeris has the same issue-of-data as the one already
    /// stored, so it is not a replacement.
    #[error("ephemeris issue-of-data unchanged")]
    StaleEphemeris,
    /// The frame's station ID does not match the ID already observed in this
    /// batch.
    #[error("station ID changed mid-batch")]
    StationMismatch,
}

/// Outcome of decoding one complete, CRC-valid RTCM3 frame.
///
/// Maps directly to the status codes in spec §4.E/§6/§7; kept as an enum
/// internally so call sites read as intent rather than magic numbers, then
/// converted to the public `i32` status code at the [`ControlRecord`](crate::control::ControlRecord)
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// No content update (unknown type, unchanged ephemeris, stale SSR sync).
    NoUpdate,
    /// The frame was malformed; discarded.
    Error,
    /// The observation epoch buffer changed.
    Observation,
    /// A navigation (ephemeris) slot changed.
    Ephemeris,
    /// The station descriptor changed.
    Station,
    /// An SSR record changed.
    Ssr,
}

impl DecodeOutcome {
    /// The public status code this outcome corresponds to, per spec §4.E.
    pub fn status_code(self) -> i32 {
        match self {
            DecodeOutcome::NoUpdate => 0,
            DecodeOutcome::Error => -1,
            DecodeOutcome::Observation => 1,
            DecodeOutcome::Ephemeris => 2,
            DecodeOutcome::Station => 5,
            DecodeOutcome::Ssr => 10,
        }
    }
}

impl From<FrameError> for DecodeOutcome {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::FramingShort
            | FrameError::StationMismatch => DecodeOutcome::Error,
            FrameError::CrcMismatch
            | FrameError::UnknownType
            | FrameError::InvalidSatellite
            | FrameError::InvalidSignal
            | FrameError::StaleEphemeris => DecodeOutcome::NoUpdate,
        }
    }
}
