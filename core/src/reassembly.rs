//! Frame reassembly from classified symbols (extension)
//!
//! The link's receive side is the per-block classifier. This module goes one
//! step further and rebuilds frames from a stream of classifications. It is
//! opt-in: the capture loop never feeds it implicitly.
//!
//! Rules:
//! - a data symbol (ONE/ZERO) only counts as a bit when a SYNC precedes it;
//!   repeated SYNC blocks collapse into one, a data symbol without SYNC is
//!   dropped as a duplicate block
//! - NOISE drops any pending SYNC
//! - bits are packed LSB first; the decoder hunts for 0x55 0xD5, reads the
//!   length octet and then that many payload octets
//! - there is no integrity check, so a corrupted frame is returned as-is

use log::debug;

use crate::classifier::Classification;
use crate::framing::Frame;
use crate::{PREAMBLE, START_FRAME_DELIMITER};

/// Preamble then delimiter, as they sit in a 16-bit LSB-first shift register
const FRAME_MARKER: u16 = ((START_FRAME_DELIMITER as u16) << 8) | PREAMBLE as u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Shifting bits until the marker shows up
    Hunting { register: u16, bits: usize },
    /// Collecting the length octet
    Length,
    /// Collecting `remaining` payload octets
    Payload { remaining: usize },
}

/// Stateful symbol -> bit -> octet -> frame decoder
#[derive(Debug, Clone)]
pub struct SymbolDecoder {
    state: State,
    sync_pending: bool,
    octet: u8,
    octet_bits: usize,
    length: u8,
    payload: Vec<u8>,
}

impl SymbolDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Hunting {
                register: 0,
                bits: 0,
            },
            sync_pending: false,
            octet: 0,
            octet_bits: 0,
            length: 0,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame and start hunting again
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether the decoder is inside a frame
    pub fn in_frame(&self) -> bool {
        !matches!(self.state, State::Hunting { .. })
    }

    /// Feed one classification; returns a frame when its last octet completes
    pub fn push(&mut self, symbol: Classification) -> Option<Frame> {
        let bit = match symbol {
            Classification::Sync => {
                self.sync_pending = true;
                return None;
            }
            Classification::Noise => {
                self.sync_pending = false;
                return None;
            }
            Classification::One | Classification::Zero if !self.sync_pending => return None,
            Classification::One => true,
            Classification::Zero => false,
        };
        self.sync_pending = false;
        self.push_bit(bit)
    }

    /// Feed a sequence of classifications, collecting every completed frame
    pub fn push_all<I>(&mut self, symbols: I) -> Vec<Frame>
    where
        I: IntoIterator<Item = Classification>,
    {
        symbols.into_iter().filter_map(|s| self.push(s)).collect()
    }

    fn push_bit(&mut self, bit: bool) -> Option<Frame> {
        if let State::Hunting { register, bits } = self.state {
            let register = (register >> 1) | ((bit as u16) << 15);
            let bits = (bits + 1).min(16);
            if bits == 16 && register == FRAME_MARKER {
                debug!("frame marker found");
                self.state = State::Length;
                self.octet = 0;
                self.octet_bits = 0;
            } else {
                self.state = State::Hunting { register, bits };
            }
            return None;
        }

        self.octet |= (bit as u8) << self.octet_bits;
        self.octet_bits += 1;
        if self.octet_bits < 8 {
            return None;
        }

        let octet = self.octet;
        self.octet = 0;
        self.octet_bits = 0;
        self.push_octet(octet)
    }

    fn push_octet(&mut self, octet: u8) -> Option<Frame> {
        match self.state {
            State::Length => {
                debug!("frame length {}", octet);
                self.length = octet;
                self.payload.clear();
                if octet == 0 {
                    return self.finish();
                }
                self.state = State::Payload {
                    remaining: octet as usize,
                };
                None
            }
            State::Payload { remaining } => {
                self.payload.push(octet);
                if remaining == 1 {
                    return self.finish();
                }
                self.state = State::Payload {
                    remaining: remaining - 1,
                };
                None
            }
            State::Hunting { .. } => None,
        }
    }

    fn finish(&mut self) -> Option<Frame> {
        let payload = std::mem::take(&mut self.payload);
        let size = self.length as usize;
        self.reset();
        Frame::new(&payload, size).ok()
    }
}

impl Default for SymbolDecoder {
    fn default() -> Self {
        Self::new()
    }
}
