//! SLIP framing codec (RFC 1055)
//!
//! Frame format: [0xC0] [escaped payload] [0xC0]
//!
//! Escaping: 0xC0 in the payload becomes [0xDB 0xDC], 0xDB becomes
//! [0xDB 0xDD]. The leading delimiter flushes any line noise that
//! accumulated before the frame (Phil Karn variant).
//!
//! Encoding is a pure function. Decoding is stateful: the serial layer
//! hands over arbitrary chunks, so a single call may complete zero, one,
//! or several frames, and a frame may span many calls.

use crate::error::{Error, Result};

/// Frame delimiter
pub const FRAME_END: u8 = 0xC0;
/// Escape marker
pub const ESC: u8 = 0xDB;
/// Escaped form of FRAME_END
pub const ESC_FRAME_END: u8 = 0xDC;
/// Escaped form of ESC
pub const ESC_ESC: u8 = 0xDD;

/// SLIP-encode a payload into a delimited frame
///
/// Emits a leading and trailing FRAME_END; FRAME_END and ESC bytes in the
/// payload are replaced by their two-byte escape sequences. Never fails.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(payload.len() + 2);
    encoded.push(FRAME_END);

    for &byte in payload {
        match byte {
            FRAME_END => {
                encoded.push(ESC);
                encoded.push(ESC_FRAME_END);
            }
            ESC => {
                encoded.push(ESC);
                encoded.push(ESC_ESC);
            }
            _ => encoded.push(byte),
        }
    }

    encoded.push(FRAME_END);
    encoded
}

/// Decoder position within the escape grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Next byte is data, a delimiter, or an escape marker
    Normal,
    /// Previous byte was ESC; next byte must be ESC_FRAME_END or ESC_ESC
    EscapePending,
}

/// Incremental SLIP decoder
///
/// Accumulates partial frames across reads. Invariant: escapes are resolved
/// before storage, so the buffer never ends with a pending escape marker.
///
/// After [`SlipDecoder::feed`] returns an error the caller must call
/// [`SlipDecoder::reset`] before feeding further bytes; data accumulated
/// for the offending frame is discarded.
#[derive(Debug)]
pub struct SlipDecoder {
    buffer: Vec<u8>,
    state: DecodeState,
}

impl SlipDecoder {
    /// Create a decoder with an empty accumulation buffer
    pub fn new() -> Self {
        SlipDecoder {
            buffer: Vec::new(),
            state: DecodeState::Normal,
        }
    }

    /// Consume a chunk of the serial byte stream, returning completed frames
    ///
    /// A chunk that ends mid-frame leaves the partial data buffered for the
    /// next call. An empty frame (two consecutive delimiters) yields
    /// nothing, which tolerates the leading delimiter encode() emits for
    /// resynchronization.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut frames = Vec::new();

        for &byte in chunk {
            match self.state {
                DecodeState::EscapePending => {
                    match byte {
                        ESC_FRAME_END => self.buffer.push(FRAME_END),
                        ESC_ESC => self.buffer.push(ESC),
                        other => return Err(Error::InvalidEscape(other)),
                    }
                    self.state = DecodeState::Normal;
                }
                DecodeState::Normal => match byte {
                    ESC => self.state = DecodeState::EscapePending,
                    FRAME_END => {
                        if !self.buffer.is_empty() {
                            frames.push(std::mem::take(&mut self.buffer));
                        }
                    }
                    _ => self.buffer.push(byte),
                },
            }
        }

        Ok(frames)
    }

    /// Discard any partial frame and return to the initial state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = DecodeState::Normal;
    }
}

impl Default for SlipDecoder {
    fn default() -> Self {
        Self::new()
    }
}
