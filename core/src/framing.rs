use crate::error::{LinkError, Result};
use crate::{FRAME_HEADER_SIZE, PREAMBLE, START_FRAME_DELIMITER};

/// Link-layer frame as it goes on the line
///
/// Layout: preamble (0x55), start delimiter (0xD5), length, payload.
/// Ethernet carries 7 preamble octets and 6-octet destination/source
/// addresses; here a single preamble octet is sent and the addresses are
/// omitted, so every receiver sees every frame. The CRC trailer slot is
/// not populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    octets: Vec<u8>,
}

impl Frame {
    /// Build a frame around the first `size` octets of `payload`
    ///
    /// The length octet is `size` truncated to its low 8 bits. Callers must
    /// keep `size` within 255 themselves; larger values go out with a wrong
    /// length octet.
    pub fn new(payload: &[u8], size: usize) -> Result<Self> {
        if size > payload.len() {
            return Err(LinkError::InvalidInputSize);
        }

        let mut octets = Vec::with_capacity(FRAME_HEADER_SIZE + size);
        octets.push(PREAMBLE);
        octets.push(START_FRAME_DELIMITER);
        octets.push(size as u8);
        octets.extend_from_slice(&payload[..size]);

        Ok(Self { octets })
    }

    /// Octets in transmission order
    pub fn as_bytes(&self) -> &[u8] {
        &self.octets
    }

    pub fn length_octet(&self) -> u8 {
        self.octets[2]
    }

    pub fn payload(&self) -> &[u8] {
        &self.octets[FRAME_HEADER_SIZE..]
    }

    /// Total octet count including the header
    pub fn octet_count(&self) -> usize {
        self.octets.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.octets
    }
}

/// Frame `size` octets of `payload`; see [`Frame::new`]
pub fn build_frame(payload: &[u8], size: usize) -> Result<Frame> {
    Frame::new(payload, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let frame = build_frame(b"test", 4).unwrap();
        assert_eq!(frame.as_bytes(), &[0x55, 0xD5, 4, b't', b'e', b's', b't']);
        assert_eq!(frame.octet_count(), 7);
        assert_eq!(frame.payload(), b"test");
    }

    #[test]
    fn test_frame_uses_only_size_octets() {
        let frame = build_frame(b"hello", 2).unwrap();
        assert_eq!(frame.as_bytes(), &[0x55, 0xD5, 2, b'h', b'e']);
    }

    #[test]
    fn test_empty_payload() {
        let frame = build_frame(&[], 0).unwrap();
        assert_eq!(frame.as_bytes(), &[0x55, 0xD5, 0]);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_max_payload() {
        let payload: Vec<u8> = (0..=254u8).collect();
        let frame = build_frame(&payload, 255).unwrap();
        assert_eq!(frame.octet_count(), 258);
        assert_eq!(frame.length_octet(), 255);
        assert_eq!(frame.payload(), payload.as_slice());
    }

    #[test]
    fn test_length_octet_truncates_silently() {
        let payload = vec![0xAAu8; 300];
        let frame = build_frame(&payload, 300).unwrap();
        assert_eq!(frame.length_octet(), (300 % 256) as u8);
        assert_eq!(frame.payload().len(), 300);
    }

    #[test]
    fn test_size_beyond_payload_is_rejected() {
        // The demo node asked for 5 octets of "test"
        let result = build_frame(b"test", 5);
        assert!(matches!(result, Err(LinkError::InvalidInputSize)));
    }

    #[test]
    fn test_frame_structure_for_many_lengths() {
        let payload: Vec<u8> = (0..255u32).map(|i| (i * 7 % 256) as u8).collect();
        for n in [0usize, 1, 2, 17, 128, 255] {
            let frame = build_frame(&payload, n).unwrap();
            let bytes = frame.as_bytes();
            assert_eq!(bytes.len(), n + 3);
            assert_eq!(bytes[0], 0x55);
            assert_eq!(bytes[1], 0xD5);
            assert_eq!(bytes[2] as usize, n);
            assert_eq!(&bytes[3..], &payload[..n]);
        }
    }
}
