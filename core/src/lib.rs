//! Acoustic data-link layer
//!
//! Frames bytes Ethernet-style and sends them as single-tone FSK symbols
//! (400/600/1200 Hz) at 8 kHz, 8-bit signed mono. The receive side classifies
//! each captured block by zero-crossing spacing.

pub mod capture;
pub mod classifier;
pub mod error;
pub mod framing;
pub mod reassembly;
pub mod stream;
pub mod symbol;
pub mod tone;
pub mod transmitter;

pub use capture::{run_capture, spawn_capture, CancellationToken};
pub use classifier::{classify, classify_stream, Classification, HalfPeriodHistogram};
pub use error::{LinkError, Result};
pub use framing::{build_frame, Frame};
pub use reassembly::SymbolDecoder;
pub use stream::{MemorySink, MemorySource, SampleSink, SampleSource};
pub use symbol::{encode_octet, LineSymbol, SymbolEncoder, SYMBOLS_PER_OCTET};
pub use tone::ToneSynthesizer;
pub use transmitter::Transmitter;

// Audio format
pub const SAMPLE_RATE: u32 = 8000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 8;
pub const MAX_AMPLITUDE: f32 = 127.0; // i8::MAX

// Symbol timing: anything shorter loses sync tones on real hardware
pub const SYMBOL_DURATION_SECS: f32 = 1.0;
pub const SAMPLES_PER_SYMBOL: usize = SAMPLE_RATE as usize; // one second of tone
pub const MAX_SYMBOL_SAMPLES: usize = 60 * SAMPLE_RATE as usize; // one minute at 8 kHz

// Line tones
pub const SYNC_FREQUENCY: f32 = 400.0; // Hz
pub const ZERO_FREQUENCY: f32 = 600.0; // Hz
pub const ONE_FREQUENCY: f32 = 1200.0; // Hz

// Frame layout
pub const PREAMBLE: u8 = 0x55;
pub const START_FRAME_DELIMITER: u8 = 0xD5;
pub const FRAME_HEADER_SIZE: usize = 3; // preamble + delimiter + length
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

// Capture block: one second of mono 8-bit audio
pub const CAPTURE_BLOCK_SIZE: usize = SAMPLE_RATE as usize * (BITS_PER_SAMPLE as usize / 8);

/// Runtime link parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkConfig {
    /// Samples per second on both directions of the line
    pub sample_rate: u32,
    /// Length of every tone in seconds
    pub symbol_duration: f32,
    /// Samples handed to the classifier per capture iteration
    pub block_size: usize,
}

impl LinkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(LinkError::InvalidConfig("sample rate must be positive".into()));
        }
        if !(self.symbol_duration.is_finite() && self.symbol_duration > 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "symbol duration must be positive, got {}",
                self.symbol_duration
            )));
        }
        let samples = f64::from(self.symbol_duration) * f64::from(self.sample_rate);
        if samples > MAX_SYMBOL_SAMPLES as f64 {
            return Err(LinkError::InvalidConfig(format!(
                "symbol of {} s at {} Hz exceeds {} samples",
                self.symbol_duration, self.sample_rate, MAX_SYMBOL_SAMPLES
            )));
        }
        if self.block_size == 0 {
            return Err(LinkError::InvalidConfig("block size must be positive".into()));
        }
        Ok(())
    }

    /// Number of samples in one tone
    pub fn samples_per_symbol(&self) -> usize {
        (self.symbol_duration * self.sample_rate as f32).round() as usize
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            symbol_duration: SYMBOL_DURATION_SECS,
            block_size: CAPTURE_BLOCK_SIZE,
        }
    }
}
