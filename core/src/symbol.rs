use log::{debug, trace};

use crate::error::Result;
use crate::stream::SampleSink;
use crate::tone::ToneSynthesizer;
use crate::{LinkConfig, ONE_FREQUENCY, SYNC_FREQUENCY, ZERO_FREQUENCY};

/// Symbols emitted per octet: a SYNC tone ahead of each of the 8 data tones
pub const SYMBOLS_PER_OCTET: usize = 16;

/// Line-level alphabet, one fixed carrier per symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineSymbol {
    Sync,
    Zero,
    One,
}

impl LineSymbol {
    /// Carrier frequency in Hz
    pub fn frequency(self) -> f32 {
        match self {
            LineSymbol::Sync => SYNC_FREQUENCY,
            LineSymbol::Zero => ZERO_FREQUENCY,
            LineSymbol::One => ONE_FREQUENCY,
        }
    }

    pub fn from_bit(bit: bool) -> Self {
        if bit {
            LineSymbol::One
        } else {
            LineSymbol::Zero
        }
    }
}

/// Line symbols for one octet, least significant bit first
///
/// Every bit goes out as the pair (SYNC, data symbol).
pub fn encode_octet(octet: u8) -> [LineSymbol; SYMBOLS_PER_OCTET] {
    let mut symbols = [LineSymbol::Sync; SYMBOLS_PER_OCTET];
    for i in 0..8 {
        let bit = (octet >> i) & 1 == 1;
        symbols[2 * i + 1] = LineSymbol::from_bit(bit);
    }
    symbols
}

/// Plays octets on a sample sink, one tone per line symbol
///
/// Every tone is drained before the next one is synthesized. That blocking
/// playback is the only thing pacing symbol boundaries; there is no shared
/// clock with the receiver.
pub struct SymbolEncoder<W> {
    sink: W,
    synth: ToneSynthesizer,
    symbol_duration: f32,
}

impl<W: SampleSink> SymbolEncoder<W> {
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, &LinkConfig::default())
    }

    pub fn with_config(sink: W, config: &LinkConfig) -> Self {
        Self {
            sink,
            synth: ToneSynthesizer::with_sample_rate(config.sample_rate),
            symbol_duration: config.symbol_duration,
        }
    }

    /// Transmit a single octet (16 tones)
    pub fn emit(&mut self, octet: u8) -> Result<()> {
        debug!("emitting octet 0x{:02X}", octet);
        for symbol in encode_octet(octet) {
            self.emit_symbol(symbol)?;
        }
        Ok(())
    }

    /// Synthesize and play one tone, blocking until it has drained
    pub fn emit_symbol(&mut self, symbol: LineSymbol) -> Result<()> {
        trace!("tone {:?} at {} Hz", symbol, symbol.frequency());
        let tone = self.synth.synthesize(symbol.frequency(), self.symbol_duration)?;
        self.sink.write_all(&tone)?;
        self.sink.drain()
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
