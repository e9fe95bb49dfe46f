use log::{debug, info};

use crate::error::Result;
use crate::framing::build_frame;
use crate::stream::SampleSink;
use crate::symbol::SymbolEncoder;
use crate::LinkConfig;

/// Send side of the link: framer feeding the symbol encoder
///
/// `send_frame` runs on the caller's thread and returns only after the last
/// tone has drained.
pub struct Transmitter<W> {
    encoder: SymbolEncoder<W>,
}

impl<W: SampleSink> Transmitter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            encoder: SymbolEncoder::new(sink),
        }
    }

    pub fn with_config(sink: W, config: &LinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            encoder: SymbolEncoder::with_config(sink, config),
        })
    }

    /// Frame the first `size` octets of `payload` and play them
    ///
    /// Octets go out in frame order, each one LSB first.
    pub fn send_frame(&mut self, payload: &[u8], size: usize) -> Result<()> {
        let frame = build_frame(payload, size)?;
        info!("sending frame: {} payload octets", frame.payload().len());

        for (index, &octet) in frame.as_bytes().iter().enumerate() {
            debug!("octet {}/{}", index + 1, frame.octet_count());
            self.encoder.emit(octet)?;
        }
        Ok(())
    }

    pub fn sink(&self) -> &W {
        self.encoder.sink()
    }

    pub fn into_sink(self) -> W {
        self.encoder.into_sink()
    }
}
