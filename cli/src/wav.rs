use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;

use crate::error::{CliError, Result};
use tonelink_core::{LinkError, SampleSink, BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE};

pub fn line_spec() -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Sink that records the line to an 8-bit mono WAV file
///
/// Drain is immediate: a file has no playback to wait for.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    written: usize,
}

impl WavSink {
    pub fn create(path: &Path) -> Result<Self> {
        let writer = WavWriter::create(path, line_spec())?;
        Ok(Self { writer, written: 0 })
    }

    pub fn finalize(self) -> Result<usize> {
        self.writer.finalize()?;
        Ok(self.written)
    }
}

impl SampleSink for WavSink {
    fn write_all(&mut self, buf: &[i8]) -> tonelink_core::Result<()> {
        for &sample in buf {
            self.writer
                .write_sample(sample)
                .map_err(|e| LinkError::OutputIo(e.to_string()))?;
        }
        self.written += buf.len();
        Ok(())
    }

    fn drain(&mut self) -> tonelink_core::Result<()> {
        self.writer
            .flush()
            .map_err(|e| LinkError::OutputIo(e.to_string()))
    }
}

/// Read a mono WAV file as signed 8-bit samples
///
/// 16-bit input is reduced to its high byte. The sample rate must match the
/// line rate since the classifier bands assume 8 kHz.
pub fn read_samples(path: &Path) -> Result<Vec<i8>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    info!(
        "read WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );

    if spec.channels != CHANNELS || spec.sample_rate != SAMPLE_RATE {
        return Err(CliError::UnsupportedWav(format!(
            "expected {} Hz mono, got {} Hz with {} channels",
            SAMPLE_RATE, spec.sample_rate, spec.channels
        )));
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8) => reader.samples::<i8>().collect::<std::result::Result<Vec<_>, _>>()?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| (v >> 8) as i8))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        (format, bits) => {
            return Err(CliError::UnsupportedWav(format!(
                "{:?} samples with {} bits",
                format, bits
            )))
        }
    };

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_sink_round_trip() {
        let path = std::env::temp_dir().join(format!("tonelink-wav-{}.wav", std::process::id()));

        let mut sink = WavSink::create(&path).unwrap();
        sink.write_all(&[0, 127, -127, 5]).unwrap();
        sink.drain().unwrap();
        assert_eq!(sink.finalize().unwrap(), 4);

        let samples = read_samples(&path).unwrap();
        assert_eq!(samples, vec![0, 127, -127, 5]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rejects_other_sample_rates() {
        let path = std::env::temp_dir().join(format!("tonelink-rate-{}.wav", std::process::id()));
        let spec = WavSpec {
            sample_rate: 44_100,
            ..line_spec()
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0i8).unwrap();
        writer.finalize().unwrap();

        assert!(matches!(read_samples(&path), Err(CliError::UnsupportedWav(_))));
        std::fs::remove_file(&path).ok();
    }
}
