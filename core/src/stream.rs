//! Sample stream capabilities
//!
//! The link never talks to audio hardware directly. The sender writes into a
//! [`SampleSink`] and the capture loop reads from a [`SampleSource`]; live
//! audio devices, WAV files and in-memory buffers all sit behind these.

use crate::error::Result;

/// Blocking reader of signed 8-bit PCM samples
pub trait SampleSource {
    /// Read samples into `buf`, blocking until some are available.
    /// Returns the number of samples read; 0 means the stream has ended.
    fn read(&mut self, buf: &mut [i8]) -> Result<usize>;
}

/// Blocking writer of signed 8-bit PCM samples
pub trait SampleSink {
    /// Queue every sample in `buf` for playback.
    fn write_all(&mut self, buf: &[i8]) -> Result<()>;

    /// Block until everything written so far has been played.
    fn drain(&mut self) -> Result<()>;
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn read(&mut self, buf: &mut [i8]) -> Result<usize> {
        (**self).read(buf)
    }
}

impl<S: SampleSink + ?Sized> SampleSink for &mut S {
    fn write_all(&mut self, buf: &[i8]) -> Result<()> {
        (**self).write_all(buf)
    }

    fn drain(&mut self) -> Result<()> {
        (**self).drain()
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read(&mut self, buf: &mut [i8]) -> Result<usize> {
        (**self).read(buf)
    }
}

impl<S: SampleSink + ?Sized> SampleSink for Box<S> {
    fn write_all(&mut self, buf: &[i8]) -> Result<()> {
        (**self).write_all(buf)
    }

    fn drain(&mut self) -> Result<()> {
        (**self).drain()
    }
}

/// Source that replays a fixed buffer, then reports end of stream
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    samples: Vec<i8>,
    position: usize,
}

impl MemorySource {
    pub fn new(samples: Vec<i8>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl SampleSource for MemorySource {
    fn read(&mut self, buf: &mut [i8]) -> Result<usize> {
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.samples[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

/// Sink that records everything written to it
///
/// Each `drain` closes a segment, so a test can see exactly which samples
/// were played together.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    segments: Vec<Vec<i8>>,
    pending: Vec<i8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drained segments in playback order
    pub fn segments(&self) -> &[Vec<i8>] {
        &self.segments
    }

    /// Every sample written, drained or not
    pub fn samples(&self) -> Vec<i8> {
        let mut all: Vec<i8> = self.segments.iter().flatten().copied().collect();
        all.extend_from_slice(&self.pending);
        all
    }

    /// Samples written since the last drain
    pub fn pending(&self) -> &[i8] {
        &self.pending
    }
}

impl SampleSink for MemorySink {
    fn write_all(&mut self, buf: &[i8]) -> Result<()> {
        self.pending.extend_from_slice(buf);
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            self.segments.push(std::mem::take(&mut self.pending));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_reads_until_exhausted() {
        let mut source = MemorySource::new(vec![1, 2, 3, 4, 5]);
        let mut buf = [0i8; 2];

        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [3, 4]);
        assert_eq!(source.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 5);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_memory_sink_segments_on_drain() {
        let mut sink = MemorySink::new();
        sink.write_all(&[1, 2]).unwrap();
        sink.write_all(&[3]).unwrap();
        sink.drain().unwrap();
        sink.write_all(&[4]).unwrap();

        assert_eq!(sink.segments(), &[vec![1i8, 2, 3]]);
        assert_eq!(sink.pending(), &[4i8]);
        assert_eq!(sink.samples(), vec![1, 2, 3, 4]);

        sink.drain().unwrap();
        sink.drain().unwrap();
        assert_eq!(sink.segments().len(), 2);
    }

    #[test]
    fn test_sink_through_mutable_reference() {
        fn play<S: SampleSink>(mut sink: S) {
            sink.write_all(&[7, 8]).unwrap();
            sink.drain().unwrap();
        }

        let mut sink = MemorySink::new();
        play(&mut sink);
        assert_eq!(sink.segments(), &[vec![7i8, 8]]);
    }
}
