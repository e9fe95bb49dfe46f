//! Live audio lines on the default cpal host
//!
//! Both directions run at 8 kHz. The device picks the sample format: `i8` is
//! used when offered, otherwise `i16` or `f32` with conversion through cpal's
//! sample traits. Multi-channel devices get the mono signal on every output
//! channel and only their first input channel is read. A device with no 8 kHz
//! configuration in one of those formats is reported as unavailable.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BuildStreamError, Device, FromSample, Sample, SampleFormat, SampleRate, SizedSample, Stream,
    StreamConfig, SupportedStreamConfig, SupportedStreamConfigRange,
};
use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info};
use parking_lot::{Condvar, Mutex};

use tonelink_core::{LinkError, Result, SampleSink, SampleSource, SAMPLE_RATE};

/// How long `drain` sleeps between checks for a stream error
const DRAIN_POLL: Duration = Duration::from_millis(100);

/// Device formats the lines can convert to, best first
const LINE_FORMATS: [SampleFormat; 3] = [SampleFormat::I8, SampleFormat::I16, SampleFormat::F32];

fn device_name(device: &Device) -> String {
    device.name().unwrap_or_else(|_| "<unknown>".to_string())
}

/// Pick an 8 kHz configuration, preferring native `i8`, then fewer channels
fn pick_config<I>(ranges: I) -> Option<SupportedStreamConfig>
where
    I: IntoIterator<Item = SupportedStreamConfigRange>,
{
    let rate = SampleRate(SAMPLE_RATE);
    ranges
        .into_iter()
        .filter(|range| range.min_sample_rate() <= rate && rate <= range.max_sample_rate())
        .filter_map(|range| {
            LINE_FORMATS
                .iter()
                .position(|format| *format == range.sample_format())
                .map(|rank| (rank, range))
        })
        .min_by_key(|(rank, range)| (*rank, range.channels()))
        .map(|(_, range)| range.with_sample_rate(rate))
}

/// First channel of each interleaved frame, converted to `i8`
fn first_channel<T>(data: &[T], channels: usize) -> Vec<i8>
where
    T: SizedSample,
    i8: FromSample<T>,
{
    data.chunks(channels.max(1))
        .map(|frame| i8::from_sample(frame[0]))
        .collect()
}

/// Keeps the capture stream alive; dropping it closes the input line
pub struct InputLine {
    _stream: Stream,
}

/// Blocking reader fed by the capture stream callback
///
/// Holds no cpal handle, so it can move to the capture thread while the
/// [`InputLine`] stays with its owner.
pub struct CpalSource {
    chunks: Receiver<std::result::Result<Vec<i8>, String>>,
    pending: VecDeque<i8>,
}

type ChunkSender = Sender<std::result::Result<Vec<i8>, String>>;

fn build_input<T>(
    device: &Device,
    config: &StreamConfig,
    tx: ChunkSender,
) -> std::result::Result<Stream, BuildStreamError>
where
    T: SizedSample,
    i8: FromSample<T>,
{
    let channels = config.channels as usize;
    let err_tx = tx.clone();
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let _ = tx.send(Ok(first_channel(data, channels)));
        },
        move |err| {
            error!("input stream error: {}", err);
            let _ = err_tx.send(Err(err.to_string()));
        },
        None,
    )
}

/// Open the default input device and start capturing
pub fn open_input() -> Result<(InputLine, CpalSource)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| LinkError::InputDeviceUnavailable("no default input device".into()))?;
    let name = device_name(&device);

    let ranges = device
        .supported_input_configs()
        .map_err(|e| LinkError::InputDeviceUnavailable(e.to_string()))?;
    let supported = pick_config(ranges).ok_or_else(|| {
        LinkError::InputDeviceUnavailable(format!("{} cannot record at {} Hz", name, SAMPLE_RATE))
    })?;
    let config = supported.config();
    info!(
        "input device: {} ({:?}, {} channel(s))",
        name,
        supported.sample_format(),
        config.channels
    );

    let (tx, rx): (ChunkSender, Receiver<_>) = crossbeam_channel::unbounded();
    let stream = match supported.sample_format() {
        SampleFormat::I8 => build_input::<i8>(&device, &config, tx),
        SampleFormat::I16 => build_input::<i16>(&device, &config, tx),
        SampleFormat::F32 => build_input::<f32>(&device, &config, tx),
        other => {
            return Err(LinkError::InputDeviceUnavailable(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(|e| LinkError::InputDeviceUnavailable(e.to_string()))?;
    stream
        .play()
        .map_err(|e| LinkError::InputDeviceUnavailable(e.to_string()))?;

    let source = CpalSource {
        chunks: rx,
        pending: VecDeque::new(),
    };
    Ok((InputLine { _stream: stream }, source))
}

impl SampleSource for CpalSource {
    /// Blocks until `buf` is full, like a hardware line read
    ///
    /// Returns short only when the input line has been closed.
    fn read(&mut self, buf: &mut [i8]) -> Result<usize> {
        while self.pending.len() < buf.len() {
            match self.chunks.recv() {
                Ok(Ok(chunk)) => self.pending.extend(chunk),
                Ok(Err(msg)) => return Err(LinkError::InputIo(msg)),
                Err(_) => {
                    debug!("input line closed");
                    break;
                }
            }
        }

        let count = buf.len().min(self.pending.len());
        for (slot, sample) in buf.iter_mut().zip(self.pending.drain(..count)) {
            *slot = sample;
        }
        Ok(count)
    }
}

/// Sample queue shared between the writer and the output callback
struct Playback {
    queue: Mutex<PlaybackState>,
    played: Condvar,
}

#[derive(Default)]
struct PlaybackState {
    samples: VecDeque<i8>,
    /// Device periods handed out so far
    periods: u64,
    error: Option<String>,
}

impl Playback {
    fn new() -> Self {
        Self {
            queue: Mutex::new(PlaybackState::default()),
            played: Condvar::new(),
        }
    }

    fn enqueue(&self, buf: &[i8]) -> Result<()> {
        let mut state = self.queue.lock();
        if let Some(msg) = state.error.take() {
            return Err(LinkError::OutputIo(msg));
        }
        state.samples.extend(buf.iter().copied());
        Ok(())
    }

    /// Fill one device period of interleaved frames, padding with silence
    fn fill<T>(&self, data: &mut [T], channels: usize)
    where
        T: SizedSample + FromSample<i8>,
    {
        let mut state = self.queue.lock();
        for frame in data.chunks_mut(channels.max(1)) {
            let value = T::from_sample(state.samples.pop_front().unwrap_or(0));
            frame.iter_mut().for_each(|slot| *slot = value);
        }
        state.periods = state.periods.wrapping_add(1);
        self.played.notify_all();
    }

    fn fail(&self, msg: String) {
        self.queue.lock().error = Some(msg);
        self.played.notify_all();
    }

    /// Block until the queue is empty and the device has asked for one more
    /// period, so the period holding the last samples has been played.
    fn wait_played(&self) -> Result<()> {
        let mut state = self.queue.lock();
        let mut emptied_at = None;
        loop {
            if let Some(msg) = state.error.take() {
                return Err(LinkError::OutputIo(msg));
            }
            match emptied_at {
                Some(period) if state.periods != period => return Ok(()),
                None if state.samples.is_empty() => emptied_at = Some(state.periods),
                _ => {}
            }
            self.played.wait_for(&mut state, DRAIN_POLL);
        }
    }
}

fn build_output<T>(
    device: &Device,
    config: &StreamConfig,
    playback: Arc<Playback>,
) -> std::result::Result<Stream, BuildStreamError>
where
    T: SizedSample + FromSample<i8>,
{
    let channels = config.channels as usize;
    let data_playback = playback.clone();
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| data_playback.fill(data, channels),
        move |err| {
            error!("output stream error: {}", err);
            playback.fail(err.to_string());
        },
        None,
    )
}

/// Output line playing queued samples on the default output device
pub struct CpalSink {
    _stream: Stream,
    playback: Arc<Playback>,
}

/// Open the default output device and start its stream
pub fn open_output() -> Result<CpalSink> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| LinkError::OutputDeviceUnavailable("no default output device".into()))?;
    let name = device_name(&device);

    let ranges = device
        .supported_output_configs()
        .map_err(|e| LinkError::OutputDeviceUnavailable(e.to_string()))?;
    let supported = pick_config(ranges).ok_or_else(|| {
        LinkError::OutputDeviceUnavailable(format!("{} cannot play at {} Hz", name, SAMPLE_RATE))
    })?;
    let config = supported.config();
    info!(
        "output device: {} ({:?}, {} channel(s))",
        name,
        supported.sample_format(),
        config.channels
    );

    let playback = Arc::new(Playback::new());
    let stream = match supported.sample_format() {
        SampleFormat::I8 => build_output::<i8>(&device, &config, playback.clone()),
        SampleFormat::I16 => build_output::<i16>(&device, &config, playback.clone()),
        SampleFormat::F32 => build_output::<f32>(&device, &config, playback.clone()),
        other => {
            return Err(LinkError::OutputDeviceUnavailable(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(|e| LinkError::OutputDeviceUnavailable(e.to_string()))?;
    stream
        .play()
        .map_err(|e| LinkError::OutputDeviceUnavailable(e.to_string()))?;

    Ok(CpalSink {
        _stream: stream,
        playback,
    })
}

impl SampleSink for CpalSink {
    fn write_all(&mut self, buf: &[i8]) -> Result<()> {
        self.playback.enqueue(buf)
    }

    fn drain(&mut self) -> Result<()> {
        self.playback.wait_played()
    }
}
