//! Capture loop: read blocks from a source and classify each one
//!
//! The loop checks its [`CancellationToken`] once per iteration, so stopping
//! takes effect after the read in flight returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info};

use crate::classifier::{classify, Classification};
use crate::error::{LinkError, Result};
use crate::stream::SampleSource;

/// Cooperative stop signal shared between a controller and a capture loop
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Read `block_size` samples at a time and report one classification per read
///
/// Runs until `token` is cancelled or the source reports end of stream.
/// Returns the number of blocks classified.
pub fn run_capture<S, F>(
    mut source: S,
    block_size: usize,
    token: &CancellationToken,
    mut on_block: F,
) -> Result<usize>
where
    S: SampleSource,
    F: FnMut(Classification),
{
    if block_size == 0 {
        return Err(LinkError::InvalidConfig("block size must be positive".into()));
    }

    let mut buffer = vec![0i8; block_size];
    let mut blocks = 0usize;

    while !token.is_cancelled() {
        let count = source.read(&mut buffer)?;
        if count == 0 {
            debug!("capture source ended");
            break;
        }

        let result = classify(&buffer[..count]);
        debug!("block {}: {} samples -> {:?}", blocks, count, result);
        on_block(result);
        blocks += 1;
    }

    info!("capture stopped after {} blocks", blocks);
    Ok(blocks)
}

/// Run [`run_capture`] on a dedicated thread
///
/// The thread's result carries the loop's error, so the controller decides
/// how fatal an input failure is.
pub fn spawn_capture<S, F>(
    source: S,
    block_size: usize,
    token: CancellationToken,
    on_block: F,
) -> JoinHandle<Result<usize>>
where
    S: SampleSource + Send + 'static,
    F: FnMut(Classification) + Send + 'static,
{
    thread::spawn(move || run_capture(source, block_size, &token, on_block))
}
