//! Zero-crossing tone classifier
//!
//! Each block is scanned once for the first positive and the first negative
//! sample of every cycle. Their index distance approximates half a period of
//! the dominant tone, and the most frequent distance decides the symbol:
//!
//! | tone    | typical distances | band        |
//! |---------|-------------------|-------------|
//! | 1200 Hz | 2, 3              | d < 3       |
//! | 600 Hz  | 5, 6              | 3 <= d <= 7 |
//! | 400 Hz  | 8, 9, 10          | d > 7       |
//!
//! Blocks are independent; nothing is carried over between calls.

use std::collections::btree_map;
use std::collections::BTreeMap;

use log::trace;

/// Upper bound (exclusive) of the ONE band
const ONE_MAX_DISTANCE: usize = 3;

/// Upper bound (inclusive) of the ZERO band; anything above is SYNC
const ZERO_MAX_DISTANCE: usize = 7;

/// Dominant signal observed in one block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    One,
    Zero,
    Sync,
    Noise,
}

impl Classification {
    /// Band lookup for a modal half-period distance
    pub fn from_distance(distance: usize) -> Self {
        if distance < ONE_MAX_DISTANCE {
            Classification::One
        } else if distance <= ZERO_MAX_DISTANCE {
            Classification::Zero
        } else {
            Classification::Sync
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::One => write!(f, "SIGNAL: ONE"),
            Classification::Zero => write!(f, "SIGNAL: ZERO"),
            Classification::Sync => write!(f, "SIGNAL: SYNC"),
            Classification::Noise => write!(f, "NOISE"),
        }
    }
}

/// Occurrence count per observed half-period distance
///
/// Keys are kept ordered so that the mode is reproducible: on equal counts
/// the smallest distance wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalfPeriodHistogram {
    counts: BTreeMap<usize, usize>,
}

impl HalfPeriodHistogram {
    /// Scan a block and record the distance of every crossing pair
    pub fn from_block(block: &[i8]) -> Self {
        let mut histogram = Self::default();
        let mut pos_index: Option<usize> = None;
        let mut neg_index: Option<usize> = None;

        for (i, &sample) in block.iter().enumerate() {
            if sample > 0 && pos_index.is_none() {
                pos_index = Some(i);
            }
            if sample < 0 && neg_index.is_none() {
                neg_index = Some(i);
            }

            if let (Some(pos), Some(neg)) = (pos_index, neg_index) {
                histogram.record(pos.abs_diff(neg));
                pos_index = None;
                neg_index = None;
            }
        }

        histogram
    }

    pub fn record(&mut self, distance: usize) {
        *self.counts.entry(distance).or_insert(0) += 1;
    }

    pub fn count(&self, distance: usize) -> usize {
        self.counts.get(&distance).copied().unwrap_or(0)
    }

    /// Number of crossing pairs recorded
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Most frequent distance, smallest first on ties
    pub fn mode(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (&distance, &count) in &self.counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((distance, count)),
            }
        }
        best.map(|(distance, _)| distance)
    }

    /// (distance, count) pairs in ascending distance order
    pub fn iter(&self) -> btree_map::Iter<'_, usize, usize> {
        self.counts.iter()
    }
}

/// Classify the dominant tone of one block of samples
pub fn classify(block: &[i8]) -> Classification {
    let histogram = HalfPeriodHistogram::from_block(block);
    trace!("half-period histogram: {:?}", histogram.counts);

    match histogram.mode() {
        Some(distance) => Classification::from_distance(distance),
        None => Classification::Noise,
    }
}

/// Split `samples` into consecutive blocks of `block_size` and classify each
///
/// A trailing partial block is classified as well.
pub fn classify_stream(samples: &[i8], block_size: usize) -> Vec<Classification> {
    if block_size == 0 {
        return Vec::new();
    }
    samples.chunks(block_size).map(classify).collect()
}
