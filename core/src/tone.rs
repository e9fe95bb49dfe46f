use std::f32::consts::PI;

use crate::error::{LinkError, Result};
use crate::{MAX_AMPLITUDE, MAX_SYMBOL_SAMPLES};

/// Sine tone generator producing signed 8-bit PCM
///
/// The phase is accumulated sample by sample (`angle += 2*pi*f/fs`) and never
/// wrapped, so a buffer is one continuous wave. Tones are not faded in or
/// out; symbol boundaries click audibly.
#[derive(Debug, Clone, Copy)]
pub struct ToneSynthesizer {
    sample_rate: f32,
}

impl ToneSynthesizer {
    pub fn new() -> Self {
        Self::with_sample_rate(crate::SAMPLE_RATE)
    }

    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of samples in a tone of `duration` seconds
    pub fn sample_count(&self, duration: f32) -> usize {
        (duration * self.sample_rate).round() as usize
    }

    /// Generate `duration` seconds of a sine at `frequency` Hz
    pub fn synthesize(&self, frequency: f32, duration: f32) -> Result<Vec<i8>> {
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "tone frequency must be positive, got {}",
                frequency
            )));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "tone duration must be positive, got {}",
                duration
            )));
        }

        let exact = f64::from(duration) * f64::from(self.sample_rate);
        if exact > MAX_SYMBOL_SAMPLES as f64 {
            return Err(LinkError::InvalidConfig(format!(
                "tone of {} s exceeds {} samples",
                duration, MAX_SYMBOL_SAMPLES
            )));
        }

        let num_samples = self.sample_count(duration);
        let angular_step = 2.0 * PI * frequency / self.sample_rate;

        let mut samples = Vec::with_capacity(num_samples);
        let mut angle = 0.0f32;
        for _ in 0..num_samples {
            samples.push((MAX_AMPLITUDE * angle.sin()).round() as i8);
            angle += angular_step;
        }

        Ok(samples)
    }
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_second_is_8000_samples() {
        let synth = ToneSynthesizer::new();
        let samples = synth.synthesize(400.0, 1.0).unwrap();
        assert_eq!(samples.len(), 8000);
    }

    #[test]
    fn test_sample_count_rounds() {
        let synth = ToneSynthesizer::new();
        assert_eq!(synth.synthesize(600.0, 0.00019).unwrap().len(), 2); // 1.52 samples
        assert_eq!(synth.synthesize(600.0, 0.5).unwrap().len(), 4000);
    }

    #[test]
    fn test_deterministic() {
        let synth = ToneSynthesizer::new();
        let a = synth.synthesize(1200.0, 1.0).unwrap();
        let b = synth.synthesize(1200.0, 1.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_starts_at_zero_phase_and_stays_in_range() {
        let synth = ToneSynthesizer::new();
        let samples = synth.synthesize(600.0, 1.0).unwrap();
        assert_eq!(samples[0], 0);
        assert!(samples.iter().all(|&s| s >= -127));
        assert_eq!(*samples.iter().max().unwrap(), 127);
        assert_eq!(*samples.iter().min().unwrap(), -127);
    }

    #[test]
    fn test_quarter_period_peaks() {
        // 400 Hz at 8 kHz: 20 samples per period, peak at sample 5
        let synth = ToneSynthesizer::new();
        let samples = synth.synthesize(400.0, 1.0).unwrap();
        assert_eq!(samples[5], 127);
        assert_eq!(samples[15], -127);
    }

    #[test]
    fn test_phase_is_continuous() {
        let synth = ToneSynthesizer::new();
        let samples = synth.synthesize(1200.0, 1.0).unwrap();
        // Sign changes roughly every 3.3 samples; no jumps larger than one step
        let max_step = samples
            .windows(2)
            .map(|w| (w[1] as i16 - w[0] as i16).abs())
            .max()
            .unwrap();
        let bound = (MAX_AMPLITUDE * (2.0 * PI * 1200.0 / 8000.0)).ceil() as i16 + 1;
        assert!(max_step <= bound, "step {} exceeds {}", max_step, bound);
    }

    #[test]
    fn test_rejects_non_positive_arguments() {
        let synth = ToneSynthesizer::new();
        assert!(synth.synthesize(0.0, 1.0).is_err());
        assert!(synth.synthesize(400.0, 0.0).is_err());
        assert!(synth.synthesize(-400.0, 1.0).is_err());
        assert!(synth.synthesize(f32::NAN, 1.0).is_err());
    }

    #[test]
    fn test_rejects_oversized_tone() {
        let synth = ToneSynthesizer::new();
        assert!(matches!(
            synth.synthesize(400.0, 1e30),
            Err(LinkError::InvalidConfig(_))
        ));
        assert!(synth.synthesize(400.0, f32::MAX).is_err());
        assert!(synth.synthesize(400.0, 61.0).is_err());
        assert_eq!(synth.synthesize(400.0, 60.0).unwrap().len(), MAX_SYMBOL_SAMPLES);
    }
}
