//! Common audio types for Overture
//!
//! This module contains the fundamental buffer type shared by every stage
//! of the extended-mix assembler, plus the named operations the pipeline
//! is built from: time-range slicing, aligned summation, gain in dB,
//! fade-in, and crossfade append.
//!
//! Numeric domain: all audio is normalized 32-bit float in [-1.0, 1.0],
//! interleaved by channel. Millisecond positions convert to frame indices
//! with integer floor division, so adjacent slices taken at the same
//! millisecond boundary share that boundary exactly.

use thiserror::Error;

/// Audio sample type (32-bit float for processing, quantized on export)
pub type Sample = f32;

/// Milliseconds per second conversion factor
pub const MS_PER_SECOND: u64 = 1000;

/// Number of stem roles (vocals, drums, bass, other)
pub const NUM_STEMS: usize = 4;

/// Stem role identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Stem {
    Vocals = 0,
    Drums = 1,
    Bass = 2,
    Other = 3,
}

impl Stem {
    /// All stems in canonical order
    pub const ALL: [Stem; NUM_STEMS] = [Stem::Vocals, Stem::Drums, Stem::Bass, Stem::Other];

    /// Lowercase role name, matching separator output file naming
    pub fn name(&self) -> &'static str {
        match self {
            Stem::Vocals => "vocals",
            Stem::Drums => "drums",
            Stem::Bass => "bass",
            Stem::Other => "other",
        }
    }

    /// Parse a role name (as used in stem file names)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vocals" => Some(Stem::Vocals),
            "drums" => Some(Stem::Drums),
            "bass" => Some(Stem::Bass),
            "other" => Some(Stem::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Buffer operation errors
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("format mismatch: {lhs_rate}Hz/{lhs_channels}ch vs {rhs_rate}Hz/{rhs_channels}ch")]
    FormatMismatch {
        lhs_rate: u32,
        lhs_channels: u16,
        rhs_rate: u32,
        rhs_channels: u16,
    },

    #[error("length mismatch: {lhs} frames vs {rhs} frames")]
    LengthMismatch { lhs: usize, rhs: usize },

    #[error("buffer too short: {frames} frames, operation needs {needed}")]
    TooShort { frames: usize, needed: usize },

    #[error("nothing to sum")]
    Empty,
}

/// Decoded PCM audio for one stem or track
///
/// Samples are interleaved `[c0, c1, c0, c1, ...]`. A "frame" is one
/// sample per channel.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: u16,
    samples: Vec<Sample>,
}

impl AudioBuffer {
    /// Create a buffer from interleaved samples
    ///
    /// Panics if the sample count is not a multiple of the channel count.
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<Sample>) -> Self {
        assert!(channels > 0, "channel count must be non-zero");
        assert!(
            samples.len() % channels as usize == 0,
            "interleaved length must be a multiple of the channel count"
        );
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    /// Create a silent buffer of the given frame count
    pub fn silence(sample_rate: u32, channels: u16, frames: usize) -> Self {
        Self::new(sample_rate, channels, vec![0.0; frames * channels as usize])
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count
    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Check if the buffer holds no audio
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interleaved sample data
    #[inline]
    pub fn as_interleaved(&self) -> &[Sample] {
        &self.samples
    }

    /// Duration in milliseconds (floored)
    pub fn duration_ms(&self) -> u64 {
        self.frames() as u64 * MS_PER_SECOND / self.sample_rate as u64
    }

    /// Convert a millisecond position to a frame index (floored)
    #[inline]
    pub fn ms_to_frame(&self, ms: u64) -> usize {
        (ms * self.sample_rate as u64 / MS_PER_SECOND) as usize
    }

    /// Check that another buffer shares this buffer's sample rate and
    /// channel count
    pub fn check_format(&self, other: &AudioBuffer) -> Result<(), BufferError> {
        if self.sample_rate != other.sample_rate || self.channels != other.channels {
            return Err(BufferError::FormatMismatch {
                lhs_rate: self.sample_rate,
                lhs_channels: self.channels,
                rhs_rate: other.sample_rate,
                rhs_channels: other.channels,
            });
        }
        Ok(())
    }

    /// Extract the audio in `[start_ms, end_ms)` as a new buffer
    ///
    /// Boundaries are floored to frame indices with the same rounding the
    /// beat grid uses, and clamped to the buffer length. An inverted or
    /// out-of-range span yields an empty buffer.
    pub fn slice_by_time_range(&self, start_ms: u64, end_ms: u64) -> AudioBuffer {
        let frames = self.frames();
        let start = self.ms_to_frame(start_ms).min(frames);
        let end = self.ms_to_frame(end_ms).min(frames);
        let ch = self.channels as usize;
        let samples = if start < end {
            self.samples[start * ch..end * ch].to_vec()
        } else {
            Vec::new()
        };
        AudioBuffer::new(self.sample_rate, self.channels, samples)
    }

    /// Root-mean-square amplitude over all channels
    ///
    /// Returns 0.0 for an empty buffer.
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_squares: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum_squares / self.samples.len() as f64).sqrt()
    }

    /// Apply a gain in decibels to every sample
    ///
    /// 0 dB is a no-op; +6 dB roughly doubles amplitude. Results are not
    /// clamped here; saturation happens at summation and export.
    pub fn apply_gain_db(&mut self, db: f32) {
        if db == 0.0 {
            return;
        }
        let factor = 10.0f32.powf(db / 20.0);
        for sample in &mut self.samples {
            *sample *= factor;
        }
    }

    /// Linear fade-in over the first `fade_ms` milliseconds
    ///
    /// Amplitude ramps from 0 at the first frame to 1 at the end of the
    /// fade span; audio past the span is untouched. A buffer shorter than
    /// the fade is ramped over its whole length.
    pub fn fade_in(&mut self, fade_ms: u64) {
        let fade_frames = self.ms_to_frame(fade_ms).min(self.frames());
        if fade_frames == 0 {
            return;
        }
        let ch = self.channels as usize;
        for frame in 0..fade_frames {
            let gain = frame as Sample / fade_frames as Sample;
            for sample in &mut self.samples[frame * ch..(frame + 1) * ch] {
                *sample *= gain;
            }
        }
    }

    /// Append `other` with a linear crossfade of `crossfade_ms`
    ///
    /// The final crossfade span of `self` and the first crossfade span of
    /// `other` are blended with complementary linear ramps; the result is
    /// `self.frames() + other.frames() - overlap` frames long, clamped to
    /// [-1, 1] in the overlap. Fails if either side is shorter than the
    /// crossfade or the formats disagree.
    pub fn crossfade_append(
        &self,
        other: &AudioBuffer,
        crossfade_ms: u64,
    ) -> Result<AudioBuffer, BufferError> {
        self.check_format(other)?;
        let overlap = self.ms_to_frame(crossfade_ms);
        if self.frames() < overlap {
            return Err(BufferError::TooShort {
                frames: self.frames(),
                needed: overlap,
            });
        }
        if other.frames() < overlap {
            return Err(BufferError::TooShort {
                frames: other.frames(),
                needed: overlap,
            });
        }

        let ch = self.channels as usize;
        let head_frames = self.frames() - overlap;
        let out_frames = head_frames + other.frames();
        let mut samples = Vec::with_capacity(out_frames * ch);

        // Unblended head of self
        samples.extend_from_slice(&self.samples[..head_frames * ch]);

        // Overlap: self fades out, other fades in
        for frame in 0..overlap {
            let t = frame as Sample / overlap as Sample;
            for c in 0..ch {
                let a = self.samples[(head_frames + frame) * ch + c];
                let b = other.samples[frame * ch + c];
                samples.push((a * (1.0 - t) + b * t).clamp(-1.0, 1.0));
            }
        }

        // Remainder of other
        samples.extend_from_slice(&other.samples[overlap * ch..]);

        Ok(AudioBuffer::new(self.sample_rate, self.channels, samples))
    }
}

/// Sum equal-format, equal-length buffers sample-wise into one buffer
///
/// Additive mixing of up to four full-scale segments can exceed [-1, 1],
/// so every output sample is clamped to that range (hard saturation).
pub fn sum_aligned(buffers: &[&AudioBuffer]) -> Result<AudioBuffer, BufferError> {
    let first = buffers.first().ok_or(BufferError::Empty)?;
    for other in &buffers[1..] {
        first.check_format(other)?;
        if other.frames() != first.frames() {
            return Err(BufferError::LengthMismatch {
                lhs: first.frames(),
                rhs: other.frames(),
            });
        }
    }

    let mut samples = vec![0.0f32; first.samples.len()];
    for buffer in buffers {
        for (dst, &src) in samples.iter_mut().zip(buffer.samples.iter()) {
            *dst += src;
        }
    }
    for sample in &mut samples {
        *sample = sample.clamp(-1.0, 1.0);
    }

    Ok(AudioBuffer::new(first.sample_rate, first.channels, samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(rate: u32, samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::new(rate, 1, samples)
    }

    #[test]
    fn test_slice_by_time_range() {
        // 1kHz: 1 frame per ms
        let buf = mono(1000, (0..100).map(|i| i as f32 / 100.0).collect());
        let slice = buf.slice_by_time_range(10, 20);
        assert_eq!(slice.frames(), 10);
        assert_eq!(slice.as_interleaved()[0], 0.10);
    }

    #[test]
    fn test_slice_clamps_and_inverted_span_is_empty() {
        let buf = mono(1000, vec![0.5; 50]);
        assert_eq!(buf.slice_by_time_range(40, 400).frames(), 10);
        assert_eq!(buf.slice_by_time_range(30, 10).frames(), 0);
    }

    #[test]
    fn test_rms() {
        let buf = mono(1000, vec![0.5; 8]);
        assert!((buf.rms() - 0.5).abs() < 1e-9);
        assert_eq!(mono(1000, Vec::new()).rms(), 0.0);
    }

    #[test]
    fn test_gain_db() {
        let mut buf = mono(1000, vec![0.1; 4]);
        buf.apply_gain_db(6.0);
        // +6 dB is a factor of ~1.995
        assert!((buf.as_interleaved()[0] - 0.1995).abs() < 1e-3);
    }

    #[test]
    fn test_fade_in_ramps_only_fade_span() {
        let mut buf = mono(1000, vec![1.0; 100]);
        buf.fade_in(50);
        assert_eq!(buf.as_interleaved()[0], 0.0);
        assert!(buf.as_interleaved()[25] < 1.0);
        // Past the fade span, untouched
        assert_eq!(buf.as_interleaved()[50], 1.0);
        assert_eq!(buf.as_interleaved()[99], 1.0);
    }

    #[test]
    fn test_sum_aligned_clamps() {
        let a = mono(1000, vec![0.8; 4]);
        let b = mono(1000, vec![0.8; 4]);
        let sum = sum_aligned(&[&a, &b]).unwrap();
        assert_eq!(sum.as_interleaved()[0], 1.0);
    }

    #[test]
    fn test_sum_aligned_rejects_mismatch() {
        let a = mono(1000, vec![0.0; 4]);
        let b = mono(2000, vec![0.0; 4]);
        assert!(matches!(
            sum_aligned(&[&a, &b]),
            Err(BufferError::FormatMismatch { .. })
        ));

        let c = mono(1000, vec![0.0; 8]);
        assert!(matches!(
            sum_aligned(&[&a, &c]),
            Err(BufferError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_crossfade_append_length() {
        let a = mono(1000, vec![1.0; 300]);
        let b = mono(1000, vec![-1.0; 400]);
        let out = a.crossfade_append(&b, 100).unwrap();
        // 300 + 400 - 100 overlap
        assert_eq!(out.frames(), 600);
        // Start of overlap is dominated by a, end by b
        assert!(out.as_interleaved()[200] > 0.9);
        assert!(out.as_interleaved()[299] < -0.9);
    }

    #[test]
    fn test_crossfade_append_too_short() {
        let a = mono(1000, vec![0.0; 50]);
        let b = mono(1000, vec![0.0; 400]);
        assert!(matches!(
            a.crossfade_append(&b, 100),
            Err(BufferError::TooShort { .. })
        ));
    }

    #[test]
    fn test_stem_names_round_trip() {
        for stem in Stem::ALL {
            assert_eq!(Stem::from_name(stem.name()), Some(stem));
        }
        assert_eq!(Stem::from_name("piano"), None);
    }
}
