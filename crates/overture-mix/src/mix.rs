//! Stem mixing
//!
//! Sums the permuted segments sample-wise into one intro buffer and
//! applies the fade-in. Saturation policy: additive mixing of up to four
//! aligned full-scale segments can exceed full scale, so the sum is
//! clamped to [-1, 1] (see `overture_core::sum_aligned`).

use overture_core::{sum_aligned, AudioBuffer};

use crate::error::{MixError, Result};
use crate::plan::FADE_IN_MS;
use crate::select::Segment;

/// Sum permuted segments into one buffer and fade it in
///
/// Segments must share sample rate, channel count, and frame count,
/// guaranteed by construction when they all derive from the same window
/// width on same-duration stems, and enforced here. The fade-in is a
/// linear amplitude ramp over exactly the first 2000 ms; a result
/// shorter than the fade-in violates the assembly contract.
pub fn mix_segments(segments: &[Segment]) -> Result<AudioBuffer> {
    if segments.is_empty() {
        return Err(MixError::Assembly("no segments to mix".to_string()));
    }

    let buffers: Vec<&AudioBuffer> = segments.iter().map(|s| &s.buffer).collect();
    let mut intro = sum_aligned(&buffers)?;

    if intro.duration_ms() < FADE_IN_MS {
        return Err(MixError::Assembly(format!(
            "intro of {}ms is shorter than the {}ms fade-in",
            intro.duration_ms(),
            FADE_IN_MS
        )));
    }
    intro.fade_in(FADE_IN_MS);

    log::info!(
        "mixed {} segments into {}ms intro",
        segments.len(),
        intro.duration_ms()
    );
    Ok(intro)
}

#[cfg(test)]
mod tests {
    use super::*;
    use overture_core::Stem;

    fn segment(role: Stem, amplitude: f32, frames: usize) -> Segment {
        Segment {
            role,
            start_ms: 0,
            end_ms: frames as u64, // 1kHz mono: 1 frame per ms
            buffer: AudioBuffer::new(1000, 1, vec![amplitude; frames]),
        }
    }

    #[test]
    fn test_mixes_four_equal_segments_without_error() {
        let segments = [
            segment(Stem::Drums, 0.2, 4000),
            segment(Stem::Other, 0.2, 4000),
            segment(Stem::Drums, 0.2, 4000),
            segment(Stem::Vocals, 0.2, 4000),
        ];
        let intro = mix_segments(&segments).unwrap();
        assert_eq!(intro.frames(), 4000);

        // Fade-in confined to the first 2000ms: faded at the start,
        // untouched sum afterwards
        assert_eq!(intro.as_interleaved()[0], 0.0);
        assert!((intro.as_interleaved()[2500] - 0.8).abs() < 1e-6);
        assert!((intro.as_interleaved()[3999] - 0.8).abs() < 1e-6);
        // Inside the ramp, strictly between 0 and the full sum
        let mid = intro.as_interleaved()[1000];
        assert!(mid > 0.0 && mid < 0.8);
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let segments = [
            segment(Stem::Drums, 0.1, 4000),
            segment(Stem::Other, 0.1, 3000),
        ];
        assert!(matches!(
            mix_segments(&segments),
            Err(MixError::Assembly(_))
        ));
    }

    #[test]
    fn test_rejects_intro_shorter_than_fade() {
        let segments = [segment(Stem::Drums, 0.1, 1000)];
        assert!(matches!(
            mix_segments(&segments),
            Err(MixError::Assembly(_))
        ));
    }

    #[test]
    fn test_sum_saturates() {
        let segments = [
            segment(Stem::Drums, 0.9, 4000),
            segment(Stem::Other, 0.9, 4000),
        ];
        let intro = mix_segments(&segments).unwrap();
        // Past the fade the clamped sum sits at full scale
        assert_eq!(intro.as_interleaved()[3000], 1.0);
    }
}
