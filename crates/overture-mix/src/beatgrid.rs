//! Beat grid construction
//!
//! Normalizes raw beat timestamps (seconds, from the external tracker)
//! into a millisecond-domain ordered index usable for slicing. Built once
//! per job, validated up front, then shared read-only across all stem
//! selections.

use overture_core::MS_PER_SECOND;

use crate::error::{MixError, Result};
use crate::plan::AssemblyPlan;

/// Ordered beat positions in milliseconds
///
/// Positions are floored to whole milliseconds at construction so every
/// consumer slices on identical boundaries.
#[derive(Debug, Clone)]
pub struct BeatGrid {
    beats_ms: Vec<u64>,
    tempo: f64,
}

impl BeatGrid {
    /// Build a grid from detected beats, validating against the plan
    ///
    /// Fails with [`MixError::InsufficientBeats`] when the tracker
    /// produced no beats, a non-positive tempo, or fewer beats than
    /// `intro_beats + outro_beats + MINIMUM_BEATS_BUFFER`, and with
    /// [`MixError::Assembly`] when the timestamps are out of order.
    pub fn from_seconds(tempo: f64, beat_seconds: &[f64], plan: &AssemblyPlan) -> Result<Self> {
        let needed = plan.required_beats();
        if beat_seconds.is_empty() || tempo <= 0.0 {
            return Err(MixError::InsufficientBeats {
                detected: beat_seconds.len(),
                needed,
            });
        }
        if beat_seconds.len() < needed {
            log::warn!(
                "beat grid too short: detected {} beats, requested extension needs {}",
                beat_seconds.len(),
                needed
            );
            return Err(MixError::InsufficientBeats {
                detected: beat_seconds.len(),
                needed,
            });
        }

        let beats_ms: Vec<u64> = beat_seconds
            .iter()
            .map(|&t| (t * MS_PER_SECOND as f64) as u64)
            .collect();

        // The analysis document is user-editable; an unsorted grid would
        // slice inverted spans downstream
        if beats_ms.windows(2).any(|w| w[0] > w[1]) {
            return Err(MixError::Assembly(
                "beat timestamps are not in ascending order".to_string(),
            ));
        }

        Ok(Self { beats_ms, tempo })
    }

    /// Detected tempo in BPM
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Number of beats in the grid
    pub fn len(&self) -> usize {
        self.beats_ms.len()
    }

    /// Check whether the grid holds no beats
    pub fn is_empty(&self) -> bool {
        self.beats_ms.is_empty()
    }

    /// Beat position in milliseconds
    #[inline]
    pub fn beat_ms(&self, index: usize) -> u64 {
        self.beats_ms[index]
    }

    /// All beat positions in milliseconds
    pub fn as_ms(&self) -> &[u64] {
        &self.beats_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_plan() -> AssemblyPlan {
        // 4 + 4 bars of 4 beats -> needs 16 + 16 + 8 = 40 beats
        AssemblyPlan {
            intro_bars: 4,
            outro_bars: 4,
            ..Default::default()
        }
    }

    fn uniform_beats(count: usize, spacing_secs: f64) -> Vec<f64> {
        (0..count).map(|i| i as f64 * spacing_secs).collect()
    }

    #[test]
    fn test_converts_to_floored_ms() {
        let plan = small_plan();
        let grid = BeatGrid::from_seconds(120.0, &uniform_beats(40, 0.5), &plan).unwrap();
        assert_eq!(grid.len(), 40);
        assert_eq!(grid.beat_ms(0), 0);
        assert_eq!(grid.beat_ms(1), 500);
        assert_eq!(grid.beat_ms(39), 19500);
    }

    #[test]
    fn test_rejects_empty_and_bad_tempo() {
        let plan = small_plan();
        assert!(matches!(
            BeatGrid::from_seconds(120.0, &[], &plan),
            Err(MixError::InsufficientBeats { .. })
        ));
        assert!(matches!(
            BeatGrid::from_seconds(0.0, &uniform_beats(40, 0.5), &plan),
            Err(MixError::InsufficientBeats { .. })
        ));
    }

    #[test]
    fn test_rejects_unordered_beats() {
        let plan = small_plan();
        let mut beats = uniform_beats(40, 0.5);
        beats.swap(10, 11);
        assert!(matches!(
            BeatGrid::from_seconds(120.0, &beats, &plan),
            Err(MixError::Assembly(_))
        ));
    }

    #[test]
    fn test_threshold_boundary() {
        let plan = small_plan();
        let needed = plan.required_beats();

        // One beat under the threshold must fail
        let short = uniform_beats(needed - 1, 0.5);
        assert!(matches!(
            BeatGrid::from_seconds(120.0, &short, &plan),
            Err(MixError::InsufficientBeats { detected, needed: n })
                if detected == needed - 1 && n == needed
        ));

        // Exactly the threshold must proceed
        let exact = uniform_beats(needed, 0.5);
        assert!(BeatGrid::from_seconds(120.0, &exact, &plan).is_ok());
    }
}
