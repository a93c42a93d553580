//! Loudest-window selection
//!
//! Scans every beat-aligned window of a stem and keeps the loudest one
//! by RMS. The scan is a stable forward pass with a strict `>`
//! comparison, so the earliest window wins a tie; reproducibility tests
//! depend on that exact behavior.

use overture_core::{AudioBuffer, Stem};
use rayon::prelude::*;

use crate::beatgrid::BeatGrid;
use crate::stems::StemSet;

/// A materialized audio slice of one stem, tagged with its source role
#[derive(Debug, Clone)]
pub struct Segment {
    pub role: Stem,
    /// Window start in milliseconds
    pub start_ms: u64,
    /// Window end in milliseconds (exclusive)
    pub end_ms: u64,
    pub buffer: AudioBuffer,
}

/// Find the loudest beat-aligned window of `window_beats` beats
///
/// Scans every start index in `[0, total_beats - window_beats)` and
/// ranks the spanned slice by RMS. If the grid is too short for even one
/// window (`total_beats < window_beats + 1`) no windowing is possible
/// and the whole stem is returned as the segment.
pub fn select_loudest_window(
    role: Stem,
    stem: &AudioBuffer,
    grid: &BeatGrid,
    window_beats: usize,
) -> Segment {
    let total_beats = grid.len();
    if total_beats < window_beats + 1 {
        log::debug!(
            "select '{}': grid of {} beats cannot fit a {}-beat window, using whole stem",
            role,
            total_beats,
            window_beats
        );
        return Segment {
            role,
            start_ms: 0,
            end_ms: stem.duration_ms(),
            buffer: stem.clone(),
        };
    }

    let mut max_rms = -1.0f64;
    let mut pick_start = 0usize;
    for i in 0..total_beats - window_beats {
        let start_ms = grid.beat_ms(i);
        let end_ms = grid.beat_ms(i + window_beats);
        let rms = stem.slice_by_time_range(start_ms, end_ms).rms();
        if rms > max_rms {
            max_rms = rms;
            pick_start = i;
        }
    }

    let start_ms = grid.beat_ms(pick_start);
    let end_ms = grid.beat_ms(pick_start + window_beats);
    log::debug!(
        "select '{}': window [{start_ms}ms, {end_ms}ms) at beat {pick_start}, rms {max_rms:.4}",
        role
    );

    Segment {
        role,
        start_ms,
        end_ms,
        buffer: stem.slice_by_time_range(start_ms, end_ms),
    }
}

/// Select the loudest window of each given role, scanning stems in
/// parallel
///
/// Each scan reads only its own stem and the shared immutable grid, so
/// the stems are processed concurrently; results come back in role
/// order, never completion order.
pub fn select_windows(
    stems: &StemSet,
    grid: &BeatGrid,
    window_beats: usize,
    roles: &[Stem],
) -> Vec<Segment> {
    roles
        .par_iter()
        .map(|&role| select_loudest_window(role, stems.get(role), grid, window_beats))
        .collect()
}
