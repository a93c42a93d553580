//! Beat analysis boundary
//!
//! Beat tracking itself is an external collaborator; this module only
//! consumes its output. The `BeatSource` trait abstracts over where the
//! beat timestamps come from, selected by a [`BeatDetectionMethod`] tag
//! rather than by catching and suppressing failures:
//!
//! - [`PrimaryAnalysis`] reads the tracker's JSON document
//!   (`{"tempo": bpm, "beats": [seconds, ...]}`).
//! - [`FallbackGrid`] synthesizes a fixed-interval grid from a known
//!   tempo and the track duration, for material where the tracker
//!   produced a tempo but no usable beat positions.
//!
//! `Auto` tries the primary source and falls back, logging each attempt.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Tempo and beat positions as produced by the external tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatAnalysis {
    /// Detected tempo in BPM
    pub tempo: f64,
    /// Beat timestamps in seconds, ordered
    pub beats: Vec<f64>,
}

/// Which beat source to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeatDetectionMethod {
    /// Primary first, fall back on failure
    #[default]
    Auto,
    /// Tracker analysis document only
    Primary,
    /// Synthesized uniform grid only
    Fallback,
}

impl BeatDetectionMethod {
    /// Parse a method tag as passed on the command line
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "auto" => Some(Self::Auto),
            "primary" => Some(Self::Primary),
            "fallback" => Some(Self::Fallback),
            _ => None,
        }
    }
}

/// A provider of beat analysis
pub trait BeatSource {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Produce tempo and beat timestamps, or a failure signal
    fn beats(&self) -> anyhow::Result<BeatAnalysis>;
}

/// Beat analysis loaded from the tracker's JSON document
pub struct PrimaryAnalysis {
    path: PathBuf,
}

impl PrimaryAnalysis {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl BeatSource for PrimaryAnalysis {
    fn name(&self) -> &'static str {
        "primary"
    }

    fn beats(&self) -> anyhow::Result<BeatAnalysis> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read beat analysis: {:?}", self.path))?;
        let analysis: BeatAnalysis = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse beat analysis: {:?}", self.path))?;

        if analysis.tempo <= 0.0 {
            bail!("beat analysis has non-positive tempo: {}", analysis.tempo);
        }
        if analysis.beats.is_empty() {
            bail!("beat analysis contains no beats");
        }

        log::info!(
            "primary analysis: tempo {:.1} BPM, {} beats",
            analysis.tempo,
            analysis.beats.len()
        );
        Ok(analysis)
    }
}

/// Uniform beat grid synthesized from tempo and duration
pub struct FallbackGrid {
    tempo: f64,
    duration_secs: f64,
}

impl FallbackGrid {
    pub fn new(tempo: f64, duration_secs: f64) -> Self {
        Self {
            tempo,
            duration_secs,
        }
    }
}

impl BeatSource for FallbackGrid {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn beats(&self) -> anyhow::Result<BeatAnalysis> {
        if self.tempo <= 0.0 {
            bail!("cannot synthesize grid from tempo {}", self.tempo);
        }
        let spacing = 60.0 / self.tempo;
        let count = (self.duration_secs / spacing) as usize;
        if count == 0 {
            bail!("track too short to synthesize a beat grid");
        }
        let beats = (0..count).map(|i| i as f64 * spacing).collect();

        log::info!(
            "fallback grid: tempo {:.1} BPM, {} synthesized beats",
            self.tempo,
            count
        );
        Ok(BeatAnalysis {
            tempo: self.tempo,
            beats,
        })
    }
}

/// Resolve beat analysis for a track according to the method tag
///
/// `analysis_path` points at the tracker's JSON document;
/// `track_duration_secs` is the decoded main-track duration, used by the
/// fallback grid. The fallback reuses the document's tempo when the
/// document itself is readable.
pub fn resolve_beats(
    method: BeatDetectionMethod,
    analysis_path: &Path,
    track_duration_secs: f64,
) -> anyhow::Result<BeatAnalysis> {
    let primary = PrimaryAnalysis::new(analysis_path);

    let fallback_tempo = |primary_err: &anyhow::Error| -> anyhow::Result<f64> {
        // The document may carry a usable tempo even when its beats are
        // unusable; otherwise there is nothing to synthesize from.
        let contents = std::fs::read_to_string(analysis_path)
            .with_context(|| format!("fallback needs a readable analysis: {primary_err:#}"))?;
        let analysis: BeatAnalysis = serde_json::from_str(&contents)?;
        Ok(analysis.tempo)
    };

    match method {
        BeatDetectionMethod::Primary => primary.beats(),
        BeatDetectionMethod::Fallback => {
            let contents = std::fs::read_to_string(analysis_path)
                .with_context(|| format!("failed to read beat analysis: {:?}", analysis_path))?;
            let analysis: BeatAnalysis = serde_json::from_str(&contents)?;
            FallbackGrid::new(analysis.tempo, track_duration_secs).beats()
        }
        BeatDetectionMethod::Auto => match primary.beats() {
            Ok(analysis) => Ok(analysis),
            Err(e) => {
                log::warn!("primary beat source failed: {e:#}, trying fallback");
                let tempo = fallback_tempo(&e)?;
                FallbackGrid::new(tempo, track_duration_secs).beats()
            }
        },
    }
}
