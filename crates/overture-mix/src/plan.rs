//! Job-level assembly parameters
//!
//! The plan is built once per job from CLI arguments and configuration,
//! then shared read-only across every stage.

use overture_core::Stem;

/// Default number of bars for the intro/outro sections
pub const DEFAULT_BARS_COUNT: u32 = 16;

/// Standard beats per bar in most music
pub const DEFAULT_BEATS_PER_BAR: u32 = 4;

/// Minimum beats required beyond intro+outro for processing
pub const MINIMUM_BEATS_BUFFER: usize = 8;

/// Gain boost for the 'other' stem in decibels
pub const OTHER_STEM_GAIN_DB: f32 = 9.0;

/// Gain boost for the 'bass' stem in decibels (reserved; bass is not
/// part of the intro multiset, so this is only applied if it ever is)
pub const BASS_STEM_GAIN_DB: f32 = 12.0;

/// Fade-in length applied to the assembled intro
pub const FADE_IN_MS: u64 = 2000;

/// Crossfade length between intro and main track
pub const CROSSFADE_MS: u64 = 500;

/// Fixed per-role gain in decibels, applied once before mixing
pub fn gain_db_for(role: Stem) -> f32 {
    match role {
        Stem::Other => OTHER_STEM_GAIN_DB,
        Stem::Bass => BASS_STEM_GAIN_DB,
        Stem::Vocals | Stem::Drums => 0.0,
    }
}

/// Parameters for one extended-mix job
#[derive(Debug, Clone)]
pub struct AssemblyPlan {
    /// Number of bars for the intro section
    pub intro_bars: u32,
    /// Number of bars for the outro section
    pub outro_bars: u32,
    /// Beats per bar (4 in almost all source material)
    pub beats_per_bar: u32,
    /// Reserved vocals-inclusion policy; currently does not alter behavior
    pub preserve_vocals: bool,
    /// Assemble and splice an outro onto the tail of the track
    pub include_outro: bool,
}

impl Default for AssemblyPlan {
    fn default() -> Self {
        Self {
            intro_bars: DEFAULT_BARS_COUNT,
            outro_bars: DEFAULT_BARS_COUNT,
            beats_per_bar: DEFAULT_BEATS_PER_BAR,
            preserve_vocals: true,
            include_outro: false,
        }
    }
}

impl AssemblyPlan {
    /// Window length of the intro in beats
    pub fn intro_beats(&self) -> usize {
        (self.intro_bars * self.beats_per_bar) as usize
    }

    /// Window length of the outro in beats
    pub fn outro_beats(&self) -> usize {
        (self.outro_bars * self.beats_per_bar) as usize
    }

    /// Minimum beat-grid length this plan can run against
    pub fn required_beats(&self) -> usize {
        self.intro_beats() + self.outro_beats() + MINIMUM_BEATS_BUFFER
    }
}
