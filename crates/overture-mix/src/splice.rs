//! Crossfade splicing
//!
//! Joins the assembled intro (and, when configured, outro) onto the main
//! track. The transition is a linear complementary crossfade: the final
//! crossfade span of the leading buffer fades out while the first span
//! of the trailing buffer fades in, never a hard cut. The resulting
//! duration is `lead + trail - crossfade` exactly.

use overture_core::AudioBuffer;

use crate::error::{MixError, Result};
use crate::plan::CROSSFADE_MS;

/// Append the main track to the intro with the fixed 500 ms crossfade
///
/// Fails with [`MixError::Assembly`] when either buffer is shorter than
/// the crossfade length.
pub fn splice_intro(intro: &AudioBuffer, main_track: &AudioBuffer) -> Result<AudioBuffer> {
    intro
        .crossfade_append(main_track, CROSSFADE_MS)
        .map_err(|e| MixError::Assembly(format!("intro splice: {e}")))
}

/// Append the assembled outro to the mix with the same crossfade
///
/// Structurally symmetric to [`splice_intro`]: the outro chain runs the
/// identical selection/shuffle/mix contract against the tail of the
/// track and joins here. Disabled by default in the plan.
pub fn splice_outro(mix: &AudioBuffer, outro: &AudioBuffer) -> Result<AudioBuffer> {
    mix.crossfade_append(outro, CROSSFADE_MS)
        .map_err(|e| MixError::Assembly(format!("outro splice: {e}")))
}
