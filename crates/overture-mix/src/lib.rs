//! Extended-mix assembly
//!
//! Builds an "extended mix" of a finished track: the loudest beat-aligned
//! windows of its instrumental stems are selected, gain-staged, shuffled,
//! mixed into an intro section, and crossfaded onto the head of the main
//! track. Beat tracking and source separation are external collaborators;
//! this crate consumes their outputs (a JSON beat analysis and a 4-stems
//! directory) and produces the exported mix plus a JSON metadata sidecar.

pub mod beatgrid;
pub mod beats;
pub mod config;
pub mod error;
pub mod export;
pub mod metadata;
pub mod mix;
pub mod pipeline;
pub mod plan;
pub mod select;
pub mod shuffle;
pub mod splice;
pub mod stems;

pub use beatgrid::BeatGrid;
pub use beats::{resolve_beats, BeatAnalysis, BeatDetectionMethod};
pub use config::{default_config_path, load_config, OvertureConfig};
pub use error::{MixError, Result};
pub use metadata::MixMetadata;
pub use pipeline::{assemble, run_job, ExtendedMix};
pub use plan::AssemblyPlan;
pub use shuffle::{ShuffleEngine, ShuffleMode};
pub use stems::{load_stems, StemSet};
