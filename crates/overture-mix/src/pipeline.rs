//! Job orchestration
//!
//! Runs one extended-mix job end to end: beat-aligned window selection
//! on the instrumental stems, gain staging, shuffle, mix-down, splice
//! onto the main track, and export with the metadata sidecar. A job is a
//! single-shot synchronous batch transform: it either completes and
//! exports, or fails and produces nothing.

use std::path::Path;

use overture_core::{AudioBuffer, Stem};

use crate::beatgrid::BeatGrid;
use crate::error::{MixError, Result};
use crate::export::export_mix;
use crate::metadata::MixMetadata;
use crate::mix::mix_segments;
use crate::plan::{gain_db_for, AssemblyPlan};
use crate::select::{select_windows, Segment};
use crate::shuffle::{ShuffleEngine, ShuffleOrder, INTRO_MULTISET};
use crate::splice::{splice_intro, splice_outro};
use crate::stems::StemSet;

/// Roles whose loudest windows feed a section, one selection per role
const SECTION_ROLES: [Stem; 3] = [Stem::Drums, Stem::Other, Stem::Vocals];

/// An assembled mix with its side-channel record
#[derive(Debug, Clone)]
pub struct ExtendedMix {
    pub buffer: AudioBuffer,
    pub metadata: MixMetadata,
}

/// One assembled section (intro or outro) before splicing
struct Section {
    buffer: AudioBuffer,
    selections: Vec<Segment>,
    order: ShuffleOrder,
}

/// Select, gain-stage, shuffle, and mix one section of `window_beats`
fn assemble_section(
    engine: &ShuffleEngine,
    grid: &BeatGrid,
    stems: &StemSet,
    window_beats: usize,
) -> Result<Section> {
    // One scan per role, in parallel against the shared immutable grid
    let mut selections = select_windows(stems, grid, window_beats, &SECTION_ROLES);

    // Gain is applied exactly once, after selection and before mixing
    for segment in &mut selections {
        segment.buffer.apply_gain_db(gain_db_for(segment.role));
    }

    let pick = |role: Stem| -> Result<Segment> {
        selections
            .iter()
            .find(|s| s.role == role)
            .cloned()
            .ok_or_else(|| MixError::Assembly(format!("no selection for role '{role}'")))
    };

    // The fixed multiset duplicates drums to bias their presence
    let mut segments = INTRO_MULTISET
        .iter()
        .map(|&role| pick(role))
        .collect::<Result<Vec<Segment>>>()?;

    let order = engine.shuffle(&mut segments);
    let buffer = mix_segments(&segments)?;

    Ok(Section {
        buffer,
        selections,
        order,
    })
}

/// Assemble the extended mix in memory
///
/// The grid and plan are read-only throughout; every buffer created here
/// is owned by its stage until handed to the next one.
pub fn assemble(
    plan: &AssemblyPlan,
    engine: &ShuffleEngine,
    grid: &BeatGrid,
    stems: &StemSet,
    main_track: &AudioBuffer,
) -> Result<ExtendedMix> {
    stems.get(Stem::Vocals).check_format(main_track)?;

    log::info!(
        "assembling extended mix: {} bars intro, {} bars outro (outro {})",
        plan.intro_bars,
        plan.outro_bars,
        if plan.include_outro { "on" } else { "off" }
    );

    let intro = assemble_section(engine, grid, stems, plan.intro_beats())?;
    let mut buffer = splice_intro(&intro.buffer, main_track)?;

    // Outro assembly follows the identical contract against the same
    // stems, spliced onto the tail instead of the head.
    if plan.include_outro {
        let outro = assemble_section(engine, grid, stems, plan.outro_beats())?;
        buffer = splice_outro(&buffer, &outro.buffer)?;
    }

    let metadata = MixMetadata::new(
        engine.version(),
        &intro.order,
        &intro.selections,
        grid.tempo(),
    );

    Ok(ExtendedMix { buffer, metadata })
}

/// Assemble, export, and write the metadata sidecar
pub fn run_job(
    plan: &AssemblyPlan,
    engine: &ShuffleEngine,
    grid: &BeatGrid,
    stems: &StemSet,
    main_track: &AudioBuffer,
    output_path: &Path,
) -> Result<MixMetadata> {
    let mix = assemble(plan, engine, grid, stems, main_track)?;
    export_mix(&mix.buffer, output_path)?;
    if let Err(e) = mix.metadata.write_sidecar(output_path) {
        // A failed job must leave no artifact behind
        if let Err(rm) = std::fs::remove_file(output_path) {
            log::warn!(
                "failed to remove {:?} after sidecar error: {}",
                output_path,
                rm
            );
        }
        return Err(e);
    }
    log::info!("extended mix created successfully: {:?}", output_path);
    Ok(mix.metadata)
}
