//! Stem loading
//!
//! Source separation is an external collaborator; this module consumes
//! its output directory, which follows the 4-stems layout
//! (`vocals.wav`, `drums.wav`, `bass.wav`, `other.wav`). All stems of a
//! job must agree on sample rate and channel count, and their durations
//! may differ only by rounding.

use std::path::Path;

use overture_core::{decode_file, AudioBuffer, Stem};

use crate::error::{MixError, Result};

/// Allowed per-stem duration drift, in milliseconds of frames
const DURATION_TOLERANCE_MS: u64 = 1;

/// The four decoded stem buffers of one job
#[derive(Debug, Clone)]
pub struct StemSet {
    pub vocals: AudioBuffer,
    pub drums: AudioBuffer,
    pub bass: AudioBuffer,
    pub other: AudioBuffer,
}

impl StemSet {
    /// Get a buffer by role
    pub fn get(&self, role: Stem) -> &AudioBuffer {
        match role {
            Stem::Vocals => &self.vocals,
            Stem::Drums => &self.drums,
            Stem::Bass => &self.bass,
            Stem::Other => &self.other,
        }
    }

    /// Sample rate shared by all stems
    pub fn sample_rate(&self) -> u32 {
        self.vocals.sample_rate()
    }

    /// Channel count shared by all stems
    pub fn channels(&self) -> u16 {
        self.vocals.channels()
    }
}

/// Load all four stems from a separator output directory
///
/// Fails with [`MixError::MissingStem`] when a stem file is absent or
/// undecodable, and with [`MixError::Assembly`] when the stems disagree
/// on format or duration.
pub fn load_stems(dir: &Path) -> Result<StemSet> {
    log::info!("loading stems from {:?}", dir);

    let load = |role: Stem| -> Result<AudioBuffer> {
        let path = dir.join(format!("{}.wav", role.name()));
        if !path.exists() {
            return Err(MixError::MissingStem {
                role,
                path,
                source: None,
            });
        }
        let buffer = decode_file(&path).map_err(|e| MixError::MissingStem {
            role,
            path: path.clone(),
            source: Some(e),
        })?;
        log::debug!(
            "stem '{}': {} frames, {}Hz, {} channels",
            role,
            buffer.frames(),
            buffer.sample_rate(),
            buffer.channels()
        );
        Ok(buffer)
    };

    let set = StemSet {
        vocals: load(Stem::Vocals)?,
        drums: load(Stem::Drums)?,
        bass: load(Stem::Bass)?,
        other: load(Stem::Other)?,
    };

    validate_agreement(&[&set.vocals, &set.drums, &set.bass, &set.other])?;

    Ok(set)
}

fn validate_agreement(buffers: &[&AudioBuffer]) -> Result<()> {
    let first = buffers[0];
    for other in &buffers[1..] {
        first.check_format(other)?;
    }

    let min = buffers.iter().map(|b| b.frames()).min().unwrap_or(0);
    let max = buffers.iter().map(|b| b.frames()).max().unwrap_or(0);
    let tolerance_frames =
        (DURATION_TOLERANCE_MS * first.sample_rate() as u64 / 1000).max(1) as usize;
    if max - min > tolerance_frames {
        return Err(MixError::Assembly(format!(
            "stem durations disagree beyond rounding: {min} vs {max} frames"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use overture_core::AudioBuffer;

    fn write_wav(path: &Path, frames: usize, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..frames * 2 {
            writer.write_sample(0.25f32).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_stems() {
        let dir = tempfile::tempdir().unwrap();
        for role in Stem::ALL {
            write_wav(&dir.path().join(format!("{}.wav", role.name())), 480, 48000);
        }

        let stems = load_stems(dir.path()).unwrap();
        assert_eq!(stems.sample_rate(), 48000);
        assert_eq!(stems.channels(), 2);
        assert_eq!(stems.get(Stem::Drums).frames(), 480);
    }

    #[test]
    fn test_missing_stem() {
        let dir = tempfile::tempdir().unwrap();
        for role in [Stem::Vocals, Stem::Drums, Stem::Bass] {
            write_wav(&dir.path().join(format!("{}.wav", role.name())), 480, 48000);
        }

        match load_stems(dir.path()) {
            Err(MixError::MissingStem { role, .. }) => assert_eq!(role, Stem::Other),
            other => panic!("expected MissingStem, got {other:?}"),
        }
    }

    #[test]
    fn test_duration_drift_rejected() {
        let a = AudioBuffer::silence(48000, 2, 48000);
        let b = AudioBuffer::silence(48000, 2, 48000 + 4800); // 100ms longer
        let c = AudioBuffer::silence(48000, 2, 48000);
        let d = AudioBuffer::silence(48000, 2, 48000);
        assert!(matches!(
            validate_agreement(&[&a, &b, &c, &d]),
            Err(MixError::Assembly(_))
        ));
    }
}
