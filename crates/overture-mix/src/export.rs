//! Export sink
//!
//! Encodes the final mix to the container format inferred from the
//! output path's extension (`wav` or `flac`, both 16-bit PCM). The
//! encoder writes to a temporary file in the destination directory and
//! persists it atomically on success, so a failed export never leaves a
//! partial artifact in place.

use std::path::Path;

use flacenc::component::BitRepr;
use flacenc::error::Verify;
use overture_core::AudioBuffer;

use crate::error::{MixError, Result};

/// Output bit depth for both containers
const BITS_PER_SAMPLE: u16 = 16;

/// Supported output containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Wav,
    Flac,
}

fn container_for(path: &Path) -> Result<Container> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("wav") => Ok(Container::Wav),
        Some("flac") => Ok(Container::Flac),
        Some(other) => Err(MixError::Export(format!(
            "unsupported output format '{other}'"
        ))),
        None => Err(MixError::Export(format!(
            "output path {path:?} has no extension to infer a format from"
        ))),
    }
}

/// Encode the mix and move it into place atomically
pub fn export_mix(mix: &AudioBuffer, output_path: &Path) -> Result<()> {
    let container = container_for(output_path)?;
    log::info!(
        "exporting {}ms mix to {:?} ({:?})",
        mix.duration_ms(),
        output_path,
        container
    );

    let parent = output_path.parent().filter(|p| !p.as_os_str().is_empty());
    let staging_dir = parent.unwrap_or_else(|| Path::new("."));

    let temp = tempfile::Builder::new()
        .prefix(".overture-export-")
        .tempfile_in(staging_dir)
        .map_err(|e| MixError::Export(format!("staging file: {e}")))?;

    match container {
        Container::Wav => write_wav(mix, temp.path())?,
        Container::Flac => write_flac(mix, temp.path())?,
    }

    temp.persist(output_path)
        .map_err(|e| MixError::Export(format!("moving into place: {e}")))?;
    log::info!("export complete: {:?}", output_path);
    Ok(())
}

/// Quantize a normalized float sample to 16-bit, clamping first
#[inline]
fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn write_wav(mix: &AudioBuffer, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: mix.channels(),
        sample_rate: mix.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| MixError::Export(format!("wav writer: {e}")))?;
    for &sample in mix.as_interleaved() {
        writer
            .write_sample(quantize(sample))
            .map_err(|e| MixError::Export(format!("wav sample write: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| MixError::Export(format!("wav finalize: {e}")))?;
    Ok(())
}

fn write_flac(mix: &AudioBuffer, path: &Path) -> Result<()> {
    let samples: Vec<i32> = mix
        .as_interleaved()
        .iter()
        .map(|&s| quantize(s) as i32)
        .collect();

    let config = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| MixError::Export(format!("flac config: {e:?}")))?;
    let source = flacenc::source::MemSource::from_samples(
        &samples,
        mix.channels() as usize,
        BITS_PER_SAMPLE as usize,
        mix.sample_rate() as usize,
    );
    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| MixError::Export(format!("flac encode: {e:?}")))?;

    let mut sink = flacenc::bitsink::ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| MixError::Export(format!("flac serialize: {e:?}")))?;
    std::fs::write(path, sink.as_slice())
        .map_err(|e| MixError::Export(format!("flac write: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use overture_core::decode_file;

    fn tone(frames: usize) -> AudioBuffer {
        let samples: Vec<f32> = (0..frames * 2)
            .map(|i| ((i / 2) as f32 * 0.01).sin() * 0.5)
            .collect();
        AudioBuffer::new(48000, 2, samples)
    }

    #[test]
    fn test_unsupported_extension() {
        let mix = tone(4800);
        let dir = tempfile::tempdir().unwrap();
        let err = export_mix(&mix, &dir.path().join("mix.ogg")).unwrap_err();
        assert!(matches!(err, MixError::Export(_)));
        // No partial file was left behind
        assert!(!dir.path().join("mix.ogg").exists());
    }

    #[test]
    fn test_wav_round_trip() {
        let mix = tone(4800);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mix.wav");
        export_mix(&mix, &path).unwrap();

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.sample_rate(), 48000);
        assert_eq!(decoded.channels(), 2);
        assert_eq!(decoded.frames(), 4800);
    }

    #[test]
    fn test_failed_export_leaves_no_staging_file() {
        let mix = tone(4800);
        let dir = tempfile::tempdir().unwrap();
        let _ = export_mix(&mix, &dir.path().join("mix.mp3"));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }
}
