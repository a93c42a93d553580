//! Audio decoding via Symphonia
//!
//! Decodes any Symphonia-supported container (WAV, FLAC, MP3) into an
//! [`AudioBuffer`]. The container format is probed from the file contents
//! with the extension as a hint.

use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::types::AudioBuffer;

/// Decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open audio file: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("no decodable audio track in {0}")]
    NoAudioTrack(PathBuf),
}

/// Decode an audio file into an interleaved float buffer
pub fn decode_file(path: &Path) -> Result<AudioBuffer, DecodeError> {
    let file = File::open(path).map_err(|e| DecodeError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::NoAudioTrack(path.to_path_buf()))?;

    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| DecodeError::UnsupportedFormat("unknown sample rate".to_string()))?;

    let mut channels: Option<u16> = track.codec_params.channels.map(|c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("decode_file: error reading packet from {:?}: {}", path, e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("decode_file: error decoding packet from {:?}: {}", path, e);
                continue;
            }
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            // Samples interleave at the decoded stream's layout, which
            // is authoritative over container metadata
            channels = Some(spec.channels.count() as u16);
            let duration = decoded.capacity() as u64;
            sample_buf = Some(SampleBuffer::new(duration, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    let channels = channels.ok_or_else(|| {
        DecodeError::UnsupportedFormat(format!("unknown channel count in {path:?}"))
    })?;

    log::debug!(
        "decode_file: {:?} -> {} frames, {}Hz, {} channels",
        path,
        samples.len() / channels as usize,
        sample_rate,
        channels
    );

    Ok(AudioBuffer::new(sample_rate, channels, samples))
}
