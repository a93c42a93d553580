//! overture-mix - extended-mix assembly CLI
//!
//! Consumes a 4-stems directory and a beat analysis document, assembles
//! the extended mix, and reports the outcome as a single JSON line on
//! stdout so supervising processes can parse it:
//!
//! ```text
//! overture-mix <stems_dir> <beats.json> <main_track> <output> \
//!     [intro_bars] [outro_bars] [preserve_vocals] [method]
//! ```
//!
//! `method` is one of `auto`, `primary`, `fallback` (default `auto`).
//! Set `RUST_LOG=debug` for verbose output; diagnostics go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use serde_json::json;

use overture_core::decode_file;
use overture_mix::{
    load_config, load_stems, resolve_beats, run_job, AssemblyPlan, BeatDetectionMethod, BeatGrid,
    MixMetadata, OvertureConfig, ShuffleEngine,
};

struct JobArgs {
    stems_dir: PathBuf,
    beats_path: PathBuf,
    main_track: PathBuf,
    output: PathBuf,
    intro_bars: Option<u32>,
    outro_bars: Option<u32>,
    preserve_vocals: bool,
    method: BeatDetectionMethod,
}

fn parse_args(args: &[String]) -> anyhow::Result<JobArgs> {
    if args.len() < 4 || args.len() > 8 {
        bail!(
            "usage: overture-mix <stems_dir> <beats.json> <main_track> <output> \
             [intro_bars] [outro_bars] [preserve_vocals] [method]"
        );
    }

    let parse_bars = |arg: Option<&String>, name: &str| -> anyhow::Result<Option<u32>> {
        arg.map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid {name}: {s:?}"))
        })
        .transpose()
    };

    let preserve_vocals = match args.get(6).map(String::as_str) {
        None => true,
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        Some(other) => bail!("invalid preserve_vocals: {other:?} (expected true/false)"),
    };

    let method = match args.get(7) {
        None => BeatDetectionMethod::Auto,
        Some(tag) => BeatDetectionMethod::from_tag(tag)
            .with_context(|| format!("invalid method: {tag:?} (expected auto/primary/fallback)"))?,
    };

    Ok(JobArgs {
        stems_dir: PathBuf::from(&args[0]),
        beats_path: PathBuf::from(&args[1]),
        main_track: PathBuf::from(&args[2]),
        output: PathBuf::from(&args[3]),
        intro_bars: parse_bars(args.get(4), "intro_bars")?,
        outro_bars: parse_bars(args.get(5), "outro_bars")?,
        preserve_vocals,
        method,
    })
}

fn run(args: &JobArgs, config: &OvertureConfig) -> anyhow::Result<MixMetadata> {
    let plan = AssemblyPlan {
        intro_bars: args.intro_bars.unwrap_or(config.intro_bars),
        outro_bars: args.outro_bars.unwrap_or(config.outro_bars),
        preserve_vocals: args.preserve_vocals,
        ..Default::default()
    };

    let main_track = decode_file(&args.main_track)
        .with_context(|| format!("failed to decode main track: {:?}", args.main_track))?;
    let duration_secs = main_track.duration_ms() as f64 / 1000.0;

    // Beat validation runs before any stem is decoded, so a track with
    // too few beats fails fast and cheap.
    let analysis = resolve_beats(args.method, &args.beats_path, duration_secs)?;
    let grid = BeatGrid::from_seconds(analysis.tempo, &analysis.beats, &plan)?;

    let stems = load_stems(&args.stems_dir)?;
    let engine = ShuffleEngine::new(config.shuffle_mode, &args.output);

    let metadata = run_job(&plan, &engine, &grid, &stems, &main_track, &args.output)?;
    Ok(metadata)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let config = match overture_mix::default_config_path() {
        Some(path) => load_config(&path),
        None => {
            log::warn!("no platform config directory, using defaults");
            OvertureConfig::default()
        }
    };

    match run(&args, &config) {
        Ok(metadata) => {
            let report = json!({
                "status": "success",
                "output_path": args.output,
                "metadata_path": MixMetadata::sidecar_path(&args.output),
                "version": metadata.version,
                "shuffle_order": metadata.shuffle_order,
            });
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("extended mix failed: {e:#}");
            let report = json!({
                "status": "error",
                "message": format!("{e:#}"),
            });
            println!("{report}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_minimal() {
        let args = parse_args(&strings(&["stems", "beats.json", "track.wav", "out_v2.wav"]))
            .unwrap();
        assert_eq!(args.stems_dir, Path::new("stems"));
        assert_eq!(args.intro_bars, None);
        assert!(args.preserve_vocals);
        assert_eq!(args.method, BeatDetectionMethod::Auto);
    }

    #[test]
    fn test_parse_full() {
        let args = parse_args(&strings(&[
            "stems",
            "beats.json",
            "track.wav",
            "out.flac",
            "8",
            "4",
            "false",
            "fallback",
        ]))
        .unwrap();
        assert_eq!(args.intro_bars, Some(8));
        assert_eq!(args.outro_bars, Some(4));
        assert!(!args.preserve_vocals);
        assert_eq!(args.method, BeatDetectionMethod::Fallback);
    }

    #[test]
    fn test_parse_rejects_bad_arity_and_values() {
        assert!(parse_args(&strings(&["stems", "beats.json"])).is_err());
        assert!(parse_args(&strings(&[
            "stems",
            "beats.json",
            "track.wav",
            "out.wav",
            "sixteen",
        ]))
        .is_err());
        assert!(parse_args(&strings(&[
            "stems",
            "beats.json",
            "track.wav",
            "out.wav",
            "16",
            "16",
            "maybe",
        ]))
        .is_err());
    }
}
