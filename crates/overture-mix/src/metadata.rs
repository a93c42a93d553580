//! Side-channel metadata record
//!
//! Every exported mix is accompanied by a JSON document describing how
//! it was assembled: the artifact version, the recorded shuffle order,
//! the selected window offsets per role, and the detected tempo. The
//! record exists for auditability: a deterministic-mode permutation can
//! be replayed from the version it names.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MixError, Result};
use crate::select::Segment;
use crate::shuffle::ShuffleOrder;

/// How one extended mix was assembled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixMetadata {
    /// Artifact version (parsed from the output filename)
    pub version: u64,
    /// Role labels in the order segments were stitched
    pub shuffle_order: Vec<String>,
    /// Selected window per role as `[start_ms, end_ms]`
    pub window_offsets: BTreeMap<String, [u64; 2]>,
    /// Detected tempo in BPM
    pub tempo: f64,
}

impl MixMetadata {
    /// Build the record from the shuffle order and selected segments
    pub fn new(version: u64, order: &ShuffleOrder, segments: &[Segment], tempo: f64) -> Self {
        let shuffle_order = order.iter().map(|role| role.name().to_string()).collect();
        let window_offsets = segments
            .iter()
            .map(|s| (s.role.name().to_string(), [s.start_ms, s.end_ms]))
            .collect();
        Self {
            version,
            shuffle_order,
            window_offsets,
            tempo,
        }
    }

    /// Path of the sidecar document for a given artifact
    pub fn sidecar_path(output_path: &Path) -> PathBuf {
        output_path.with_extension("shuffle_info.json")
    }

    /// Write the record alongside the artifact
    pub fn write_sidecar(&self, output_path: &Path) -> Result<()> {
        let path = Self::sidecar_path(output_path);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MixError::Export(format!("metadata serialization: {e}")))?;
        std::fs::write(&path, json)
            .map_err(|e| MixError::Export(format!("metadata write to {path:?}: {e}")))?;
        log::info!("wrote shuffle metadata to {:?}", path);
        Ok(())
    }
}
