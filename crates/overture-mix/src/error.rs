//! Assembly error types
//!
//! One job either completes and exports, or fails with one of these and
//! produces no output. Errors are never retried here; the caller decides
//! whether to re-invoke with different parameters.

use std::path::PathBuf;

use overture_core::{BufferError, DecodeError, Stem};
use thiserror::Error;

/// Errors that can occur while assembling an extended mix
#[derive(Debug, Error)]
pub enum MixError {
    /// Beat grid too short for the requested intro/outro length.
    /// Raised before any stem is touched.
    #[error("insufficient beats: detected {detected}, need at least {needed}")]
    InsufficientBeats { detected: usize, needed: usize },

    /// An expected stem buffer is absent or unreadable
    #[error("missing stem '{role}' at {path}")]
    MissingStem {
        role: Stem,
        path: PathBuf,
        #[source]
        source: Option<DecodeError>,
    },

    /// A segment or buffer violates the assembly contract (too short for
    /// the crossfade/fade-in, or stems disagree on format/duration)
    #[error("assembly failed: {0}")]
    Assembly(String),

    /// Container encode failure; no partial output is left in place
    #[error("export failed: {0}")]
    Export(String),
}

impl From<BufferError> for MixError {
    fn from(e: BufferError) -> Self {
        MixError::Assembly(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MixError>;
