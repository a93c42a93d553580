//! Overture core audio types
//!
//! Shared foundation for the extended-mix assembler: the [`AudioBuffer`]
//! type with its named operations, the [`Stem`] role enum, and Symphonia
//! based file decoding.

pub mod decode;
pub mod types;

pub use decode::{decode_file, DecodeError};
pub use types::{sum_aligned, AudioBuffer, BufferError, Sample, Stem, MS_PER_SECOND, NUM_STEMS};
