//! Internal failure reasons.
//!
//! These never cross the public `encode`/`decode` boundary as a
//! `Result` — per the codec's error handling design, both public
//! entry points flatten every failure to an empty result. This enum
//! exists so internal stages can log and be tested against a precise
//! failure mode instead of a boolean.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CodecError {
    /// A normalized character indexed into both `odd_set` and `even_set`.
    #[error("character indexes both alphabets: table construction bug")]
    TableCorruption,

    /// The repaired stream fell below the `2*expected/3` recoverability floor.
    #[error("chirality repair gave up: stream too short to recover")]
    ChiralityUnrecoverable,

    /// The error-locator degree implies more errors than `sym` can correct.
    #[error("too many errors: locator degree {degree} exceeds capacity for {sym} check symbols")]
    TooManyErrors { degree: usize, sym: usize },

    /// The Chien search didn't find as many roots as the locator degree demands.
    #[error("Chien search found {found} roots, expected {expected}")]
    ChienMismatch { found: usize, expected: usize },

    /// Syndromes were nonzero after applying the computed correction.
    #[error("residual syndrome nonzero after correction")]
    UncorrectedResidual,

    /// Repaired stream length didn't match the expected code length.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}
