//! # lexis-core
//!
//! CTC decoding engine SDK.
//!
//! ## Architecture
//!
//! ```text
//! AcousticModel ──► (frames, vocab) log-probability matrix
//!                              │
//!               ┌──────────────┴───────────────┐
//!        decoder::greedy              BeamSearchDecoder ◄── ExternalScorer
//!               │                              │               (optional)
//!               └──────────────┬───────────────┘
//!                     ranked Hypothesis list
//!                              │
//!                    metrics (CER / WER), output writers
//! ```
//!
//! Decoding is strictly sequential within one utterance — the beam at frame
//! t+1 depends on the beam at frame t — and embarrassingly parallel across
//! utterances: each call owns all of its search state and shares only the
//! read-only vocabulary. `BeamSearchDecoder::decode_batch` fans a batch out
//! to a scoped worker pool.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod decoder;
pub mod error;
pub mod metrics;
pub mod model;
pub mod scorer;
pub mod transform;
pub mod vocab;

// Convenience re-exports for downstream crates
pub use decoder::{BeamSearchConfig, BeamSearchDecoder, DecodeOutcome, Hypothesis};
pub use error::LexisError;
pub use metrics::{calc_cer, calc_wer};
pub use model::{AcousticModel, StubModel};
pub use scorer::{ExternalScorer, WordListScorer};
pub use vocab::{CharacterVocabulary, BLANK_INDEX, BLANK_SYMBOL};
