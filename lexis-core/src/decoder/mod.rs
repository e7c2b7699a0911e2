//! CTC decoders.
//!
//! Both decoders consume a (frames, vocab) matrix of per-frame
//! log-probabilities — rows beyond `valid_frames` are padding and are never
//! read. `greedy` is the O(T) best-path collapse; `beam` is the
//! frame-synchronous prefix search with blank/non-blank mass splitting.

pub mod beam;
pub mod greedy;

pub use beam::{BeamSearchConfig, BeamSearchDecoder, DecodeOutcome};

use ndarray::ArrayView2;
use serde::Serialize;

use crate::error::{LexisError, Result};
use crate::vocab::CharacterVocabulary;

/// A decoded hypothesis: collapsed text plus its log-domain score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hypothesis {
    pub text: String,
    pub score: f32,
}

/// log(0): the mass of an impossible path.
pub(crate) const LOG_ZERO: f32 = f32::NEG_INFINITY;

/// Numerically stable log(exp(a) + exp(b)).
pub(crate) fn log_sum_exp(a: f32, b: f32) -> f32 {
    let max = a.max(b);
    if max == LOG_ZERO {
        LOG_ZERO
    } else {
        max + ((a - max).exp() + (b - max).exp()).ln()
    }
}

/// Per-frame arg-max over the first `valid_frames` rows.
///
/// Ties resolve to the lowest index, so the result is deterministic.
pub(crate) fn frame_argmax(log_probs: &ArrayView2<'_, f32>, valid_frames: usize) -> Vec<usize> {
    log_probs
        .rows()
        .into_iter()
        .take(valid_frames)
        .map(|row| {
            let mut best = 0;
            let mut best_value = LOG_ZERO;
            for (index, &value) in row.iter().enumerate() {
                if value > best_value {
                    best = index;
                    best_value = value;
                }
            }
            best
        })
        .collect()
}

/// Shared input validation for both decoders.
pub(crate) fn validate_input(
    vocab: &CharacterVocabulary,
    log_probs: &ArrayView2<'_, f32>,
    valid_frames: usize,
) -> Result<()> {
    if log_probs.ncols() != vocab.size() {
        return Err(LexisError::ShapeMismatch {
            columns: log_probs.ncols(),
            vocab_size: vocab.size(),
        });
    }
    if valid_frames > log_probs.nrows() {
        return Err(LexisError::InvalidLength {
            valid_frames,
            frames: log_probs.nrows(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn log_sum_exp_matches_linear_domain() {
        let a = 0.3f32.ln();
        let b = 0.2f32.ln();
        assert_relative_eq!(log_sum_exp(a, b), 0.5f32.ln(), epsilon = 1e-6);
    }

    #[test]
    fn log_sum_exp_absorbs_log_zero() {
        assert_relative_eq!(log_sum_exp(LOG_ZERO, -1.5), -1.5);
        assert_relative_eq!(log_sum_exp(-1.5, LOG_ZERO), -1.5);
        assert_eq!(log_sum_exp(LOG_ZERO, LOG_ZERO), LOG_ZERO);
    }

    #[test]
    fn log_sum_exp_is_stable_for_large_negatives() {
        // Naive exp() of either operand underflows to 0.
        let result = log_sum_exp(-1000.0, -1000.0);
        assert_relative_eq!(result, -1000.0 + 2.0f32.ln(), epsilon = 1e-3);
    }

    #[test]
    fn frame_argmax_respects_valid_frames() {
        let probs = array![[0.1f32, 0.9], [0.8, 0.2], [0.0, 1.0]];
        let indices = frame_argmax(&probs.view(), 2);
        assert_eq!(indices, vec![1, 0]);
    }

    #[test]
    fn frame_argmax_ties_pick_lowest_index() {
        let probs = array![[0.5f32, 0.5]];
        assert_eq!(frame_argmax(&probs.view(), 1), vec![0]);
    }
}
