//! Greedy (best-path) CTC decoding.
//!
//! ## Algorithm
//!
//! 1. Take the per-frame arg-max index sequence.
//! 2. Collapse consecutive runs of the same index into one occurrence.
//! 3. Drop every blank.
//! 4. Map survivors through the vocabulary and concatenate.
//!
//! Deterministic, O(T), no search state. An empty input decodes to `""`.

use ndarray::ArrayView2;

use super::{frame_argmax, validate_input};
use crate::error::Result;
use crate::vocab::CharacterVocabulary;

/// Decode a sequence of per-frame arg-max indices.
///
/// # Errors
/// `LexisError::IndexOutOfRange` if any index is not a valid vocabulary slot.
pub fn decode_indices(vocab: &CharacterVocabulary, frame_indices: &[usize]) -> Result<String> {
    let mut text = String::with_capacity(frame_indices.len());
    let mut previous = None;

    for &index in frame_indices {
        // Look up first so bad indices fail even when they would collapse away.
        let symbol = vocab.decode(index)?;
        if previous != Some(index) && !vocab.is_blank(index) {
            text.push(symbol);
        }
        previous = Some(index);
    }

    Ok(text)
}

/// Arg-max each of the first `valid_frames` rows of a (frames, vocab)
/// log-probability matrix, then decode.
///
/// # Errors
/// `LexisError::ShapeMismatch` if the column count differs from the
/// vocabulary size; `LexisError::InvalidLength` if `valid_frames` exceeds
/// the row count.
pub fn decode_log_probs(
    vocab: &CharacterVocabulary,
    log_probs: ArrayView2<'_, f32>,
    valid_frames: usize,
) -> Result<String> {
    validate_input(vocab, &log_probs, valid_frames)?;
    decode_indices(vocab, &frame_argmax(&log_probs, valid_frames))
}
