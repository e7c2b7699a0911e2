//! Frame-synchronous CTC prefix beam search.
//!
//! ## Algorithm
//!
//! The beam holds collapsed text prefixes, each with two log masses:
//! paths ending in blank and paths ending in the prefix's last symbol.
//! Per frame, for every surviving prefix:
//!
//! 1. Blank folds the prefix's total mass into its own blank-ending mass —
//!    the text never changes.
//! 2. A symbol equal to the last character splits: the symbol-ending mass
//!    collapses back into the same prefix (CTC repeat rule), while the
//!    blank-ending mass starts `text + c` (the repeat crossed a blank).
//! 3. Any other symbol starts `text + c` from the total mass.
//!
//! Candidates with identical text are merged in an arena (text → slot) by
//! log-sum-exp, then the beam is pruned to `beam_width` — mandatory every
//! frame, the search space is exponential without it.
//!
//! With `beam_width = 1` and no scorer the surviving prefix follows the
//! per-frame arg-max, reproducing [`greedy`](super::greedy) output.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ndarray::ArrayView2;
use tracing::{debug, warn};

use super::{log_sum_exp, validate_input, Hypothesis, LOG_ZERO};
use crate::error::{LexisError, Result};
use crate::scorer::ExternalScorer;
use crate::vocab::CharacterVocabulary;

/// Symbols below this frame log-probability are not expanded. ≈ ln(1e-5).
pub const DEFAULT_CUTOFF_LOG_PROB: f32 = -11.5;

/// Beam search parameters.
#[derive(Debug, Clone)]
pub struct BeamSearchConfig {
    /// Maximum number of prefixes kept per frame. Must be ≥ 1.
    pub beam_width: usize,
    /// Maximum number of hypotheses returned. May be smaller than the beam.
    pub max_results: usize,
    /// Frame log-probability below which a symbol is skipped entirely.
    pub cutoff_log_prob: f32,
    /// Optional wall-clock budget for one decode call. When exceeded the
    /// search stops after the current frame and the outcome is flagged
    /// `truncated` — never reported as a silent success.
    pub deadline: Option<Duration>,
}

impl Default for BeamSearchConfig {
    fn default() -> Self {
        Self {
            beam_width: 32,
            max_results: 10,
            cutoff_log_prob: DEFAULT_CUTOFF_LOG_PROB,
            deadline: None,
        }
    }
}

impl BeamSearchConfig {
    /// Default parameters with an explicit beam width.
    pub fn with_beam_width(beam_width: usize) -> Self {
        Self {
            beam_width,
            ..Self::default()
        }
    }
}

/// Result of one beam-search decode call.
#[derive(Debug, Clone)]
pub struct DecodeOutcome {
    /// Hypotheses sorted non-increasing by score, at most `max_results`.
    pub hypotheses: Vec<Hypothesis>,
    /// True when a configured deadline fired before all frames were consumed.
    pub truncated: bool,
}

impl DecodeOutcome {
    /// The top-ranked hypothesis, if any.
    pub fn best(&self) -> Option<&Hypothesis> {
        self.hypotheses.first()
    }
}

/// One prefix in the beam: collapsed text plus split log masses.
#[derive(Debug, Clone)]
struct Prefix {
    text: String,
    /// Log mass of paths ending in blank.
    p_blank: f32,
    /// Log mass of paths ending in the last symbol of `text`.
    p_symbol: f32,
    /// External scorer adjustment, fixed when the text first appears.
    lm_score: f32,
}

impl Prefix {
    /// The empty prefix before frame 0: certain via blank, impossible via symbol.
    fn root() -> Self {
        Self {
            text: String::new(),
            p_blank: 0.0,
            p_symbol: LOG_ZERO,
            lm_score: 0.0,
        }
    }

    fn total(&self) -> f32 {
        log_sum_exp(self.p_blank, self.p_symbol)
    }

    fn score(&self) -> f32 {
        self.total() + self.lm_score
    }
}

/// Per-frame arena of destination prefixes with O(1) amortized text → slot
/// lookup. Guarantees each text occupies exactly one slot, so merging is a
/// log-sum-exp into the existing slot rather than a duplicate entry.
struct BeamArena {
    slots: Vec<Prefix>,
    by_text: HashMap<String, usize>,
}

impl BeamArena {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            by_text: HashMap::with_capacity(capacity),
        }
    }

    /// Slot for `text`, creating it on first sight. The scorer is consulted
    /// exactly once per created slot, so the adjustment is never
    /// double-counted across the paths that merge into it.
    fn slot(&mut self, text: &str, scorer: Option<&dyn ExternalScorer>) -> &mut Prefix {
        if let Some(&index) = self.by_text.get(text) {
            return &mut self.slots[index];
        }
        let index = self.slots.len();
        self.by_text.insert(text.to_string(), index);
        self.slots.push(Prefix {
            text: text.to_string(),
            p_blank: LOG_ZERO,
            p_symbol: LOG_ZERO,
            lm_score: scorer.map_or(0.0, |s| s.score(text)),
        });
        &mut self.slots[index]
    }
}

/// Score-descending order with deterministic tie-breaks:
/// shorter text first, then lexicographic.
fn rank(a_score: f32, a_text: &str, b_score: f32, b_text: &str) -> Ordering {
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_text.chars().count().cmp(&b_text.chars().count()))
        .then_with(|| a_text.cmp(b_text))
}

/// CTC prefix beam search decoder.
///
/// Owns the vocabulary (shared via `Arc`) for its entire lifetime. One
/// decode call owns all of its search state, so a single decoder can serve
/// concurrent calls — see [`decode_batch`](Self::decode_batch).
pub struct BeamSearchDecoder {
    vocab: Arc<CharacterVocabulary>,
    config: BeamSearchConfig,
    scorer: Option<Arc<dyn ExternalScorer>>,
}

impl BeamSearchDecoder {
    pub fn new(vocab: Arc<CharacterVocabulary>, config: BeamSearchConfig) -> Self {
        Self {
            vocab,
            config,
            scorer: None,
        }
    }

    /// Attach an external scorer consulted once per newly created prefix.
    pub fn with_scorer(
        vocab: Arc<CharacterVocabulary>,
        config: BeamSearchConfig,
        scorer: Arc<dyn ExternalScorer>,
    ) -> Self {
        Self {
            vocab,
            config,
            scorer: Some(scorer),
        }
    }

    pub fn vocab(&self) -> &CharacterVocabulary {
        &self.vocab
    }

    pub fn config(&self) -> &BeamSearchConfig {
        &self.config
    }

    /// Decode the first `valid_frames` rows of a (frames, vocab)
    /// log-probability matrix into ranked hypotheses.
    ///
    /// # Errors
    /// - `LexisError::InvalidBeamWidth` if the configured width is 0.
    /// - `LexisError::ShapeMismatch` if columns ≠ vocabulary size.
    /// - `LexisError::InvalidLength` if `valid_frames` exceeds the rows.
    pub fn decode(
        &self,
        log_probs: ArrayView2<'_, f32>,
        valid_frames: usize,
    ) -> Result<DecodeOutcome> {
        if self.config.beam_width < 1 {
            return Err(LexisError::InvalidBeamWidth(self.config.beam_width));
        }
        validate_input(&self.vocab, &log_probs, valid_frames)?;

        let deadline = self.config.deadline.map(|budget| Instant::now() + budget);
        let scorer = self.scorer.as_deref();
        let symbols = self.vocab.symbols();
        let blank = self.vocab.blank_index();

        let mut beam = vec![Prefix::root()];
        let mut truncated = false;

        for (frame_index, frame) in log_probs
            .rows()
            .into_iter()
            .take(valid_frames)
            .enumerate()
        {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    warn!(
                        frame = frame_index,
                        total_frames = valid_frames,
                        "decode deadline exceeded — returning best beam found so far"
                    );
                    truncated = true;
                    break;
                }
            }

            let mut next = BeamArena::with_capacity(beam.len() * 2);

            for prefix in &beam {
                let total = prefix.total();
                let last = prefix.text.chars().last();

                for (index, &log_p) in frame.iter().enumerate() {
                    if log_p < self.config.cutoff_log_prob {
                        continue;
                    }

                    if index == blank {
                        // Text unchanged; all mass moves to the blank-ending bucket.
                        let slot = next.slot(&prefix.text, scorer);
                        slot.p_blank = log_sum_exp(slot.p_blank, total + log_p);
                        continue;
                    }

                    let symbol = symbols[index];
                    if Some(symbol) == last {
                        // Repeat of the last character: symbol-ending paths
                        // collapse back into the same prefix...
                        if prefix.p_symbol > LOG_ZERO {
                            let slot = next.slot(&prefix.text, scorer);
                            slot.p_symbol = log_sum_exp(slot.p_symbol, prefix.p_symbol + log_p);
                        }
                        // ...while blank-ending paths start a genuinely new
                        // character (the repeat crossed a blank).
                        if prefix.p_blank > LOG_ZERO {
                            let extended = extend(&prefix.text, symbol);
                            let slot = next.slot(&extended, scorer);
                            slot.p_symbol = log_sum_exp(slot.p_symbol, prefix.p_blank + log_p);
                        }
                    } else if total > LOG_ZERO {
                        let extended = extend(&prefix.text, symbol);
                        let slot = next.slot(&extended, scorer);
                        slot.p_symbol = log_sum_exp(slot.p_symbol, total + log_p);
                    }
                }
            }

            let mut pruned = next.slots;
            pruned.sort_by(|a, b| rank(a.score(), &a.text, b.score(), &b.text));
            pruned.truncate(self.config.beam_width);
            beam = pruned;
        }

        let mut hypotheses: Vec<Hypothesis> = beam
            .iter()
            .map(|prefix| Hypothesis {
                text: prefix.text.clone(),
                score: prefix.score(),
            })
            .collect();
        hypotheses.sort_by(|a, b| rank(a.score, &a.text, b.score, &b.text));
        hypotheses.truncate(self.config.max_results);

        debug!(
            frames = valid_frames,
            beam_width = self.config.beam_width,
            hypotheses = hypotheses.len(),
            truncated,
            "beam decode complete"
        );

        Ok(DecodeOutcome {
            hypotheses,
            truncated,
        })
    }

    /// Decode a batch of utterances in parallel.
    ///
    /// Each call owns its beam; the only shared state is the read-only
    /// vocabulary and the (internally synchronized) scorer, so utterances
    /// fan out to `workers` scoped threads over a crossbeam work queue.
    /// Results come back in input order. `workers <= 1` decodes inline.
    ///
    /// # Errors
    /// The first decode error from any utterance.
    pub fn decode_batch(
        &self,
        utterances: &[(ArrayView2<'_, f32>, usize)],
        workers: usize,
    ) -> Result<Vec<DecodeOutcome>> {
        if workers <= 1 || utterances.len() <= 1 {
            return utterances
                .iter()
                .map(|&(log_probs, valid_frames)| self.decode(log_probs, valid_frames))
                .collect();
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        for (index, &(log_probs, valid_frames)) in utterances.iter().enumerate() {
            // Unbounded queue, all receivers alive: send cannot fail here.
            let _ = job_tx.send((index, log_probs, valid_frames));
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers.min(utterances.len()) {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (index, log_probs, valid_frames) in job_rx.iter() {
                        let _ = result_tx.send((index, self.decode(log_probs, valid_frames)));
                    }
                });
            }
        });
        drop(result_tx);

        let mut outcomes: Vec<Option<DecodeOutcome>> = vec![None; utterances.len()];
        for (index, result) in result_rx.iter() {
            outcomes[index] = Some(result?);
        }
        outcomes
            .into_iter()
            .map(|outcome| {
                outcome.ok_or_else(|| {
                    LexisError::Other(anyhow::anyhow!("batch worker dropped a decode result"))
                })
            })
            .collect()
    }
}

fn extend(text: &str, symbol: char) -> String {
    let mut extended = String::with_capacity(text.len() + symbol.len_utf8());
    extended.push_str(text);
    extended.push(symbol);
    extended
}
