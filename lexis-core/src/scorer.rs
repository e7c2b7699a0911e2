//! External rescoring hook for beam search.
//!
//! The decoder consults the scorer exactly once per prefix it creates — the
//! returned value is stored on the prefix and reused when paths merge, so an
//! adjustment can never be double-counted. Scores are log-domain and
//! *absolute* for the candidate text: as a prefix grows, each new text is
//! scored fresh, so implementations must return cumulative adjustments.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

/// Log-domain score adjustment for a candidate text.
///
/// Must behave as a pure function of the text: the decoder may call `score`
/// many times per frame and ranks prefixes by the stored value, so a result
/// that varies between calls for the same text corrupts the search. Internal
/// caching is fine — it just has to be invisible.
pub trait ExternalScorer: Send + Sync {
    fn score(&self, text: &str) -> f32;
}

/// Flat log-bonus per completed word found in a known-word set.
///
/// Only words terminated by a later whitespace count — the word still being
/// extended at the end of the candidate is not scored until a boundary
/// closes it. This keeps the cumulative score monotone as a prefix grows.
pub struct WordListScorer {
    words: HashSet<String>,
    bonus: f32,
    /// Memo of recent lookups. Interior mutability keeps `score(&self)`
    /// pure in effect while skipping repeated scans of hot prefixes.
    cache: RwLock<HashMap<String, f32>>,
}

impl WordListScorer {
    /// `bonus` is the log-score added per recognized completed word.
    pub fn new<I, S>(words: I, bonus: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            bonus,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn completed_bonus(&self, text: &str) -> f32 {
        // Everything before the last whitespace is completed; the tail word
        // may still be mid-extension.
        let completed = match text.rfind(char::is_whitespace) {
            Some(boundary) => &text[..boundary],
            None => return 0.0,
        };
        let hits = completed
            .split_whitespace()
            .filter(|word| self.words.contains(*word))
            .count();
        self.bonus * hits as f32
    }
}

impl ExternalScorer for WordListScorer {
    fn score(&self, text: &str) -> f32 {
        if let Some(&cached) = self.cache.read().get(text) {
            return cached;
        }
        let value = self.completed_bonus(text);
        self.cache.write().insert(text.to_string(), value);
        value
    }
}
