//! Acoustic model seam.
//!
//! The decoding engine never runs inference itself — it only consumes the
//! (frames, vocab) log-probability matrix an acoustic backend produces. The
//! `AcousticModel` trait is that boundary; swap in an ONNX conformer, a
//! candle network, or the deterministic `StubModel` without touching a
//! decoder.
//!
//! `&mut self` on `log_probs` intentionally expresses that backends are
//! stateful — streaming encoders, RNN hidden states, KV caches.

use ndarray::Array2;
use tracing::debug;

use crate::error::{LexisError, Result};

/// Contract for acoustic backends feeding the decoders.
pub trait AcousticModel: Send + 'static {
    /// One-time warm-up: load weights, pre-allocate caches, run a dummy
    /// forward pass. Called once before the first utterance.
    ///
    /// # Errors
    /// Returns an error if model files are missing or corrupt.
    fn warm_up(&mut self) -> Result<()>;

    /// Map mono f32 samples to a (frames, vocab_size) matrix of per-frame
    /// log-probabilities. Every row's exponentials sum to 1.
    fn log_probs(&mut self, samples: &[f32]) -> Result<Array2<f32>>;

    /// Reset internal state between utterances.
    fn reset(&mut self);
}

/// Frame log-probability the stub assigns to its scripted index.
const STUB_PEAK: f32 = 0.0;
/// Frame log-probability for everything else. Effectively one-hot.
const STUB_FLOOR: f32 = -30.0;

/// Deterministic stub backend: ignores the audio content and emits a fixed
/// index script as a near-one-hot matrix. Lets the decode → metrics path be
/// exercised end-to-end without any real inference.
#[derive(Debug)]
pub struct StubModel {
    vocab_size: usize,
    script: Vec<usize>,
    utterance_count: u32,
}

impl StubModel {
    /// # Errors
    /// `LexisError::Inference` if any scripted index is outside the
    /// vocabulary.
    pub fn new(vocab_size: usize, script: Vec<usize>) -> Result<Self> {
        if let Some(&bad) = script.iter().find(|&&index| index >= vocab_size) {
            return Err(LexisError::Inference(format!(
                "stub script index {bad} outside vocabulary of size {vocab_size}"
            )));
        }
        Ok(Self {
            vocab_size,
            script,
            utterance_count: 0,
        })
    }
}

impl AcousticModel for StubModel {
    fn warm_up(&mut self) -> Result<()> {
        debug!("StubModel::warm_up — no-op");
        Ok(())
    }

    fn log_probs(&mut self, samples: &[f32]) -> Result<Array2<f32>> {
        self.utterance_count += 1;
        debug!(
            utterance = self.utterance_count,
            samples = samples.len(),
            frames = self.script.len(),
            "StubModel emitting scripted frames"
        );

        let mut probs = Array2::from_elem((self.script.len(), self.vocab_size), STUB_FLOOR);
        for (t, &index) in self.script.iter().enumerate() {
            probs[[t, index]] = STUB_PEAK;
        }
        Ok(probs)
    }

    fn reset(&mut self) {
        debug!("StubModel::reset");
    }
}
