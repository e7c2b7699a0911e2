//! Waveform transform seam for training-time augmentation.
//!
//! Transforms are plain `samples in → samples out` functions; anything
//! random about them draws from an explicitly passed source — there is no
//! hidden global RNG, so a seeded run is reproducible end to end.
//! Randomized *application* (apply-with-probability-p) is its own
//! combinator, `RandomApply`, rather than a convention inside each
//! transform.

use rand::{Rng, RngCore};

/// A waveform-level transform.
pub trait WaveTransform {
    /// Transform a buffer of mono f32 samples. Implementations draw any
    /// randomness from `rng`, never from thread-local state.
    fn apply(&self, samples: Vec<f32>, rng: &mut dyn RngCore) -> Vec<f32>;
}

/// Applies the inner transform with probability `probability`, otherwise
/// passes the samples through untouched.
pub struct RandomApply<T: WaveTransform> {
    inner: T,
    probability: f64,
}

impl<T: WaveTransform> RandomApply<T> {
    pub fn new(inner: T, probability: f64) -> Self {
        Self {
            inner,
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl<T: WaveTransform> WaveTransform for RandomApply<T> {
    fn apply(&self, samples: Vec<f32>, rng: &mut dyn RngCore) -> Vec<f32> {
        if rng.gen_bool(self.probability) {
            self.inner.apply(samples, rng)
        } else {
            samples
        }
    }
}

/// Additive uniform noise in `[-amplitude, amplitude]` per sample.
pub struct UniformNoise {
    amplitude: f32,
}

impl UniformNoise {
    pub fn new(amplitude: f32) -> Self {
        Self {
            amplitude: amplitude.abs(),
        }
    }
}

impl WaveTransform for UniformNoise {
    fn apply(&self, mut samples: Vec<f32>, rng: &mut dyn RngCore) -> Vec<f32> {
        if self.amplitude == 0.0 {
            return samples;
        }
        for sample in &mut samples {
            *sample += rng.gen_range(-self.amplitude..=self.amplitude);
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn noise_stays_within_amplitude() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = UniformNoise::new(0.1);
        let samples = noise.apply(vec![0.0; 512], &mut rng);
        assert!(samples.iter().all(|s| s.abs() <= 0.1));
    }

    #[test]
    fn zero_amplitude_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = UniformNoise::new(0.0);
        let samples = noise.apply(vec![0.25; 16], &mut rng);
        assert_eq!(samples, vec![0.25; 16]);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let noise = UniformNoise::new(0.05);
        let mut first_rng = StdRng::seed_from_u64(42);
        let mut second_rng = StdRng::seed_from_u64(42);
        let first = noise.apply(vec![0.1; 64], &mut first_rng);
        let second = noise.apply(vec![0.1; 64], &mut second_rng);
        assert_eq!(first, second);
    }

    #[test]
    fn probability_zero_never_applies() {
        let mut rng = StdRng::seed_from_u64(3);
        let transform = RandomApply::new(UniformNoise::new(1.0), 0.0);
        let samples = transform.apply(vec![0.5; 32], &mut rng);
        assert_eq!(samples, vec![0.5; 32]);
    }

    #[test]
    fn probability_one_always_applies() {
        let mut rng = StdRng::seed_from_u64(3);
        let transform = RandomApply::new(UniformNoise::new(1.0), 1.0);
        let samples = transform.apply(vec![0.5; 32], &mut rng);
        assert_ne!(samples, vec![0.5; 32]);
    }
}
