//! Decode latency benchmark over synthetic utterances.
//!
//! Generates peaked random log-probability matrices, times greedy and beam
//! decodes, and prints p50/p95/avg latency per decoder. Optionally writes a
//! JSON summary for trend tracking.
//!
//! ```text
//! cargo run --bin benchmark -- --frames 400 --iterations 50 --beam-width 32
//! ```

fn main() {
    if let Err(e) = run() {
        eprintln!("benchmark failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Instant;

    use lexis_core::decoder::greedy;
    use lexis_core::{BeamSearchConfig, BeamSearchDecoder, CharacterVocabulary};
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde::Serialize;
    use tracing::info;

    #[derive(Debug)]
    struct Args {
        frames: usize,
        iterations: usize,
        beam_width: usize,
        seed: u64,
        output: Option<PathBuf>,
    }

    #[derive(Debug, Clone, Serialize)]
    struct DecoderSummary {
        decoder: String,
        runs: usize,
        p50_latency_ms: f64,
        p95_latency_ms: f64,
        avg_latency_ms: f64,
    }

    #[derive(Debug, Serialize)]
    struct Summary {
        frames: usize,
        vocab_size: usize,
        beam_width: usize,
        iterations: usize,
        decoders: Vec<DecoderSummary>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = Args {
            frames: 400,
            iterations: 20,
            beam_width: 32,
            seed: 17,
            output: None,
        };

        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            let mut value = |name: &str| {
                it.next().ok_or_else(|| format!("{name} requires a value"))
            };
            match arg.as_str() {
                "--frames" => {
                    args.frames = value("--frames")?
                        .parse()
                        .map_err(|e| format!("--frames: {e}"))?;
                }
                "--iterations" => {
                    args.iterations = value("--iterations")?
                        .parse()
                        .map_err(|e| format!("--iterations: {e}"))?;
                }
                "--beam-width" => {
                    args.beam_width = value("--beam-width")?
                        .parse()
                        .map_err(|e| format!("--beam-width: {e}"))?;
                }
                "--seed" => {
                    args.seed = value("--seed")?
                        .parse()
                        .map_err(|e| format!("--seed: {e}"))?;
                }
                "--output" => {
                    args.output = Some(PathBuf::from(value("--output")?));
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(args)
    }

    /// Peaked random (frames, vocab) log-prob matrix: one dominant symbol
    /// per frame plus uniform residual mass, rows normalized then logged.
    fn synthetic_matrix(frames: usize, vocab_size: usize, rng: &mut StdRng) -> Array2<f32> {
        let mut probs = Array2::<f32>::zeros((frames, vocab_size));
        for t in 0..frames {
            let peak = rng.gen_range(0..vocab_size);
            let peak_mass = rng.gen_range(0.7f32..0.95);
            let residual = (1.0 - peak_mass) / (vocab_size - 1) as f32;
            for v in 0..vocab_size {
                let p = if v == peak { peak_mass } else { residual };
                probs[[t, v]] = p.ln();
            }
        }
        probs
    }

    fn percentile(sorted_ms: &[f64], pct: f64) -> f64 {
        if sorted_ms.is_empty() {
            return 0.0;
        }
        let rank = (pct / 100.0 * (sorted_ms.len() - 1) as f64).round() as usize;
        sorted_ms[rank.min(sorted_ms.len() - 1)]
    }

    fn summarize(decoder: &str, mut latencies_ms: Vec<f64>) -> DecoderSummary {
        latencies_ms.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let avg = latencies_ms.iter().sum::<f64>() / latencies_ms.len().max(1) as f64;
        DecoderSummary {
            decoder: decoder.to_string(),
            runs: latencies_ms.len(),
            p50_latency_ms: percentile(&latencies_ms, 50.0),
            p95_latency_ms: percentile(&latencies_ms, 95.0),
            avg_latency_ms: avg,
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;
    if args.iterations == 0 {
        return Err("--iterations must be at least 1".into());
    }

    let vocab = Arc::new(
        CharacterVocabulary::from_alphabet_str("abcdefghijklmnopqrstuvwxyz '")
            .map_err(|e| e.to_string())?,
    );
    let decoder = BeamSearchDecoder::new(
        Arc::clone(&vocab),
        BeamSearchConfig::with_beam_width(args.beam_width),
    );

    info!(
        frames = args.frames,
        vocab_size = vocab.size(),
        beam_width = args.beam_width,
        iterations = args.iterations,
        "starting decode benchmark"
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let matrices: Vec<Array2<f32>> = (0..args.iterations)
        .map(|_| synthetic_matrix(args.frames, vocab.size(), &mut rng))
        .collect();

    let mut greedy_ms = Vec::with_capacity(args.iterations);
    for matrix in &matrices {
        let start = Instant::now();
        let text =
            greedy::decode_log_probs(&vocab, matrix.view(), args.frames).map_err(|e| e.to_string())?;
        greedy_ms.push(start.elapsed().as_secs_f64() * 1e3);
        std::hint::black_box(text);
    }

    let mut beam_ms = Vec::with_capacity(args.iterations);
    for matrix in &matrices {
        let start = Instant::now();
        let outcome = decoder
            .decode(matrix.view(), args.frames)
            .map_err(|e| e.to_string())?;
        beam_ms.push(start.elapsed().as_secs_f64() * 1e3);
        std::hint::black_box(outcome);
    }

    let summary = Summary {
        frames: args.frames,
        vocab_size: vocab.size(),
        beam_width: args.beam_width,
        iterations: args.iterations,
        decoders: vec![summarize("greedy", greedy_ms), summarize("beam", beam_ms)],
    };

    for d in &summary.decoders {
        println!(
            "{:>8}: p50 {:.3} ms | p95 {:.3} ms | avg {:.3} ms ({} runs)",
            d.decoder, d.p50_latency_ms, d.p95_latency_ms, d.avg_latency_ms, d.runs
        );
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| e.to_string())?;
        info!(path = %path.display(), "wrote benchmark summary");
    }

    Ok(())
}
