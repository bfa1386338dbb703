//! Summary statistics over scenario samples.

use serde::Serialize;

/// Sample statistics with a normal-approximation 95% interval on the mean.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    /// Non-finite samples are ignored.
    pub fn from_samples(samples: &[f64]) -> Self {
        let finite: Vec<f64> = samples.iter().copied().filter(|x| x.is_finite()).collect();
        let n = finite.len();
        if n == 0 {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                ci_lower: 0.0,
                ci_upper: 0.0,
                min: 0.0,
                max: 0.0,
                n: 0,
            };
        }
        let mean = finite.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96;
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: finite.iter().copied().fold(f64::INFINITY, f64::min),
            max: finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}
