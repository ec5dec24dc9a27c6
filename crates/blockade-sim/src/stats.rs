use serde::{Deserialize, Serialize};

/// Mean and sample variance of one metric across realizations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    /// (n-1)-denominator variance; 0 for a single sample.
    pub var: f64,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
            / (samples.len() - 1).max(1) as f64;
        Self { mean, var }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_variance() {
        let s = Stats::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(s.mean, 2.5, epsilon = 1e-12);
        assert_relative_eq!(s.var, 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_sample_has_zero_variance() {
        let s = Stats::from_samples(&[7.0]);
        assert_eq!(s, Stats { mean: 7.0, var: 0.0 });
        assert_eq!(Stats::from_samples(&[]), Stats::default());
    }
}
