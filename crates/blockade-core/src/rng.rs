use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Bernoulli, Distribution};

/// Seedable random stream owned by whichever component draws randomness.
pub struct RngStream {
    rng: ChaCha20Rng,
}

impl RngStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Independent stream for realization `stream_id` under `global_seed`.
    pub fn from_stream_id(global_seed: u64, stream_id: u64) -> Self {
        let seed = global_seed.wrapping_add(stream_id.wrapping_mul(0x9e3779b97f4a7c15));
        Self::new(seed)
    }

    /// One independent-cascade coin flip. `p` outside [0, 1] never fires.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        Bernoulli::new(p)
            .map(|coin| coin.sample(&mut self.rng))
            .unwrap_or(false)
    }

    /// Uniform draw from [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// `amount` distinct items drawn without replacement, in draw order.
    pub fn sample_distinct<T: Clone>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        let amount = amount.min(items.len());
        index::sample(&mut self.rng, items.len(), amount)
            .into_iter()
            .map(|i| items[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streams_are_reproducible() {
        let mut a = RngStream::from_stream_id(42, 7);
        let mut b = RngStream::from_stream_id(42, 7);
        let xs: Vec<f64> = (0..16).map(|_| a.uniform()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.uniform()).collect();
        assert_eq!(xs, ys);

        let mut c = RngStream::from_stream_id(42, 8);
        assert_ne!(xs[0], c.uniform());
    }

    #[test]
    fn test_bernoulli_extremes() {
        let mut rng = RngStream::new(1);
        assert!((0..1000).all(|_| rng.bernoulli(1.0)));
        assert!((0..1000).all(|_| !rng.bernoulli(0.0)));
        assert!(!rng.bernoulli(1.5));
    }

    #[test]
    fn test_sample_distinct() {
        let mut rng = RngStream::new(3);
        let items: Vec<usize> = (10..30).collect();
        let mut picked = rng.sample_distinct(&items, 5);
        assert_eq!(picked.len(), 5);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 5);
        assert!(picked.iter().all(|p| items.contains(p)));
        assert_eq!(rng.sample_distinct(&items, 50).len(), 20);
    }
}
