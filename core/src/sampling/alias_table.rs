//! Alias Table

use crate::pbrt::*;
use thiserror::Error;

/// Errors raised while building a discrete distribution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    /// No weights were given.
    #[error("distribution has no entries")]
    Empty,

    /// A weight was negative.
    #[error("weight {weight} at index {index} is negative")]
    NegativeWeight { index: usize, weight: Float },

    /// A weight was NaN or infinite.
    #[error("weight at index {index} is not finite")]
    NonFiniteWeight { index: usize },

    /// All weights were zero.
    #[error("all {count} weights are zero")]
    ZeroSum { count: usize },
}

#[derive(Copy, Clone, Debug)]
struct Bin {
    /// Probability of keeping the bin's own index.
    q: Float,

    /// Index returned otherwise.
    alias: usize,
}

/// Samples a discrete distribution in O(1) per draw using Walker's alias
/// method (Vose's construction).
#[derive(Clone, Debug)]
pub struct AliasTable {
    bins: Vec<Bin>,
    weights: Vec<Float>,
    sum: f64,
}

impl AliasTable {
    /// Build an alias table from non-negative weights.
    ///
    /// * `weights` - Unnormalized weights.
    pub fn new(weights: &[Float]) -> Result<Self, DistributionError> {
        if weights.is_empty() {
            return Err(DistributionError::Empty);
        }
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() {
                return Err(DistributionError::NonFiniteWeight { index });
            }
            if weight < 0.0 {
                return Err(DistributionError::NegativeWeight { index, weight });
            }
        }

        let sum: f64 = weights.iter().map(|&w| w as f64).sum();
        if sum == 0.0 {
            return Err(DistributionError::ZeroSum {
                count: weights.len(),
            });
        }

        let n = weights.len();
        let mut scaled: Vec<f64> = weights.iter().map(|&w| w as f64 * n as f64 / sum).collect();
        let mut bins = vec![Bin { q: 1.0, alias: 0 }; n];

        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&i| scaled[i] < 1.0);
        while let (Some(&s), Some(&l)) = (small.last(), large.last()) {
            small.pop();
            bins[s] = Bin {
                q: scaled[s] as Float,
                alias: l,
            };
            scaled[l] -= 1.0 - scaled[s];
            if scaled[l] < 1.0 {
                large.pop();
                small.push(l);
            }
        }
        // Anything left over is 1 up to rounding error.
        for i in small.into_iter().chain(large) {
            bins[i] = Bin { q: 1.0, alias: i };
        }

        Ok(Self {
            bins,
            weights: weights.to_vec(),
            sum,
        })
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Returns true if there are no entries. Never true for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Returns a sampled index and its probability.
    ///
    /// * `u` - Uniform sample in [0, 1).
    pub fn sample(&self, u: Float) -> (usize, Float) {
        let n = self.bins.len();
        let scaled = u * n as Float;
        let i = (scaled as usize).min(n - 1);
        let up = scaled - i as Float;
        let index = if up < self.bins[i].q {
            i
        } else {
            self.bins[i].alias
        };
        (index, self.pmf(index))
    }

    /// Returns the probability of sampling a given index.
    ///
    /// * `index` - The index.
    pub fn pmf(&self, index: usize) -> Float {
        (self.weights[index] as f64 / self.sum) as Float
    }

    /// Returns the weight stored at a given index.
    ///
    /// * `index` - The index.
    pub fn weight(&self, index: usize) -> Float {
        self.weights[index]
    }

    /// Returns the mean weight, the integral of the weights treated as a
    /// piecewise-constant function over [0, 1].
    pub fn integral(&self) -> Float {
        (self.sum / self.bins.len() as f64) as Float
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RNG;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn pmf_is_exact() {
        let table = AliasTable::new(&[1.0, 3.0, 6.0]).unwrap();
        assert_eq!(table.pmf(2), 0.6);
        assert_eq!(table.len(), 3);
        assert!(approx_eq!(Float, table.integral(), 10.0 / 3.0, epsilon = 1e-6));
    }

    #[test]
    fn sample_frequency_converges() {
        let table = AliasTable::new(&[1.0, 3.0, 6.0]).unwrap();
        let mut rng = RNG::new(0);
        let n = 200_000;
        let mut counts = [0usize; 3];
        for _ in 0..n {
            let (i, p) = table.sample(rng.uniform_float());
            assert_eq!(p, table.pmf(i));
            counts[i] += 1;
        }
        let f2 = counts[2] as Float / n as Float;
        assert!((f2 - 0.6).abs() < 0.01, "frequency {}", f2);
        let f0 = counts[0] as Float / n as Float;
        assert!((f0 - 0.1).abs() < 0.01, "frequency {}", f0);
    }

    #[test]
    fn zero_weight_never_sampled() {
        let table = AliasTable::new(&[0.0, 1.0, 0.0]).unwrap();
        let mut rng = RNG::new(9);
        for _ in 0..1000 {
            assert_eq!(table.sample(rng.uniform_float()).0, 1);
        }
    }

    #[test]
    fn construction_errors() {
        assert_eq!(AliasTable::new(&[]).unwrap_err(), DistributionError::Empty);
        assert_eq!(
            AliasTable::new(&[0.0, 0.0]).unwrap_err(),
            DistributionError::ZeroSum { count: 2 }
        );
        assert_eq!(
            AliasTable::new(&[1.0, -1.0]).unwrap_err(),
            DistributionError::NegativeWeight {
                index: 1,
                weight: -1.0
            }
        );
        assert_eq!(
            AliasTable::new(&[1.0, Float::NAN]).unwrap_err(),
            DistributionError::NonFiniteWeight { index: 1 }
        );
    }

    proptest! {
        #[test]
        fn sampled_index_has_positive_weight(
            weights in prop::collection::vec(0.0..10.0f32, 1..20),
            u in 0.0..1.0f32,
        ) {
            prop_assume!(weights.iter().any(|&w| w > 0.0));
            let table = AliasTable::new(&weights).unwrap();
            let (i, p) = table.sample(u);
            prop_assert!(i < weights.len());
            prop_assert!(weights[i] > 0.0);
            prop_assert!(p > 0.0);
        }
    }
}
