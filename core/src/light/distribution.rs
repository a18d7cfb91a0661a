//! Light Distribution

use super::ArcLight;
use crate::pbrt::*;
use crate::sampling::*;
use clap::ValueEnum;

/// Light sampling strategy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LightSampleStrategy {
    /// Sample all light sources uniformly.
    #[default]
    Uniform,

    /// Samples light sources according to their emitted power.
    Power,
}

/// Discrete distribution used to pick a light source.
#[derive(Clone, Debug)]
pub struct LightDistribution {
    /// `None` when there are no lights.
    table: Option<AliasTable>,
}

impl LightDistribution {
    /// Create a new light distribution. When every light reports zero power
    /// the power strategy degrades to uniform selection.
    ///
    /// * `strategy` - The strategy to use for light sampling.
    /// * `lights`   - The lights in the scene.
    pub fn new(strategy: LightSampleStrategy, lights: &[ArcLight]) -> Self {
        if lights.is_empty() {
            return Self { table: None };
        }

        let uniform = || AliasTable::new(&vec![1.0; lights.len()]).ok();
        let table = match strategy {
            LightSampleStrategy::Uniform => uniform(),
            LightSampleStrategy::Power => {
                let powers: Vec<Float> = lights.iter().map(|l| l.power().y().max(0.0)).collect();
                match AliasTable::new(&powers) {
                    Ok(table) => Some(table),
                    Err(err) => {
                        warn!("Light power distribution unusable ({}). Using uniform.", err);
                        uniform()
                    }
                }
            }
        };
        Self { table }
    }

    /// Returns a sampled light index and the probability of choosing it, or
    /// `None` if there are no lights.
    ///
    /// * `u` - Uniform sample in [0, 1).
    pub fn sample(&self, u: Float) -> Option<(usize, Float)> {
        self.table.as_ref().map(|t| t.sample(u))
    }

    /// Returns the probability of choosing the light at `index`.
    ///
    /// * `index` - Light index.
    pub fn pmf(&self, index: usize) -> Float {
        self.table.as_ref().map_or(0.0, |t| t.pmf(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::*;
    use crate::interaction::*;
    use crate::light::*;
    use crate::spectrum::*;
    use float_cmp::*;
    use std::sync::Arc;

    struct Constant(Float);

    impl Light for Constant {
        fn get_type(&self) -> LightType {
            LightType::DELTA_POSITION_LIGHT
        }

        fn sample_li(&self, _hit: &Hit, _u: &Point2f) -> Li {
            Li::zero()
        }

        fn power(&self) -> Spectrum {
            Spectrum::new(self.0)
        }

        fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
            0.0
        }

        fn sample_le(&self, _u1: &Point2f, _u2: &Point2f) -> Le {
            Le::new(Ray::default(), Normal3f::ZERO, 0.0, 0.0, Spectrum::ZERO)
        }

        fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Pdf {
            Pdf::default()
        }
    }

    fn lights(powers: &[Float]) -> Vec<ArcLight> {
        powers
            .iter()
            .map(|&p| Arc::new(Constant(p)) as ArcLight)
            .collect()
    }

    #[test]
    fn uniform_ignores_power() {
        let d = LightDistribution::new(LightSampleStrategy::Uniform, &lights(&[1.0, 3.0]));
        assert!(approx_eq!(Float, d.pmf(0), 0.5, epsilon = 1e-6));
        assert!(approx_eq!(Float, d.pmf(1), 0.5, epsilon = 1e-6));
    }

    #[test]
    fn power_is_proportional() {
        let d = LightDistribution::new(LightSampleStrategy::Power, &lights(&[1.0, 3.0]));
        assert!(approx_eq!(Float, d.pmf(1), 0.75, epsilon = 1e-5));
        let (index, pmf) = d.sample(0.99).unwrap();
        assert_eq!(pmf, d.pmf(index));
    }

    #[test]
    fn power_falls_back_to_uniform_and_empty_has_none() {
        let d = LightDistribution::new(LightSampleStrategy::Power, &lights(&[0.0, 0.0]));
        assert!(approx_eq!(Float, d.pmf(0), 0.5, epsilon = 1e-6));

        let d = LightDistribution::new(LightSampleStrategy::Uniform, &[]);
        assert!(d.sample(0.5).is_none());
        assert_eq!(d.pmf(0), 0.0);
    }
}
