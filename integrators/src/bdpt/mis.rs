//! MIS Weights

use lucent_core::pbrt::*;
use lucent_core::sampling::MISHeuristic;

/// The densities of one path vertex as seen by one connection strategy.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Densities {
    /// Area density of sampling the vertex from the camera side.
    pub pdf_fwd: Float,

    /// Area density of sampling the vertex from the light side.
    pub pdf_rev: Float,

    /// The vertex scatters through a Dirac delta distribution.
    pub delta: bool,
}

/// Returns `f`, or 1 if `f` is zero. Delta vertices carry zero densities
/// which must not cancel out of the ratios.
///
/// * `f` - The value to remap.
fn remap0(f: Float) -> Float {
    if f != 0.0 {
        f
    } else {
        1.0
    }
}

/// Returns the weight of the strategy that joins `camera.len()` camera
/// subpath vertices with `light.len()` light subpath vertices.
///
/// The densities must already describe the connected path, i.e. the reverse
/// densities of the two connection endpoints and their predecessors are
/// those of the joined path and the endpoints are not marked delta. The
/// alternatives considered are every other split of the same vertices into
/// at least two camera vertices and any number of light vertices.
///
/// * `camera`             - Camera subpath densities, camera first.
/// * `light`              - Light subpath densities, light origin first.
/// * `light_origin_delta` - The light subpath starts on a delta light.
/// * `heuristic`          - How strategies are weighted.
pub fn mis_weight(
    camera: &[Densities],
    light: &[Densities],
    light_origin_delta: bool,
    heuristic: MISHeuristic,
) -> Float {
    let (s, t) = (camera.len(), light.len());
    if s + t == 2 {
        return 1.0;
    }

    let mut sum_ri = 0.0;
    let mut n_strategies = 0_usize;

    // Consider hypothetical connection strategies along the camera subpath.
    let mut ri = 1.0;
    for i in (2..s).rev() {
        ri *= remap0(camera[i].pdf_rev) / remap0(camera[i].pdf_fwd);
        if !camera[i].delta && !camera[i - 1].delta {
            sum_ri += ri;
            if ri > 0.0 {
                n_strategies += 1;
            }
        }
    }

    // Consider hypothetical connection strategies along the light subpath.
    ri = 1.0;
    for i in (0..t).rev() {
        ri *= remap0(light[i].pdf_rev) / remap0(light[i].pdf_fwd);
        let delta_light_vertex = if i > 0 {
            light[i - 1].delta
        } else {
            light_origin_delta
        };
        if !light[i].delta && !delta_light_vertex {
            sum_ri += ri;
            if ri > 0.0 {
                n_strategies += 1;
            }
        }
    }

    match heuristic {
        MISHeuristic::Balance => 1.0 / (1.0 + sum_ri),
        MISHeuristic::Uniform => 1.0 / (1 + n_strategies) as Float,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    /// Splits a path with per-vertex camera side densities `pc` and light side
    /// densities `pl` after `s` camera vertices.
    fn split(pc: &[Float], pl: &[Float], s: usize) -> (Vec<Densities>, Vec<Densities>) {
        let n = pc.len();
        let camera = (0..s)
            .map(|j| Densities {
                pdf_fwd: pc[j],
                pdf_rev: pl[j],
                delta: false,
            })
            .collect();
        let light = (s..n)
            .rev()
            .map(|j| Densities {
                pdf_fwd: pl[j],
                pdf_rev: pc[j],
                delta: false,
            })
            .collect();
        (camera, light)
    }

    /// Density of the strategy using `s` camera vertices.
    fn strategy_pdf(pc: &[Float], pl: &[Float], s: usize) -> Float {
        pc[..s].iter().product::<Float>() * pl[s..].iter().product::<Float>()
    }

    #[test]
    fn two_vertex_paths_have_unit_weight() {
        let camera = vec![Densities::default(); 2];
        assert_eq!(mis_weight(&camera, &[], false, MISHeuristic::Balance), 1.0);
        assert_eq!(mis_weight(&camera, &[], true, MISHeuristic::Uniform), 1.0);
    }

    #[test]
    fn uniform_weights_count_strategies() {
        let pc = [1.0, 2.0, 3.0, 4.0, 5.0];
        let pl = [5.0, 4.0, 3.0, 2.0, 1.0];
        for s in 2..=5 {
            let (camera, light) = split(&pc, &pl, s);
            let w = mis_weight(&camera, &light, false, MISHeuristic::Uniform);
            assert!(approx_eq!(Float, w, 0.25, epsilon = 1e-6));
        }
    }

    #[test]
    fn delta_light_origin_excludes_hitting_the_light() {
        let pc = [1.0, 0.5, 0.8, 0.3];
        let pl = [0.2, 0.9, 1.5, 0.7];
        let total: Float = (2..4)
            .map(|s| {
                let (camera, light) = split(&pc, &pl, s);
                mis_weight(&camera, &light, true, MISHeuristic::Balance)
            })
            .sum();
        assert!(approx_eq!(Float, total, 1.0, epsilon = 1e-5));
    }

    #[test]
    fn delta_camera_vertex_is_skipped() {
        let pc = [1.0, 0.5, 0.8, 0.3, 0.6];
        let pl = [0.2, 0.9, 1.5, 0.7, 0.4];
        let (mut camera, light) = split(&pc, &pl, 5);
        camera[2].delta = true;
        // Splits ending on either side of the delta vertex are impossible,
        // leaving this strategy and the one with four camera vertices.
        let w = mis_weight(&camera, &light, false, MISHeuristic::Uniform);
        assert!(approx_eq!(Float, w, 0.5, epsilon = 1e-6));
    }

    proptest! {
        #[test]
        fn balance_weights_match_strategy_densities(
            pc in prop::collection::vec(0.1..10.0f32, 5),
            pl in prop::collection::vec(0.1..10.0f32, 5),
            s in 2..=5usize,
        ) {
            let (camera, light) = split(&pc, &pl, s);
            let w = mis_weight(&camera, &light, false, MISHeuristic::Balance);
            let total: Float = (2..=5).map(|k| strategy_pdf(&pc, &pl, k)).sum();
            let expected = strategy_pdf(&pc, &pl, s) / total;
            prop_assert!(approx_eq!(Float, w, expected, epsilon = 1e-4));
        }

        #[test]
        fn balance_weights_sum_to_one(
            pc in prop::collection::vec(0.1..10.0f32, 6),
            pl in prop::collection::vec(0.1..10.0f32, 6),
        ) {
            let total: Float = (2..=6)
                .map(|s| {
                    let (camera, light) = split(&pc, &pl, s);
                    mis_weight(&camera, &light, false, MISHeuristic::Balance)
                })
                .sum();
            prop_assert!(approx_eq!(Float, total, 1.0, epsilon = 1e-4));
        }
    }
}
