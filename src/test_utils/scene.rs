use rand::{rngs::StdRng, SeedableRng};

use crate::simulation::Particle;

pub struct SceneBuilder;

impl SceneBuilder {
    /// `count` particles with seeded random positions inside `bounds`.
    pub fn scattered(count: usize, bounds: [f32; 2], speed: f32, seed: u64) -> Vec<Particle> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| Particle::random(&mut rng, bounds, speed))
            .collect()
    }

    /// Particles on a diagonal line, moving outwards so some hit the walls
    /// on the first step.
    pub fn diagonal(count: usize, bounds: [f32; 2]) -> Vec<Particle> {
        (0..count)
            .map(|i| {
                let t = (i as f32 + 0.5) / count as f32;
                let position = [t * bounds[0], t * bounds[1]];
                let velocity = if t < 0.5 { [-3.0, -2.0] } else { [3.0, 2.0] };
                Particle::new(position, velocity)
            })
            .collect()
    }

    /// Values that stress exact byte preservation: zeros, negatives, tiny and
    /// huge magnitudes.
    pub fn boundary_values() -> Vec<Particle> {
        vec![
            Particle::new([0.0, -0.0], [0.0, 0.0]),
            Particle::new([-1.5, -1.0e-30], [f32::MIN_POSITIVE, -f32::MIN_POSITIVE]),
            Particle::new([f32::MAX, f32::MIN], [1.0e30, -1.0e30]),
            Particle::new([99.999_99, 55.999_99], [-5.0, 5.0]),
        ]
    }
}
