use crate::simulation::Particle;

const JUST_BELOW_ONE: f32 = 0.999_999_94;

/// Host version of the builtin `particle_step` kernel.
pub fn step_cpu(particles: &mut [Particle], bounds: [f32; 2]) {
    let upper = [bounds[0] * JUST_BELOW_ONE, bounds[1] * JUST_BELOW_ONE];

    for particle in particles.iter_mut() {
        for axis in 0..2 {
            let moved = particle.position[axis] + particle.velocity[axis];
            if moved < 0.0 || moved > upper[axis] {
                particle.velocity[axis] = -particle.velocity[axis];
            }
            particle.position[axis] = moved.clamp(0.0, upper[axis]);
        }
    }
}

/// Host version of the builtin `particle_drift` kernel.
pub fn drift_cpu(particles: &mut [Particle]) {
    for particle in particles.iter_mut() {
        particle.position[0] += particle.velocity[0];
        particle.position[1] += particle.velocity[1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_reflects_at_upper_wall() {
        let mut particles = [Particle::new([99.5, 10.0], [1.0, 0.0])];
        step_cpu(&mut particles, [100.0, 56.0]);

        assert!(particles[0].position[0] < 100.0);
        assert_eq!(particles[0].velocity[0], -1.0);
        assert_eq!(particles[0].position[1], 10.0);
    }

    #[test]
    fn test_step_reflects_at_lower_wall() {
        let mut particles = [Particle::new([5.0, 0.2], [0.0, -0.5])];
        step_cpu(&mut particles, [100.0, 56.0]);

        assert_eq!(particles[0].position[1], 0.0);
        assert_eq!(particles[0].velocity[1], 0.5);
    }

    #[test]
    fn test_drift_has_no_bounds() {
        let mut particles = [Particle::new([-1.0, 200.0], [-1.0, 1.0])];
        drift_cpu(&mut particles);
        assert_eq!(particles[0].position, [-2.0, 201.0]);
    }
}
