use bytemuck::{Pod, Zeroable};
use rand::Rng;

/// One particle as laid out in the storage buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<Particle>() == 16);
const _: () = assert!(std::mem::offset_of!(Particle, position) == 0);
const _: () = assert!(std::mem::offset_of!(Particle, velocity) == 8);

impl Particle {
    pub fn new(position: [f32; 2], velocity: [f32; 2]) -> Self {
        Self { position, velocity }
    }

    /// Uniform position in `[0, bounds)`, velocity in `[-speed, speed]` per axis.
    pub fn random<R: Rng>(rng: &mut R, bounds: [f32; 2], speed: f32) -> Self {
        let mut position = [0.0; 2];
        let mut velocity = [0.0; 2];
        for axis in 0..2 {
            position[axis] = rng.gen_range(0.0..bounds[axis]);
            velocity[axis] = if speed > 0.0 {
                rng.gen_range(-speed..=speed)
            } else {
                0.0
            };
        }
        Self { position, velocity }
    }

    pub fn is_within(&self, bounds: [f32; 2]) -> bool {
        (0..2).all(|axis| self.position[axis] >= 0.0 && self.position[axis] < bounds[axis])
    }
}
