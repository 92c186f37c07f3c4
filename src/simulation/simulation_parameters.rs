use bytemuck::{Pod, Zeroable};

/// Parameter block read by the step kernel. Mirrors the WGSL
/// `struct Params { particle_count: u32, pad: f32, bounds: vec2<f32> }`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SimulationParams {
    pub particle_count: u32,
    pub padding: f32,
    pub bounds: [f32; 2],
}

// Verify layout matches the kernel
const _: () = assert!(std::mem::size_of::<SimulationParams>() == 16);
const _: () = assert!(std::mem::offset_of!(SimulationParams, particle_count) == 0);
const _: () = assert!(std::mem::offset_of!(SimulationParams, padding) == 4);
const _: () = assert!(std::mem::offset_of!(SimulationParams, bounds) == 8);

impl SimulationParams {
    pub fn new(particle_count: u32, bounds: [f32; 2]) -> Self {
        Self {
            particle_count,
            padding: 0.0,
            bounds,
        }
    }
}
