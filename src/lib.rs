//! GPU particle simulation driven by a single compute kernel.
//!
//! Particles live in one storage buffer. Each frame the driver dispatches
//! the kernel over every particle, waits for the device, reads the buffer
//! back and hands it to a [`render::FrameSink`].

pub mod compute;
pub mod cpu_ref;
pub mod error;
pub mod gpu;
pub mod kernel;
pub mod render;
pub mod simulation;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{BufferError, ComputeError, GpuError, KernelError, LayoutError, SimulationError};
pub use gpu::GpuContext;
pub use kernel::KernelBlob;
pub use simulation::{Particle, RunSummary, Simulation, SimulationConfig, SimulationParams};
