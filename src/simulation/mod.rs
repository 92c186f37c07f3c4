//! The simulation driver: owns particle state, keeps it mirrored in a GPU
//! buffer, and advances it one kernel dispatch per frame.

mod config;
mod particle;
mod simulation_parameters;

pub use config::SimulationConfig;
pub use particle::Particle;
pub use simulation_parameters::SimulationParams;

use std::time::{Duration, Instant};

use rand::{rngs::StdRng, SeedableRng};

use crate::compute::{run_once, BindingRole, BufferRole, DispatchDescriptor, DispatchPipeline, GpuBuffer};
use crate::error::SimulationError;
use crate::gpu::GpuContext;
use crate::kernel::KernelBlob;
use crate::render::FrameSink;

/// Totals for a finished [`Simulation::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed: Duration,
}

pub struct Simulation<'g> {
    gpu: &'g GpuContext,
    config: SimulationConfig,
    kernel: KernelBlob,
    roles: Vec<BindingRole>,
    particles: Vec<Particle>,
    params: Option<SimulationParams>,
    particle_buffer: GpuBuffer,
    params_buffer: Option<GpuBuffer>,
}

impl<'g> Simulation<'g> {
    /// Seeds `config.particle_count` particles inside the bounds and uploads them.
    pub fn new(gpu: &'g GpuContext, config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let particles = (0..config.particle_count)
            .map(|_| Particle::random(&mut rng, config.bounds, config.speed))
            .collect();

        Self::with_particles(gpu, config, particles)
    }

    /// Uses the given particles as the initial state. The particle count in
    /// `config` is replaced by `particles.len()`.
    pub fn with_particles(
        gpu: &'g GpuContext,
        mut config: SimulationConfig,
        particles: Vec<Particle>,
    ) -> Result<Self, SimulationError> {
        config.particle_count = u32::try_from(particles.len()).map_err(|_| {
            SimulationError::InvalidConfig(format!("{} particles is too many", particles.len()))
        })?;
        config.validate()?;

        let kernel = Self::load_kernel(&config)?;

        let particle_buffer =
            GpuBuffer::from_slice(gpu, "Particle Buffer", &particles, BufferRole::Storage)?;

        let (roles, params, params_buffer) = if config.use_params {
            let params = SimulationParams::new(config.particle_count, config.bounds);
            let buffer =
                GpuBuffer::from_slice(gpu, "Params Buffer", &[params], BufferRole::Parameter)?;
            (
                vec![BindingRole::Storage, BindingRole::Uniform],
                Some(params),
                Some(buffer),
            )
        } else {
            (vec![BindingRole::Storage], None, None)
        };

        log::info!(
            "Simulation ready: {} particles in {:?}, kernel '{}'",
            config.particle_count,
            config.bounds,
            kernel.name()
        );

        Ok(Self {
            gpu,
            config,
            kernel,
            roles,
            particles,
            params,
            particle_buffer,
            params_buffer,
        })
    }

    fn load_kernel(config: &SimulationConfig) -> Result<KernelBlob, SimulationError> {
        let kernel = match &config.kernel {
            Some(path) => KernelBlob::load(path)?.with_workgroup_size(config.workgroup_size),
            None if config.use_params => KernelBlob::particle_step(),
            None => KernelBlob::particle_drift(),
        };
        Ok(kernel)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn params(&self) -> Option<&SimulationParams> {
        self.params.as_ref()
    }

    /// Advances one frame, building and tearing down the pipeline around the
    /// single dispatch.
    pub fn step(&mut self) -> Result<&[Particle], SimulationError> {
        let mut buffers = vec![&self.particle_buffer];
        if let Some(params) = &self.params_buffer {
            buffers.push(params);
        }

        let descriptor = DispatchDescriptor::new(&self.kernel, &self.roles, &buffers)?;
        run_once(self.gpu, &descriptor, self.config.particle_count, self.config.wait)?;

        self.particle_buffer
            .read_into(self.gpu, bytemuck::cast_slice_mut(&mut self.particles))?;
        Ok(&self.particles)
    }

    /// Runs `config.frames` frames against one pipeline, handing each frame to
    /// `sink`.
    pub fn run<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Result<RunSummary, SimulationError> {
        let gpu = self.gpu;
        let mut buffers = vec![&self.particle_buffer];
        if let Some(params) = &self.params_buffer {
            buffers.push(params);
        }

        let descriptor = DispatchDescriptor::new(&self.kernel, &self.roles, &buffers)?;
        let pipeline = DispatchPipeline::open(gpu, &descriptor)?;

        let start = Instant::now();
        for frame in 0..self.config.frames {
            pipeline.run(gpu, self.config.particle_count, self.config.wait)?;
            self.particle_buffer
                .read_into(gpu, bytemuck::cast_slice_mut(&mut self.particles))?;
            sink.present(frame, &self.particles)?;
            log::trace!("Frame {} presented", frame);

            if !self.config.frame_interval.is_zero() {
                std::thread::sleep(self.config.frame_interval);
            }
        }

        pipeline.close();

        let summary = RunSummary {
            frames: self.config.frames,
            elapsed: start.elapsed(),
        };
        log::info!("Ran {} frames in {:.2?}", summary.frames, summary.elapsed);
        Ok(summary)
    }

    /// Destroys the GPU buffers and hands back the final host state.
    pub fn finish(self) -> Vec<Particle> {
        if let Some(params_buffer) = self.params_buffer {
            params_buffer.destroy();
        }
        self.particle_buffer.destroy();
        self.particles
    }
}
