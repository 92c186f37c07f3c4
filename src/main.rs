//! Terminal particle simulator.
//!
//! Seeds particles inside a rectangle, advances them with a compute kernel
//! every frame and paints them as dots. Flags mirror
//! [`particle_compute::SimulationConfig`]; `RUST_LOG` controls logging.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use particle_compute::{
    compute::WaitPolicy,
    render::{FrameSink, HeadlessSink, TerminalConfig, TerminalRenderer},
    GpuContext, Simulation, SimulationConfig,
};

const HEADLESS_LOG_INTERVAL: u64 = 1000;

#[derive(Parser, Debug)]
#[command(name = "particle_compute")]
#[command(about = "GPU compute particle simulation rendered in the terminal")]
struct Args {
    /// Number of particles
    #[arg(long, default_value = "100")]
    particles: u32,

    /// Width of the simulation rectangle
    #[arg(long, default_value = "100")]
    bounds_x: f32,

    /// Height of the simulation rectangle
    #[arg(long, default_value = "56")]
    bounds_y: f32,

    /// Largest initial speed per axis, in units per frame
    #[arg(long, default_value = "0.5")]
    velocity: f32,

    /// Number of frames to run
    #[arg(long, default_value = "100000")]
    frames: u64,

    /// Pause between frames in milliseconds
    #[arg(long, default_value = "1")]
    interval_ms: u64,

    /// Seed for the initial particle state
    #[arg(long)]
    seed: Option<u64>,

    /// Compiled kernel (SPIR-V) or WGSL source to run instead of the builtin
    #[arg(long)]
    kernel: Option<PathBuf>,

    /// Workgroup size declared by --kernel
    #[arg(long, default_value = "1")]
    workgroup_size: u32,

    /// Do not bind a parameter buffer
    #[arg(long)]
    no_params: bool,

    /// Give up waiting on a dispatch after this many milliseconds
    #[arg(long)]
    wait_timeout_ms: Option<u64>,

    /// Visible width in simulation units
    #[arg(long, default_value = "106")]
    width: u32,

    /// Visible height in simulation units
    #[arg(long, default_value = "56")]
    height: u32,

    /// Skip terminal output
    #[arg(long)]
    headless: bool,
}

impl Args {
    fn simulation_config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::default()
            .with_particle_count(self.particles)
            .with_bounds([self.bounds_x, self.bounds_y])
            .with_speed(self.velocity)
            .with_frames(self.frames)
            .with_frame_interval(Duration::from_millis(self.interval_ms))
            .with_params(!self.no_params);

        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(kernel) = &self.kernel {
            config = config.with_kernel(kernel.clone(), self.workgroup_size);
        }
        if let Some(ms) = self.wait_timeout_ms {
            config = config.with_wait(WaitPolicy::Timeout(Duration::from_millis(ms)));
        }
        config
    }

    fn terminal_config(&self) -> TerminalConfig {
        TerminalConfig::default().with_size(self.width, self.height)
    }
}

fn main() {
    // Error level stays enabled without RUST_LOG, so failures always surface
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = run(&args) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let gpu = GpuContext::new_blocking().context("failed to acquire a compute-capable GPU")?;
    let mut simulation = Simulation::new(&gpu, args.simulation_config())
        .context("failed to set up the simulation")?;

    let mut sink: Box<dyn FrameSink> = if args.headless {
        Box::new(HeadlessSink::new(HEADLESS_LOG_INTERVAL))
    } else {
        Box::new(TerminalRenderer::stdout(args.terminal_config()))
    };

    let summary = simulation
        .run(sink.as_mut())
        .context("simulation aborted")?;
    simulation.finish();

    log::info!(
        "Finished {} frames in {:.2?}",
        summary.frames,
        summary.elapsed
    );
    Ok(())
}
