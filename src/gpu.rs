use wgpu::{Adapter, Device, Instance, Queue};

use crate::error::GpuError;

/// A compute-capable device and its submission queue.
pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
}

impl GpuContext {
    /// Requests every limit the adapter supports.
    pub async fn new() -> Result<Self, GpuError> {
        Self::with_limits(|_| {}).await
    }

    /// Like [`GpuContext::new`], but `adjust` may lower the adapter's limits
    /// before the device is requested. Raising them past the adapter fails
    /// with [`GpuError::DeviceCreation`].
    pub async fn with_limits(adjust: impl FnOnce(&mut wgpu::Limits)) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel.flags.contains(wgpu::DownlevelFlags::COMPUTE_SHADERS) {
            return Err(GpuError::NoComputeSupport(info.name));
        }

        let mut limits = adapter.limits();
        adjust(&mut limits);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Particle Compute Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits,
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn new_blocking() -> Result<Self, GpuError> {
        pollster::block_on(Self::new())
    }

    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Runs `f` inside out-of-memory and validation error scopes and returns
    /// whatever the device reported. Out-of-memory takes precedence.
    pub fn capture<T>(&self, f: impl FnOnce(&Device) -> T) -> (T, Option<CapturedError>) {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let value = f(&self.device);

        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        let validation = pollster::block_on(self.device.pop_error_scope());

        let captured = match (out_of_memory, validation) {
            (Some(err), _) => Some(CapturedError::OutOfMemory(err.to_string())),
            (None, Some(err)) => Some(CapturedError::Validation(err.to_string())),
            (None, None) => None,
        };
        (value, captured)
    }
}

/// An error reported by the device inside [`GpuContext::capture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedError {
    OutOfMemory(String),
    Validation(String),
}

impl CapturedError {
    pub fn message(&self) -> &str {
        match self {
            CapturedError::OutOfMemory(msg) | CapturedError::Validation(msg) => msg,
        }
    }
}
