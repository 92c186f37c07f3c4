use crate::gpu::GpuContext;

/// Owns a GPU context for tests that need a device.
pub struct TestHarness {
    pub gpu: GpuContext,
}

/// Binding size cap for test devices. Keeps oversized-buffer tests small on
/// drivers that report near-`i32::MAX` limits.
pub const TEST_BINDING_LIMIT: u32 = 1 << 20;

impl TestHarness {
    pub fn new_blocking() -> Result<Self, crate::error::GpuError> {
        let gpu = pollster::block_on(GpuContext::with_limits(|limits| {
            limits.max_uniform_buffer_binding_size =
                limits.max_uniform_buffer_binding_size.min(TEST_BINDING_LIMIT);
            limits.max_storage_buffer_binding_size =
                limits.max_storage_buffer_binding_size.min(TEST_BINDING_LIMIT);
        }))?;
        Ok(Self { gpu })
    }

    /// Returns `None` on machines without a compute-capable adapter so GPU
    /// tests can bail out instead of failing.
    pub fn try_new() -> Option<Self> {
        match Self::new_blocking() {
            Ok(harness) => Some(harness),
            Err(err) => {
                eprintln!("skipping GPU test: {}", err);
                None
            }
        }
    }
}

/// Pipeline-related handles the application still holds, as counted by the
/// wgpu hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveHandles {
    pub shader_modules: usize,
    pub bind_group_layouts: usize,
    pub pipeline_layouts: usize,
    pub compute_pipelines: usize,
    pub bind_groups: usize,
}

impl TestHarness {
    /// `None` when the backend does not expose a hub report.
    pub fn live_handles(&self) -> Option<LiveHandles> {
        let report = self.gpu.instance.generate_report()?;
        let hub = report.hub_report();
        Some(LiveHandles {
            shader_modules: hub.shader_modules.num_kept_from_user,
            bind_group_layouts: hub.bind_group_layouts.num_kept_from_user,
            pipeline_layouts: hub.pipeline_layouts.num_kept_from_user,
            compute_pipelines: hub.compute_pipelines.num_kept_from_user,
            bind_groups: hub.bind_groups.num_kept_from_user,
        })
    }
}
