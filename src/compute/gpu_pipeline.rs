use wgpu::{BindGroup, BindGroupLayout, ComputePipeline, PipelineLayout, ShaderModule};

use crate::error::{BuildStage, ComputeError};
use crate::gpu::GpuContext;
use crate::kernel::{KernelBlob, KERNEL_ENTRY_POINT};

use super::binding_layout::{BindingLayout, BindingRole};
use super::buffer_manager::GpuBuffer;

/// Everything needed to build a [`DispatchPipeline`]: a kernel, the roles it
/// declares and the buffers that fill those roles, slot for slot.
#[derive(Debug, Clone)]
pub struct DispatchDescriptor<'k, 'b> {
    label: String,
    kernel: &'k KernelBlob,
    roles: Vec<BindingRole>,
    buffers: Vec<&'b GpuBuffer>,
}

impl<'k, 'b> DispatchDescriptor<'k, 'b> {
    /// Pairs declared roles with buffers. The counts must match and each
    /// buffer's role must fit its slot.
    pub fn new(
        kernel: &'k KernelBlob,
        roles: &[BindingRole],
        buffers: &[&'b GpuBuffer],
    ) -> Result<Self, ComputeError> {
        if roles.len() != buffers.len() {
            return Err(ComputeError::BindingCountMismatch {
                slots: roles.len(),
                buffers: buffers.len(),
            });
        }

        for (slot, (role, buffer)) in roles.iter().zip(buffers).enumerate() {
            if !role.accepts(buffer.role()) {
                return Err(ComputeError::RoleMismatch {
                    slot,
                    expected: *role,
                    actual: buffer.role(),
                    label: buffer.label().to_string(),
                });
            }
        }

        Ok(Self {
            label: kernel.name().to_string(),
            kernel,
            roles: roles.to_vec(),
            buffers: buffers.to_vec(),
        })
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kernel(&self) -> &KernelBlob {
        self.kernel
    }

    pub fn roles(&self) -> &[BindingRole] {
        &self.roles
    }
}

/// GPU handles released by [`DispatchPipeline::close`], in release order.
pub const TEARDOWN_ORDER: [&str; 5] = [
    "binding set",
    "compute pipeline",
    "pipeline layout",
    "binding layout",
    "kernel module",
];

/// Record of a completed teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teardown {
    pub label: String,
    pub released: Vec<&'static str>,
}

/// A built compute pipeline with its single binding set.
///
/// The pipeline borrows the buffers it binds, so none of them can be
/// destroyed while it is alive. Fields are declared in reverse construction
/// order, which is also the order they are dropped in.
///
/// Teardown consumes the pipeline, so it cannot run twice:
///
/// ```compile_fail
/// # use particle_compute::compute::DispatchPipeline;
/// fn close_twice(pipeline: DispatchPipeline<'_>) {
///     pipeline.close();
///     pipeline.close();
/// }
/// ```
pub struct DispatchPipeline<'b> {
    bind_group: BindGroup,
    pipeline: ComputePipeline,
    pipeline_layout: PipelineLayout,
    bind_group_layout: BindGroupLayout,
    module: ShaderModule,
    label: String,
    workgroup_size: u32,
    _buffers: Vec<&'b GpuBuffer>,
}

impl<'b> DispatchPipeline<'b> {
    /// Builds the kernel module, layouts, pipeline and binding set. On error
    /// whatever was already created is dropped before returning.
    pub fn open(gpu: &GpuContext, descriptor: &DispatchDescriptor<'_, 'b>) -> Result<Self, ComputeError> {
        let label = descriptor.label();
        let layout = BindingLayout::new(descriptor.roles(), &gpu.limits())?;

        let module = Self::create_kernel_module(gpu, descriptor)?;
        let bind_group_layout = Self::create_bind_group_layout(gpu, label, &layout)?;
        let pipeline_layout = Self::create_pipeline_layout(gpu, label, &bind_group_layout)?;
        let pipeline = Self::create_compute_pipeline(gpu, label, &module, &pipeline_layout)?;
        let bind_group = Self::create_bind_group(gpu, label, &bind_group_layout, &descriptor.buffers)?;

        log::debug!(
            "Built pipeline '{}' with {} binding slots",
            label,
            layout.len()
        );

        Ok(Self {
            bind_group,
            pipeline,
            pipeline_layout,
            bind_group_layout,
            module,
            label: label.to_string(),
            workgroup_size: descriptor.kernel().workgroup_size(),
            _buffers: descriptor.buffers.clone(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }

    pub(crate) fn compute_pipeline(&self) -> &ComputePipeline {
        &self.pipeline
    }

    pub(crate) fn bind_group(&self) -> &BindGroup {
        &self.bind_group
    }

    /// Releases every handle in reverse construction order.
    pub fn close(self) -> Teardown {
        let Self {
            bind_group,
            pipeline,
            pipeline_layout,
            bind_group_layout,
            module,
            label,
            ..
        } = self;

        let mut released = Vec::with_capacity(TEARDOWN_ORDER.len());
        drop(bind_group);
        released.push("binding set");
        drop(pipeline);
        released.push("compute pipeline");
        drop(pipeline_layout);
        released.push("pipeline layout");
        drop(bind_group_layout);
        released.push("binding layout");
        drop(module);
        released.push("kernel module");

        log::debug!("Tore down pipeline '{}'", label);

        Teardown { label, released }
    }

    fn create_kernel_module(
        gpu: &GpuContext,
        descriptor: &DispatchDescriptor<'_, '_>,
    ) -> Result<ShaderModule, ComputeError> {
        let source = descriptor.kernel().shader_source()?;
        let (module, error) = gpu.capture(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(descriptor.kernel().name()),
                source,
            })
        });
        check(BuildStage::KernelModule, module, error.map(|e| e.message().to_string()))
    }

    fn create_bind_group_layout(
        gpu: &GpuContext,
        label: &str,
        layout: &BindingLayout,
    ) -> Result<BindGroupLayout, ComputeError> {
        let entries = layout.entries();
        let (bind_group_layout, error) = gpu.capture(|device| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &entries,
            })
        });
        check(BuildStage::BindingLayout, bind_group_layout, error.map(|e| e.message().to_string()))
    }

    fn create_pipeline_layout(
        gpu: &GpuContext,
        label: &str,
        bind_group_layout: &BindGroupLayout,
    ) -> Result<PipelineLayout, ComputeError> {
        let (pipeline_layout, error) = gpu.capture(|device| {
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[bind_group_layout],
                push_constant_ranges: &[],
            })
        });
        check(BuildStage::PipelineLayout, pipeline_layout, error.map(|e| e.message().to_string()))
    }

    fn create_compute_pipeline(
        gpu: &GpuContext,
        label: &str,
        module: &ShaderModule,
        pipeline_layout: &PipelineLayout,
    ) -> Result<ComputePipeline, ComputeError> {
        let (pipeline, error) = gpu.capture(|device| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(pipeline_layout),
                module,
                entry_point: Some(KERNEL_ENTRY_POINT),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            })
        });
        check(BuildStage::ComputePipeline, pipeline, error.map(|e| e.message().to_string()))
    }

    fn create_bind_group(
        gpu: &GpuContext,
        label: &str,
        bind_group_layout: &BindGroupLayout,
        buffers: &[&GpuBuffer],
    ) -> Result<BindGroup, ComputeError> {
        let entries: Vec<wgpu::BindGroupEntry> = buffers
            .iter()
            .enumerate()
            .map(|(slot, buffer)| wgpu::BindGroupEntry {
                binding: slot as u32,
                resource: buffer.buffer().as_entire_binding(),
            })
            .collect();

        let (bind_group, error) = gpu.capture(|device| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: bind_group_layout,
                entries: &entries,
            })
        });
        check(BuildStage::BindingSet, bind_group, error.map(|e| e.message().to_string()))
    }
}

fn check<T>(stage: BuildStage, value: T, error: Option<String>) -> Result<T, ComputeError> {
    match error {
        None => Ok(value),
        Some(reason) => {
            log::error!("Pipeline build failed at {:?}: {}", stage, reason);
            Err(ComputeError::PipelineBuildFailed { stage, reason })
        }
    }
}
