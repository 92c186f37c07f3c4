use bytemuck::Pod;
use wgpu::{util::DeviceExt, Buffer};

use crate::error::BufferError;
use crate::gpu::{CapturedError, GpuContext};

/// What a buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferRole {
    /// General read-write storage, e.g. the particle array.
    Storage,
    /// Read-only parameter block bound as a uniform.
    Parameter,
}

impl BufferRole {
    fn usages(self) -> wgpu::BufferUsages {
        let base = wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST;
        match self {
            BufferRole::Storage => base | wgpu::BufferUsages::STORAGE,
            BufferRole::Parameter => base | wgpu::BufferUsages::UNIFORM,
        }
    }

    fn binding_limit(self, limits: &wgpu::Limits) -> u64 {
        match self {
            BufferRole::Storage => u64::from(limits.max_storage_buffer_binding_size),
            BufferRole::Parameter => u64::from(limits.max_uniform_buffer_binding_size),
        }
    }
}

/// A device buffer whose size and role are fixed at creation.
///
/// Reads go through a mapped staging copy, writes through the queue, so the
/// host never touches memory the device may still be using. Dropping the
/// value releases the buffer; [`GpuBuffer::destroy`] does it eagerly.
#[derive(Debug)]
pub struct GpuBuffer {
    buffer: Buffer,
    label: String,
    size: u64,
    role: BufferRole,
}

impl GpuBuffer {
    pub fn new(
        gpu: &GpuContext,
        label: &str,
        contents: &[u8],
        role: BufferRole,
    ) -> Result<Self, BufferError> {
        if contents.is_empty() {
            return Err(BufferError::Empty(label.to_string()));
        }

        let size = contents.len() as u64;
        let limits = gpu.limits();
        if size > limits.max_buffer_size || size > role.binding_limit(&limits) {
            return Err(BufferError::AllocationFailed {
                label: label.to_string(),
                reason: format!("{} bytes exceeds the device limit for {:?} buffers", size, role),
            });
        }

        let (buffer, error) = gpu.capture(|device| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: role.usages(),
            })
        });

        match error {
            None => {}
            Some(CapturedError::OutOfMemory(reason)) => {
                return Err(BufferError::AllocationFailed {
                    label: label.to_string(),
                    reason,
                })
            }
            Some(CapturedError::Validation(reason)) => {
                return Err(BufferError::BackendBufferCreateFailed {
                    label: label.to_string(),
                    reason,
                })
            }
        }

        log::debug!("Created {:?} buffer '{}' ({} bytes)", role, label, size);

        Ok(Self {
            buffer,
            label: label.to_string(),
            size,
            role,
        })
    }

    pub fn from_slice<T: Pod>(
        gpu: &GpuContext,
        label: &str,
        data: &[T],
        role: BufferRole,
    ) -> Result<Self, BufferError> {
        Self::new(gpu, label, bytemuck::cast_slice(data), role)
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Size in bytes as requested at creation.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn role(&self) -> BufferRole {
        self.role
    }

    /// Uploads `contents` at offset 0.
    pub fn write(&self, gpu: &GpuContext, contents: &[u8]) -> Result<(), BufferError> {
        let len = contents.len() as u64;
        if len > self.size {
            return Err(BufferError::Overflow {
                label: self.label.clone(),
                len,
                size: self.size,
            });
        }
        if len % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(BufferError::Unaligned {
                label: self.label.clone(),
                len,
            });
        }

        gpu.queue.write_buffer(&self.buffer, 0, contents);
        Ok(())
    }

    /// Copies exactly `size()` bytes into the front of `dst`.
    pub fn read_into(&self, gpu: &GpuContext, dst: &mut [u8]) -> Result<(), BufferError> {
        let capacity = dst.len() as u64;
        if capacity < self.size {
            return Err(BufferError::DestinationTooSmall {
                label: self.label.clone(),
                size: self.size,
                capacity,
            });
        }

        // create_buffer_init pads to COPY_BUFFER_ALIGNMENT, so the padded size
        // is always a legal copy length.
        let padded = self.buffer.size();
        let staging_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging Buffer"),
            size: padded,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging_buffer, 0, padded);
        gpu.queue.submit(Some(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        gpu.device.poll(wgpu::Maintain::Wait);
        match pollster::block_on(rx) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                return Err(BufferError::MapFailed {
                    label: self.label.clone(),
                    reason: err.to_string(),
                })
            }
            Err(_) => {
                return Err(BufferError::MapFailed {
                    label: self.label.clone(),
                    reason: "map callback dropped".to_string(),
                })
            }
        }

        {
            let data = buffer_slice.get_mapped_range();
            let size = self.size as usize;
            dst[..size].copy_from_slice(&data[..size]);
        }
        staging_buffer.unmap();

        Ok(())
    }

    /// Reads the whole buffer as a vector of `T`.
    pub fn read_vec<T: Pod>(&self, gpu: &GpuContext) -> Result<Vec<T>, BufferError> {
        let stride = std::mem::size_of::<T>() as u64;
        let len = self.size.div_ceil(stride) as usize;
        let mut out = vec![T::zeroed(); len];
        self.read_into(gpu, bytemuck::cast_slice_mut(&mut out))?;
        Ok(out)
    }

    /// Releases the buffer now. Consumes `self`, so it can only happen once.
    pub fn destroy(self) {
        log::debug!("Destroying buffer '{}'", self.label);
        self.buffer.destroy();
    }
}
