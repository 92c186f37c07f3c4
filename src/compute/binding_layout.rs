use crate::error::LayoutError;

use super::buffer_manager::BufferRole;

/// Kind of resource a kernel declares at a binding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingRole {
    Storage,
    ReadOnlyStorage,
    Uniform,
}

impl BindingRole {
    /// Whether a buffer created for `role` can be bound at a slot of this kind.
    pub fn accepts(self, role: BufferRole) -> bool {
        matches!(
            (self, role),
            (BindingRole::Storage, BufferRole::Storage)
                | (BindingRole::ReadOnlyStorage, BufferRole::Storage)
                | (BindingRole::Uniform, BufferRole::Parameter)
        )
    }

    fn binding_type(self) -> wgpu::BindingType {
        let ty = match self {
            BindingRole::Storage => wgpu::BufferBindingType::Storage { read_only: false },
            BindingRole::ReadOnlyStorage => wgpu::BufferBindingType::Storage { read_only: true },
            BindingRole::Uniform => wgpu::BufferBindingType::Uniform,
        };
        wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        }
    }
}

/// Slot-ordered binding declaration for a single bind group.
///
/// Slot `i` maps to `@binding(i)` in group 0. Building the same role list
/// against the same limits always yields the same layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingLayout {
    slots: Vec<BindingRole>,
}

impl BindingLayout {
    pub fn new(roles: &[BindingRole], limits: &wgpu::Limits) -> Result<Self, LayoutError> {
        let mut storage = 0u32;
        let mut uniform = 0u32;

        for (slot, &role) in roles.iter().enumerate() {
            if slot as u64 >= u64::from(limits.max_bindings_per_bind_group) {
                return Err(LayoutError::UnsupportedRoleCombination {
                    slot,
                    role,
                    reason: "slot index exceeds bindings per bind group",
                });
            }

            match role {
                BindingRole::Storage | BindingRole::ReadOnlyStorage => {
                    storage += 1;
                    if storage > limits.max_storage_buffers_per_shader_stage {
                        return Err(LayoutError::UnsupportedRoleCombination {
                            slot,
                            role,
                            reason: "too many storage buffers for the compute stage",
                        });
                    }
                }
                BindingRole::Uniform => {
                    uniform += 1;
                    if uniform > limits.max_uniform_buffers_per_shader_stage {
                        return Err(LayoutError::UnsupportedRoleCombination {
                            slot,
                            role,
                            reason: "too many uniform buffers for the compute stage",
                        });
                    }
                }
            }
        }

        Ok(Self {
            slots: roles.to_vec(),
        })
    }

    pub fn roles(&self) -> &[BindingRole] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.slots
            .iter()
            .enumerate()
            .map(|(slot, role)| wgpu::BindGroupLayoutEntry {
                binding: slot as u32,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: role.binding_type(),
                count: None,
            })
            .collect()
    }
}
