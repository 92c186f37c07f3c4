use particle_compute::compute::{BindingLayout, BindingRole};
use particle_compute::LayoutError;

#[test]
fn test_same_roles_give_same_layout() {
    let roles = [BindingRole::Storage, BindingRole::Uniform];
    let limits = wgpu::Limits::default();

    let first = BindingLayout::new(&roles, &limits).unwrap();
    let second = BindingLayout::new(&roles, &limits).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.entries(), second.entries());
    assert_eq!(first.roles(), &roles);
}

#[test]
fn test_storage_only_layout() {
    let layout = BindingLayout::new(&[BindingRole::Storage], &wgpu::Limits::default()).unwrap();

    assert_eq!(layout.len(), 1);
    assert!(!layout.is_empty());
    assert_eq!(layout.entries()[0].binding, 0);
}

#[test]
fn test_read_only_storage_entry() {
    let layout =
        BindingLayout::new(&[BindingRole::ReadOnlyStorage], &wgpu::Limits::default()).unwrap();

    assert_eq!(
        layout.entries()[0].ty,
        wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        }
    );
}

#[test]
fn test_storage_unsupported_without_storage_buffers() {
    let limits = wgpu::Limits {
        max_storage_buffers_per_shader_stage: 0,
        ..wgpu::Limits::default()
    };

    let result = BindingLayout::new(&[BindingRole::Uniform, BindingRole::Storage], &limits);

    match result {
        Err(LayoutError::UnsupportedRoleCombination { slot, role, .. }) => {
            assert_eq!(slot, 1);
            assert_eq!(role, BindingRole::Storage);
        }
        other => panic!("expected UnsupportedRoleCombination, got {:?}", other),
    }
}

#[test]
fn test_too_many_uniforms() {
    let limits = wgpu::Limits {
        max_uniform_buffers_per_shader_stage: 1,
        ..wgpu::Limits::default()
    };

    let result = BindingLayout::new(
        &[BindingRole::Storage, BindingRole::Uniform, BindingRole::Uniform],
        &limits,
    );

    assert!(matches!(
        result,
        Err(LayoutError::UnsupportedRoleCombination { slot: 2, role: BindingRole::Uniform, .. })
    ));
}

#[test]
fn test_slot_beyond_bind_group_limit() {
    let limits = wgpu::Limits {
        max_bindings_per_bind_group: 1,
        ..wgpu::Limits::default()
    };

    let result = BindingLayout::new(&[BindingRole::Storage, BindingRole::Storage], &limits);

    assert!(matches!(
        result,
        Err(LayoutError::UnsupportedRoleCombination { slot: 1, .. })
    ));
}

#[test]
fn test_empty_layout_is_allowed() {
    let layout = BindingLayout::new(&[], &wgpu::Limits::default()).unwrap();
    assert!(layout.is_empty());
    assert!(layout.entries().is_empty());
}
