use particle_compute::kernel::{KernelBlob, KernelFormat};
use particle_compute::KernelError;
use std::io::Write;
use tempfile::NamedTempFile;

const SPIRV_MAGIC: u32 = 0x0723_0203;

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_spirv_blob_verbatim() {
    let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
    bytes.extend_from_slice(&0x0001_0000u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 12]);
    let file = write_temp(&bytes);

    let kernel = KernelBlob::load(file.path()).unwrap();

    assert_eq!(kernel.bytes(), &bytes[..]);
    assert_eq!(kernel.format().unwrap(), KernelFormat::SpirV);
    assert_eq!(kernel.workgroup_size(), 1);
    assert_eq!(kernel.name(), file.path().to_string_lossy());
}

#[test]
fn test_load_wgsl_source() {
    let source = "@compute @workgroup_size(1)\nfn main() {}\n";
    let file = write_temp(source.as_bytes());

    let kernel = KernelBlob::load(file.path()).unwrap();

    assert_eq!(kernel.format().unwrap(), KernelFormat::Wgsl);
    match kernel.shader_source().unwrap() {
        wgpu::ShaderSource::Wgsl(text) => assert_eq!(text, source),
        _ => panic!("expected WGSL source"),
    }
}

#[test]
fn test_spirv_source_is_little_endian_words() {
    let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
    bytes.extend_from_slice(&42u32.to_le_bytes());
    let file = write_temp(&bytes);

    let kernel = KernelBlob::load(file.path()).unwrap();
    match kernel.shader_source().unwrap() {
        wgpu::ShaderSource::SpirV(words) => assert_eq!(&words[..], &[SPIRV_MAGIC, 42]),
        _ => panic!("expected SPIR-V source"),
    }
}

#[test]
fn test_missing_file_is_resource_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("particle-shader.spv");

    let result = KernelBlob::load(&path);

    match result {
        Err(KernelError::ResourceNotFound { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected ResourceNotFound, got {:?}", other),
    }
}

#[test]
fn test_binary_garbage_is_unrecognized() {
    let file = write_temp(&[0xFF, 0xFE, 0x00, 0x80, 0xC3]);

    let kernel = KernelBlob::load(file.path()).unwrap();

    assert!(matches!(kernel.format(), Err(KernelError::UnrecognizedFormat(_))));
    assert!(kernel.shader_source().is_err());
}

#[test]
fn test_each_load_reads_the_file_again() {
    let mut file = write_temp(b"// first\n");
    let first = KernelBlob::load(file.path()).unwrap();

    file.write_all(b"// second\n").unwrap();
    file.flush().unwrap();
    let second = KernelBlob::load(file.path()).unwrap();

    assert_eq!(first.bytes(), b"// first\n");
    assert_eq!(second.bytes(), b"// first\n// second\n");
}
