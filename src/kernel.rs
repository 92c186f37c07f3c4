//! Compute kernel loading.
//!
//! A kernel is an opaque blob: either a compiled SPIR-V module or WGSL
//! source. The loader reads it verbatim and only inspects enough of it to
//! tell the backend which of the two it is.

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::KernelError;

/// Entry point every kernel must export.
pub const KERNEL_ENTRY_POINT: &str = "main";

const SPIRV_MAGIC: u32 = 0x0723_0203;
const BUILTIN_WORKGROUP_SIZE: u32 = 64;

const PARTICLE_STEP_SOURCE: &str = include_str!("shaders/particle_step.wgsl");
const PARTICLE_DRIFT_SOURCE: &str = include_str!("shaders/particle_drift.wgsl");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelFormat {
    SpirV,
    Wgsl,
}

/// An immutable compute kernel blob.
#[derive(Debug, Clone)]
pub struct KernelBlob {
    name: String,
    bytes: Arc<[u8]>,
    workgroup_size: u32,
}

impl KernelBlob {
    /// Reads the kernel at `path` in full. No caching: every call hits the
    /// filesystem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, KernelError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| KernelError::ResourceNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let expected = file
            .metadata()
            .map_err(|source| KernelError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let bytes = read_exact_len(file, expected, path)?;
        log::debug!("Loaded kernel {} ({} bytes)", path.display(), bytes.len());

        Ok(Self {
            name: path.to_string_lossy().into_owned(),
            bytes: bytes.into(),
            workgroup_size: 1,
        })
    }

    /// Wraps WGSL source that is already in memory.
    pub fn from_wgsl(name: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            bytes: Arc::from(source.as_bytes()),
            workgroup_size: 1,
        }
    }

    /// Adds velocity to position, reflects and clamps at the bounds from the
    /// parameter buffer. Bindings: particles (storage), params (uniform).
    pub fn particle_step() -> Self {
        Self::from_wgsl("particle_step", PARTICLE_STEP_SOURCE)
            .with_workgroup_size(BUILTIN_WORKGROUP_SIZE)
    }

    /// Adds velocity to position with no bounds. Bindings: particles (storage).
    pub fn particle_drift() -> Self {
        Self::from_wgsl("particle_drift", PARTICLE_DRIFT_SOURCE)
            .with_workgroup_size(BUILTIN_WORKGROUP_SIZE)
    }

    /// Sets the workgroup size the kernel declares along x.
    pub fn with_workgroup_size(mut self, workgroup_size: u32) -> Self {
        self.workgroup_size = workgroup_size.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }

    pub fn format(&self) -> Result<KernelFormat, KernelError> {
        if is_spirv(&self.bytes) {
            Ok(KernelFormat::SpirV)
        } else if std::str::from_utf8(&self.bytes).is_ok() {
            Ok(KernelFormat::Wgsl)
        } else {
            Err(KernelError::UnrecognizedFormat(self.name.clone()))
        }
    }

    /// Shader source suitable for `create_shader_module`.
    pub fn shader_source(&self) -> Result<wgpu::ShaderSource<'_>, KernelError> {
        match self.format()? {
            KernelFormat::SpirV => {
                let words: Vec<u32> = self
                    .bytes
                    .chunks_exact(4)
                    .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
                    .collect();
                Ok(wgpu::ShaderSource::SpirV(Cow::Owned(words)))
            }
            KernelFormat::Wgsl => {
                let source = std::str::from_utf8(&self.bytes)
                    .map_err(|_| KernelError::UnrecognizedFormat(self.name.clone()))?;
                Ok(wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)))
            }
        }
    }
}

fn is_spirv(bytes: &[u8]) -> bool {
    bytes.len() >= 4
        && bytes.len() % 4 == 0
        && u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) == SPIRV_MAGIC
}

/// Reads until EOF and fails if fewer than `expected` bytes arrived.
fn read_exact_len<R: Read>(reader: R, expected: u64, path: &Path) -> Result<Vec<u8>, KernelError> {
    let mut bytes = Vec::with_capacity(expected as usize);
    reader
        .take(expected)
        .read_to_end(&mut bytes)
        .map_err(|source| KernelError::Io {
            path: PathBuf::from(path),
            source,
        })?;

    let actual = bytes.len() as u64;
    if actual < expected {
        return Err(KernelError::TruncatedRead {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_short_reader_is_truncated() {
        let reader = Cursor::new(vec![1u8, 2, 3]);
        let result = read_exact_len(reader, 8, Path::new("short.spv"));

        match result {
            Err(KernelError::TruncatedRead { expected, actual, .. }) => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 3);
            }
            other => panic!("expected TruncatedRead, got {:?}", other),
        }
    }

    #[test]
    fn test_reader_stops_at_reported_size() {
        let reader = Cursor::new(vec![7u8; 16]);
        let bytes = read_exact_len(reader, 12, Path::new("long.spv")).unwrap();
        assert_eq!(bytes.len(), 12);
    }

    #[test]
    fn test_spirv_magic_detection() {
        let mut blob = SPIRV_MAGIC.to_le_bytes().to_vec();
        blob.extend_from_slice(&[0u8; 4]);
        assert!(is_spirv(&blob));

        // Magic number present but length not word aligned
        blob.push(0);
        assert!(!is_spirv(&blob));
    }

    #[test]
    fn test_builtin_kernels_are_wgsl() {
        let step = KernelBlob::particle_step();
        assert_eq!(step.format().unwrap(), KernelFormat::Wgsl);
        assert_eq!(step.workgroup_size(), BUILTIN_WORKGROUP_SIZE);
        assert!(std::str::from_utf8(step.bytes()).unwrap().contains("fn main"));

        let drift = KernelBlob::particle_drift();
        assert_eq!(drift.format().unwrap(), KernelFormat::Wgsl);
    }

    #[test]
    fn test_workgroup_size_never_zero() {
        let kernel = KernelBlob::from_wgsl("k", "").with_workgroup_size(0);
        assert_eq!(kernel.workgroup_size(), 1);
    }
}
