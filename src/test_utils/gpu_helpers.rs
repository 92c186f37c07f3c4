use crate::kernel::KernelBlob;

/// Records every invocation it runs as: one atomic count, the largest
/// `y + z` id seen, then the x ids in arrival order.
const INDEX_RECORDER_SOURCE: &str = r#"
struct Record {
    count: atomic<u32>,
    off_axis: atomic<u32>,
    indices: array<u32>,
}

@group(0) @binding(0) var<storage, read_write> record: Record;

@compute @workgroup_size(1)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    atomicMax(&record.off_axis, gid.y + gid.z);
    let slot = atomicAdd(&record.count, 1u);
    if (slot < arrayLength(&record.indices)) {
        record.indices[slot] = gid.x;
    }
}
"#;

/// Same record as above but with 64-wide workgroups, guarded by the
/// particle count from the parameter block.
const GUARDED_INDEX_RECORDER_SOURCE: &str = r#"
struct Record {
    count: atomic<u32>,
    off_axis: atomic<u32>,
    indices: array<u32>,
}

struct Params {
    particle_count: u32,
    pad: f32,
    bounds: vec2<f32>,
}

@group(0) @binding(0) var<storage, read_write> record: Record;
@group(0) @binding(1) var<uniform> params: Params;

@compute @workgroup_size(64)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= params.particle_count) {
        return;
    }
    atomicMax(&record.off_axis, gid.y + gid.z);
    let slot = atomicAdd(&record.count, 1u);
    if (slot < arrayLength(&record.indices)) {
        record.indices[slot] = gid.x;
    }
}
"#;

/// Copies the parameter block into a storage buffer field by field.
const PARAMS_ECHO_SOURCE: &str = r#"
struct Params {
    particle_count: u32,
    pad: f32,
    bounds: vec2<f32>,
}

@group(0) @binding(0) var<storage, read_write> echo: Params;
@group(0) @binding(1) var<uniform> params: Params;

@compute @workgroup_size(1)
fn main() {
    echo.particle_count = params.particle_count;
    echo.pad = params.pad;
    echo.bounds = params.bounds;
}
"#;

/// Declares a binding the pipeline will not provide, so pipeline creation
/// fails validation.
const MISMATCHED_LAYOUT_SOURCE: &str = r#"
@group(0) @binding(3) var<storage, read_write> data: array<u32>;

@compute @workgroup_size(1)
fn main() {
    data[0] = 1u;
}
"#;

pub struct KernelFixtures;

impl KernelFixtures {
    pub fn index_recorder() -> KernelBlob {
        KernelBlob::from_wgsl("index_recorder", INDEX_RECORDER_SOURCE)
    }

    pub fn guarded_index_recorder() -> KernelBlob {
        KernelBlob::from_wgsl("guarded_index_recorder", GUARDED_INDEX_RECORDER_SOURCE)
            .with_workgroup_size(64)
    }

    pub fn params_echo() -> KernelBlob {
        KernelBlob::from_wgsl("params_echo", PARAMS_ECHO_SOURCE)
    }

    pub fn mismatched_layout() -> KernelBlob {
        KernelBlob::from_wgsl("mismatched_layout", MISMATCHED_LAYOUT_SOURCE)
    }

    pub fn broken_source() -> KernelBlob {
        KernelBlob::from_wgsl("broken", "fn main( {")
    }
}

/// Host view of an index recorder buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedIndices {
    pub count: u32,
    pub off_axis: u32,
    pub indices: Vec<u32>,
}

impl RecordedIndices {
    /// Zeroed words for a recorder that can hold `capacity` indices.
    pub fn blank(capacity: usize) -> Vec<u32> {
        vec![0; 2 + capacity]
    }

    pub fn parse(words: &[u32]) -> Self {
        let count = words[0];
        let stored = (count as usize).min(words.len() - 2);
        Self {
            count,
            off_axis: words[1],
            indices: words[2..2 + stored].to_vec(),
        }
    }

    /// Whether every index in `0..n` was recorded exactly once and nothing else.
    pub fn is_exact_cover(&self, n: u32) -> bool {
        if self.count != n || self.indices.len() != n as usize {
            return false;
        }
        let mut sorted = self.indices.clone();
        sorted.sort_unstable();
        sorted.iter().copied().eq(0..n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_cover_detection() {
        let good = RecordedIndices::parse(&[3, 0, 2, 0, 1, 0]);
        assert!(good.is_exact_cover(3));

        let duplicate = RecordedIndices::parse(&[3, 0, 2, 2, 1, 0]);
        assert!(!duplicate.is_exact_cover(3));

        let extra = RecordedIndices::parse(&[4, 0, 0, 1, 2, 3]);
        assert!(!extra.is_exact_cover(3));
    }
}
