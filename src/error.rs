//! Error types for GPU setup, kernel loading, buffer management and dispatch.
//!
//! Every failure in this crate is a setup-time problem (missing driver,
//! missing kernel, layout mismatch) rather than something to retry, so the
//! variants carry enough context to be logged once and acted on.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::compute::{BindingRole, BufferRole};

/// Errors raised while acquiring the GPU.
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("no GPU adapter found")]
    NoAdapter,
    #[error("adapter '{0}' cannot run compute shaders")]
    NoComputeSupport(String),
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors raised by the kernel loader.
#[derive(Error, Debug)]
pub enum KernelError {
    #[error("kernel not found at {path}: {source}")]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("kernel {path} truncated: expected {expected} bytes, read {actual}")]
    TruncatedRead {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
    #[error("failed to read kernel {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("kernel {0} is neither SPIR-V nor WGSL")]
    UnrecognizedFormat(String),
}

/// Errors raised by the binding layout builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("slot {slot} cannot hold a {role:?} binding: {reason}")]
    UnsupportedRoleCombination {
        slot: usize,
        role: BindingRole,
        reason: &'static str,
    },
}

/// Errors raised by the GPU resource allocator.
#[derive(Error, Debug)]
pub enum BufferError {
    #[error("buffer '{0}' would be empty")]
    Empty(String),
    #[error("allocation of '{label}' failed: {reason}")]
    AllocationFailed { label: String, reason: String },
    #[error("backend failed to create buffer '{label}': {reason}")]
    BackendBufferCreateFailed { label: String, reason: String },
    #[error("write of {len} bytes overflows buffer '{label}' of {size} bytes")]
    Overflow { label: String, len: u64, size: u64 },
    #[error("write of {len} bytes to '{label}' is not a multiple of 4")]
    Unaligned { label: String, len: u64 },
    #[error("destination holds {capacity} bytes but buffer '{label}' has {size}")]
    DestinationTooSmall {
        label: String,
        size: u64,
        capacity: u64,
    },
    #[error("failed to map buffer '{label}': {reason}")]
    MapFailed { label: String, reason: String },
}

/// Stage of pipeline construction that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    KernelModule,
    BindingLayout,
    PipelineLayout,
    ComputePipeline,
    BindingSet,
}

/// Errors raised while building, dispatching or waiting on a compute pipeline.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("layout declares {slots} slots but {buffers} buffers were bound")]
    BindingCountMismatch { slots: usize, buffers: usize },
    #[error("slot {slot} expects a {expected:?} binding but buffer '{label}' is {actual:?}")]
    RoleMismatch {
        slot: usize,
        expected: BindingRole,
        actual: BufferRole,
        label: String,
    },
    #[error("pipeline build failed at {stage:?}: {reason}")]
    PipelineBuildFailed { stage: BuildStage, reason: String },
    #[error("dispatch of zero work items")]
    EmptyDispatch,
    #[error("{workgroups} workgroups exceed the device limit of {limit}")]
    DispatchTooLarge { workgroups: u32, limit: u32 },
    #[error("dispatch rejected by the device: {0}")]
    SubmitFailed(String),
    #[error("dispatch did not complete within {0:?}")]
    WaitTimedOut(Duration),
}

/// Errors raised by the simulation driver.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error("frame sink failed: {0}")]
    Sink(#[from] std::io::Error),
}
