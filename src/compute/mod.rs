//! Compute dispatch orchestration: buffers, binding layouts, pipelines and
//! the submit/wait cycle.
//!
//! A pipeline goes through `DispatchDescriptor` (declared) ->
//! `DispatchPipeline` (built) -> `InFlight` (dispatched) -> `wait` (completed)
//! -> `close` (torn down). Each step consumes or borrows the previous one so
//! an out-of-order call does not compile.

mod binding_layout;
mod buffer_manager;
mod compute_executor;
mod gpu_pipeline;

pub use binding_layout::{BindingLayout, BindingRole};
pub use buffer_manager::{BufferRole, GpuBuffer};
pub use compute_executor::{run_once, workgroup_count, InFlight, WaitPolicy};
pub use gpu_pipeline::{DispatchDescriptor, DispatchPipeline, Teardown, TEARDOWN_ORDER};
