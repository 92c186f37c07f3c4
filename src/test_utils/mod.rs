//! Shared fixtures for unit tests, integration tests and benchmarks.

pub mod gpu_helpers;
pub mod harness;
pub mod scene;

pub use gpu_helpers::{KernelFixtures, RecordedIndices};
pub use harness::{LiveHandles, TestHarness, TEST_BINDING_LIMIT};
pub use scene::SceneBuilder;
