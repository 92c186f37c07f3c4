use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ComputeError;
use crate::gpu::GpuContext;

use super::gpu_pipeline::{DispatchDescriptor, DispatchPipeline};

const POLL_INTERVAL: Duration = Duration::from_micros(200);

/// How the host waits for a submitted dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Block until the device finishes, however long that takes.
    #[default]
    Block,
    /// Give up waiting after the duration. The work itself still runs.
    Timeout(Duration),
}

/// Number of workgroups that covers `element_count` items.
pub fn workgroup_count(element_count: u32, workgroup_size: u32) -> u32 {
    element_count.div_ceil(workgroup_size.max(1))
}

impl<'b> DispatchPipeline<'b> {
    /// Records and submits one dispatch over `element_count` items along x.
    pub fn dispatch<'p>(
        &'p self,
        gpu: &'p GpuContext,
        element_count: u32,
    ) -> Result<InFlight<'p>, ComputeError> {
        if element_count == 0 {
            return Err(ComputeError::EmptyDispatch);
        }

        let workgroups = workgroup_count(element_count, self.workgroup_size());
        let limit = gpu.limits().max_compute_workgroups_per_dimension;
        if workgroups > limit {
            return Err(ComputeError::DispatchTooLarge { workgroups, limit });
        }

        let (submission, error) = gpu.capture(|device| {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(self.label()),
            });

            {
                let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some(self.label()),
                    timestamp_writes: None,
                });
                compute_pass.set_pipeline(self.compute_pipeline());
                compute_pass.set_bind_group(0, self.bind_group(), &[]);
                compute_pass.dispatch_workgroups(workgroups, 1, 1);
            }

            gpu.queue.submit(Some(encoder.finish()))
        });

        if let Some(err) = error {
            return Err(ComputeError::SubmitFailed(err.message().to_string()));
        }

        let done = Arc::new(AtomicBool::new(false));
        let signal = done.clone();
        gpu.queue.on_submitted_work_done(move || {
            signal.store(true, Ordering::Release);
        });

        log::trace!(
            "Dispatched '{}': {} items in {} workgroups",
            self.label(),
            element_count,
            workgroups
        );

        Ok(InFlight {
            gpu,
            submission: Some(submission),
            done,
            element_count,
        })
    }

    /// Dispatches and waits.
    pub fn run(&self, gpu: &GpuContext, element_count: u32, policy: WaitPolicy) -> Result<(), ComputeError> {
        self.dispatch(gpu, element_count)?.wait(policy)
    }
}

/// A submitted dispatch. Holds the pipeline borrow until the device is done.
///
/// Dropping it without calling [`InFlight::wait`] blocks until completion.
pub struct InFlight<'p> {
    gpu: &'p GpuContext,
    submission: Option<wgpu::SubmissionIndex>,
    done: Arc<AtomicBool>,
    element_count: u32,
}

impl<'p> InFlight<'p> {
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn wait(mut self, policy: WaitPolicy) -> Result<(), ComputeError> {
        let Some(submission) = self.submission.take() else {
            return Ok(());
        };

        match policy {
            WaitPolicy::Block => {
                self.gpu.device.poll(wgpu::Maintain::wait_for(submission));
                Ok(())
            }
            WaitPolicy::Timeout(timeout) => {
                let device = &self.gpu.device;
                let done = &self.done;
                poll_until(
                    timeout,
                    || {
                        device.poll(wgpu::Maintain::Poll);
                    },
                    || done.load(Ordering::Acquire),
                )
            }
        }
    }
}

/// Calls `poll` until `is_done` reports completion or `timeout` elapses.
/// Completion is checked before the deadline, so work that finished during
/// the last poll is never reported as timed out.
fn poll_until(
    timeout: Duration,
    mut poll: impl FnMut(),
    is_done: impl Fn() -> bool,
) -> Result<(), ComputeError> {
    let start = Instant::now();
    loop {
        poll();
        if is_done() {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            log::warn!("Dispatch still running after {:?}", timeout);
            return Err(ComputeError::WaitTimedOut(timeout));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(submission) = self.submission.take() {
            self.gpu.device.poll(wgpu::Maintain::wait_for(submission));
        }
    }
}

/// Builds a pipeline, runs one dispatch, waits, and tears everything down.
pub fn run_once(
    gpu: &GpuContext,
    descriptor: &DispatchDescriptor<'_, '_>,
    element_count: u32,
    policy: WaitPolicy,
) -> Result<(), ComputeError> {
    let pipeline = DispatchPipeline::open(gpu, descriptor)?;
    let result = pipeline.run(gpu, element_count, policy);
    pipeline.close();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroup_count_rounds_up() {
        assert_eq!(workgroup_count(1, 64), 1);
        assert_eq!(workgroup_count(64, 64), 1);
        assert_eq!(workgroup_count(65, 64), 2);
        assert_eq!(workgroup_count(100, 1), 100);
    }

    #[test]
    fn test_zero_workgroup_size_is_treated_as_one() {
        assert_eq!(workgroup_count(10, 0), 10);
    }

    #[test]
    fn test_poll_until_times_out_when_never_done() {
        let mut polls = 0;
        let result = poll_until(Duration::from_millis(1), || polls += 1, || false);

        assert!(matches!(result, Err(ComputeError::WaitTimedOut(d)) if d == Duration::from_millis(1)));
        assert!(polls >= 1);
    }

    #[test]
    fn test_poll_until_zero_timeout_still_checks_once() {
        let result = poll_until(Duration::ZERO, || {}, || true);
        assert!(result.is_ok());

        let result = poll_until(Duration::ZERO, || {}, || false);
        assert!(matches!(result, Err(ComputeError::WaitTimedOut(_))));
    }

    #[test]
    fn test_poll_until_sees_completion_from_poll() {
        let done = std::cell::Cell::new(false);
        let mut polls = 0;
        let result = poll_until(
            Duration::from_secs(30),
            || {
                polls += 1;
                if polls == 3 {
                    done.set(true);
                }
            },
            || done.get(),
        );

        assert!(result.is_ok());
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_default_policy_blocks() {
        assert_eq!(WaitPolicy::default(), WaitPolicy::Block);
    }
}
