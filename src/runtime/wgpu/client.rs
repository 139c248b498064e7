//! WebGPU Client implementation.
//!
//! `WgpuClient` owns the WebGPU device and queue for pass dispatch.
//!
//! # Thread Safety
//!
//! `WgpuClient` is `Clone` and the underlying wgpu::Device and wgpu::Queue
//! are already `Send + Sync` by design.

use std::sync::Arc;
use std::time::Duration;
use wgpu::util::DeviceExt;
use wgpu::{Buffer, BufferDescriptor, BufferUsages, CommandEncoder, Device, Queue};

use super::WgpuRuntime;
use super::device::{WgpuDevice, query_adapter_info_blocking};
use super::shaders::{PipelineCache, StatsParams, encode_histogram, encode_reduce};
use crate::error::{Error, Result};
use crate::histogram::HistogramLayout;
use crate::ops::{PartialResults, ReduceOp};
use crate::plan::PartitionPlan;
use crate::runtime::kernel::check_plan;
use crate::runtime::{Kernel, RuntimeClient};
use crate::sample::Sample;

const BACKEND: &str = "wgpu";
const POLL_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// WgpuClient
// ============================================================================

/// WebGPU Runtime Client.
///
/// Owns WebGPU device and queue for pass dispatch.
///
/// # Buffer Management
///
/// Samples are uploaded once into a storage buffer shared by all passes.
/// Each pass writes a fresh output buffer which is copied into a staging
/// buffer for readback.
#[derive(Clone)]
pub struct WgpuClient {
    /// GPU device identifier
    pub(crate) device_id: WgpuDevice,

    /// WebGPU device handle
    pub(crate) wgpu_device: Arc<Device>,

    /// WebGPU queue for command submission
    pub(crate) queue: Arc<Queue>,

    /// Pipeline cache for compute shaders
    pub(crate) pipeline_cache: Arc<PipelineCache>,
}

impl std::fmt::Debug for WgpuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuClient")
            .field("device", &self.device_id)
            .finish_non_exhaustive()
    }
}

/// Samples resident in a GPU storage buffer.
#[derive(Debug)]
pub struct WgpuSamples {
    buffer: Buffer,
    len: usize,
    /// Largest magnitude in the sequence, bounds per-group sums
    max_abs: u32,
}

impl WgpuClient {
    /// Create a new WebGPU client for a device.
    ///
    /// This initializes the WebGPU device and queue. Prefer
    /// `WgpuRuntime::default_client`, which shares one client per adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No adapter exists at the device index (`NoDevice`)
    /// - Device creation fails (`Backend`)
    pub fn new(device: WgpuDevice) -> Result<Self> {
        let (adapter, info) = query_adapter_info_blocking(device.index)?;

        let (wgpu_device, queue) = pollster::block_on(async {
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("tempstat WebGPU Device"),
                    required_features: wgpu::Features::empty(),
                    // Take what the adapter offers so large datasets fit in one binding
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    trace: wgpu::Trace::Off,
                    experimental_features: wgpu::ExperimentalFeatures::default(),
                })
                .await
        })
        .map_err(|e| Error::Backend(format!("device request failed: {e:?}")))?;

        let wgpu_device = Arc::new(wgpu_device);
        let queue = Arc::new(queue);
        let pipeline_cache = Arc::new(PipelineCache::new(wgpu_device.clone()));

        let device_with_info = WgpuDevice::with_info(device.index, info);
        tracing::debug!(device = ?device_with_info, "wgpu client created");

        Ok(Self {
            device_id: device_with_info,
            wgpu_device,
            queue,
            pipeline_cache,
        })
    }

    fn max_storage_binding(&self) -> u64 {
        let limits = self.wgpu_device.limits();
        (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size)
    }

    fn max_workgroups_per_dimension(&self) -> u32 {
        self.wgpu_device
            .limits()
            .max_compute_workgroups_per_dimension
    }

    /// Create a storage buffer for pass output, checked against binding limits.
    fn create_output_buffer(&self, op: &'static str, label: &str, len: usize) -> Result<Buffer> {
        let size = (len * std::mem::size_of::<u32>()) as u64;
        if size > self.max_storage_binding() {
            return Err(Error::dispatch(
                op,
                format!(
                    "{size}-byte output exceeds the {}-byte storage binding limit",
                    self.max_storage_binding()
                ),
            ));
        }
        Ok(self.wgpu_device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        }))
    }

    /// Create a staging buffer for CPU readback.
    fn create_staging_buffer(&self, label: &str, size: u64) -> Buffer {
        self.wgpu_device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_params_buffer(&self, params: &StatsParams) -> Buffer {
        self.wgpu_device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("stats_params"),
                contents: bytemuck::bytes_of(params),
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            })
    }

    fn create_encoder(&self, label: &str) -> CommandEncoder {
        self.wgpu_device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Submit commands and wait for completion.
    fn submit_and_wait(&self, encoder: CommandEncoder) -> Result<()> {
        let submission = self.queue.submit(std::iter::once(encoder.finish()));
        self.wgpu_device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: Some(POLL_TIMEOUT),
            })
            .map_err(|e| Error::Backend(format!("GPU poll failed after submit: {e}")))?;
        Ok(())
    }

    /// Read buffer data back to CPU (blocking).
    fn read_buffer<T: bytemuck::Pod>(&self, staging: &Buffer, output: &mut [T]) -> Result<()> {
        let slice = staging.slice(..);

        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        self.wgpu_device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(POLL_TIMEOUT),
            })
            .map_err(|e| Error::Backend(format!("GPU poll failed during buffer read: {e}")))?;

        let map_result = receiver.recv().map_err(|_| {
            Error::Backend("map_async callback was not invoked during buffer read".into())
        })?;
        map_result
            .map_err(|e| Error::Backend(format!("map_async failed during buffer read: {e}")))?;

        {
            let data = slice.get_mapped_range();
            let src: &[T] = bytemuck::cast_slice(&data);
            output.copy_from_slice(&src[..output.len()]);
        }

        staging.unmap();
        Ok(())
    }

    fn read_values<T: bytemuck::Pod>(&self, staging: &Buffer, len: usize) -> Result<Vec<T>> {
        let mut out = vec![T::zeroed(); len];
        self.read_buffer(staging, &mut out)?;
        Ok(out)
    }

    fn check_dispatch(&self, op: ReduceOp, samples: &WgpuSamples, plan: &PartitionPlan) -> Result<()> {
        check_plan(op.entry_point(), samples.len, plan)?;
        // value_avg accumulates in i32 on the device
        if op == ReduceOp::Sum {
            let bound = u64::from(samples.max_abs) * plan.group_size as u64;
            if bound > i32::MAX as u64 {
                return Err(Error::backend_limitation(
                    BACKEND,
                    op.entry_point(),
                    format!(
                        "group of {} samples with magnitude up to {} may overflow a 32-bit sum",
                        plan.group_size, samples.max_abs
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Record and run the given reductions in one submission.
    fn run_reductions(
        &self,
        ops: &[ReduceOp],
        samples: &WgpuSamples,
        plan: &PartitionPlan,
    ) -> Result<Vec<PartialResults>> {
        for &op in ops {
            self.check_dispatch(op, samples, plan)?;
        }

        let params = self.create_params_buffer(&StatsParams {
            group_size: plan.group_size as u32,
            num_groups: group_count(plan)?,
            range: 0,
            lower: 0,
        });
        let size = (plan.num_groups * std::mem::size_of::<i32>()) as u64;
        let max_per_dimension = self.max_workgroups_per_dimension();

        let mut encoder = self.create_encoder("stats_reduce");
        let mut staging = Vec::with_capacity(ops.len());
        for &op in ops {
            let output = self.create_output_buffer(op.entry_point(), op.entry_point(), plan.num_groups)?;
            encode_reduce(
                &self.pipeline_cache,
                &mut encoder,
                op,
                &samples.buffer,
                &output,
                &params,
                plan.num_groups,
                max_per_dimension,
            )?;
            let readback = self.create_staging_buffer("stats_reduce_staging", size);
            encoder.copy_buffer_to_buffer(&output, 0, &readback, 0, size);
            staging.push((op, readback));
        }
        self.submit_and_wait(encoder)?;

        staging
            .into_iter()
            .map(|(op, readback)| {
                let values: Vec<i32> = self.read_values(&readback, plan.num_groups)?;
                Ok(PartialResults::new(
                    op,
                    values.into_iter().map(i64::from).collect(),
                ))
            })
            .collect()
    }
}

fn group_count(plan: &PartitionPlan) -> Result<u32> {
    u32::try_from(plan.num_groups).map_err(|_| {
        Error::invalid_argument("plan", format!("{} work-groups exceed u32", plan.num_groups))
    })
}

impl Kernel<WgpuRuntime> for WgpuClient {
    type Samples<'a> = WgpuSamples;

    fn upload<'a>(&'a self, samples: &'a [Sample]) -> Result<WgpuSamples> {
        if samples.is_empty() {
            return Err(Error::NoSamples);
        }
        let size = std::mem::size_of_val(samples) as u64;
        if size > self.max_storage_binding() {
            return Err(Error::dispatch(
                "upload",
                format!(
                    "{} samples ({size} bytes) exceed the {}-byte storage binding limit",
                    samples.len(),
                    self.max_storage_binding()
                ),
            ));
        }

        let buffer = self
            .wgpu_device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("samples"),
                contents: bytemuck::cast_slice(samples),
                usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            });
        let max_abs = samples
            .iter()
            .map(|v| v.unsigned_abs())
            .max()
            .unwrap_or(0);
        tracing::debug!(samples = samples.len(), bytes = size, "samples uploaded");

        Ok(WgpuSamples {
            buffer,
            len: samples.len(),
            max_abs,
        })
    }

    fn reduce_groups(
        &self,
        op: ReduceOp,
        samples: &WgpuSamples,
        plan: &PartitionPlan,
    ) -> Result<PartialResults> {
        self.run_reductions(&[op], samples, plan)?
            .pop()
            .ok_or_else(|| Error::Backend(format!("{} produced no output", op.entry_point())))
    }

    fn reduce_all(&self, samples: &WgpuSamples, plan: &PartitionPlan) -> Result<[PartialResults; 3]> {
        let partials = self.run_reductions(&ReduceOp::ALL, samples, plan)?;
        <[PartialResults; 3]>::try_from(partials)
            .map_err(|p| Error::Backend(format!("expected 3 partial arrays, got {}", p.len())))
    }

    fn bin_samples(
        &self,
        samples: &WgpuSamples,
        plan: &PartitionPlan,
        layout: &HistogramLayout,
    ) -> Result<Vec<u64>> {
        check_plan("value_hist", samples.len, plan)?;
        let range = u32::try_from(layout.range)
            .map_err(|_| Error::invalid_argument("layout", "histogram range exceeds u32"))?;
        let lower = i32::try_from(layout.lower)
            .map_err(|_| Error::invalid_argument("layout", "histogram offset exceeds i32"))?;

        let params = self.create_params_buffer(&StatsParams {
            group_size: plan.group_size as u32,
            num_groups: group_count(plan)?,
            range,
            lower,
        });
        // New buffers are zero-initialised
        let bins = self.create_output_buffer("value_hist", "hist_bins", layout.range)?;
        let size = (layout.range * std::mem::size_of::<u32>()) as u64;
        let readback = self.create_staging_buffer("hist_staging", size);

        let mut encoder = self.create_encoder("stats_hist");
        encode_histogram(
            &self.pipeline_cache,
            &mut encoder,
            &samples.buffer,
            &bins,
            &params,
            plan.num_groups,
            self.max_workgroups_per_dimension(),
        )?;
        encoder.copy_buffer_to_buffer(&bins, 0, &readback, 0, size);
        self.submit_and_wait(encoder)?;

        let counts: Vec<u64> = self
            .read_values::<u32>(&readback, layout.range)?
            .into_iter()
            .map(u64::from)
            .collect();

        // The shader drops out-of-range samples; surface them here
        let binned: u64 = counts.iter().sum();
        if binned != samples.len as u64 {
            return Err(Error::invalid_argument(
                "samples",
                format!(
                    "{} of {} samples outside histogram range {}..={}",
                    samples.len as u64 - binned,
                    samples.len,
                    layout.lower,
                    layout.upper
                ),
            ));
        }
        Ok(counts)
    }
}

impl RuntimeClient<WgpuRuntime> for WgpuClient {
    fn device(&self) -> &WgpuDevice {
        &self.device_id
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Device;

    fn client_or_skip() -> Option<WgpuClient> {
        match WgpuClient::new(WgpuDevice::new(0)) {
            Ok(client) => Some(client),
            Err(e) => {
                println!("No GPU available, skipping test: {}", e);
                None
            }
        }
    }

    #[test]
    fn test_wgpu_client_creation() {
        let Some(client) = client_or_skip() else {
            return;
        };
        println!("Client created for: {}", client.device().name());
        assert_eq!(client.device().id(), 0);
    }

    #[test]
    fn test_wgpu_reduce_groups() {
        let Some(client) = client_or_skip() else {
            return;
        };
        let samples: Vec<Sample> = vec![50, 60, 55, 70, 65, 40, 80, 75, 58, 62];
        let plan = PartitionPlan {
            group_size: 5,
            num_groups: 2,
        };
        let uploaded = client.upload(&samples).unwrap();
        let [min, max, sum] = client.reduce_all(&uploaded, &plan).unwrap();
        assert_eq!(min.values, vec![50, 40]);
        assert_eq!(max.values, vec![70, 80]);
        assert_eq!(sum.values, vec![300, 315]);
    }

    #[test]
    fn test_wgpu_bin_samples_negative_values() {
        let Some(client) = client_or_skip() else {
            return;
        };
        let samples: Vec<Sample> = vec![-25, -10, -1, 0, 9, 10];
        let layout = HistogramLayout::new(-25, 10).unwrap();
        let plan = PartitionPlan {
            group_size: 6,
            num_groups: 1,
        };
        let uploaded = client.upload(&samples).unwrap();
        let counts = client.bin_samples(&uploaded, &plan, &layout).unwrap();
        // Bins -3..=1; -1.0 and -0.1 both floor to -1
        assert_eq!(counts, vec![1, 0, 2, 2, 1]);
    }

    #[test]
    fn test_wgpu_sum_overflow_is_a_limitation() {
        let Some(client) = client_or_skip() else {
            return;
        };
        let samples: Vec<Sample> = vec![i32::MAX / 2; 4];
        let plan = PartitionPlan {
            group_size: 4,
            num_groups: 1,
        };
        let uploaded = client.upload(&samples).unwrap();
        assert!(matches!(
            client.reduce_groups(ReduceOp::Sum, &uploaded, &plan),
            Err(Error::BackendLimitation {
                backend: "wgpu",
                operation: "value_avg",
                ..
            })
        ));
        // Min/max have no accumulation bound
        let max = client.reduce_groups(ReduceOp::Max, &uploaded, &plan).unwrap();
        assert_eq!(max.values, vec![i64::from(i32::MAX / 2)]);
    }
}
