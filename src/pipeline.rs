//! End-to-end statistics pipeline
//!
//! ```text
//! samples ─► plan ─► upload ─► min/max/sum partials ─► merge ─► layout
//!                         └──────────────► bin_samples ◄───────────┘
//!                                               │
//!                                          trim_tails ─► Report
//! ```

use crate::error::{Error, Result};
use crate::histogram::{HistogramLayout, trim_tails};
use crate::merge::merge_partials;
use crate::plan::plan_partition;
use crate::report::Report;
use crate::runtime::{Device, Kernel, Runtime, RuntimeClient};
use crate::sample::Sample;

/// Runs the full reduction and histogram pipeline on one backend client.
#[derive(Debug, Clone)]
pub struct Pipeline<R: Runtime> {
    client: R::Client,
}

impl<R: Runtime> Pipeline<R> {
    /// Create a pipeline dispatching to `client`.
    pub fn new(client: R::Client) -> Self {
        Self { client }
    }

    /// The client passes are dispatched to.
    pub fn client(&self) -> &R::Client {
        &self.client
    }

    /// Compute min, max, mean and the trimmed histogram of `samples`.
    ///
    /// # Errors
    ///
    /// - `NoSamples` if `samples` is empty
    /// - Any backend error from upload or dispatch; there is no partial result
    pub fn run(&self, samples: &[Sample]) -> Result<Report> {
        if samples.is_empty() {
            return Err(Error::NoSamples);
        }

        let plan = plan_partition(samples.len())?;
        tracing::debug!(
            backend = R::name(),
            group_size = plan.group_size,
            num_groups = plan.num_groups,
            "partition planned"
        );

        let uploaded = self.client.upload(samples)?;
        let [min, max, sum] = self.client.reduce_all(&uploaded, &plan)?;
        tracing::debug!(partials = min.len(), "reductions complete");

        let stats = merge_partials(&min, &max, &sum, samples.len())?;
        let layout = HistogramLayout::from_stats(&stats)?;
        tracing::debug!(
            lower = layout.lower,
            upper = layout.upper,
            bins = layout.range,
            "histogram layout"
        );

        let counts = self.client.bin_samples(&uploaded, &plan, &layout)?;
        let histogram = trim_tails(&layout, &counts)?;
        tracing::debug!(bins = histogram.bins().len(), "tails trimmed");

        tracing::info!(
            backend = R::name(),
            device = %self.client.device().name(),
            samples = samples.len(),
            min = stats.min_value(),
            max = stats.max_value(),
            mean = stats.mean_value(),
            "statistics computed"
        );

        Ok(Report {
            plan,
            stats,
            layout,
            histogram,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    fn cpu_pipeline() -> Pipeline<CpuRuntime> {
        let device = CpuRuntime::default_device();
        Pipeline::new(CpuRuntime::default_client(&device).unwrap())
    }

    #[test]
    fn test_run_rejects_empty_input() {
        assert!(matches!(cpu_pipeline().run(&[]), Err(Error::NoSamples)));
    }

    #[test]
    fn test_run_single_sample() {
        let report = cpu_pipeline().run(&[-37]).unwrap();
        assert_eq!(report.plan.group_size, 1);
        assert_eq!(report.plan.num_groups, 1);
        assert_eq!(report.stats.min, -37);
        assert_eq!(report.stats.max, -37);
        assert_eq!(report.histogram.total(), 1);
        assert_eq!(report.histogram.bins().len(), 1);
    }

    #[test]
    fn test_run_rejects_outlier_span() {
        // One corrupt reading of 99999999.9 next to 21.5
        assert!(matches!(
            cpu_pipeline().run(&[215, 999_999_999]),
            Err(Error::InvalidArgument { arg: "range", .. })
        ));
    }

    #[test]
    fn test_run_plans_full_groups() {
        let samples: Vec<Sample> = (0..2048).map(|i| i % 50).collect();
        let report = cpu_pipeline().run(&samples).unwrap();
        assert_eq!(report.plan.group_size, 1024);
        assert_eq!(report.plan.num_groups, 2);
    }

    #[test]
    fn test_client_accessor() {
        let pipeline = cpu_pipeline();
        assert!(pipeline.client().device.is_same(&CpuDevice::new()));
    }
}
