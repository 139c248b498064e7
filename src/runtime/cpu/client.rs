//! CPU client implementation

use super::device::CpuDevice;
use super::kernels;
use super::runtime::CpuRuntime;
use crate::error::{Error, Result};
use crate::histogram::HistogramLayout;
use crate::ops::{PartialResults, ReduceOp};
use crate::plan::PartitionPlan;
use crate::runtime::kernel::check_plan;
use crate::runtime::{Kernel, RuntimeClient};
use crate::sample::Sample;
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// CPU client for operation dispatch
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl CpuClient {
    /// Create a new CPU client on the global thread pool
    pub fn new(device: CpuDevice) -> Self {
        Self {
            device,
            #[cfg(feature = "rayon")]
            pool: None,
        }
    }

    /// Create a CPU client with a dedicated pool of `num_threads` workers.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `num_threads` is 0
    /// - `Backend` if the pool cannot be built
    #[cfg(feature = "rayon")]
    pub fn with_num_threads(device: CpuDevice, num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(Error::invalid_argument(
                "num_threads",
                "thread count must be positive",
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("tempstat-cpu-{i}"))
            .build()
            .map_err(|e| Error::Backend(format!("failed to build thread pool: {e}")))?;
        Ok(Self {
            device,
            pool: Some(Arc::new(pool)),
        })
    }

    /// Run `f` inside this client's pool, or the global pool if none.
    #[cfg(feature = "rayon")]
    pub(crate) fn install_parallelism<T: Send>(&self, f: impl FnOnce() -> T + Send) -> T {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    #[cfg(not(feature = "rayon"))]
    pub(crate) fn install_parallelism<T>(&self, f: impl FnOnce() -> T) -> T {
        f()
    }
}

impl Kernel<CpuRuntime> for CpuClient {
    type Samples<'a> = &'a [Sample];

    fn upload<'a>(&'a self, samples: &'a [Sample]) -> Result<&'a [Sample]> {
        Ok(samples)
    }

    fn reduce_groups(
        &self,
        op: ReduceOp,
        samples: &&[Sample],
        plan: &PartitionPlan,
    ) -> Result<PartialResults> {
        check_plan(op.entry_point(), samples.len(), plan)?;
        let values =
            self.install_parallelism(|| kernels::reduce_groups_kernel(op, samples, plan.group_size));
        Ok(PartialResults::new(op, values))
    }

    #[cfg(feature = "rayon")]
    fn reduce_all(&self, samples: &&[Sample], plan: &PartitionPlan) -> Result<[PartialResults; 3]> {
        for op in ReduceOp::ALL {
            check_plan(op.entry_point(), samples.len(), plan)?;
        }
        let group_size = plan.group_size;
        let (min, (max, sum)) = self.install_parallelism(|| {
            rayon::join(
                || kernels::reduce_groups_kernel(ReduceOp::Min, samples, group_size),
                || {
                    rayon::join(
                        || kernels::reduce_groups_kernel(ReduceOp::Max, samples, group_size),
                        || kernels::reduce_groups_kernel(ReduceOp::Sum, samples, group_size),
                    )
                },
            )
        });
        Ok([
            PartialResults::new(ReduceOp::Min, min),
            PartialResults::new(ReduceOp::Max, max),
            PartialResults::new(ReduceOp::Sum, sum),
        ])
    }

    fn bin_samples(
        &self,
        samples: &&[Sample],
        plan: &PartitionPlan,
        layout: &HistogramLayout,
    ) -> Result<Vec<u64>> {
        check_plan("value_hist", samples.len(), plan)?;
        self.install_parallelism(|| kernels::histogram_kernel(samples, plan.group_size, layout))
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }
}
