//! Kernel trait: the four operations every backend exposes
//!
//! ```text
//! upload ──► Samples ──┬─► reduce_groups(Min) ─► value_min
//!                      ├─► reduce_groups(Max) ─► value_max
//!                      ├─► reduce_groups(Sum) ─► value_avg
//!                      └─► bin_samples        ─► value_hist
//! ```
//!
//! Samples are uploaded once and shared by all four passes. Every pass reads
//! them only; outputs are disjoint, so passes may be issued concurrently.

use super::Runtime;
use crate::error::{Error, Result};
use crate::histogram::HistogramLayout;
use crate::ops::{PartialResults, ReduceOp};
use crate::plan::{MAX_GROUP_SIZE, PartitionPlan};
use crate::sample::Sample;

/// Backend operations over a resident sample sequence.
pub trait Kernel<R: Runtime>: Send + Sync {
    /// Samples resident on the execution surface.
    type Samples<'a>: Send + Sync
    where
        Self: 'a;

    /// Make `samples` available to subsequent passes.
    ///
    /// # Errors
    ///
    /// - `Dispatch` if the surface cannot hold the sequence
    fn upload<'a>(&'a self, samples: &'a [Sample]) -> Result<Self::Samples<'a>>;

    /// Run one grouped tree reduction, producing one value per work-group.
    ///
    /// # Errors
    ///
    /// - `Dispatch` if the plan's shape is not accepted
    /// - `InvalidArgument` if the plan does not cover the uploaded samples
    fn reduce_groups(
        &self,
        op: ReduceOp,
        samples: &Self::Samples<'_>,
        plan: &PartitionPlan,
    ) -> Result<PartialResults>;

    /// Run the min, max and sum passes, in [`ReduceOp::ALL`] order.
    ///
    /// Backends that can overlap the passes override this.
    fn reduce_all(
        &self,
        samples: &Self::Samples<'_>,
        plan: &PartitionPlan,
    ) -> Result<[PartialResults; 3]> {
        let [min, max, sum] = ReduceOp::ALL;
        Ok([
            self.reduce_groups(min, samples, plan)?,
            self.reduce_groups(max, samples, plan)?,
            self.reduce_groups(sum, samples, plan)?,
        ])
    }

    /// Count samples per histogram bin, `layout.range` counts in total.
    ///
    /// # Errors
    ///
    /// - `Dispatch` if the plan's shape is not accepted
    /// - `InvalidArgument` if a sample falls outside the layout
    fn bin_samples(
        &self,
        samples: &Self::Samples<'_>,
        plan: &PartitionPlan,
        layout: &HistogramLayout,
    ) -> Result<Vec<u64>>;
}

/// Reject plans that do not tile `num_samples` exactly.
pub(crate) fn check_plan(op: &'static str, num_samples: usize, plan: &PartitionPlan) -> Result<()> {
    if plan.group_size == 0 || plan.group_size > MAX_GROUP_SIZE {
        return Err(Error::dispatch(
            op,
            format!(
                "work-group size {} outside 1..={}",
                plan.group_size, MAX_GROUP_SIZE
            ),
        ));
    }
    if plan.total_samples() != num_samples {
        return Err(Error::invalid_argument(
            "plan",
            format!(
                "{} groups of {} do not cover {} samples",
                plan.num_groups, plan.group_size, num_samples
            ),
        ));
    }
    Ok(())
}
