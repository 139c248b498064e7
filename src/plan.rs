//! Partition planning
//!
//! Splits the sample sequence into equally sized work-groups so every
//! reduction dispatch runs over a full grid with no padding.

use crate::error::{Error, Result};

/// Largest work-group size the planner will ever choose.
pub const MAX_GROUP_SIZE: usize = 1024;

/// Shape of a grouped dispatch over the whole sample sequence.
///
/// Invariant: `group_size * num_groups` equals the sample count the plan
/// was made for, and `group_size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    /// Samples reduced by a single work-group
    pub group_size: usize,
    /// Number of work-groups in the grid
    pub num_groups: usize,
}

impl PartitionPlan {
    /// Total number of samples covered by this plan.
    #[inline]
    pub fn total_samples(&self) -> usize {
        self.group_size * self.num_groups
    }
}

/// Plan a dispatch using the default [`MAX_GROUP_SIZE`] limit.
///
/// # Errors
///
/// - `NoSamples` if `total_samples` is 0
pub fn plan_partition(total_samples: usize) -> Result<PartitionPlan> {
    plan_partition_with_limit(total_samples, MAX_GROUP_SIZE)
}

/// Plan a dispatch whose group size does not exceed `limit`.
///
/// Scans candidates from `min(limit, MAX_GROUP_SIZE)` down to 1 and takes the
/// first one that divides `total_samples`. A candidate of 1 always divides,
/// so the scan cannot come up empty.
///
/// # Errors
///
/// - `NoSamples` if `total_samples` is 0
/// - `InvalidArgument` if `limit` is 0
pub fn plan_partition_with_limit(total_samples: usize, limit: usize) -> Result<PartitionPlan> {
    if total_samples == 0 {
        return Err(Error::NoSamples);
    }
    if limit == 0 {
        return Err(Error::invalid_argument(
            "limit",
            "work-group size limit must be positive",
        ));
    }

    let ceiling = limit.min(MAX_GROUP_SIZE);
    let group_size = (1..=ceiling)
        .rev()
        .find(|candidate| total_samples % candidate == 0)
        .unwrap_or(1);

    Ok(PartitionPlan {
        group_size,
        num_groups: total_samples / group_size,
    })
}
