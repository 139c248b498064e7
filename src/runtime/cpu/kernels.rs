//! CPU kernel implementations
//!
//! Each work-group is a contiguous chunk of `group_size` samples. With the
//! `rayon` feature, groups are distributed over the worker pool; each worker
//! owns one scratch buffer, the host-side analogue of workgroup memory.

use crate::error::{Error, Result};
use crate::histogram::{AtomicBins, HistogramLayout};
use crate::ops::{ReduceOp, tree_reduce};
use crate::sample::Sample;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Reduce each work-group of `samples` to a single value.
///
/// `samples.len()` must be a multiple of `group_size`.
pub(crate) fn reduce_groups_kernel(op: ReduceOp, samples: &[Sample], group_size: usize) -> Vec<i64> {
    debug_assert_eq!(samples.len() % group_size, 0);

    #[cfg(feature = "rayon")]
    {
        samples
            .par_chunks(group_size)
            .map_init(
                || vec![0i64; group_size],
                |scratch, group| tree_reduce(op, group, scratch),
            )
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        let mut scratch = vec![0i64; group_size];
        samples
            .chunks(group_size)
            .map(|group| tree_reduce(op, group, &mut scratch))
            .collect()
    }
}

/// Count samples per bin of `layout`.
///
/// Work-groups run concurrently and share one [`AtomicBins`]; a sample that
/// maps outside the layout aborts the pass.
pub(crate) fn histogram_kernel(
    samples: &[Sample],
    group_size: usize,
    layout: &HistogramLayout,
) -> Result<Vec<u64>> {
    let bins = AtomicBins::new(layout.range);

    let bin_group = |group: &[Sample]| -> Result<()> {
        for &value in group {
            let index = layout.bin_index(value).ok_or_else(|| {
                Error::invalid_argument(
                    "samples",
                    format!(
                        "sample {value} outside histogram range {}..={}",
                        layout.lower, layout.upper
                    ),
                )
            })?;
            bins.increment(index);
        }
        Ok(())
    };

    #[cfg(feature = "rayon")]
    samples.par_chunks(group_size).try_for_each(bin_group)?;

    #[cfg(not(feature = "rayon"))]
    samples.chunks(group_size).try_for_each(bin_group)?;

    Ok(bins.into_counts())
}
