//! Host-side merge of per-group partial results
//!
//! Folds the three partial arrays produced by the executor into a single
//! [`GlobalStats`]. The fold is sequential over `num_groups` values, which is
//! tiny next to the parallel passes that produced them.

use crate::error::{Error, Result};
use crate::ops::{PartialResults, ReduceOp};
use crate::sample::{Sample, unscale};

/// Whole-run statistics, in scaled units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalStats {
    /// Smallest sample
    pub min: Sample,
    /// Largest sample
    pub max: Sample,
    /// Exact sum of all samples
    pub sum: i64,
    /// Number of samples
    pub count: usize,
    /// `sum / count`
    pub mean: f64,
}

impl GlobalStats {
    /// Minimum as a decimal value.
    pub fn min_value(&self) -> f64 {
        unscale(self.min as f64)
    }

    /// Maximum as a decimal value.
    pub fn max_value(&self) -> f64 {
        unscale(self.max as f64)
    }

    /// Mean as a decimal value.
    pub fn mean_value(&self) -> f64 {
        unscale(self.mean)
    }
}

/// Fold per-group min/max/sum arrays into global statistics.
///
/// The mean divides by `total_samples`, never by the group count.
///
/// # Errors
///
/// - `NoSamples` if there are no groups or `total_samples` is 0
/// - `InvalidArgument` if an array was produced by the wrong operator or the
///   arrays disagree on the group count
pub fn merge_partials(
    min: &PartialResults,
    max: &PartialResults,
    sum: &PartialResults,
    total_samples: usize,
) -> Result<GlobalStats> {
    for (partials, expected) in [(min, ReduceOp::Min), (max, ReduceOp::Max), (sum, ReduceOp::Sum)] {
        if partials.op != expected {
            return Err(Error::invalid_argument(
                "partials",
                format!("expected {:?} results, got {:?}", expected, partials.op),
            ));
        }
    }

    let num_groups = min.len();
    if max.len() != num_groups || sum.len() != num_groups {
        return Err(Error::invalid_argument(
            "partials",
            format!(
                "group counts differ: min={}, max={}, sum={}",
                min.len(),
                max.len(),
                sum.len()
            ),
        ));
    }
    if num_groups == 0 || total_samples == 0 {
        return Err(Error::NoSamples);
    }

    let mut global_min = min.values[0];
    let mut global_max = max.values[0];
    let mut global_sum = sum.values[0];
    for g in 1..num_groups {
        global_min = ReduceOp::Min.combine(global_min, min.values[g]);
        global_max = ReduceOp::Max.combine(global_max, max.values[g]);
        global_sum = ReduceOp::Sum.combine(global_sum, sum.values[g]);
    }

    let min = Sample::try_from(global_min).map_err(|_| {
        Error::invalid_argument("partials", format!("min {global_min} is not a sample value"))
    })?;
    let max = Sample::try_from(global_max).map_err(|_| {
        Error::invalid_argument("partials", format!("max {global_max} is not a sample value"))
    })?;

    Ok(GlobalStats {
        min,
        max,
        sum: global_sum,
        count: total_samples,
        mean: global_sum as f64 / total_samples as f64,
    })
}
