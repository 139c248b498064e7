//! Console rendering of a pipeline run

use std::fmt;

use crate::histogram::{HistogramLayout, TrimmedHistogram};
use crate::merge::GlobalStats;
use crate::plan::PartitionPlan;

/// Everything a pipeline run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Partition the passes ran with
    pub plan: PartitionPlan,
    /// Merged statistics, scaled
    pub stats: GlobalStats,
    /// Untrimmed bin layout
    pub layout: HistogramLayout,
    /// Histogram with collapsed tails
    pub histogram: TrimmedHistogram,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Min = {:.1}", self.stats.min_value())?;
        writeln!(f, "Max = {:.1}", self.stats.max_value())?;
        writeln!(f, "Avg = {:.2}", self.stats.mean_value())?;
        write!(f, "{}", self.histogram)
    }
}
