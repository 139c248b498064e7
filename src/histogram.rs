//! Histogram layout, concurrent binning storage and tail trimming
//!
//! Bins are one whole unit (one degree) wide and span
//! `floor(min / scale) ..= ceil(max / scale)`. After binning, the lowest and
//! highest ~1% of the mass are collapsed into open-ended boundary bins.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::merge::GlobalStats;
use crate::sample::{Sample, ceil_unit, floor_unit};

/// Most bins a layout may span. One-degree bins over any plausible
/// temperature range stay far below this.
pub const MAX_BINS: usize = 1 << 16;

/// Bin span derived from the global extremes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramLayout {
    /// Whole unit of the first bin; also the offset subtracted from a
    /// sample's unit to get its bin index
    pub lower: i64,
    /// Whole unit of the last bin
    pub upper: i64,
    /// Number of bins, `upper - lower + 1`
    pub range: usize,
}

impl HistogramLayout {
    /// Derive the layout covering `[min, max]`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `min > max` or the span exceeds [`MAX_BINS`]
    pub fn new(min: Sample, max: Sample) -> Result<Self> {
        if min > max {
            return Err(Error::invalid_argument(
                "range",
                format!("min ({min}) must not exceed max ({max})"),
            ));
        }
        let lower = floor_unit(min);
        let upper = ceil_unit(max);
        let range = (upper - lower + 1) as usize;
        if range > MAX_BINS {
            return Err(Error::invalid_argument(
                "range",
                format!("{lower}..={upper} needs {range} bins, more than {MAX_BINS}"),
            ));
        }
        Ok(Self {
            lower,
            upper,
            range,
        })
    }

    /// Layout for the extremes reported by the merge stage.
    pub fn from_stats(stats: &GlobalStats) -> Result<Self> {
        Self::new(stats.min, stats.max)
    }

    /// Bin index of `value`, or `None` if it falls outside the layout.
    #[inline]
    pub fn bin_index(&self, value: Sample) -> Option<usize> {
        let offset = floor_unit(value) - self.lower;
        if offset < 0 || offset as usize >= self.range {
            None
        } else {
            Some(offset as usize)
        }
    }

    /// Whole unit labelling bin `index`.
    #[inline]
    pub fn bin_label(&self, index: usize) -> i64 {
        self.lower + index as i64
    }
}

/// Fixed-size array of counters that many workers may increment at once.
///
/// Used only by the binning pass; once the pass finishes the counts are
/// moved out with [`AtomicBins::into_counts`].
pub struct AtomicBins {
    counts: Vec<AtomicU64>,
}

impl AtomicBins {
    /// Create `len` zeroed counters.
    pub fn new(len: usize) -> Self {
        Self {
            counts: (0..len).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Number of counters.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when there are no counters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Increment counter `index` by one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn increment(&self, index: usize) {
        self.counts[index].fetch_add(1, Ordering::Relaxed);
    }

    /// Consume the counters into plain counts.
    pub fn into_counts(self) -> Vec<u64> {
        self.counts.into_iter().map(AtomicU64::into_inner).collect()
    }
}

impl fmt::Debug for AtomicBins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicBins")
            .field("len", &self.counts.len())
            .finish()
    }
}

/// Role of a retained bin in the trimmed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinKind {
    /// Aggregates everything at or below its label
    LowTail,
    /// An ordinary one-unit bin
    Interior,
    /// Aggregates everything at or above its label
    HighTail,
    /// The only retained bin; holds every sample
    Whole,
}

/// One retained histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramBin {
    /// Whole unit at the bin's lower edge
    pub lower_bound: i64,
    /// Samples attributed to the bin, including collapsed tails
    pub count: u64,
    /// Position of the bin in the trimmed output
    pub kind: BinKind,
}

impl fmt::Display for HistogramBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BinKind::LowTail => write!(f, "<={}: {}", self.lower_bound, self.count),
            BinKind::Interior => write!(f, "{}: {}", self.lower_bound, self.count),
            BinKind::HighTail => write!(f, "{}+: {}", self.lower_bound, self.count),
            BinKind::Whole => write!(f, "<={}+: {}", self.lower_bound, self.count),
        }
    }
}

/// Histogram with both 1% tails collapsed into open-ended bins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedHistogram {
    bins: Vec<HistogramBin>,
}

impl TrimmedHistogram {
    /// Retained bins, lowest first.
    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    /// Sum of all retained counts.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }
}

impl fmt::Display for TrimmedHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bin in &self.bins {
            writeln!(f, "{bin}")?;
        }
        Ok(())
    }
}

/// Tail mass a scan must exceed before it stops: `ceil(total / 100)`.
#[inline]
pub fn tail_threshold(total: u64) -> u64 {
    total.div_ceil(100)
}

/// Collapse the low and high 1% tails of `counts`.
///
/// The low scan stops at the first bin where the running count strictly
/// exceeds [`tail_threshold`]; the high scan does the same from the top but
/// never crosses the low boundary. Retained counts always sum to the input
/// total.
///
/// # Errors
///
/// - `InvalidArgument` if `counts` does not match the layout's range
/// - `NoSamples` if every count is zero
pub fn trim_tails(layout: &HistogramLayout, counts: &[u64]) -> Result<TrimmedHistogram> {
    if counts.len() != layout.range {
        return Err(Error::invalid_argument(
            "counts",
            format!("expected {} bins, got {}", layout.range, counts.len()),
        ));
    }
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return Err(Error::NoSamples);
    }
    let threshold = tail_threshold(total);
    let last = counts.len() - 1;

    let mut low_count = 0u64;
    let mut start = last;
    for (i, &count) in counts.iter().enumerate() {
        low_count += count;
        if low_count > threshold {
            start = i;
            break;
        }
    }

    let mut high_count = 0u64;
    let mut end = start;
    for i in (start + 1..=last).rev() {
        high_count += counts[i];
        if high_count > threshold {
            end = i;
            break;
        }
    }
    if end == start {
        // High scan never cleared the threshold: fold its remainder down.
        low_count += high_count;
    }

    let bins = (start..=end)
        .map(|i| {
            let (count, kind) = if start == end {
                (low_count, BinKind::Whole)
            } else if i == start {
                (low_count, BinKind::LowTail)
            } else if i == end {
                (high_count, BinKind::HighTail)
            } else {
                (counts[i], BinKind::Interior)
            };
            HistogramBin {
                lower_bound: layout.bin_label(i),
                count,
                kind,
            }
        })
        .collect();

    Ok(TrimmedHistogram { bins })
}
