//! Reduction operations helpers
//!
//! One parameterized operator covers every statistic the executor computes,
//! so backends share a single dispatch path instead of one per statistic.

use crate::sample::Sample;

/// Reduction operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    /// Minimum element
    Min,
    /// Maximum element
    Max,
    /// Sum of elements
    Sum,
}

impl ReduceOp {
    /// Every reduction the pipeline runs, in dispatch order.
    pub const ALL: [ReduceOp; 3] = [ReduceOp::Min, ReduceOp::Max, ReduceOp::Sum];

    /// Identity element of the operator.
    #[inline]
    pub fn identity(self) -> i64 {
        match self {
            ReduceOp::Min => i64::MAX,
            ReduceOp::Max => i64::MIN,
            ReduceOp::Sum => 0,
        }
    }

    /// Combine two partial values. Associative and commutative for every op.
    #[inline]
    pub fn combine(self, a: i64, b: i64) -> i64 {
        match self {
            ReduceOp::Min => a.min(b),
            ReduceOp::Max => a.max(b),
            ReduceOp::Sum => a + b,
        }
    }

    /// Kernel entry point implementing this reduction.
    pub fn entry_point(self) -> &'static str {
        match self {
            ReduceOp::Min => "value_min",
            ReduceOp::Max => "value_max",
            ReduceOp::Sum => "value_avg",
        }
    }
}

/// Per-group outputs of one reduction pass.
///
/// `values[g]` is the reduction of work-group `g`; there is exactly one
/// entry per group and no reserved slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResults {
    /// Operator that produced these values
    pub op: ReduceOp,
    /// One value per work-group
    pub values: Vec<i64>,
}

impl PartialResults {
    /// Wrap per-group values produced by `op`.
    pub fn new(op: ReduceOp, values: Vec<i64>) -> Self {
        Self { op, values }
    }

    /// Number of groups covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no group produced a value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Reduce a group through a scratch buffer by pairwise halving.
///
/// `scratch` is overwritten; its length must be at least `group.len()`.
/// Each round combines element `i` with element `i + half`, which mirrors
/// the strided work-item pattern of a workgroup reduction.
pub fn tree_reduce(op: ReduceOp, group: &[Sample], scratch: &mut [i64]) -> i64 {
    let len = group.len();
    if len == 0 {
        return op.identity();
    }
    debug_assert!(scratch.len() >= len, "scratch smaller than work-group");

    for (slot, &value) in scratch.iter_mut().zip(group) {
        *slot = value as i64;
    }

    let mut active = len;
    while active > 1 {
        let half = active.div_ceil(2);
        for i in 0..active / 2 {
            scratch[i] = op.combine(scratch[i], scratch[i + half]);
        }
        active = half;
    }
    scratch[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_neutral() {
        for op in ReduceOp::ALL {
            assert_eq!(op.combine(op.identity(), 17), 17);
            assert_eq!(op.combine(-4, op.identity()), -4);
        }
    }

    #[test]
    fn test_entry_points() {
        assert_eq!(ReduceOp::Min.entry_point(), "value_min");
        assert_eq!(ReduceOp::Max.entry_point(), "value_max");
        assert_eq!(ReduceOp::Sum.entry_point(), "value_avg");
    }

    #[test]
    fn test_tree_reduce_odd_length() {
        let group = [5, -3, 9, 2, 7];
        let mut scratch = vec![0i64; group.len()];
        assert_eq!(tree_reduce(ReduceOp::Min, &group, &mut scratch), -3);
        assert_eq!(tree_reduce(ReduceOp::Max, &group, &mut scratch), 9);
        assert_eq!(tree_reduce(ReduceOp::Sum, &group, &mut scratch), 20);
    }

    #[test]
    fn test_tree_reduce_matches_sequential_fold() {
        let group: Vec<i32> = (0..1000).map(|i| ((i * 37) % 211) - 100).collect();
        let mut scratch = vec![0i64; 1024];
        for len in [1usize, 2, 3, 63, 64, 65, 511, 1000] {
            let slice = &group[..len];
            for op in ReduceOp::ALL {
                let expected = slice
                    .iter()
                    .fold(op.identity(), |acc, &v| op.combine(acc, v as i64));
                assert_eq!(tree_reduce(op, slice, &mut scratch), expected, "{op:?} len {len}");
            }
        }
    }
}
