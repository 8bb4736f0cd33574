//! Reference model and proptest strategies shared by lazyrange tests.
//!
//! Keeping these in a microcrate avoids copy-paste across the tree, config
//! and fuzz tests.

use lazyrange_tree::RangeOp;

pub mod proptest;

/// Brute-force mirror of a `LazyRangeTree`.
///
/// Every operation walks the plain vector, so results are trivially correct
/// and can be compared against the tree. Arithmetic wraps like the tree's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceArray {
    values: Vec<i64>,
}

impl ReferenceArray {
    pub fn new(values: &[i64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    pub fn zeroed(len: usize) -> Self {
        Self {
            values: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Adds `delta` to the in-bounds part of `[start, end]`.
    pub fn update_range(&mut self, start: i64, end: i64, delta: i64) {
        for (i, value) in self.values.iter_mut().enumerate() {
            let i = i as i64;
            if start <= i && i <= end {
                *value = value.wrapping_add(delta);
            }
        }
    }

    /// Sums `[start, end]`, or `0` for a range outside `[0, len - 1]`.
    pub fn query_sum(&self, start: i64, end: i64) -> i64 {
        if start < 0 || end >= self.values.len() as i64 || start > end {
            return 0;
        }
        self.values[start as usize..=end as usize]
            .iter()
            .fold(0i64, |acc, &v| acc.wrapping_add(v))
    }

    pub fn apply(&mut self, op: RangeOp) -> Option<i64> {
        match op {
            RangeOp::Update { start, end, delta } => {
                self.update_range(start, end, delta);
                None
            }
            RangeOp::Query { start, end } => Some(self.query_sum(start, end)),
        }
    }
}

/// Number of indices shared by `[a_start, a_end]` and `[b_start, b_end]`.
pub fn overlap_len(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> i64 {
    (a_end.min(b_end) - a_start.max(b_start) + 1).max(0)
}
