//! Lazy-propagation segment tree for range add and range sum queries.
//!
//! The tree is stored as two flat buffers addressed by index arithmetic: the
//! root lives at index 0 and the children of node `i` at `2*i + 1` and
//! `2*i + 2`. Node ranges are never stored; they are derived while descending
//! by splitting `[start, end]` at `mid = (start + end) / 2`.
//!
//! # Operations
//!
//! | Operation | Time | Allocations |
//! |-----------|------|-------------|
//! | `build(values)` | O(n) | 2 Vec |
//! | `update_range(l, r, d)` | O(log n) | 0 |
//! | `query_sum(l, r)` | O(log n) | 0 |
//! | `to_vec()` | O(n) | 1 Vec |
//!
//! # Invariants
//!
//! 1. For node `i` covering `[s, e]`, the logical sum of `[s, e]` is
//!    `tree[i] + (e - s + 1) * lazy[i]`.
//! 2. Push-down folds `lazy[i]` into `tree[i]`, forwards it to both children
//!    (non-leaf only) and zeroes it, in that order.
//! 3. Nodes outside `[0, len - 1]` are never expanded.
//!
//! Sums use two's-complement wrapping arithmetic in every build profile, so
//! aggregates that leave the `i64` range wrap instead of panicking.
//!
//! Queries push pending deltas down as a side effect, so every read takes
//! `&mut self`. Callers sharing a tree across threads must wrap it in a lock.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by [`LazyRangeTree`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("cannot build a range tree over an empty array")]
    EmptyInput,
    #[error("invalid range [{start}, {end}] for length {len}")]
    InvalidRange { start: i64, end: i64, len: usize },
    #[error("array length {len} exceeds the maximum of {max}")]
    TooLarge { len: usize, max: usize },
}

/// Largest array length a tree can be built over.
///
/// Both buffers together take `2 * (2 * MAX_LEN - 1)` slots of 8 bytes, about
/// 2 GiB at this bound.
pub const MAX_LEN: usize = 1 << 26;

/// One scripted operation against a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RangeOp {
    /// Add `delta` to every element in `[start, end]`.
    Update { start: i64, end: i64, delta: i64 },
    /// Sum the elements in `[start, end]`.
    Query { start: i64, end: i64 },
}

/// Number of slots needed for a tree over `len` leaves.
///
/// Midpoint splitting yields a recursion of height `ceil(log2(len))`, so every
/// index stays below `2 * len.next_power_of_two() - 1`.
fn tree_capacity(len: usize) -> Result<usize, RangeError> {
    if len == 0 {
        return Err(RangeError::EmptyInput);
    }
    if len > MAX_LEN {
        return Err(RangeError::TooLarge { len, max: MAX_LEN });
    }
    len.checked_next_power_of_two()
        .and_then(|leaves| leaves.checked_mul(2))
        .map(|slots| slots - 1)
        .ok_or(RangeError::TooLarge { len, max: MAX_LEN })
}

/// A segment tree supporting range add and range sum with lazy propagation.
#[derive(Debug, Clone)]
pub struct LazyRangeTree {
    tree: Vec<i64>,
    lazy: Vec<i64>,
    len: usize,
}

impl LazyRangeTree {
    /// Builds a tree over `values`.
    ///
    /// Returns [`RangeError::EmptyInput`] when `values` is empty and
    /// [`RangeError::TooLarge`] when it holds more than [`MAX_LEN`] elements.
    pub fn build(values: &[i64]) -> Result<Self, RangeError> {
        let capacity = tree_capacity(values.len())?;
        let mut this = Self {
            tree: vec![0; capacity],
            lazy: vec![0; capacity],
            len: values.len(),
        };
        this.build_node(values, 0, this.last(), 0);

        tracing::debug!(len = this.len, capacity, "built lazy range tree");
        Ok(this)
    }

    /// Builds a tree of `len` zeros.
    pub fn zeroed(len: usize) -> Result<Self, RangeError> {
        // Checked before allocating the zero array itself.
        tree_capacity(len)?;
        Self::build(&vec![0; len])
    }

    /// Number of elements in the backing array.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a tree cannot be built over an empty array.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in each of the two internal buffers.
    pub fn capacity(&self) -> usize {
        self.tree.len()
    }

    /// Adds `delta` to every element with index in `[start, end]`.
    ///
    /// The range is not validated. Any part of it outside `[0, len - 1]` is
    /// absorbed by the disjointness test, and a range entirely outside the
    /// array is a no-op.
    pub fn update_range(&mut self, start: i64, end: i64, delta: i64) {
        if self.check_range(start, end).is_err() {
            tracing::debug!(
                start,
                end,
                len = self.len,
                "update range outside array bounds, clamped or ignored"
            );
        }
        tracing::trace!(start, end, delta, "update_range");
        self.update_node(0, 0, self.last(), start, end, delta);
    }

    /// Like [`update_range`](Self::update_range) but rejects ranges that are
    /// not within `[0, len - 1]` or have `start > end`.
    pub fn try_update_range(&mut self, start: i64, end: i64, delta: i64) -> Result<(), RangeError> {
        self.check_range(start, end)?;
        self.update_range(start, end, delta);
        Ok(())
    }

    /// Returns the sum of elements with index in `[start, end]`.
    ///
    /// An invalid range logs a warning and yields `0` without touching the
    /// tree. Use [`try_query_sum`](Self::try_query_sum) to get the error.
    pub fn query_sum(&mut self, start: i64, end: i64) -> i64 {
        match self.try_query_sum(start, end) {
            Ok(sum) => sum,
            Err(err) => {
                tracing::warn!(start, end, len = self.len, "invalid query range: {err}");
                0
            }
        }
    }

    /// Returns the sum of elements with index in `[start, end]`, or
    /// [`RangeError::InvalidRange`] when `0 <= start <= end <= len - 1` does
    /// not hold.
    pub fn try_query_sum(&mut self, start: i64, end: i64) -> Result<i64, RangeError> {
        self.check_range(start, end)?;
        tracing::trace!(start, end, "query_sum");
        Ok(self.query_node(0, 0, self.last(), start, end))
    }

    /// Returns the current value at `index`, or `None` if out of bounds.
    pub fn get(&mut self, index: i64) -> Option<i64> {
        self.try_query_sum(index, index).ok()
    }

    /// Sum of the whole array.
    pub fn total(&mut self) -> i64 {
        self.query_node(0, 0, self.last(), 0, self.last())
    }

    /// Materializes the current logical array.
    pub fn to_vec(&mut self) -> Vec<i64> {
        let mut out = vec![0; self.len];
        self.collect_node(0, 0, self.last(), &mut out);
        out
    }

    /// Executes one scripted operation. Queries return their sum.
    pub fn apply(&mut self, op: RangeOp) -> Option<i64> {
        match op {
            RangeOp::Update { start, end, delta } => {
                self.update_range(start, end, delta);
                None
            }
            RangeOp::Query { start, end } => Some(self.query_sum(start, end)),
        }
    }

    fn last(&self) -> i64 {
        self.len as i64 - 1
    }

    fn check_range(&self, start: i64, end: i64) -> Result<(), RangeError> {
        if start < 0 || end > self.last() || start > end {
            return Err(RangeError::InvalidRange {
                start,
                end,
                len: self.len,
            });
        }
        Ok(())
    }

    fn build_node(&mut self, values: &[i64], start: i64, end: i64, node: usize) {
        if start > end {
            return;
        }
        if start == end {
            self.tree[node] = values[start as usize];
            return;
        }

        let mid = (start + end) / 2;
        self.build_node(values, start, mid, 2 * node + 1);
        self.build_node(values, mid + 1, end, 2 * node + 2);
        self.tree[node] = self.tree[2 * node + 1].wrapping_add(self.tree[2 * node + 2]);
    }

    fn push_down(&mut self, node: usize, start: i64, end: i64) {
        let pending = self.lazy[node];
        if pending == 0 {
            return;
        }

        self.tree[node] = self.tree[node].wrapping_add(pending.wrapping_mul(end - start + 1));
        if start != end {
            // Accumulate: children may already hold undelivered deltas.
            self.lazy[2 * node + 1] = self.lazy[2 * node + 1].wrapping_add(pending);
            self.lazy[2 * node + 2] = self.lazy[2 * node + 2].wrapping_add(pending);
        }
        self.lazy[node] = 0;
    }

    fn update_node(
        &mut self,
        node: usize,
        start: i64,
        end: i64,
        query_start: i64,
        query_end: i64,
        delta: i64,
    ) {
        self.push_down(node, start, end);

        if start > end || start > query_end || end < query_start {
            return;
        }

        if query_start <= start && end <= query_end {
            self.tree[node] = self.tree[node].wrapping_add(delta.wrapping_mul(end - start + 1));
            if start != end {
                self.lazy[2 * node + 1] = self.lazy[2 * node + 1].wrapping_add(delta);
                self.lazy[2 * node + 2] = self.lazy[2 * node + 2].wrapping_add(delta);
            }
            return;
        }

        let mid = (start + end) / 2;
        self.update_node(2 * node + 1, start, mid, query_start, query_end, delta);
        self.update_node(2 * node + 2, mid + 1, end, query_start, query_end, delta);
        self.tree[node] = self.tree[2 * node + 1].wrapping_add(self.tree[2 * node + 2]);
    }

    fn query_node(
        &mut self,
        node: usize,
        start: i64,
        end: i64,
        query_start: i64,
        query_end: i64,
    ) -> i64 {
        self.push_down(node, start, end);

        if start > end || start > query_end || end < query_start {
            return 0;
        }

        if query_start <= start && end <= query_end {
            return self.tree[node];
        }

        let mid = (start + end) / 2;
        let left = self.query_node(2 * node + 1, start, mid, query_start, query_end);
        let right = self.query_node(2 * node + 2, mid + 1, end, query_start, query_end);
        left.wrapping_add(right)
    }

    fn collect_node(&mut self, node: usize, start: i64, end: i64, out: &mut [i64]) {
        self.push_down(node, start, end);

        if start > end {
            return;
        }
        if start == end {
            out[start as usize] = self.tree[node];
            return;
        }

        let mid = (start + end) / 2;
        self.collect_node(2 * node + 1, start, mid, out);
        self.collect_node(2 * node + 2, mid + 1, end, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_capacity() {
        assert_eq!(tree_capacity(1), Ok(1));
        assert_eq!(tree_capacity(2), Ok(3));
        assert_eq!(tree_capacity(5), Ok(15));
        assert_eq!(tree_capacity(8), Ok(15));
        assert_eq!(tree_capacity(100_000), Ok(262_143));
        assert_eq!(tree_capacity(MAX_LEN), Ok(2 * MAX_LEN - 1));
        assert_eq!(tree_capacity(0), Err(RangeError::EmptyInput));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let too_large = |len| RangeError::TooLarge { len, max: MAX_LEN };
        assert_eq!(tree_capacity(MAX_LEN + 1), Err(too_large(MAX_LEN + 1)));
        assert_eq!(tree_capacity(usize::MAX), Err(too_large(usize::MAX)));
        assert_eq!(
            LazyRangeTree::zeroed(usize::MAX).unwrap_err(),
            too_large(usize::MAX)
        );
        assert_eq!(
            LazyRangeTree::zeroed(MAX_LEN + 1).unwrap_err(),
            too_large(MAX_LEN + 1)
        );
    }

    #[test]
    fn test_build_near_i64_max_wraps() {
        let mut tree = LazyRangeTree::build(&[i64::MAX, 1]).unwrap();
        assert_eq!(tree.query_sum(0, 0), i64::MAX);
        assert_eq!(tree.query_sum(1, 1), 1);
        assert_eq!(tree.query_sum(0, 1), i64::MIN);
        assert_eq!(tree.to_vec(), vec![i64::MAX, 1]);
    }

    #[test]
    fn test_large_delta_keeps_points_exact() {
        let half = i64::MAX / 2;
        let mut tree = LazyRangeTree::zeroed(4).unwrap();
        tree.update_range(0, 3, half);

        assert_eq!(tree.query_sum(0, 0), half);
        assert_eq!(tree.query_sum(3, 3), half);
        assert_eq!(tree.query_sum(0, 1), half.wrapping_mul(2));
        assert_eq!(tree.query_sum(0, 3), half.wrapping_mul(4));
        assert_eq!(tree.to_vec(), vec![half; 4]);

        tree.update_range(1, 2, -half);
        assert_eq!(tree.to_vec(), vec![half, 0, 0, half]);
    }

    #[test]
    fn test_build_empty_rejected() {
        assert_eq!(LazyRangeTree::build(&[]).unwrap_err(), RangeError::EmptyInput);
        assert_eq!(LazyRangeTree::zeroed(0).unwrap_err(), RangeError::EmptyInput);
    }

    #[test]
    fn test_build_single_element() {
        let mut tree = LazyRangeTree::build(&[42]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.capacity(), 1);
        assert_eq!(tree.query_sum(0, 0), 42);

        tree.update_range(0, 0, -2);
        assert_eq!(tree.query_sum(0, 0), 40);
    }

    #[test]
    fn test_build_sums() {
        let mut tree = LazyRangeTree::build(&[1, 2, 3, 4, 5]).unwrap();
        assert!(!tree.is_empty());
        assert_eq!(tree.capacity(), 15);
        assert_eq!(tree.query_sum(0, 4), 15);
        assert_eq!(tree.query_sum(1, 3), 9);
        assert_eq!(tree.query_sum(2, 2), 3);
        assert_eq!(tree.total(), 15);
    }

    #[test]
    fn test_build_leaves_lazy_clear() {
        let tree = LazyRangeTree::build(&[3, 1, 4, 1, 5, 9, 2]).unwrap();
        assert!(tree.lazy.iter().all(|&d| d == 0));
        assert_eq!(tree.tree[0], 25);
    }

    #[test]
    fn test_update_then_query() {
        let mut tree = LazyRangeTree::build(&[1, 2, 3, 4, 5]).unwrap();
        tree.update_range(1, 3, 10);

        assert_eq!(tree.query_sum(0, 4), 45);
        assert_eq!(tree.query_sum(0, 0), 1);
        assert_eq!(tree.query_sum(1, 1), 12);
        assert_eq!(tree.query_sum(3, 4), 19);
    }

    #[test]
    fn test_overlapping_updates_accumulate() {
        let mut tree = LazyRangeTree::zeroed(8).unwrap();
        tree.update_range(0, 7, 1);
        tree.update_range(2, 5, 2);
        tree.update_range(4, 7, 3);

        assert_eq!(tree.to_vec(), vec![1, 1, 3, 3, 6, 6, 4, 4]);
        assert_eq!(tree.total(), 28);
    }

    #[test]
    fn test_pending_deltas_compose_before_push() {
        let mut tree = LazyRangeTree::zeroed(4).unwrap();
        // Both updates cover the root, so the children hold stacked lazy values.
        tree.update_range(0, 3, 5);
        tree.update_range(0, 3, 7);
        assert_eq!(tree.lazy[1], 12);
        assert_eq!(tree.lazy[2], 12);

        assert_eq!(tree.query_sum(1, 2), 24);
        assert_eq!(tree.lazy[1], 0);
        assert_eq!(tree.lazy[2], 0);
    }

    #[test]
    fn test_negative_delta() {
        let mut tree = LazyRangeTree::build(&[10, 10, 10]).unwrap();
        tree.update_range(0, 1, -15);
        assert_eq!(tree.to_vec(), vec![-5, -5, 10]);
        assert_eq!(tree.query_sum(0, 2), 0);
    }

    #[test]
    fn test_query_is_idempotent() {
        let mut tree = LazyRangeTree::zeroed(10).unwrap();
        tree.update_range(2, 8, 3);
        let first = tree.query_sum(3, 6);
        let second = tree.query_sum(3, 6);
        assert_eq!(first, 12);
        assert_eq!(first, second);
    }

    #[test]
    fn test_query_invalid_range_sentinel() {
        let mut tree = LazyRangeTree::build(&[1, 2, 3]).unwrap();
        assert_eq!(tree.query_sum(-1, 2), 0);
        assert_eq!(tree.query_sum(0, 3), 0);
        assert_eq!(tree.query_sum(2, 1), 0);
    }

    #[test]
    fn test_try_query_invalid_range() {
        let mut tree = LazyRangeTree::build(&[1, 2, 3]).unwrap();
        assert_eq!(
            tree.try_query_sum(0, 3),
            Err(RangeError::InvalidRange {
                start: 0,
                end: 3,
                len: 3
            })
        );
        assert_eq!(tree.try_query_sum(0, 2), Ok(6));
    }

    #[test]
    fn test_update_out_of_bounds_is_clamped() {
        let mut tree = LazyRangeTree::zeroed(5).unwrap();
        tree.update_range(-3, 1, 2);
        tree.update_range(3, 10, 1);
        tree.update_range(7, 9, 100);
        tree.update_range(-9, -1, 100);

        assert_eq!(tree.to_vec(), vec![2, 2, 0, 1, 1]);
    }

    #[test]
    fn test_update_reversed_range_is_noop() {
        let mut tree = LazyRangeTree::zeroed(5).unwrap();
        tree.update_range(3, 1, 9);
        assert_eq!(tree.total(), 0);
    }

    #[test]
    fn test_try_update_rejects_out_of_bounds() {
        let mut tree = LazyRangeTree::zeroed(5).unwrap();
        assert!(tree.try_update_range(-1, 2, 1).is_err());
        assert!(tree.try_update_range(0, 5, 1).is_err());
        assert_eq!(tree.total(), 0);

        tree.try_update_range(0, 4, 1).unwrap();
        assert_eq!(tree.total(), 5);
    }

    #[test]
    fn test_get() {
        let mut tree = LazyRangeTree::build(&[4, 5, 6]).unwrap();
        tree.update_range(1, 2, 1);
        assert_eq!(tree.get(0), Some(4));
        assert_eq!(tree.get(2), Some(7));
        assert_eq!(tree.get(3), None);
        assert_eq!(tree.get(-1), None);
    }

    #[test]
    fn test_to_vec_non_power_of_two() {
        let values: Vec<i64> = (1..=11).collect();
        let mut tree = LazyRangeTree::build(&values).unwrap();
        assert_eq!(tree.to_vec(), values);
    }

    #[test]
    fn test_apply_ops() {
        let mut tree = LazyRangeTree::zeroed(6).unwrap();
        assert_eq!(
            tree.apply(RangeOp::Update {
                start: 0,
                end: 5,
                delta: 2
            }),
            None
        );
        assert_eq!(tree.apply(RangeOp::Query { start: 1, end: 4 }), Some(8));
        assert_eq!(tree.apply(RangeOp::Query { start: 4, end: 6 }), Some(0));
    }

    #[test]
    fn test_range_op_serde() {
        let op: RangeOp =
            serde_json::from_str(r#"{"op":"update","start":1,"end":3,"delta":-4}"#).unwrap();
        assert_eq!(
            op,
            RangeOp::Update {
                start: 1,
                end: 3,
                delta: -4
            }
        );

        let json = serde_json::to_string(&RangeOp::Query { start: 0, end: 9 }).unwrap();
        assert_eq!(json, r#"{"op":"query","start":0,"end":9}"#);
    }

    #[test]
    fn test_reference_scenario() {
        let n = 100_000;
        let mut tree = LazyRangeTree::zeroed(n).unwrap();

        assert_eq!(tree.query_sum(1000, 7500), 0);

        tree.update_range(1000, 7500, 100);
        assert_eq!(tree.query_sum(1000, 7500), 650_100);

        tree.update_range(1000, 2000, 1000);
        assert_eq!(tree.query_sum(1000, 7500), 1_651_100);
    }

    #[test]
    fn test_error_display() {
        let err = RangeError::InvalidRange {
            start: -1,
            end: 5,
            len: 3,
        };
        assert_eq!(err.to_string(), "invalid range [-1, 5] for length 3");

        let err = RangeError::TooLarge { len: 10, max: 4 };
        assert_eq!(err.to_string(), "array length 10 exceeds the maximum of 4");
    }
}
