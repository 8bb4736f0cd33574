//! Reusable proptest strategies for arrays, ranges and scripted operations.

use lazyrange_tree::RangeOp;
use proptest::prelude::*;

/// Strategy for array lengths, including non-powers of two.
pub fn strategy_len() -> impl Strategy<Value = usize> {
    1usize..200
}

/// Strategy for element values and deltas small enough never to overflow.
pub fn strategy_delta() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000
}

/// Strategy for values across the whole `i64` domain, biased toward the
/// extremes where aggregates wrap.
pub fn strategy_wide_value() -> impl Strategy<Value = i64> {
    prop_oneof![
        2 => prop::num::i64::ANY,
        1 => (i64::MAX - 8..=i64::MAX),
        1 => (i64::MIN..=i64::MIN + 8),
    ]
}

/// Strategy for a non-empty initial array of up to `max_len` elements.
pub fn strategy_values(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(strategy_delta(), 1..=max_len.max(1))
}

/// Strategy for a range with `0 <= start <= end < len`.
pub fn strategy_in_bounds_range(len: usize) -> impl Strategy<Value = (i64, i64)> {
    let last = len.max(1) as i64 - 1;
    (0..=last, 0..=last).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

/// Strategy for any range around the array, including negative, reversed
/// and past-the-end bounds.
pub fn strategy_any_range(len: usize) -> impl Strategy<Value = (i64, i64)> {
    let len = len as i64;
    (-len - 2..len + 3, -len - 2..len + 3)
}

/// Strategy for one update or query, mostly in bounds.
pub fn strategy_range_op(len: usize) -> impl Strategy<Value = RangeOp> {
    let range = prop_oneof![
        4 => strategy_in_bounds_range(len),
        1 => strategy_any_range(len),
    ];
    (range, prop::bool::ANY, strategy_delta()).prop_map(|((start, end), is_update, delta)| {
        if is_update {
            RangeOp::Update { start, end, delta }
        } else {
            RangeOp::Query { start, end }
        }
    })
}

/// Strategy for a script of up to `max_ops` operations over `len` elements.
pub fn strategy_range_ops(len: usize, max_ops: usize) -> impl Strategy<Value = Vec<RangeOp>> {
    prop::collection::vec(strategy_range_op(len), 0..=max_ops)
}
