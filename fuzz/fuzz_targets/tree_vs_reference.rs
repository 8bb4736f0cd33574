//! Fuzz harness comparing the lazy tree against a brute-force array.
//!
//! The first byte picks the length; every following 4-byte chunk is one
//! update or query with signed offsets so that out-of-bounds ranges are
//! exercised too.

#![no_main]

use lazyrange_testkit::ReferenceArray;
use lazyrange_tree::{LazyRangeTree, RangeOp};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&len, rest)) = data.split_first() else {
        return;
    };
    let len = len as usize % 64 + 1;

    let mut tree = LazyRangeTree::zeroed(len).unwrap();
    let mut reference = ReferenceArray::zeroed(len);

    for chunk in rest.chunks_exact(4) {
        let start = chunk[1] as i8 as i64;
        let end = chunk[2] as i8 as i64;
        let op = if chunk[0] & 1 == 0 {
            RangeOp::Update {
                start,
                end,
                delta: chunk[3] as i8 as i64,
            }
        } else {
            RangeOp::Query { start, end }
        };

        assert_eq!(tree.apply(op), reference.apply(op));
    }

    assert_eq!(tree.to_vec(), reference.values());
});
