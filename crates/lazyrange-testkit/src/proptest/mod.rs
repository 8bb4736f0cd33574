//! Proptest strategies for lazyrange property-based testing.

pub mod strategies;

pub use strategies::{
    strategy_any_range, strategy_delta, strategy_in_bounds_range, strategy_len, strategy_range_op,
    strategy_range_ops, strategy_values, strategy_wide_value,
};
