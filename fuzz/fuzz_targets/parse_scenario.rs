//! Fuzz harness for scenario files (YAML and JSON)
//!
//! Parsing must never panic, and any scenario that validates must build a
//! tree whose answers match the brute-force mirror, wrapping included.

#![no_main]

use lazyrange_config::{ConfigFormat, parse_config};
use lazyrange_testkit::ReferenceArray;
use lazyrange_tree::LazyRangeTree;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    for format in [ConfigFormat::Yaml, ConfigFormat::Json] {
        let Ok(config) = parse_config(input, format) else {
            continue;
        };
        if config.validate().is_err() || config.len > 4096 {
            continue;
        }

        let values = config.initial_values();
        let mut tree = LazyRangeTree::build(&values).unwrap();
        let mut reference = ReferenceArray::new(&values);
        for op in config.ops.iter().take(256) {
            assert_eq!(tree.apply(*op), reference.apply(*op));
        }
    }
});
