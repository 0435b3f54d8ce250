#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_aggregator::pipeline::clean_abstract;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let cleaned = clean_abstract(text);
        // Whitespace is always collapsed and trimmed
        assert_eq!(cleaned.trim(), cleaned);
        assert!(!cleaned.contains("  "));
    }
});
