#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_aggregator::models::{CrossrefItem, RawRecord};
use scholar_aggregator::pipeline::normalize;

fuzz_target!(|data: &[u8]| {
    // Any decodable item must normalize without panicking
    if let Ok(item) = serde_json::from_slice::<CrossrefItem>(data) {
        let _ = normalize(&RawRecord::Crossref(item));
    }
});
