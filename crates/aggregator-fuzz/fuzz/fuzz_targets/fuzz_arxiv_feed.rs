#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_aggregator::models::RawRecord;
use scholar_aggregator::pipeline::normalize;
use scholar_aggregator::sources::parse_feed;

fuzz_target!(|data: &[u8]| {
    let xml = String::from_utf8_lossy(data);
    for entry in parse_feed(&xml) {
        let _ = normalize(&RawRecord::Arxiv(entry));
    }
});
