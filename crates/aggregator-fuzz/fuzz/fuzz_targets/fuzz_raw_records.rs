#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_aggregator::models::{CoreItem, PwcResult, RawRecord};
use scholar_aggregator::pipeline::{identity_key, normalize};

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(item) = serde_json::from_value::<CoreItem>(json.clone()) {
            let _ = identity_key(&normalize(&RawRecord::Core(item)));
        }
        if let Ok(result) = serde_json::from_value::<PwcResult>(json) {
            let _ = identity_key(&normalize(&RawRecord::PapersWithCode(result)));
        }
    }
});
