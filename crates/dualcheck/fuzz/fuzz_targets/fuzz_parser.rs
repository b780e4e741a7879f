//! Fuzz target for the CSV loader.
//!
//! The loader must never panic on malformed input, whatever the delimiter.

#![no_main]

use dualcheck::CsvLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let loader = CsvLoader::new();
    for delimiter in [b',', b'\t', b';', b'|'] {
        if let Ok(dataset) = loader.parse_bytes(data, delimiter) {
            assert_eq!(dataset.index.len(), dataset.rows.len());
            assert!(dataset.rows.iter().all(|r| r.len() == dataset.headers.len()));
        }
    }
});
