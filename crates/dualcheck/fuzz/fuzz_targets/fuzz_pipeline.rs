//! Fuzz target for validation, derivation and reconciliation.
//!
//! Arbitrary CSV bodies are pushed through the lenient pipeline of either
//! dataset kind. Per-record problems must surface as report entries or
//! typed errors, never as panics.

#![no_main]

use arbitrary::Arbitrary;
use dualcheck::{CsvLoader, DatasetKind, Mode, Pipeline, PipelineConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    weather: bool,
    header: String,
    body: Vec<u8>,
}

fuzz_target!(|input: Input| {
    if input.body.len() > 50_000 {
        return;
    }

    let kind = if input.weather {
        DatasetKind::Weather
    } else {
        DatasetKind::PropertySale
    };

    let mut bytes = input.header.into_bytes();
    bytes.push(b'\n');
    bytes.extend_from_slice(&input.body);

    let Ok(data) = CsvLoader::new().parse_bytes(&bytes, b',') else {
        return;
    };

    let config = PipelineConfig::for_kind(kind).with_mode(Mode::Lenient);
    let Ok(pipeline) = Pipeline::new(config) else {
        return;
    };
    let pipeline = pipeline.without_sinks();

    let validation = pipeline.validate(&data);
    assert_eq!(validation.valid_count + validation.invalid_count, validation.total);

    if let Ok((enriched, report)) = pipeline.process(data, "fuzz") {
        let reconciliation = pipeline.reconcile(&enriched);
        assert_eq!(reconciliation.flagged_count, report.reconciliation.flagged);
    }
});
