//! Property-based tests for validation, derivation and reconciliation.
//!
//! The two derivation paths are written independently, so on any well-formed
//! input they must agree. These tests generate such inputs and check that
//! they do, along with the counting invariants of the validator.
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test -p dualcheck --test property_tests
//! ```

use proptest::prelude::*;

use dualcheck::schema::columns::{property as p, weather as w};
use dualcheck::{
    Dataset, DatasetKind, DerivationEngine, ReconciliationEngine, RecordValidator, Value,
};

// =============================================================================
// Test Strategies
// =============================================================================

fn owner_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z]{2,10}, [A-Z]{2,10}",
        "[A-Z]{2,10}, [A-Z]{2,10} & [A-Z]{2,10} [A-Z]{2,10}",
        "[A-Z]{2,10} [A-Z]{2,10}( [A-Z]{2,6})?",
        "[A-Z]{2,12}",
        "[A-Z]{2,10}, ",
    ]
}

#[derive(Debug, Clone)]
struct Sale {
    owner: Option<String>,
    date: (i32, u32, u32),
    price: i64,
    land: i64,
    building: i64,
    area: i64,
    built: i64,
}

fn sale() -> impl Strategy<Value = Sale> {
    (
        proptest::option::weighted(0.9, owner_name()),
        (1990..2024i32, 1..=12u32, 1..=28u32),
        1..3_000_000i64,
        0..500_000i64,
        1..800_000i64,
        1..12_000i64,
        1800..1990i64,
    )
        .prop_map(|(owner, date, price, land, building, area, built)| Sale {
            owner,
            date,
            price,
            land,
            building,
            area,
            built,
        })
}

fn property_dataset(sales: &[Sale]) -> Dataset {
    let mut headers: Vec<String> = p::MANDATORY.iter().map(|c| c.to_string()).collect();
    headers.push(p::OWNER_NAME.to_string());

    let rows = sales
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut row: Vec<Value> = p::MANDATORY
                .iter()
                .map(|&column| match column {
                    c if c == p::SALE_DATE => {
                        Value::from(format!("{:04}-{:02}-{:02}", s.date.0, s.date.1, s.date.2))
                    }
                    c if c == p::SALE_PRICE => Value::Integer(s.price),
                    c if c == p::LAND_VALUE => Value::Integer(s.land),
                    c if c == p::BUILDING_VALUE => Value::Integer(s.building),
                    c if c == p::TOTAL_VALUE => Value::Integer(s.land + s.building),
                    c if c == p::FINISHED_AREA => Value::Integer(s.area),
                    c if c == p::YEAR_BUILT => Value::Integer(s.built),
                    c if c == p::ACREAGE => Value::Float(0.25),
                    c if c == p::NEIGHBORHOOD => Value::Integer(3127),
                    c if c == p::SOLD_AS_VACANT || c == p::MULTIPLE_PARCELS => Value::from("No"),
                    c if c == p::BEDROOMS || c == p::FULL_BATH => Value::Integer(2),
                    c if c == p::HALF_BATH => Value::Integer(0),
                    _ => Value::from(format!("VALUE {}", i)),
                })
                .collect();
            row.push(s.owner.clone().into());
            row
        })
        .collect();

    Dataset::new(headers, rows)
}

/// Readings are (station, celsius, epa index). Repeated stations share a
/// location and timestamp, so dedup drops all but the first.
fn weather_dataset(readings: &[(u8, f64, i64)]) -> Dataset {
    let headers = vec![
        w::LOCATION_NAME.to_string(),
        w::COUNTRY.to_string(),
        w::LAST_UPDATED.to_string(),
        w::TEMPERATURE_CELSIUS.to_string(),
        w::AIR_US_EPA_INDEX.to_string(),
    ];
    let rows = readings
        .iter()
        .map(|&(station, celsius, epa)| {
            vec![
                Value::from(format!("Station {}", station)),
                Value::from("Testland"),
                Value::from("2024-05-16 09:45"),
                Value::Float(celsius),
                Value::Integer(epa),
            ]
        })
        .collect();
    Dataset::new(headers, rows)
}

/// Arbitrary cells, mostly text, some numbers and nulls.
fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>().prop_map(Value::Float),
        "[ -~]{0,20}".prop_map(Value::Text),
    ]
}

// =============================================================================
// Derivation and reconciliation agree
// =============================================================================

mod agreement_tests {
    use super::*;

    proptest! {
        /// Derived property columns always pass reconciliation.
        #[test]
        fn property_derivation_reconciles(sales in prop::collection::vec(sale(), 1..40)) {
            let data = property_dataset(&sales);
            let (enriched, report) = DerivationEngine::for_kind(DatasetKind::PropertySale)
                .run(data)
                .unwrap();
            prop_assert_eq!(report.rows_out, sales.len());

            let reconciliation =
                ReconciliationEngine::for_kind(DatasetKind::PropertySale).reconcile(&enriched);
            prop_assert!(reconciliation.is_clean(), "{:?}", reconciliation.sample(5));
        }

        /// Derived weather columns always pass reconciliation, duplicates
        /// included.
        #[test]
        fn weather_derivation_reconciles(
            readings in prop::collection::vec((0..6u8, -80.0..80.0f64, -1..9i64), 1..40)
        ) {
            let data = weather_dataset(&readings);
            let (enriched, _) = DerivationEngine::for_kind(DatasetKind::Weather)
                .run(data)
                .unwrap();

            let reconciliation =
                ReconciliationEngine::for_kind(DatasetKind::Weather).reconcile(&enriched);
            prop_assert!(reconciliation.is_clean(), "{:?}", reconciliation.sample(5));
        }

        /// Derivation is deterministic.
        #[test]
        fn derivation_is_deterministic(sales in prop::collection::vec(sale(), 1..20)) {
            let engine = DerivationEngine::for_kind(DatasetKind::PropertySale);
            let (first, _) = engine.run(property_dataset(&sales)).unwrap();
            let (second, _) = engine.run(property_dataset(&sales)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}

// =============================================================================
// Validation invariants
// =============================================================================

mod validation_tests {
    use super::*;

    proptest! {
        /// Valid and invalid counts always partition the records.
        #[test]
        fn counts_partition_records(
            rows in prop::collection::vec(prop::collection::vec(cell(), 6), 0..30)
        ) {
            let headers = vec![
                p::PARCEL_ID.to_string(),
                p::SALE_DATE.to_string(),
                p::SALE_PRICE.to_string(),
                p::FINISHED_AREA.to_string(),
                p::YEAR_BUILT.to_string(),
                p::GRADE.to_string(),
            ];
            let data = Dataset::new(headers, rows);
            let report = RecordValidator::for_kind(DatasetKind::PropertySale)
                .unwrap()
                .validate(&data);

            prop_assert_eq!(report.valid_count + report.invalid_count, report.total);
            prop_assert_eq!(report.total, data.row_count());
            prop_assert_eq!(report.invalid_count, report.error_rows.len());
            for error in &report.errors {
                let label = error.record_index.unwrap();
                prop_assert!(report.error_rows.contains(&label));
            }
        }

        /// Errors come out in record order.
        #[test]
        fn errors_are_record_major(
            rows in prop::collection::vec(prop::collection::vec(cell(), 4), 1..30)
        ) {
            let headers = vec![
                p::SALE_DATE.to_string(),
                p::STATE.to_string(),
                p::BEDROOMS.to_string(),
                p::SOLD_AS_VACANT.to_string(),
            ];
            let data = Dataset::new(headers, rows);
            let report = RecordValidator::for_kind(DatasetKind::PropertySale)
                .unwrap()
                .validate(&data);

            let labels: Vec<usize> = report.errors.iter().filter_map(|e| e.record_index).collect();
            prop_assert_eq!(labels.len(), report.errors.len());
            prop_assert!(labels.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }
}
