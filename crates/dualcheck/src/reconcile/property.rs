//! Recomputation of the property-sale derived columns.
//!
//! These formulas are written independently of the derivation steps so that
//! a change to one side shows up as flags instead of passing silently.

use chrono::{Datelike, NaiveDate};

use crate::input::{Dataset, Value};
use crate::schema::columns::property as p;

use super::engine::{DerivedCheck, TOLERANCE};

pub(super) fn checks() -> Vec<Box<dyn DerivedCheck>> {
    vec![
        Box::new(PricePerSquareFoot),
        Box::new(PropertyAge),
        Box::new(SaleDatePart::Year),
        Box::new(SaleDatePart::Month),
        Box::new(LandToBuildingRatio),
        Box::new(SalePriceCategory),
        Box::new(OwnerName::Family),
        Box::new(OwnerName::First),
    ]
}

/// Cell values of `name` for every row, if the column exists.
fn cells<'a>(data: &'a Dataset, name: &str) -> Option<Vec<&'a Value>> {
    data.column(name)
}

fn number(value: &Value) -> Option<f64> {
    value.coerce_f64().filter(|v| !v.is_nan())
}

/// Sale date as a calendar date. Text is read up to the first space or `T`.
fn sale_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Text(s) => {
            let day = s.trim().split([' ', 'T']).next()?;
            NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
        }
        _ => None,
    }
}

struct PricePerSquareFoot;

impl DerivedCheck for PricePerSquareFoot {
    fn field(&self) -> &'static str {
        p::PRICE_PER_SQFT
    }

    fn tolerance(&self) -> f64 {
        TOLERANCE
    }

    fn expected(&self, data: &Dataset) -> Option<Vec<Value>> {
        let price = cells(data, p::SALE_PRICE)?;
        let area = cells(data, p::FINISHED_AREA)?;
        Some(
            price
                .iter()
                .zip(&area)
                .map(|(price, area)| match (number(price), number(area)) {
                    // 0/0 and inf/inf have no price per foot.
                    (Some(price), Some(area)) => Some(price / area)
                        .filter(|ratio| !ratio.is_nan())
                        .map_or(Value::Null, Value::Float),
                    _ => Value::Null,
                })
                .collect(),
        )
    }
}

struct PropertyAge;

impl DerivedCheck for PropertyAge {
    fn field(&self) -> &'static str {
        p::PROPERTY_AGE
    }

    fn expected(&self, data: &Dataset) -> Option<Vec<Value>> {
        let dates = cells(data, p::SALE_DATE)?;
        let built = cells(data, p::YEAR_BUILT)?;
        Some(
            dates
                .iter()
                .zip(&built)
                .map(|(date, built)| {
                    match (sale_date(date), number(built)) {
                        (Some(date), Some(built)) => Value::Float(f64::from(date.year()) - built),
                        _ => Value::Null,
                    }
                })
                .collect(),
        )
    }
}

enum SaleDatePart {
    Year,
    Month,
}

impl DerivedCheck for SaleDatePart {
    fn field(&self) -> &'static str {
        match self {
            SaleDatePart::Year => p::SALE_YEAR,
            SaleDatePart::Month => p::SALE_MONTH,
        }
    }

    fn expected(&self, data: &Dataset) -> Option<Vec<Value>> {
        let dates = cells(data, p::SALE_DATE)?;
        Some(
            dates
                .iter()
                .map(|d| match (sale_date(d), self) {
                    (Some(d), SaleDatePart::Year) => Value::Integer(i64::from(d.year())),
                    (Some(d), SaleDatePart::Month) => Value::Integer(i64::from(d.month())),
                    (None, _) => Value::Null,
                })
                .collect(),
        )
    }
}

struct LandToBuildingRatio;

impl DerivedCheck for LandToBuildingRatio {
    fn field(&self) -> &'static str {
        p::LAND_TO_BUILDING_RATIO
    }

    fn tolerance(&self) -> f64 {
        TOLERANCE
    }

    fn expected(&self, data: &Dataset) -> Option<Vec<Value>> {
        let land = cells(data, p::LAND_VALUE)?;
        let building = cells(data, p::BUILDING_VALUE)?;
        Some(
            land.iter()
                .zip(&building)
                .map(|(land, building)| match (number(land), number(building)) {
                    (_, Some(b)) if b == 0.0 => Value::Null,
                    (Some(l), Some(b)) if !(l / b).is_nan() => Value::Float(l / b),
                    _ => Value::Null,
                })
                .collect(),
        )
    }
}

struct SalePriceCategory;

impl DerivedCheck for SalePriceCategory {
    fn field(&self) -> &'static str {
        p::SALE_PRICE_CATEGORY
    }

    fn expected(&self, data: &Dataset) -> Option<Vec<Value>> {
        let prices = cells(data, p::SALE_PRICE)?;
        Some(
            prices
                .iter()
                .map(|price| {
                    let label = match number(price) {
                        None => "Unknown",
                        Some(v) if v > 300_000.0 => "High",
                        Some(v) if v >= 100_000.0 => "Medium",
                        Some(_) => "Low",
                    };
                    Value::Text(label.to_string())
                })
                .collect(),
        )
    }
}

enum OwnerName {
    Family,
    First,
}

impl OwnerName {
    /// (family, first) for one owner string.
    fn parse(raw: &str) -> (Option<String>, Option<String>) {
        let primary = raw.split('&').next().unwrap_or("").trim();
        let keep = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());

        match primary.find(',') {
            Some(comma) => (keep(&primary[..comma]), keep(&primary[comma + 1..])),
            None => {
                let mut words = primary.split_whitespace();
                match (words.next(), words.clone().next()) {
                    (Some(first), Some(_)) => {
                        let family: Vec<&str> = words.collect();
                        (Some(family.join(" ")), Some(first.to_string()))
                    }
                    _ => (keep(primary), None),
                }
            }
        }
    }
}

impl DerivedCheck for OwnerName {
    fn field(&self) -> &'static str {
        match self {
            OwnerName::Family => p::FAMILY_NAME,
            OwnerName::First => p::FIRST_NAME,
        }
    }

    fn expected(&self, data: &Dataset) -> Option<Vec<Value>> {
        let owners = cells(data, p::OWNER_NAME)?;
        Some(
            owners
                .iter()
                .map(|owner| {
                    if owner.is_null() {
                        return Value::Null;
                    }
                    let (family, first) = Self::parse(&owner.to_string());
                    match self {
                        OwnerName::Family => family.into(),
                        OwnerName::First => first.into(),
                    }
                })
                .collect(),
        )
    }
}
