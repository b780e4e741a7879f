//! Named derivation steps.
//!
//! Each step reads columns already present and adds columns, removes
//! columns, or removes rows. Later steps rely on earlier ones, so the order
//! a plan lists them in matters.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::error::{DualcheckError, Result};
use crate::input::{Dataset, Value};
use crate::schema::columns::{property as p, weather as w};

/// Temperature bucket edges in °C. Intervals are open on the left.
const TEMPERATURE_EDGES: [f64; 7] = [-60.0, 0.0, 10.0, 20.0, 30.0, 40.0, 60.0];
const TEMPERATURE_LABELS: [&str; 6] = ["Freezing", "Cold", "Cool", "Mild", "Warm", "Hot"];

const AIR_QUALITY_LABELS: [&str; 6] = [
    "Good",
    "Moderate",
    "Unhealthy for Sensitive Groups",
    "Unhealthy",
    "Very Unhealthy",
    "Hazardous",
];

/// One derivation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivationStep {
    /// Drop rows with a null in any of `columns`.
    DropIncompleteRows { columns: Vec<String> },
    /// Remove columns; absent ones are ignored.
    DropColumns { columns: Vec<String> },
    /// Sale price divided by finished area.
    PricePerArea,
    /// Year of sale minus year built. Coerces the sale date.
    PropertyAge,
    /// Sale year and month. Coerces the sale date.
    SaleYearMonth,
    /// Land value divided by building value, null on a zero denominator.
    LandToBuildingRatio,
    /// Low, Medium, High or Unknown by sale price.
    PriceCategory,
    /// Family and first name of the first listed owner.
    OwnerNames,
    /// Reset row labels to `0..n`.
    Reindex,
    /// Bucket the Celsius temperature.
    TemperatureCategory,
    /// Temperature minus the column mean.
    TemperatureDeviation,
    /// Label the US EPA air quality index.
    AirQualityCategory,
    /// Drop exact duplicates, then location/date duplicates, then reindex.
    RemoveDuplicates,
}

impl DerivationStep {
    /// Short identifier used in reports and errors.
    pub fn name(&self) -> &'static str {
        match self {
            DerivationStep::DropIncompleteRows { .. } => "drop_incomplete_rows",
            DerivationStep::DropColumns { .. } => "drop_columns",
            DerivationStep::PricePerArea => "price_per_area",
            DerivationStep::PropertyAge => "property_age",
            DerivationStep::SaleYearMonth => "sale_year_month",
            DerivationStep::LandToBuildingRatio => "land_to_building_ratio",
            DerivationStep::PriceCategory => "price_category",
            DerivationStep::OwnerNames => "owner_names",
            DerivationStep::Reindex => "reindex",
            DerivationStep::TemperatureCategory => "temperature_category",
            DerivationStep::TemperatureDeviation => "temperature_deviation",
            DerivationStep::AirQualityCategory => "air_quality_category",
            DerivationStep::RemoveDuplicates => "remove_duplicates",
        }
    }

    /// Get a human-readable description of the step.
    pub fn description(&self) -> String {
        match self {
            DerivationStep::DropIncompleteRows { columns } => {
                format!("Drop rows with missing values in {} mandatory columns", columns.len())
            }
            DerivationStep::DropColumns { columns } => format!("Drop columns {:?}", columns),
            DerivationStep::PricePerArea => {
                format!("'{}' = '{}' / '{}'", p::PRICE_PER_SQFT, p::SALE_PRICE, p::FINISHED_AREA)
            }
            DerivationStep::PropertyAge => {
                format!("'{}' = year('{}') - '{}'", p::PROPERTY_AGE, p::SALE_DATE, p::YEAR_BUILT)
            }
            DerivationStep::SaleYearMonth => {
                format!("'{}', '{}' from '{}'", p::SALE_YEAR, p::SALE_MONTH, p::SALE_DATE)
            }
            DerivationStep::LandToBuildingRatio => format!(
                "'{}' = '{}' / '{}'",
                p::LAND_TO_BUILDING_RATIO,
                p::LAND_VALUE,
                p::BUILDING_VALUE
            ),
            DerivationStep::PriceCategory => format!("'{}' from '{}'", p::SALE_PRICE_CATEGORY, p::SALE_PRICE),
            DerivationStep::OwnerNames => {
                format!("'{}', '{}' from '{}'", p::FAMILY_NAME, p::FIRST_NAME, p::OWNER_NAME)
            }
            DerivationStep::Reindex => "Reset row labels".to_string(),
            DerivationStep::TemperatureCategory => format!("'{}' from Celsius buckets", w::TEMPERATURE_CATEGORY),
            DerivationStep::TemperatureDeviation => {
                format!("'{}' = temperature - mean", w::TEMPERATURE_DEVIATION)
            }
            DerivationStep::AirQualityCategory => {
                format!("'{}' from '{}'", w::AIR_QUALITY_CATEGORY, w::AIR_US_EPA_INDEX)
            }
            DerivationStep::RemoveDuplicates => "Remove duplicate observations".to_string(),
        }
    }

    /// Apply the step in place.
    pub fn apply(&self, data: &mut Dataset) -> Result<()> {
        match self {
            DerivationStep::DropIncompleteRows { columns } => self.drop_incomplete(data, columns),
            DerivationStep::DropColumns { columns } => {
                let names: Vec<&str> = columns.iter().map(String::as_str).collect();
                data.drop_columns(&names);
                Ok(())
            }
            DerivationStep::PricePerArea => self.price_per_area(data),
            DerivationStep::PropertyAge => self.property_age(data),
            DerivationStep::SaleYearMonth => self.sale_year_month(data),
            DerivationStep::LandToBuildingRatio => self.land_to_building(data),
            DerivationStep::PriceCategory => self.price_category(data),
            DerivationStep::OwnerNames => {
                owner_names(data);
                Ok(())
            }
            DerivationStep::Reindex => {
                data.reindex();
                Ok(())
            }
            DerivationStep::TemperatureCategory => {
                temperature_category(data);
                Ok(())
            }
            DerivationStep::TemperatureDeviation => {
                temperature_deviation(data);
                Ok(())
            }
            DerivationStep::AirQualityCategory => {
                air_quality_category(data);
                Ok(())
            }
            DerivationStep::RemoveDuplicates => {
                remove_duplicates(data);
                Ok(())
            }
        }
    }

    fn require(&self, data: &Dataset, column: &str) -> Result<usize> {
        data.column_index(column)
            .ok_or_else(|| DualcheckError::MissingColumn {
                column: column.to_string(),
                step: self.name().to_string(),
            })
    }

    fn drop_incomplete(&self, data: &mut Dataset, columns: &[String]) -> Result<()> {
        let positions = columns
            .iter()
            .map(|c| self.require(data, c))
            .collect::<Result<Vec<_>>>()?;

        data.retain_rows(|_, row| positions.iter().all(|&c| !row[c].is_null()));

        let residual: Vec<usize> = data
            .rows
            .iter()
            .zip(&data.index)
            .filter(|(row, _)| positions.iter().any(|&c| row[c].is_null()))
            .map(|(_, &label)| label)
            .collect();
        if !residual.is_empty() {
            return Err(DualcheckError::ExhaustiveDropFailed { rows: residual });
        }
        Ok(())
    }

    fn price_per_area(&self, data: &mut Dataset) -> Result<()> {
        let price = self.require(data, p::SALE_PRICE)?;
        let area = self.require(data, p::FINISHED_AREA)?;

        let values = data
            .rows
            .iter()
            .map(|row| match (row[price].coerce_f64(), row[area].coerce_f64()) {
                (Some(x), Some(y)) => {
                    let ratio = x / y;
                    // 0/0 is undefined; x/0 keeps its infinite sign.
                    if ratio.is_nan() { Value::Null } else { Value::Float(ratio) }
                }
                _ => Value::Null,
            })
            .collect();
        data.set_column(p::PRICE_PER_SQFT, values);
        Ok(())
    }

    fn property_age(&self, data: &mut Dataset) -> Result<()> {
        let dates = self.coerce_sale_dates(data)?;
        let built = self.require(data, p::YEAR_BUILT)?;

        let values = data
            .rows
            .iter()
            .zip(&dates)
            .map(|(row, date)| {
                let Some(year) = date.map(|d| d.year()) else {
                    return Value::Null;
                };
                match &row[built] {
                    Value::Integer(b) => (year as i64)
                        .checked_sub(*b)
                        .map_or(Value::Null, Value::Integer),
                    other => other
                        .coerce_f64()
                        .map(|b| Value::Float(year as f64 - b))
                        .unwrap_or(Value::Null),
                }
            })
            .collect();
        data.set_column(p::PROPERTY_AGE, values);
        Ok(())
    }

    fn sale_year_month(&self, data: &mut Dataset) -> Result<()> {
        let dates = self.coerce_sale_dates(data)?;
        let years = dates
            .iter()
            .map(|d| d.map(|d| Value::Integer(d.year() as i64)).unwrap_or(Value::Null))
            .collect();
        let months = dates
            .iter()
            .map(|d| d.map(|d| Value::Integer(d.month() as i64)).unwrap_or(Value::Null))
            .collect();
        data.set_column(p::SALE_YEAR, years);
        data.set_column(p::SALE_MONTH, months);
        Ok(())
    }

    /// Replace the sale date column with `Value::Date` cells.
    fn coerce_sale_dates(&self, data: &mut Dataset) -> Result<Vec<Option<NaiveDate>>> {
        let col = self.require(data, p::SALE_DATE)?;

        let mut dates = Vec::with_capacity(data.row_count());
        for (row, &label) in data.rows.iter().zip(&data.index) {
            let date = match &row[col] {
                Value::Date(d) => Some(*d),
                Value::Null => None,
                other => {
                    let raw = other.to_string();
                    Some(parse_date(&raw).ok_or(DualcheckError::UnparseableDate {
                        row: label,
                        value: raw,
                    })?)
                }
            };
            dates.push(date);
        }

        data.set_column(p::SALE_DATE, dates.iter().map(|d| (*d).map(Value::Date).into()).collect());
        Ok(dates)
    }

    fn land_to_building(&self, data: &mut Dataset) -> Result<()> {
        let land = self.require(data, p::LAND_VALUE)?;
        let building = self.require(data, p::BUILDING_VALUE)?;

        let values = data
            .rows
            .iter()
            .map(|row| {
                let denominator = row[building].coerce_f64().filter(|b| *b != 0.0);
                match (row[land].coerce_f64(), denominator) {
                    (Some(l), Some(b)) if !(l / b).is_nan() => Value::Float(l / b),
                    _ => Value::Null,
                }
            })
            .collect();
        data.set_column(p::LAND_TO_BUILDING_RATIO, values);
        Ok(())
    }

    fn price_category(&self, data: &mut Dataset) -> Result<()> {
        let price = self.require(data, p::SALE_PRICE)?;

        let values = data
            .rows
            .iter()
            .map(|row| Value::from(price_category(row[price].coerce_f64())))
            .collect();
        data.set_column(p::SALE_PRICE_CATEGORY, values);
        Ok(())
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a `HH:MM:SS` time.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|dt| dt.date())
    })
}

fn price_category(price: Option<f64>) -> &'static str {
    match price {
        Some(v) if v < 100_000.0 => "Low",
        Some(v) if (100_000.0..=300_000.0).contains(&v) => "Medium",
        Some(v) if v > 300_000.0 => "High",
        _ => "Unknown",
    }
}

/// Split the first listed owner into (family name, first name).
fn split_owner(owner: &str) -> (Option<String>, Option<String>) {
    let mut owner = owner.trim();
    if let Some((first_owner, _)) = owner.split_once('&') {
        owner = first_owner.trim();
    }

    let non_empty = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };

    if let Some((family, first)) = owner.split_once(',') {
        return (non_empty(family), non_empty(first));
    }

    let tokens: Vec<&str> = owner.split_whitespace().collect();
    match tokens.split_first() {
        Some((first, rest)) if !rest.is_empty() => (Some(rest.join(" ")), Some(first.to_string())),
        _ => (non_empty(owner), None),
    }
}

fn owner_names(data: &mut Dataset) {
    let (family, first): (Vec<Value>, Vec<Value>) = match data.column_index(p::OWNER_NAME) {
        Some(col) => data
            .rows
            .iter()
            .map(|row| match &row[col] {
                Value::Null => (Value::Null, Value::Null),
                other => {
                    let (family, first) = split_owner(&other.to_string());
                    (family.into(), first.into())
                }
            })
            .unzip(),
        None => (0..data.row_count()).map(|_| (Value::Null, Value::Null)).unzip(),
    };
    data.set_column(p::FAMILY_NAME, family);
    data.set_column(p::FIRST_NAME, first);
}

/// Bucket label for a Celsius temperature, `None` outside (-60, 60].
fn temperature_bucket(celsius: f64) -> Option<&'static str> {
    TEMPERATURE_EDGES
        .windows(2)
        .position(|edge| celsius > edge[0] && celsius <= edge[1])
        .map(|i| TEMPERATURE_LABELS[i])
}

fn temperature_category(data: &mut Dataset) {
    if !data.has_column(w::TEMPERATURE_CELSIUS) {
        let Some(fahrenheit) = data.column_index(w::TEMPERATURE_FAHRENHEIT) else {
            return;
        };
        let celsius = data
            .rows
            .iter()
            .map(|row| {
                row[fahrenheit]
                    .coerce_f64()
                    .map(|f| Value::Float((f - 32.0) * 5.0 / 9.0))
                    .unwrap_or(Value::Null)
            })
            .collect();
        data.set_column(w::TEMPERATURE_CELSIUS, celsius);
    }

    let Some(col) = data.column_index(w::TEMPERATURE_CELSIUS) else {
        return;
    };
    let values = data
        .rows
        .iter()
        .map(|row| row[col].coerce_f64().and_then(temperature_bucket).into())
        .collect();
    data.set_column(w::TEMPERATURE_CATEGORY, values);
}

fn temperature_deviation(data: &mut Dataset) {
    let Some(col) = data
        .column_index(w::TEMPERATURE_CELSIUS)
        .or_else(|| data.column_index(w::TEMPERATURE_FAHRENHEIT))
    else {
        return;
    };

    let temps: Vec<Option<f64>> = data.rows.iter().map(|row| row[col].coerce_f64()).collect();
    let present: Vec<f64> = temps.iter().flatten().copied().collect();
    let mean = (!present.is_empty()).then(|| present.iter().sum::<f64>() / present.len() as f64);

    let values = temps
        .iter()
        .map(|t| match (t, mean) {
            (Some(t), Some(mean)) => Value::Float(t - mean),
            _ => Value::Null,
        })
        .collect();
    data.set_column(w::TEMPERATURE_DEVIATION, values);
}

fn air_quality_category(data: &mut Dataset) {
    let Some(col) = data.column_index(w::AIR_US_EPA_INDEX) else {
        return;
    };
    let values = data
        .rows
        .iter()
        .map(|row| {
            let label = row[col]
                .coerce_f64()
                .filter(|v| v.fract() == 0.0 && (1.0..=6.0).contains(v))
                .map(|v| AIR_QUALITY_LABELS[v as usize - 1])
                .unwrap_or("Unknown");
            Value::from(label)
        })
        .collect();
    data.set_column(w::AIR_QUALITY_CATEGORY, values);
}

fn remove_duplicates(data: &mut Dataset) {
    let mut seen = HashSet::new();
    let keys: Vec<Vec<String>> = (0..data.row_count()).map(|pos| data.row_key(pos, None)).collect();
    data.retain_rows(|pos, _| seen.insert(keys[pos].clone()));

    let location = present_columns(data, w::LOCATION_KEYS);
    let date = present_columns(data, w::DATE_KEYS);

    if !location.is_empty() && !date.is_empty() {
        let mut subset: Vec<usize> = location.into_iter().chain(date).collect();
        subset.sort_unstable();

        let mut seen = HashSet::new();
        let keys: Vec<Vec<String>> = (0..data.row_count())
            .map(|pos| data.row_key(pos, Some(&subset)))
            .collect();
        data.retain_rows(|pos, _| seen.insert(keys[pos].clone()));
    }

    data.reindex();
}

/// Positions of the named columns that exist, in dataset order.
fn present_columns(data: &Dataset, names: &[&str]) -> Vec<usize> {
    data.headers
        .iter()
        .enumerate()
        .filter(|(_, h)| names.contains(&h.as_str()))
        .map(|(i, _)| i)
        .collect()
}
