//! Recomputation of the weather derived columns.

use crate::input::{Dataset, Value};
use crate::schema::columns::weather as w;

use super::engine::{DerivedCheck, TOLERANCE};

pub(super) fn checks() -> Vec<Box<dyn DerivedCheck>> {
    vec![
        Box::new(TemperatureCategory),
        Box::new(TemperatureDeviation),
        Box::new(AirQualityCategory),
    ]
}

struct TemperatureCategory;

impl TemperatureCategory {
    fn label(celsius: f64) -> Option<&'static str> {
        if !(celsius > -60.0 && celsius <= 60.0) {
            return None;
        }
        Some(if celsius <= 0.0 {
            "Freezing"
        } else if celsius <= 10.0 {
            "Cold"
        } else if celsius <= 20.0 {
            "Cool"
        } else if celsius <= 30.0 {
            "Mild"
        } else if celsius <= 40.0 {
            "Warm"
        } else {
            "Hot"
        })
    }
}

impl DerivedCheck for TemperatureCategory {
    fn field(&self) -> &'static str {
        w::TEMPERATURE_CATEGORY
    }

    fn expected(&self, data: &Dataset) -> Option<Vec<Value>> {
        let temps = data.column(w::TEMPERATURE_CELSIUS)?;
        Some(
            temps
                .iter()
                .map(|t| match t.coerce_f64().and_then(Self::label) {
                    Some(label) => Value::Text(label.to_string()),
                    None => Value::Null,
                })
                .collect(),
        )
    }
}

struct TemperatureDeviation;

impl DerivedCheck for TemperatureDeviation {
    fn field(&self) -> &'static str {
        w::TEMPERATURE_DEVIATION
    }

    fn tolerance(&self) -> f64 {
        TOLERANCE
    }

    fn expected(&self, data: &Dataset) -> Option<Vec<Value>> {
        let temps = data
            .column(w::TEMPERATURE_CELSIUS)
            .or_else(|| data.column(w::TEMPERATURE_FAHRENHEIT))?;

        let (sum, count) = temps
            .iter()
            .filter_map(|t| t.coerce_f64())
            .fold((0.0, 0usize), |(sum, n), t| (sum + t, n + 1));

        Some(
            temps
                .iter()
                .map(|t| match t.coerce_f64() {
                    Some(t) if count > 0 => Value::Float(t - sum / count as f64),
                    _ => Value::Null,
                })
                .collect(),
        )
    }
}

struct AirQualityCategory;

impl DerivedCheck for AirQualityCategory {
    fn field(&self) -> &'static str {
        w::AIR_QUALITY_CATEGORY
    }

    fn expected(&self, data: &Dataset) -> Option<Vec<Value>> {
        let index = data.column(w::AIR_US_EPA_INDEX)?;
        Some(
            index
                .iter()
                .map(|v| {
                    let code = match v {
                        Value::Integer(i) => Some(*i),
                        Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
                        Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.fract() == 0.0).map(|f| f as i64),
                        _ => None,
                    };
                    let label = match code {
                        Some(1) => "Good",
                        Some(2) => "Moderate",
                        Some(3) => "Unhealthy for Sensitive Groups",
                        Some(4) => "Unhealthy",
                        Some(5) => "Very Unhealthy",
                        Some(6) => "Hazardous",
                        _ => "Unknown",
                    };
                    Value::Text(label.to_string())
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_edges() {
        assert_eq!(TemperatureCategory::label(0.0), Some("Freezing"));
        assert_eq!(TemperatureCategory::label(0.001), Some("Cold"));
        assert_eq!(TemperatureCategory::label(40.0), Some("Warm"));
        assert_eq!(TemperatureCategory::label(-60.0), None);
        assert_eq!(TemperatureCategory::label(f64::NAN), None);
    }

    #[test]
    fn test_unmapped_index() {
        let data = Dataset::new(
            vec![w::AIR_US_EPA_INDEX.to_string()],
            vec![vec![Value::Integer(7)], vec![Value::Float(2.0)]],
        );
        let expected = AirQualityCategory.expected(&data).unwrap();
        assert_eq!(expected[0], Value::from("Unknown"));
        assert_eq!(expected[1], Value::from("Moderate"));
    }
}
