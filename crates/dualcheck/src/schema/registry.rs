//! Declarative schemas for the two dataset kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DualcheckError, Result};

use super::columns::{property as p, weather as w};
use super::rule::{Bound, Constraint, FieldRule};
use super::types::LogicalType;

/// Which pipeline a dataset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Property sale records.
    #[default]
    PropertySale,
    /// Weather observations.
    Weather,
}

impl DatasetKind {
    /// Default file stem for persisted output.
    pub fn output_stem(&self) -> &'static str {
        match self {
            DatasetKind::PropertySale => "processed_property_sales",
            DatasetKind::Weather => "processed_weather",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::PropertySale => write!(f, "property-sale"),
            DatasetKind::Weather => write!(f, "weather"),
        }
    }
}

impl FromStr for DatasetKind {
    type Err = DualcheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "property_sale" | "property" | "sales" | "nashville" | "housing" => {
                Ok(DatasetKind::PropertySale)
            }
            "weather" => Ok(DatasetKind::Weather),
            _ => Err(DualcheckError::Config(format!(
                "Unknown dataset kind: {}. Use: property-sale or weather.",
                s
            ))),
        }
    }
}

/// What the validator does with schema columns the dataset lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentColumnPolicy {
    /// Every cell of an absent column reads as null.
    TreatAsNull,
    /// Report each absent column once and skip its rule.
    SkipAndReport,
}

/// Ordered field rules for one dataset kind.
#[derive(Debug, Clone)]
pub struct Schema {
    pub kind: DatasetKind,
    pub rules: Vec<FieldRule>,
    pub absent_columns: AbsentColumnPolicy,
}

impl Schema {
    /// Registry lookup.
    pub fn for_kind(kind: DatasetKind) -> Result<Self> {
        match kind {
            DatasetKind::PropertySale => Self::property_sale(),
            DatasetKind::Weather => Self::weather(),
        }
    }

    /// Schema for property sale records.
    pub fn property_sale() -> Result<Self> {
        use LogicalType::{Number, Text, TextOrNumber};

        let non_negative_int = |name: &str| {
            FieldRule::mandatory(name, Number).with(Constraint::NonNegativeInteger)
        };

        let rules = vec![
            FieldRule::optional(p::UNNAMED_INDEX, Number).strict(),
            FieldRule::mandatory(p::PARCEL_ID, Text).strict(),
            FieldRule::mandatory(p::LAND_USE, Text).strict(),
            FieldRule::mandatory(p::PROPERTY_ADDRESS, Text).strict(),
            FieldRule::optional(p::SUITE_CONDO, TextOrNumber),
            FieldRule::mandatory(p::PROPERTY_CITY, Text).strict(),
            FieldRule::mandatory(p::SALE_DATE, LogicalType::date("%Y-%m-%d", "YYYY-MM-DD")),
            FieldRule::mandatory(p::SALE_PRICE, Number),
            FieldRule::mandatory(p::LEGAL_REFERENCE, Text).strict(),
            FieldRule::mandatory(p::SOLD_AS_VACANT, Text).with(Constraint::one_of(&["Yes", "No"])),
            FieldRule::mandatory(p::MULTIPLE_PARCELS, Text)
                .with(Constraint::one_of(&["Yes", "No"])),
            FieldRule::optional(p::OWNER_NAME, Text).strict(),
            FieldRule::optional(p::ADDRESS, Text).strict(),
            FieldRule::optional(p::CITY, Text).strict(),
            FieldRule::optional(p::STATE, Text)
                .strict()
                .with(Constraint::Length(2)),
            FieldRule::mandatory(p::ACREAGE, Number).with(Constraint::NonNegative),
            FieldRule::optional(p::TAX_DISTRICT, Text).strict(),
            FieldRule::mandatory(p::NEIGHBORHOOD, Number).strict(),
            FieldRule::optional(p::IMAGE, Text).strict(),
            FieldRule::mandatory(p::LAND_VALUE, Number).with(Constraint::NonNegative),
            FieldRule::mandatory(p::BUILDING_VALUE, Number)
                .with(Constraint::non_zero("land-to-building ratio")),
            FieldRule::mandatory(p::TOTAL_VALUE, Number).with(Constraint::NonNegative),
            FieldRule::mandatory(p::FINISHED_AREA, Number)
                .with(Constraint::non_zero("price per square foot")),
            FieldRule::optional(p::FOUNDATION_TYPE, Text).strict().with(Constraint::pattern(
                "[A-Z ]+",
                "contain only uppercase letters and spaces",
            )?),
            FieldRule::mandatory(p::YEAR_BUILT, Number).with(Constraint::Range {
                min: Bound::Fixed(1700.0),
                max: Bound::CurrentYear,
            }),
            FieldRule::optional(p::EXTERIOR_WALL, Text).strict().with(Constraint::pattern(
                "[A-Z/ ]+",
                "contain only uppercase letters, spaces, or slashes",
            )?),
            FieldRule::optional(p::GRADE, Text).strict().with(Constraint::pattern(
                "[A-Z][+-]?",
                "be a single uppercase letter optionally followed by + or -",
            )?),
            non_negative_int(p::BEDROOMS),
            non_negative_int(p::FULL_BATH),
            non_negative_int(p::HALF_BATH),
        ];

        Ok(Self {
            kind: DatasetKind::PropertySale,
            rules,
            absent_columns: AbsentColumnPolicy::TreatAsNull,
        })
    }

    /// Schema for weather observations. Every field is mandatory.
    pub fn weather() -> Result<Self> {
        use LogicalType::{Integer, Number, Text};

        let text = |name: &str| FieldRule::mandatory(name, Text);
        let number = |name: &str| FieldRule::mandatory(name, Number);
        let clock = |name: &str| {
            FieldRule::mandatory(
                name,
                LogicalType::time(
                    "%I:%M %p",
                    "HH:MM AM/PM",
                    &["No sunrise", "No sunset", "No moonrise", "No moonset"],
                ),
            )
        };

        let rules = vec![
            text(w::COUNTRY),
            text(w::LOCATION_NAME),
            number(w::LATITUDE),
            number(w::LONGITUDE),
            text(w::TIMEZONE),
            number(w::LAST_UPDATED_EPOCH),
            FieldRule::mandatory(
                w::LAST_UPDATED,
                LogicalType::date_time("%Y-%m-%d %H:%M", "YYYY-MM-DD HH:MM"),
            ),
            number(w::TEMPERATURE_CELSIUS),
            number(w::TEMPERATURE_FAHRENHEIT),
            text(w::CONDITION_TEXT),
            number(w::WIND_MPH),
            number(w::WIND_KPH),
            number(w::WIND_DEGREE),
            text(w::WIND_DIRECTION),
            number(w::PRESSURE_MB),
            number(w::PRESSURE_IN),
            number(w::PRECIP_MM),
            number(w::PRECIP_IN),
            number(w::HUMIDITY),
            number(w::CLOUD),
            number(w::FEELS_LIKE_CELSIUS),
            number(w::FEELS_LIKE_FAHRENHEIT),
            number(w::VISIBILITY_KM),
            number(w::VISIBILITY_MILES),
            number(w::UV_INDEX),
            number(w::GUST_MPH),
            number(w::GUST_KPH),
            number(w::AIR_CARBON_MONOXIDE),
            number(w::AIR_OZONE),
            number(w::AIR_NITROGEN_DIOXIDE),
            number(w::AIR_SULPHUR_DIOXIDE),
            number(w::AIR_PM2_5),
            number(w::AIR_PM10),
            number(w::AIR_US_EPA_INDEX),
            number(w::AIR_GB_DEFRA_INDEX),
            clock(w::SUNRISE),
            clock(w::SUNSET),
            clock(w::MOONRISE),
            clock(w::MOONSET),
            text(w::MOON_PHASE).with(Constraint::one_of_ignore_case(&[
                "New Moon",
                "Waxing Crescent",
                "First Quarter",
                "Waxing Gibbous",
                "Full Moon",
                "Waning Gibbous",
                "Third Quarter",
                "Waning Crescent",
                "Last Quarter",
            ])),
            FieldRule::mandatory(w::MOON_ILLUMINATION, Integer),
        ];

        Ok(Self {
            kind: DatasetKind::Weather,
            rules,
            absent_columns: AbsentColumnPolicy::SkipAndReport,
        })
    }

    /// Get a rule by column name.
    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Column names in rule order.
    pub fn field_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Names of the mandatory fields, in rule order.
    pub fn mandatory_fields(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| r.is_mandatory())
            .map(|r| r.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Requirement;

    #[test]
    fn test_property_mandatory_matches_drop_list() {
        let schema = Schema::property_sale().unwrap();
        let mut mandatory = schema.mandatory_fields();
        let mut expected = p::MANDATORY.to_vec();
        mandatory.sort_unstable();
        expected.sort_unstable();
        assert_eq!(mandatory, expected);
    }

    #[test]
    fn test_weather_all_mandatory() {
        let schema = Schema::weather().unwrap();
        assert_eq!(schema.rules.len(), 41);
        assert!(schema.rules.iter().all(|r| r.requirement == Requirement::Mandatory));
        assert_eq!(schema.absent_columns, AbsentColumnPolicy::SkipAndReport);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("property-sale".parse::<DatasetKind>().unwrap(), DatasetKind::PropertySale);
        assert_eq!("Nashville".parse::<DatasetKind>().unwrap(), DatasetKind::PropertySale);
        assert_eq!("weather".parse::<DatasetKind>().unwrap(), DatasetKind::Weather);
        assert!("stocks".parse::<DatasetKind>().is_err());
    }

    #[test]
    fn test_rule_lookup() {
        let schema = Schema::for_kind(DatasetKind::PropertySale).unwrap();
        let grade = schema.rule(p::GRADE).unwrap();
        assert!(!grade.is_mandatory());
        assert!(schema.rule("nonexistent").is_none());
    }
}
