//! Column names shared by the registry, the derivation steps and the
//! reconciliation checks.

/// Property-sale columns.
pub mod property {
    pub const UNNAMED_INDEX: &str = "Unnamed: 0";
    pub const PARCEL_ID: &str = "Parcel ID";
    pub const LAND_USE: &str = "Land Use";
    pub const PROPERTY_ADDRESS: &str = "Property Address";
    pub const SUITE_CONDO: &str = "Suite/ Condo   #";
    pub const PROPERTY_CITY: &str = "Property City";
    pub const SALE_DATE: &str = "Sale Date";
    pub const SALE_PRICE: &str = "Sale Price";
    pub const LEGAL_REFERENCE: &str = "Legal Reference";
    pub const SOLD_AS_VACANT: &str = "Sold As Vacant";
    pub const MULTIPLE_PARCELS: &str = "Multiple Parcels Involved in Sale";
    pub const OWNER_NAME: &str = "Owner Name";
    pub const ADDRESS: &str = "Address";
    pub const CITY: &str = "City";
    pub const STATE: &str = "State";
    pub const ACREAGE: &str = "Acreage";
    pub const TAX_DISTRICT: &str = "Tax District";
    pub const NEIGHBORHOOD: &str = "Neighborhood";
    pub const IMAGE: &str = "image";
    pub const LAND_VALUE: &str = "Land Value";
    pub const BUILDING_VALUE: &str = "Building Value";
    pub const TOTAL_VALUE: &str = "Total Value";
    pub const FINISHED_AREA: &str = "Finished Area";
    pub const FOUNDATION_TYPE: &str = "Foundation Type";
    pub const YEAR_BUILT: &str = "Year Built";
    pub const EXTERIOR_WALL: &str = "Exterior Wall";
    pub const GRADE: &str = "Grade";
    pub const BEDROOMS: &str = "Bedrooms";
    pub const FULL_BATH: &str = "Full Bath";
    pub const HALF_BATH: &str = "Half Bath";

    pub const PRICE_PER_SQFT: &str = "Price per Square Foot";
    pub const PROPERTY_AGE: &str = "Property Age";
    pub const SALE_YEAR: &str = "Sale Year";
    pub const SALE_MONTH: &str = "Sale Month";
    pub const LAND_TO_BUILDING_RATIO: &str = "Land-to-Building Ratio";
    pub const SALE_PRICE_CATEGORY: &str = "Sale Price Category";
    pub const FAMILY_NAME: &str = "Family Name";
    pub const FIRST_NAME: &str = "First Name";

    /// Columns whose nulls make a row unusable for derivation.
    pub const MANDATORY: &[&str] = &[
        PARCEL_ID,
        LAND_USE,
        PROPERTY_ADDRESS,
        PROPERTY_CITY,
        SALE_DATE,
        SALE_PRICE,
        LEGAL_REFERENCE,
        SOLD_AS_VACANT,
        MULTIPLE_PARCELS,
        ACREAGE,
        NEIGHBORHOOD,
        LAND_VALUE,
        BUILDING_VALUE,
        TOTAL_VALUE,
        FINISHED_AREA,
        YEAR_BUILT,
        BEDROOMS,
        FULL_BATH,
        HALF_BATH,
    ];

    /// Raw columns not carried past derivation.
    pub const DROPPED: &[&str] = &[IMAGE, SOLD_AS_VACANT, MULTIPLE_PARCELS];

    /// Columns the reconciliation pass expects after derivation.
    pub const EXPECTED_DERIVED: &[&str] = &[
        PRICE_PER_SQFT,
        PROPERTY_AGE,
        SALE_YEAR,
        SALE_MONTH,
        LAND_TO_BUILDING_RATIO,
        SALE_PRICE_CATEGORY,
        FAMILY_NAME,
        FIRST_NAME,
        OWNER_NAME,
    ];
}

/// Weather-observation columns.
pub mod weather {
    pub const COUNTRY: &str = "country";
    pub const LOCATION_NAME: &str = "location_name";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const TIMEZONE: &str = "timezone";
    pub const LAST_UPDATED_EPOCH: &str = "last_updated_epoch";
    pub const LAST_UPDATED: &str = "last_updated";
    pub const DATE: &str = "date";
    pub const TEMPERATURE_CELSIUS: &str = "temperature_celsius";
    pub const TEMPERATURE_FAHRENHEIT: &str = "temperature_fahrenheit";
    pub const CONDITION_TEXT: &str = "condition_text";
    pub const WIND_MPH: &str = "wind_mph";
    pub const WIND_KPH: &str = "wind_kph";
    pub const WIND_DEGREE: &str = "wind_degree";
    pub const WIND_DIRECTION: &str = "wind_direction";
    pub const PRESSURE_MB: &str = "pressure_mb";
    pub const PRESSURE_IN: &str = "pressure_in";
    pub const PRECIP_MM: &str = "precip_mm";
    pub const PRECIP_IN: &str = "precip_in";
    pub const HUMIDITY: &str = "humidity";
    pub const CLOUD: &str = "cloud";
    pub const FEELS_LIKE_CELSIUS: &str = "feels_like_celsius";
    pub const FEELS_LIKE_FAHRENHEIT: &str = "feels_like_fahrenheit";
    pub const VISIBILITY_KM: &str = "visibility_km";
    pub const VISIBILITY_MILES: &str = "visibility_miles";
    pub const UV_INDEX: &str = "uv_index";
    pub const GUST_MPH: &str = "gust_mph";
    pub const GUST_KPH: &str = "gust_kph";
    pub const AIR_CARBON_MONOXIDE: &str = "air_quality_Carbon_Monoxide";
    pub const AIR_OZONE: &str = "air_quality_Ozone";
    pub const AIR_NITROGEN_DIOXIDE: &str = "air_quality_Nitrogen_dioxide";
    pub const AIR_SULPHUR_DIOXIDE: &str = "air_quality_Sulphur_dioxide";
    pub const AIR_PM2_5: &str = "air_quality_PM2.5";
    pub const AIR_PM10: &str = "air_quality_PM10";
    pub const AIR_US_EPA_INDEX: &str = "air_quality_us-epa-index";
    pub const AIR_GB_DEFRA_INDEX: &str = "air_quality_gb-defra-index";
    pub const SUNRISE: &str = "sunrise";
    pub const SUNSET: &str = "sunset";
    pub const MOONRISE: &str = "moonrise";
    pub const MOONSET: &str = "moonset";
    pub const MOON_PHASE: &str = "moon_phase";
    pub const MOON_ILLUMINATION: &str = "moon_illumination";

    pub const TEMPERATURE_CATEGORY: &str = "temperature_category";
    pub const TEMPERATURE_DEVIATION: &str = "temperature_deviation";
    pub const AIR_QUALITY_CATEGORY: &str = "air_quality_category";

    /// Location columns used for the secondary dedup pass, when present.
    pub const LOCATION_KEYS: &[&str] = &[LOCATION_NAME, COUNTRY, LATITUDE, LONGITUDE];
    /// Timestamp columns used for the secondary dedup pass, when present.
    pub const DATE_KEYS: &[&str] = &[LAST_UPDATED, DATE];

    pub const EXPECTED_DERIVED: &[&str] =
        &[TEMPERATURE_CATEGORY, TEMPERATURE_DEVIATION, AIR_QUALITY_CATEGORY];
}
