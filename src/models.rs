use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{KNMI_DAILY_ENDPOINT, KNMI_HOURLY_ENDPOINT};

// ============================================================================
// Query Parameters
// ============================================================================

/// Flat query-string parameters. Setting a key twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

// ============================================================================
// KNMI Dataset Models
// ============================================================================

/// Which KNMI climatology service to query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Hourly,
    #[default]
    Daily,
}

impl Resolution {
    pub fn endpoint(self) -> &'static str {
        match self {
            Resolution::Hourly => KNMI_HOURLY_ENDPOINT,
            Resolution::Daily => KNMI_DAILY_ENDPOINT,
        }
    }
}

/// Named bundles of observation acronyms understood by the `vars` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableGroup {
    Wind,
    Temperature,
    Sunshine,
    Precipitation,
    Pressure,
    VisibilityClouds,
    Moisture,
    All,
}

impl VariableGroup {
    pub const ALL_GROUPS: [VariableGroup; 8] = [
        VariableGroup::Wind,
        VariableGroup::Temperature,
        VariableGroup::Sunshine,
        VariableGroup::Precipitation,
        VariableGroup::Pressure,
        VariableGroup::VisibilityClouds,
        VariableGroup::Moisture,
        VariableGroup::All,
    ];

    pub fn acronym(self) -> &'static str {
        match self {
            VariableGroup::Wind => "WIND",
            VariableGroup::Temperature => "TEMP",
            VariableGroup::Sunshine => "SUNR",
            VariableGroup::Precipitation => "PRCP",
            VariableGroup::Pressure => "PRES",
            VariableGroup::VisibilityClouds => "VICL",
            VariableGroup::Moisture => "MSTR",
            VariableGroup::All => "ALL",
        }
    }

    /// Columns the daily service returns for the group, with their meaning.
    pub fn variables(self) -> &'static [(&'static str, &'static str)] {
        match self {
            VariableGroup::Wind => &[
                (
                    "DDVEC",
                    "vector mean wind direction in degrees (360=north, 90=east, 180=south, 270=west, 0=calm/variable)",
                ),
                ("FHVEC", "vector mean wind speed (0.1 m/s)"),
                ("FG", "daily mean wind speed (0.1 m/s)"),
                ("FHX", "highest hourly mean wind speed (0.1 m/s)"),
                ("FHXH", "hourly division in which FHX was measured"),
                ("FHN", "lowest hourly mean wind speed (0.1 m/s)"),
                ("FHNH", "hourly division in which FHN was measured"),
                ("FXX", "highest wind gust (0.1 m/s)"),
                ("FXXH", "hourly division in which FXX was measured"),
            ],
            VariableGroup::Temperature => &[
                ("TG", "daily mean temperature (0.1 degrees Celsius)"),
                ("TN", "minimum temperature (0.1 degrees Celsius)"),
                ("TNH", "hourly division in which TN was measured"),
                ("TX", "maximum temperature (0.1 degrees Celsius)"),
                ("TXH", "hourly division in which TX was measured"),
                ("T10N", "minimum temperature at 10 cm height (0.1 degrees Celsius)"),
                ("T10NH", "6-hour division in which T10N was measured"),
            ],
            VariableGroup::Sunshine => &[
                ("SQ", "sunshine duration (0.1 hour)"),
                ("SP", "percentage of maximum potential sunshine duration"),
                ("Q", "global radiation (J/cm2)"),
            ],
            VariableGroup::Precipitation => &[
                ("DR", "precipitation duration (0.1 hour)"),
                ("RH", "daily precipitation amount (0.1 mm) (-1 for <0.05 mm)"),
                (
                    "RHX",
                    "highest hourly precipitation amount (0.1 mm) (-1 for <0.05 mm)",
                ),
                ("RHXH", "hourly division in which RHX was measured"),
                ("EV24", "potential evapotranspiration, Makkink (0.1 mm)"),
            ],
            VariableGroup::Pressure => &[
                ("PG", "daily mean sea level pressure (0.1 hPa)"),
                ("PGX", "highest hourly sea level pressure (0.1 hPa)"),
                ("PGXH", "hourly division in which PGX was measured"),
                ("PGN", "lowest hourly sea level pressure (0.1 hPa)"),
                ("PGNH", "hourly division in which PGN was measured"),
            ],
            VariableGroup::VisibilityClouds => &[
                ("VVN", "minimum visibility"),
                ("VVNH", "hourly division in which VVN was measured"),
                ("VVX", "maximum visibility"),
                ("VVXH", "hourly division in which VVX was measured"),
                ("NG", "mean daily cloud cover (octants, 9=sky invisible)"),
            ],
            VariableGroup::Moisture => &[
                ("UG", "daily mean relative humidity (percent)"),
                ("UX", "maximum relative humidity (percent)"),
                ("UXH", "hourly division in which UX was measured"),
                ("UN", "minimum relative humidity (percent)"),
                ("UNH", "hourly division in which UN was measured"),
            ],
            VariableGroup::All => &[],
        }
    }

    /// Codes of [`VariableGroup::variables`], in column order.
    pub fn codes(self) -> impl Iterator<Item = &'static str> {
        self.variables().iter().map(|&(code, _)| code)
    }

    pub fn description(self) -> &'static str {
        match self {
            VariableGroup::Wind => "wind",
            VariableGroup::Temperature => "temperature",
            VariableGroup::Sunshine => "sunshine duration and global radiation",
            VariableGroup::Precipitation => "precipitation and potential evaporation",
            VariableGroup::Pressure => "sea level pressure",
            VariableGroup::VisibilityClouds => "visibility and cloud cover",
            VariableGroup::Moisture => "humidity",
            VariableGroup::All => "all variables",
        }
    }
}

impl fmt::Display for VariableGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.acronym())
    }
}

impl FromStr for VariableGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_GROUPS
            .into_iter()
            .find(|g| g.acronym().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown variable group: {s}"))
    }
}

/// A single-station, single-variable-set request against one KNMI service.
///
/// Values are passed through to the service as written: dates are
/// `YYYYMMDD` (daily) or `YYYYMMDDHH` (hourly), lists are `:` separated and
/// `ALL` selects everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationQuery {
    pub resolution: Resolution,
    pub start: String,
    pub end: String,
    pub vars: String,
    pub stations: String,
    pub inseason: Option<String>,
}

impl ObservationQuery {
    pub fn new(
        resolution: Resolution,
        start: impl Into<String>,
        end: impl Into<String>,
        vars: impl Into<String>,
        stations: impl Into<String>,
    ) -> Self {
        Self {
            resolution,
            start: start.into(),
            end: end.into(),
            vars: vars.into(),
            stations: stations.into(),
            inseason: None,
        }
    }

    /// Restricts every year in the range to the start/end day-of-year window.
    pub fn in_season(mut self, flag: impl Into<String>) -> Self {
        self.inseason = Some(flag.into());
        self
    }

    pub fn hourly_temperature(station: &str, start: &str, end: &str) -> Self {
        Self::new(Resolution::Hourly, start, end, VariableGroup::Temperature.acronym(), station)
    }

    pub fn daily_temperature(station: &str, start: &str, end: &str) -> Self {
        Self::new(Resolution::Daily, start, end, VariableGroup::Temperature.acronym(), station)
    }

    pub fn daily_wind(station: &str, start: &str, end: &str) -> Self {
        Self::new(Resolution::Daily, start, end, VariableGroup::Wind.acronym(), station)
    }

    pub fn daily_precipitation(station: &str, start: &str, end: &str) -> Self {
        Self::new(Resolution::Daily, start, end, VariableGroup::Precipitation.acronym(), station)
    }

    pub fn endpoint(&self) -> &'static str {
        self.resolution.endpoint()
    }

    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .set("start", self.start.as_str())
            .set("end", self.end.as_str())
            .set("vars", self.vars.as_str())
            .set("stns", self.stations.as_str());
        if let Some(inseason) = &self.inseason {
            params.set("inseason", inseason.as_str());
        }
        params
    }
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetObservationsRequest {
    /// "hourly" or "daily"
    #[serde(default)]
    pub resolution: Resolution,
    /// Start date, YYYYMMDD for daily or YYYYMMDDHH for hourly data
    pub start: String,
    /// End date, same format as start
    pub end: String,
    /// Colon separated variables or groups, e.g. "TEMP" or "TG:TN:EV24"
    pub vars: String,
    /// Colon separated station numbers, e.g. "240" or "240:260", or "ALL"
    pub stations: String,
    /// Set (e.g. "Y") to keep only the start/end day-of-year window of each year
    #[serde(default)]
    pub inseason: Option<String>,
    /// "text" (default) or "json"
    #[serde(default)]
    pub format: OutputFormat,
}

impl From<GetObservationsRequest> for ObservationQuery {
    fn from(request: GetObservationsRequest) -> Self {
        Self {
            resolution: request.resolution,
            start: request.start,
            end: request.end,
            vars: request.vars,
            stations: request.stations,
            inseason: request.inseason,
        }
    }
}
