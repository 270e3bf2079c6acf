use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Country – the closed set of regions the dashboard compares
// ---------------------------------------------------------------------------

/// One of the three countries covered by the measurement campaign.
///
/// The declaration order is the load order and the grouping order used by
/// every aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Country {
    Benin,
    SierraLeone,
    Togo,
}

impl Country {
    pub const ALL: [Country; 3] = [Country::Benin, Country::SierraLeone, Country::Togo];

    /// Display name, as used in tables and chart legends.
    pub fn name(self) -> &'static str {
        match self {
            Country::Benin => "Benin",
            Country::SierraLeone => "Sierra_Leone",
            Country::Togo => "Togo",
        }
    }

    /// Lower-cased name used to build `{stem}_clean.{ext}` file names.
    pub fn file_stem(self) -> &'static str {
        match self {
            Country::Benin => "benin",
            Country::SierraLeone => "sierra_leone",
            Country::Togo => "togo",
        }
    }

    /// Position in [`Country::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Country {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Country {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown country '{0}' (expected one of Benin, Sierra_Leone, Togo)")]
pub struct UnknownCountry(pub String);

impl FromStr for Country {
    type Err = UnknownCountry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Country::ALL
            .into_iter()
            .find(|c| c.file_stem() == normalized)
            .ok_or_else(|| UnknownCountry(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Measurement – one row of the combined table
// ---------------------------------------------------------------------------

/// A single GHI reading for one country at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    #[serde(rename = "Country")]
    pub country: Country,
    #[serde(rename = "TIMESTAMP")]
    pub timestamp: NaiveDateTime,
    /// Global Horizontal Irradiance, W/m².
    #[serde(rename = "GHI")]
    pub ghi: f64,
}

// ---------------------------------------------------------------------------
// CombinedDataset – everything the session works with
// ---------------------------------------------------------------------------

/// Where the rows of a [`CombinedDataset`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    /// Read from the cleaned per-country files.
    Measured,
    /// Generated because at least one country file was missing.
    Synthetic,
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrigin::Measured => f.write_str("measured"),
            DataOrigin::Synthetic => f.write_str("synthetic"),
        }
    }
}

/// All measurements across countries, in country order then file order.
/// Treated as read-only once built.
#[derive(Debug, Clone)]
pub struct CombinedDataset {
    records: Vec<Measurement>,
    origin: DataOrigin,
}

impl CombinedDataset {
    pub fn new(records: Vec<Measurement>, origin: DataOrigin) -> Self {
        Self { records, origin }
    }

    pub fn records(&self) -> &[Measurement] {
        &self.records
    }

    pub fn origin(&self) -> DataOrigin {
        self.origin
    }

    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Countries that contribute at least one row, in country order.
    pub fn countries(&self) -> Vec<Country> {
        let counts = self.counts_by_country();
        Country::ALL
            .into_iter()
            .filter(|c| counts[c.index()] > 0)
            .collect()
    }

    /// Row count per country, indexed by [`Country::index`].
    pub fn counts_by_country(&self) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for m in &self.records {
            counts[m.country.index()] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_parses_loosely() {
        assert_eq!("benin".parse::<Country>().unwrap(), Country::Benin);
        assert_eq!("Sierra Leone".parse::<Country>().unwrap(), Country::SierraLeone);
        assert_eq!("SIERRA-LEONE".parse::<Country>().unwrap(), Country::SierraLeone);
        assert_eq!(" Togo ".parse::<Country>().unwrap(), Country::Togo);
        assert!("Ghana".parse::<Country>().is_err());
    }

    #[test]
    fn file_stem_is_lowercased_name() {
        for c in Country::ALL {
            assert_eq!(c.file_stem(), c.name().to_ascii_lowercase());
        }
    }

    #[test]
    fn countries_lists_only_present_ones() {
        let ts = chrono::NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ds = CombinedDataset::new(
            vec![
                Measurement { country: Country::Togo, timestamp: ts, ghi: 1.0 },
                Measurement { country: Country::Benin, timestamp: ts, ghi: 2.0 },
            ],
            DataOrigin::Measured,
        );
        assert_eq!(ds.countries(), vec![Country::Benin, Country::Togo]);
        assert_eq!(ds.counts_by_country(), [1, 0, 1]);
    }
}
