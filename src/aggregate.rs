//! Derived views over the combined dataset.
//!
//! All functions are pure and recompute from their input on every call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::data::filter::{filtered, CountrySelection};
use crate::data::model::{CombinedDataset, Country, Measurement};

// ---------------------------------------------------------------------------
// Ranked summary
// ---------------------------------------------------------------------------

/// One row of the "top regions" table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Country")]
    pub country: Country,
    /// Mean GHI rounded to 2 decimals.
    #[serde(rename = "Average GHI (W/m²)")]
    pub mean_ghi: f64,
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Mean GHI per country, highest first. Equal means keep country order.
pub fn ranked_summary<'a, I>(rows: I) -> Vec<SummaryRow>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut sums = [(0.0f64, 0usize); 3];
    for m in rows {
        let slot = &mut sums[m.country.index()];
        slot.0 += m.ghi;
        slot.1 += 1;
    }

    let mut out: Vec<SummaryRow> = Country::ALL
        .into_iter()
        .filter_map(|country| {
            let (sum, n) = sums[country.index()];
            (n > 0).then(|| SummaryRow {
                country,
                mean_ghi: round2(sum / n as f64),
            })
        })
        .collect();

    out.sort_by(|a, b| b.mean_ghi.total_cmp(&a.mean_ghi));
    out
}

// ---------------------------------------------------------------------------
// Distribution comparison
// ---------------------------------------------------------------------------

/// Input of the boxplot. Quantiles are left to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison<'a> {
    /// Nothing selected or nothing left after filtering.
    Empty,
    Rows(Vec<&'a Measurement>),
}

impl Comparison<'_> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Comparison::Empty)
    }
}

pub fn distribution_comparison<'a>(
    dataset: &'a CombinedDataset,
    selection: &CountrySelection,
) -> Comparison<'a> {
    let rows = filtered(dataset, selection);
    if rows.is_empty() {
        Comparison::Empty
    } else {
        Comparison::Rows(rows)
    }
}

// ---------------------------------------------------------------------------
// Trend series
// ---------------------------------------------------------------------------

/// Calendar bucket width for the trend chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Granularity {
    #[default]
    Daily,
    /// Monday to Sunday.
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Daily, Granularity::Weekly, Granularity::Monthly];

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        }
    }

    /// First day of the bucket containing `ts`.
    pub fn bucket_start(self, ts: NaiveDateTime) -> NaiveDate {
        let date = ts.date();
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).unwrap_or(date)
            }
            Granularity::Monthly => date.with_day(1).unwrap_or(date),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Granularity::Daily),
            "weekly" | "week" | "w" => Ok(Granularity::Weekly),
            "monthly" | "month" | "m" => Ok(Granularity::Monthly),
            other => Err(format!(
                "unknown granularity '{other}' (expected daily, weekly or monthly)"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Granularity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Mean GHI of one country over one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    #[serde(rename = "Country")]
    pub country: Country,
    #[serde(rename = "TIMESTAMP")]
    pub bucket_start: NaiveDate,
    #[serde(rename = "GHI")]
    pub mean_ghi: f64,
    /// Observations that fell in the bucket.
    #[serde(skip)]
    pub count: usize,
}

/// Bucket each country's series and average within buckets.
///
/// Output is ordered by country, then bucket start. Buckets without any
/// observation are not emitted.
pub fn trend_series<'a, I>(rows: I, granularity: Granularity) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut buckets: BTreeMap<(Country, NaiveDate), (f64, usize)> = BTreeMap::new();
    for m in rows {
        let slot = buckets
            .entry((m.country, granularity.bucket_start(m.timestamp)))
            .or_insert((0.0, 0));
        slot.0 += m.ghi;
        slot.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((country, bucket_start), (sum, count))| TrendPoint {
            country,
            bucket_start,
            mean_ghi: sum / count as f64,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Timelike};

    use super::*;
    use crate::data::model::DataOrigin;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn m(country: Country, timestamp: NaiveDateTime, ghi: f64) -> Measurement {
        Measurement { country, timestamp, ghi }
    }

    #[test]
    fn summary_sorts_descending_by_mean() {
        let t = at(2022, 1, 1, 0);
        let rows = vec![
            m(Country::Benin, t, 200.0),
            m(Country::Benin, t, 400.0),
            m(Country::SierraLeone, t, 100.0),
            m(Country::Togo, t, 500.0),
        ];
        let summary = ranked_summary(&rows);
        let order: Vec<Country> = summary.iter().map(|r| r.country).collect();
        assert_eq!(order, vec![Country::Togo, Country::Benin, Country::SierraLeone]);
        assert_eq!(summary[1].mean_ghi, 300.0);
    }

    #[test]
    fn summary_rounds_to_two_decimals_and_breaks_ties_by_country() {
        let t = at(2022, 1, 1, 0);
        let rows = vec![
            m(Country::Togo, t, 1.0),
            m(Country::Togo, t, 2.0),
            m(Country::Togo, t, 2.0),
            m(Country::Benin, t, 5.0 / 3.0),
        ];
        let summary = ranked_summary(&rows);
        assert_eq!(summary[0].country, Country::Benin);
        assert_eq!(summary[0].mean_ghi, 1.67);
        assert_eq!(summary[1].country, Country::Togo);
        assert_eq!(summary[1].mean_ghi, 1.67);
    }

    #[test]
    fn empty_selection_gives_neutral_comparison() {
        let ds = CombinedDataset::new(
            vec![m(Country::Benin, at(2022, 1, 1, 0), 1.0)],
            DataOrigin::Measured,
        );
        let cmp = distribution_comparison(&ds, &CountrySelection::new());
        assert!(cmp.is_empty());

        let only_togo: CountrySelection = [Country::Togo].into_iter().collect();
        assert_eq!(distribution_comparison(&ds, &only_togo), Comparison::Empty);
    }

    #[test]
    fn comparison_passes_rows_through() {
        let ds = CombinedDataset::new(
            vec![
                m(Country::Benin, at(2022, 1, 1, 0), 1.0),
                m(Country::Togo, at(2022, 1, 1, 0), 2.0),
            ],
            DataOrigin::Measured,
        );
        let sel: CountrySelection = [Country::Togo].into_iter().collect();
        match distribution_comparison(&ds, &sel) {
            Comparison::Rows(rows) => assert_eq!(rows, vec![&ds.records()[1]]),
            Comparison::Empty => panic!("expected rows"),
        }
    }

    #[test]
    fn bucket_starts() {
        // 2022-03-17 is a Thursday
        let ts = at(2022, 3, 17, 15);
        assert_eq!(Granularity::Daily.bucket_start(ts), NaiveDate::from_ymd_opt(2022, 3, 17).unwrap());
        assert_eq!(Granularity::Weekly.bucket_start(ts), NaiveDate::from_ymd_opt(2022, 3, 14).unwrap());
        assert_eq!(Granularity::Monthly.bucket_start(ts), NaiveDate::from_ymd_opt(2022, 3, 1).unwrap());
        // Sunday belongs to the week that started the previous Monday
        let sunday = at(2022, 3, 20, 23);
        assert_eq!(Granularity::Weekly.bucket_start(sunday), NaiveDate::from_ymd_opt(2022, 3, 14).unwrap());
    }

    #[test]
    fn granularity_parses() {
        assert_eq!("Weekly".parse::<Granularity>().unwrap(), Granularity::Weekly);
        assert_eq!("M".parse::<Granularity>().unwrap(), Granularity::Monthly);
        assert!("hourly".parse::<Granularity>().is_err());
    }

    #[test]
    fn sparse_countries_keep_their_buckets() {
        let rows = vec![
            m(Country::Benin, at(2022, 1, 1, 0), 10.0),
            m(Country::Benin, at(2022, 1, 1, 6), 20.0),
            m(Country::Benin, at(2022, 1, 3, 0), 30.0),
            m(Country::Togo, at(2022, 2, 10, 0), 5.0),
        ];
        let trend = trend_series(&rows, Granularity::Daily);
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].mean_ghi, 15.0);
        assert_eq!(trend[0].count, 2);
        assert_eq!(trend[2].country, Country::Togo);
    }

    #[test]
    fn daily_and_monthly_agree_on_overall_mean() {
        // 60 days of hourly data with a varying signal and an uneven count
        // per day (every third day drops its night hours).
        let mut rows = Vec::new();
        let start = at(2022, 1, 20, 0);
        for h in 0..(60 * 24) {
            let ts = start + Duration::hours(h);
            let day = h / 24;
            if day % 3 == 0 && ts.hour() < 6 {
                continue;
            }
            for country in Country::ALL {
                let ghi = (h % 24) as f64 * 10.0 + country.index() as f64 * 50.0 + day as f64;
                rows.push(m(country, ts, ghi));
            }
        }

        let weighted = |points: &[TrendPoint], country: Country| {
            let (sum, n) = points
                .iter()
                .filter(|p| p.country == country)
                .fold((0.0, 0usize), |(s, n), p| (s + p.mean_ghi * p.count as f64, n + p.count));
            sum / n as f64
        };

        let daily = trend_series(&rows, Granularity::Daily);
        let monthly = trend_series(&rows, Granularity::Monthly);
        let weekly = trend_series(&rows, Granularity::Weekly);
        for country in Country::ALL {
            let direct: Vec<f64> = rows.iter().filter(|r| r.country == country).map(|r| r.ghi).collect();
            let overall = direct.iter().sum::<f64>() / direct.len() as f64;
            assert!((weighted(&daily, country) - overall).abs() < 1e-9);
            assert!((weighted(&monthly, country) - overall).abs() < 1e-9);
            assert!((weighted(&weekly, country) - overall).abs() < 1e-9);
        }
        // Jan, Feb, Mar
        assert_eq!(monthly.iter().filter(|p| p.country == Country::Togo).count(), 3);
    }

    #[test]
    fn mean_of_daily_means_matches_day_weighted_monthly_means() {
        use chrono::Datelike;

        // every hour of Q1 2022, so each day holds 24 readings
        let mut rows = Vec::new();
        let start = at(2022, 1, 1, 0);
        for h in 0..(90 * 24) {
            let ts = start + Duration::hours(h);
            for country in Country::ALL {
                let ghi = ((h * 7 + country.index() as i64 * 13) % 97) as f64 * 8.5;
                rows.push(m(country, ts, ghi));
            }
        }

        let daily = trend_series(&rows, Granularity::Daily);
        let monthly = trend_series(&rows, Granularity::Monthly);
        let days_in_month = [31.0, 28.0, 31.0];
        for country in Country::ALL {
            let days: Vec<f64> = daily
                .iter()
                .filter(|p| p.country == country)
                .map(|p| p.mean_ghi)
                .collect();
            assert_eq!(days.len(), 90);
            let mean_of_days = days.iter().sum::<f64>() / days.len() as f64;

            let months: Vec<&TrendPoint> = monthly.iter().filter(|p| p.country == country).collect();
            assert_eq!(months.len(), 3);
            let day_weighted = months
                .iter()
                .map(|p| p.mean_ghi * days_in_month[p.bucket_start.month0() as usize])
                .sum::<f64>()
                / 90.0;

            assert!(
                (mean_of_days - day_weighted).abs() < 1e-9,
                "{country}: {mean_of_days} vs {day_weighted}"
            );
        }
    }
}
