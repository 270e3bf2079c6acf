use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::model::{CombinedDataset, Country, DataOrigin, Measurement};

// ---------------------------------------------------------------------------
// Generation settings
// ---------------------------------------------------------------------------

/// Controls the placeholder data generated when real files are unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Fixed RNG seed. `None` seeds from the operating system.
    #[serde(default)]
    pub seed: Option<u64>,

    /// First hourly timestamp (inclusive).
    #[serde(default = "default_start")]
    pub start: NaiveDateTime,

    /// End of the window (exclusive).
    #[serde(default = "default_end")]
    pub end: NaiveDateTime,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start: default_start(),
            end: default_end(),
        }
    }
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn default_start() -> NaiveDateTime {
    midnight(2022, 1, 1)
}

fn default_end() -> NaiveDateTime {
    midnight(2023, 1, 1)
}

/// Mean and standard deviation of a country's synthetic GHI draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

/// Distribution used for each country. Distinct per country so the
/// comparison charts have something to show.
pub fn params_for(country: Country) -> NormalParams {
    match country {
        Country::Benin => NormalParams { mean: 300.0, std_dev: 350.0 },
        Country::SierraLeone => NormalParams { mean: 350.0, std_dev: 300.0 },
        Country::Togo => NormalParams { mean: 250.0, std_dev: 400.0 },
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Box-Muller transform over a uniform source. Not clamped.
pub fn draw_normal<R: Rng>(rng: &mut R, params: NormalParams) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-15);
    let u2: f64 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    params.mean + params.std_dev * z
}

/// Hourly timestamps in `[start, end)`.
pub fn hourly_range(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let mut out = Vec::new();
    let mut ts = start;
    while ts < end {
        out.push(ts);
        ts += Duration::hours(1);
    }
    out
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Generate one country's series: hourly over the window, negatives
/// floored to zero.
pub fn generate_country<R: Rng>(
    rng: &mut R,
    country: Country,
    timestamps: &[NaiveDateTime],
) -> Vec<Measurement> {
    let params = params_for(country);
    timestamps
        .iter()
        .map(|&timestamp| Measurement {
            country,
            timestamp,
            ghi: draw_normal(rng, params).max(0.0),
        })
        .collect()
}

/// Generate the full synthetic dataset for every country.
pub fn generate(config: &SyntheticConfig) -> CombinedDataset {
    let mut rng = make_rng(config.seed);
    let timestamps = hourly_range(config.start, config.end);

    let mut records = Vec::with_capacity(timestamps.len() * Country::ALL.len());
    for country in Country::ALL {
        records.extend(generate_country(&mut rng, country, &timestamps));
    }

    log::debug!(
        "generated {} synthetic rows ({} hours × {} countries)",
        records.len(),
        timestamps.len(),
        Country::ALL.len()
    );
    CombinedDataset::new(records, DataOrigin::Synthetic)
}
