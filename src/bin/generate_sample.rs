//! Writes `{country}_clean.csv` (or `.parquet`) files with a plausible
//! diurnal irradiance curve, for trying the real-data path.
//!
//! Usage: `generate_sample [DIR] [csv|parquet] [DAYS]`

use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Float64Array, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use solar_panda::data::model::Country;
use solar_panda::data::synthetic::{draw_normal, NormalParams};

struct Row {
    timestamp: NaiveDateTime,
    ghi: f64,
    dni: f64,
    dhi: f64,
}

/// Clear-sky peak GHI around solar noon, W/m².
fn peak_for(country: Country) -> f64 {
    match country {
        Country::Benin => 950.0,
        Country::SierraLeone => 850.0,
        Country::Togo => 900.0,
    }
}

fn generate_country(country: Country, start: NaiveDateTime, days: u32, rng: &mut StdRng) -> Vec<Row> {
    let peak = peak_for(country);
    let noise = NormalParams { mean: 0.0, std_dev: 25.0 };
    let cloud = NormalParams { mean: 0.85, std_dev: 0.1 };

    let mut rows = Vec::with_capacity(days as usize * 24);
    for day in 0..days {
        // one cloudiness factor per day
        let clearness = draw_normal(rng, cloud).clamp(0.3, 1.0);
        for hour in 0..24 {
            let timestamp = start + Duration::days(i64::from(day)) + Duration::hours(hour);
            let elevation = (PI * (timestamp.hour() as f64 - 6.0) / 12.0).sin().max(0.0);
            let clear_sky = peak * elevation * clearness;
            let ghi = if elevation > 0.0 {
                (clear_sky + draw_normal(rng, noise)).max(0.0)
            } else {
                0.0
            };
            let dhi = ghi * (1.0 - clearness).max(0.1);
            let dni = if elevation > 0.05 { (ghi - dhi) / elevation } else { 0.0 };
            rows.push(Row { timestamp, ghi, dni, dhi });
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(["TIMESTAMP", "GHI", "DNI", "DHI"])?;
    for r in rows {
        writer.write_record([
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.2}", r.ghi),
            format!("{:.2}", r.dni),
            format!("{:.2}", r.dhi),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("TIMESTAMP", DataType::Timestamp(TimeUnit::Second, None), false),
        Field::new("GHI", DataType::Float64, false),
        Field::new("DNI", DataType::Float64, false),
        Field::new("DHI", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(TimestampSecondArray::from(
                rows.iter()
                    .map(|r| r.timestamp.and_utc().timestamp())
                    .collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.ghi).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.dni).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.dhi).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Day count must be a positive integer.
fn parse_days(raw: &str) -> Result<u32> {
    let days: u32 = raw
        .parse()
        .with_context(|| format!("invalid day count '{raw}'"))?;
    if days == 0 {
        bail!("day count must be at least 1");
    }
    Ok(days)
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let format = args.next().unwrap_or_else(|| "csv".to_string());
    let days = match args.next() {
        Some(d) => parse_days(&d)?,
        None => 365,
    };
    if format != "csv" && format != "parquet" {
        bail!("unsupported format '{format}' (expected csv or parquet)");
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating {}", dir.display()))?;

    let start = NaiveDate::from_ymd_opt(2022, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;
    let mut rng = StdRng::seed_from_u64(42);

    for country in Country::ALL {
        let rows = generate_country(country, start, days, &mut rng);
        let path = dir.join(format!("{}_clean.{format}", country.file_stem()));
        match format.as_str() {
            "parquet" => write_parquet(&path, &rows),
            _ => write_csv(&path, &rows),
        }
        .with_context(|| format!("writing {}", path.display()))?;

        log::info!("{country}: {} rows", rows.len());
        println!("Wrote {} rows to {}", rows.len(), path.display());
    }
    Ok(())
}
