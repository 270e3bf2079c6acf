use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::aggregate::{SummaryRow, TrendPoint};

// ---------------------------------------------------------------------------
// Top regions table
// ---------------------------------------------------------------------------

/// The ranked summary as an Arrow batch (`Country`, `Average GHI (W/m²)`).
pub fn summary_batch(rows: &[SummaryRow]) -> Result<RecordBatch, ArrowError> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Country", DataType::Utf8, false),
        Field::new("Average GHI (W/m²)", DataType::Float64, false),
    ]));
    let countries = StringArray::from(rows.iter().map(|r| r.country.name()).collect::<Vec<_>>());
    let means = Float64Array::from(rows.iter().map(|r| r.mean_ghi).collect::<Vec<_>>());
    RecordBatch::try_new(schema, vec![Arc::new(countries), Arc::new(means)])
}

/// Boxed text table of the ranked summary.
pub fn format_summary(rows: &[SummaryRow]) -> Result<String, ArrowError> {
    let batch = summary_batch(rows)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}

// ---------------------------------------------------------------------------
// Trend table
// ---------------------------------------------------------------------------

/// Boxed text table of the trend series, means to 2 decimals.
pub fn format_trend(points: &[TrendPoint]) -> Result<String, ArrowError> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Country", DataType::Utf8, false),
        Field::new("Period", DataType::Utf8, false),
        Field::new("Average GHI (W/m²)", DataType::Float64, false),
    ]));
    let countries = StringArray::from(points.iter().map(|p| p.country.name()).collect::<Vec<_>>());
    let periods = StringArray::from(
        points
            .iter()
            .map(|p| p.bucket_start.to_string())
            .collect::<Vec<_>>(),
    );
    let means = Float64Array::from(
        points
            .iter()
            .map(|p| crate::aggregate::round2(p.mean_ghi))
            .collect::<Vec<_>>(),
    );
    let batch = RecordBatch::try_new(
        schema,
        vec![Arc::new(countries), Arc::new(periods), Arc::new(means)],
    )?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}
