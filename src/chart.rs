//! Chart specifications.
//!
//! Each mapper turns a tabular view plus its parameters into a
//! [`ChartSpec`] shaped like a Vega-Lite v5 document. Drawing is left to a
//! [`ChartRenderer`], so the charting backend can be swapped freely.

use std::io;

use serde::Serialize;

use crate::aggregate::{Comparison, Granularity, TrendPoint};
use crate::color::CountryColors;
use crate::data::model::{Country, Measurement};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Shown instead of the boxplot when nothing is selected.
pub const EMPTY_COMPARISON_MESSAGE: &str = "Please select at least one country.";
/// Shown instead of the trend chart when nothing is selected.
pub const EMPTY_TREND_MESSAGE: &str = "Cannot display Time Series without data.";

const GHI_AXIS_TITLE: &str = "Global Horizontal Irradiance (W/m²)";
const AVG_GHI_AXIS_TITLE: &str = "Average GHI (W/m²)";

// ---------------------------------------------------------------------------
// Specification types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub title: String,
    pub data: InlineData,
    pub mark: Mark,
    pub encoding: Encoding,
    /// Pan/zoom bound to the scales.
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineData {
    pub values: ChartRows,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartRows {
    Measurements(Vec<Measurement>),
    Trend(Vec<TrendPoint>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Boxplot,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Nominal,
    Quantitative,
    Temporal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionChannel {
    pub field: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub axis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scale {
    pub domain: Vec<String>,
    pub range: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorChannel {
    pub field: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub scale: Scale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub field: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
}

impl Tooltip {
    fn plain(field: &'static str, field_type: FieldType) -> Self {
        Self {
            field,
            field_type,
            aggregate: None,
            format: None,
        }
    }

    fn aggregated(aggregate: &'static str) -> Self {
        Self {
            aggregate: Some(aggregate),
            ..Self::plain("GHI", FieldType::Quantitative)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encoding {
    pub x: PositionChannel,
    pub y: PositionChannel,
    pub color: ColorChannel,
    pub tooltip: Vec<Tooltip>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: &'static str,
    pub select: Selection,
    pub bind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

fn interactive() -> Vec<Param> {
    vec![Param {
        name: "grid",
        select: Selection { kind: "interval" },
        bind: "scales",
    }]
}

fn country_color(colors: &CountryColors, countries: &[Country]) -> ColorChannel {
    let (domain, range) = colors.scale(countries);
    ColorChannel {
        field: "Country",
        field_type: FieldType::Nominal,
        scale: Scale { domain, range },
    }
}

fn present_countries<'a>(countries: impl Iterator<Item = &'a Country>) -> Vec<Country> {
    let mut seen = [false; 3];
    for c in countries {
        seen[c.index()] = true;
    }
    Country::ALL.into_iter().filter(|c| seen[c.index()]).collect()
}

// ---------------------------------------------------------------------------
// Mappers
// ---------------------------------------------------------------------------

/// Min–max boxplot of GHI per country. `None` for an empty comparison.
pub fn comparison_chart(comparison: &Comparison<'_>, colors: &CountryColors) -> Option<ChartSpec> {
    let rows = match comparison {
        Comparison::Empty => return None,
        Comparison::Rows(rows) => rows,
    };
    let countries = present_countries(rows.iter().map(|m| &m.country));

    Some(ChartSpec {
        schema: VEGA_LITE_SCHEMA,
        title: "Cross-Country Comparison of GHI Distribution".to_string(),
        data: InlineData {
            values: ChartRows::Measurements(rows.iter().map(|&m| m.clone()).collect()),
        },
        mark: Mark {
            kind: MarkKind::Boxplot,
            extent: Some("min-max"),
            size: Some(30),
            point: None,
        },
        encoding: Encoding {
            x: PositionChannel {
                field: "Country",
                field_type: FieldType::Nominal,
                axis: Axis {
                    title: "Country".to_string(),
                },
            },
            y: PositionChannel {
                field: "GHI",
                field_type: FieldType::Quantitative,
                axis: Axis {
                    title: GHI_AXIS_TITLE.to_string(),
                },
            },
            color: country_color(colors, &countries),
            tooltip: vec![
                Tooltip::plain("Country", FieldType::Nominal),
                Tooltip::aggregated("median"),
                Tooltip::aggregated("min"),
                Tooltip::aggregated("max"),
            ],
        },
        params: interactive(),
    })
}

/// Line chart of bucket means per country. `None` when there are no points.
pub fn trend_chart(
    points: &[TrendPoint],
    granularity: Granularity,
    colors: &CountryColors,
) -> Option<ChartSpec> {
    if points.is_empty() {
        return None;
    }
    let countries = present_countries(points.iter().map(|p| &p.country));

    Some(ChartSpec {
        schema: VEGA_LITE_SCHEMA,
        title: format!("Average GHI Over Time (Aggregated by {granularity})"),
        data: InlineData {
            values: ChartRows::Trend(points.to_vec()),
        },
        mark: Mark {
            kind: MarkKind::Line,
            extent: None,
            size: None,
            point: Some(true),
        },
        encoding: Encoding {
            x: PositionChannel {
                field: "TIMESTAMP",
                field_type: FieldType::Temporal,
                axis: Axis {
                    title: format!("{granularity} Period"),
                },
            },
            y: PositionChannel {
                field: "GHI",
                field_type: FieldType::Quantitative,
                axis: Axis {
                    title: AVG_GHI_AXIS_TITLE.to_string(),
                },
            },
            color: country_color(colors, &countries),
            tooltip: vec![
                Tooltip::plain("TIMESTAMP", FieldType::Temporal),
                Tooltip::plain("Country", FieldType::Nominal),
                Tooltip {
                    format: Some(".2f"),
                    ..Tooltip::plain("GHI", FieldType::Quantitative)
                },
            ],
        },
        params: interactive(),
    })
}

// ---------------------------------------------------------------------------
// Rendering boundary
// ---------------------------------------------------------------------------

/// Anything that can draw a chart specification.
pub trait ChartRenderer {
    fn render(&mut self, spec: &ChartSpec) -> io::Result<()>;

    /// Neutral state shown instead of a chart.
    fn placeholder(&mut self, message: &str) -> io::Result<()>;
}

/// Render `spec`, or the placeholder when there is nothing to draw.
pub fn render_or_placeholder<R: ChartRenderer + ?Sized>(
    renderer: &mut R,
    spec: Option<&ChartSpec>,
    message: &str,
) -> io::Result<()> {
    match spec {
        Some(spec) => renderer.render(spec),
        None => renderer.placeholder(message),
    }
}
