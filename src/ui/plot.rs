use std::io::{self, Write};

use crate::chart::{ChartRenderer, ChartRows, ChartSpec};
use crate::data::model::Country;
use crate::ui::table::format_trend;

// ---------------------------------------------------------------------------
// Box statistics
// ---------------------------------------------------------------------------

/// Five-number summary drawn by a min–max boxplot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    /// Whiskers span the full range, no outlier rule.
    pub fn from_data(data: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            min: sorted[0],
            q1: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            q3: percentile(&sorted, 75.0),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Percentile of sorted data with linear interpolation.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let k = (p / 100.0) * (sorted.len() - 1) as f64;
    let f = k.floor() as usize;
    let c = k.ceil() as usize;
    if f == c || c >= sorted.len() {
        sorted[f.min(sorted.len() - 1)]
    } else {
        let d = k - f as f64;
        sorted[f] * (1.0 - d) + sorted[c] * d
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Writes each chart's Vega-Lite document on its own line (JSON Lines).
pub struct JsonSpecRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonSpecRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartRenderer for JsonSpecRenderer<W> {
    fn render(&mut self, spec: &ChartSpec) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, spec)?;
        writeln!(self.out)
    }

    fn placeholder(&mut self, message: &str) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &serde_json::json!({ "message": message }))?;
        writeln!(self.out)
    }
}

/// Plain-text rendering for terminals: box statistics per country for
/// boxplots, a boxed table of buckets for trend charts.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartRenderer for TextRenderer<W> {
    fn render(&mut self, spec: &ChartSpec) -> io::Result<()> {
        writeln!(self.out, "{}", spec.title)?;
        match &spec.data.values {
            ChartRows::Measurements(rows) => {
                writeln!(
                    self.out,
                    "  {:<14}{:>10}{:>10}{:>10}{:>10}{:>10}",
                    "Country", "min", "q1", "median", "q3", "max"
                )?;
                for country in Country::ALL {
                    let values: Vec<f64> = rows
                        .iter()
                        .filter(|m| m.country == country)
                        .map(|m| m.ghi)
                        .collect();
                    let Some(s) = BoxStats::from_data(&values) else {
                        continue;
                    };
                    writeln!(
                        self.out,
                        "  {:<14}{:>10.2}{:>10.2}{:>10.2}{:>10.2}{:>10.2}",
                        country.name(),
                        s.min,
                        s.q1,
                        s.median,
                        s.q3,
                        s.max
                    )?;
                }
            }
            ChartRows::Trend(points) => {
                let table = format_trend(points).map_err(io::Error::other)?;
                writeln!(self.out, "{table}")?;
            }
        }
        writeln!(self.out)
    }

    fn placeholder(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }
}
