//! The dashboard page: headings, the ranked table and both charts, written
//! either as terminal text or as a JSON Lines stream.

use std::io::{self, Write};

use crate::aggregate::Granularity;
use crate::chart::{
    comparison_chart, render_or_placeholder, trend_chart, EMPTY_COMPARISON_MESSAGE,
    EMPTY_TREND_MESSAGE,
};
use crate::color::CountryColors;
use crate::data::model::DataOrigin;
use crate::state::Views;
use crate::ui::plot::{JsonSpecRenderer, TextRenderer};
use crate::ui::table::format_summary;

pub const DASHBOARD_TITLE: &str = "West Africa Solar Farm Feasibility Dashboard";
pub const DISTRIBUTION_HEADING: &str = "1. Cross-Country GHI Distribution";
pub const SUMMARY_HEADING: &str = "Top Regions (By Mean GHI)";
pub const DATA_SOURCE_NOTE: &str = "*Data Source: Cleaned, Pre-processed CSVs.*";

pub fn trend_heading(granularity: Granularity) -> String {
    format!("2. GHI Time Series Analysis ({granularity} Mean)")
}

/// Terminal page: distribution chart, ranked table with its source note,
/// then the trend chart.
pub fn write_text<W: Write>(
    out: &mut W,
    origin: DataOrigin,
    granularity: Granularity,
    views: &Views<'_>,
    colors: &CountryColors,
) -> io::Result<()> {
    writeln!(out, "{DASHBOARD_TITLE}")?;
    if origin == DataOrigin::Synthetic {
        writeln!(out, "(cleaned CSV files not found – showing generated data)")?;
    }
    writeln!(out)?;

    writeln!(out, "{DISTRIBUTION_HEADING}")?;
    render_or_placeholder(
        &mut TextRenderer::new(&mut *out),
        comparison_chart(&views.comparison, colors).as_ref(),
        EMPTY_COMPARISON_MESSAGE,
    )?;
    writeln!(out)?;

    writeln!(out, "{SUMMARY_HEADING}")?;
    let table = format_summary(&views.summary).map_err(io::Error::other)?;
    writeln!(out, "{table}")?;
    writeln!(out, "{DATA_SOURCE_NOTE}")?;
    writeln!(out)?;

    writeln!(out, "{}", trend_heading(granularity))?;
    render_or_placeholder(
        &mut TextRenderer::new(&mut *out),
        trend_chart(&views.trend, granularity, colors).as_ref(),
        EMPTY_TREND_MESSAGE,
    )
}

/// JSON Lines: a header object (`origin`, `granularity`, `summary`), then
/// the comparison spec, then the trend spec. A chart with nothing to draw
/// is a `{"message": ...}` line.
pub fn write_json_lines<W: Write>(
    out: &mut W,
    origin: DataOrigin,
    granularity: Granularity,
    views: &Views<'_>,
    colors: &CountryColors,
) -> io::Result<()> {
    let header = serde_json::json!({
        "origin": origin,
        "granularity": granularity,
        "summary": views.summary,
    });
    serde_json::to_writer(&mut *out, &header)?;
    writeln!(out)?;

    let mut renderer = JsonSpecRenderer::new(&mut *out);
    render_or_placeholder(
        &mut renderer,
        comparison_chart(&views.comparison, colors).as_ref(),
        EMPTY_COMPARISON_MESSAGE,
    )?;
    render_or_placeholder(
        &mut renderer,
        trend_chart(&views.trend, granularity, colors).as_ref(),
        EMPTY_TREND_MESSAGE,
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::Value;

    use super::*;
    use crate::data::model::{CombinedDataset, Country, Measurement};
    use crate::state::DashboardState;

    fn dataset() -> CombinedDataset {
        let mut records = Vec::new();
        for (country, ghi) in [
            (Country::Benin, 200.0),
            (Country::SierraLeone, 150.0),
            (Country::Togo, 250.0),
        ] {
            for h in 0..24 {
                let timestamp = NaiveDate::from_ymd_opt(2022, 4, 1)
                    .unwrap()
                    .and_hms_opt(h, 0, 0)
                    .unwrap();
                records.push(Measurement { country, timestamp, ghi });
            }
        }
        CombinedDataset::new(records, DataOrigin::Measured)
    }

    fn json_lines(state: &DashboardState, ds: &CombinedDataset) -> Vec<Value> {
        let mut out = Vec::new();
        write_json_lines(
            &mut out,
            ds.origin(),
            state.granularity,
            &state.views(ds),
            &CountryColors::default(),
        )
        .unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn every_json_line_parses() {
        let ds = dataset();
        let docs = json_lines(&DashboardState::default(), &ds);
        assert_eq!(docs.len(), 3);

        assert_eq!(docs[0]["origin"], "measured");
        assert_eq!(docs[0]["granularity"], "Daily");
        assert_eq!(docs[0]["summary"].as_array().unwrap().len(), 3);
        assert_eq!(docs[0]["summary"][0]["Country"], "Togo");

        assert_eq!(docs[1]["mark"]["type"], "boxplot");
        assert_eq!(docs[1]["data"]["values"].as_array().unwrap().len(), 72);
        assert_eq!(docs[2]["mark"]["type"], "line");
        assert_eq!(docs[2]["data"]["values"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn empty_selection_gives_message_lines() {
        let ds = dataset();
        let mut state = DashboardState::default();
        state.select_none();
        let docs = json_lines(&state, &ds);
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0]["summary"].as_array().unwrap().len(), 3);
        assert_eq!(docs[1], serde_json::json!({ "message": EMPTY_COMPARISON_MESSAGE }));
        assert_eq!(docs[2], serde_json::json!({ "message": EMPTY_TREND_MESSAGE }));
    }

    #[test]
    fn text_page_follows_dashboard_layout() {
        let ds = dataset();
        let mut state = DashboardState::default();
        state.set_granularity(Granularity::Weekly);

        let mut out = Vec::new();
        write_text(
            &mut out,
            ds.origin(),
            state.granularity,
            &state.views(&ds),
            &CountryColors::default(),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();

        let order = [
            DASHBOARD_TITLE,
            DISTRIBUTION_HEADING,
            "Cross-Country Comparison of GHI Distribution",
            SUMMARY_HEADING,
            DATA_SOURCE_NOTE,
            "2. GHI Time Series Analysis (Weekly Mean)",
            "Average GHI Over Time (Aggregated by Weekly)",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle:?}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
        assert!(!text.contains("showing generated data"));
    }

    #[test]
    fn text_page_shows_placeholders_under_headings() {
        let ds = dataset();
        let mut state = DashboardState::default();
        state.select_none();

        let mut out = Vec::new();
        write_text(
            &mut out,
            DataOrigin::Synthetic,
            state.granularity,
            &state.views(&ds),
            &CountryColors::default(),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("showing generated data"));
        assert!(text.contains(&format!("{DISTRIBUTION_HEADING}\n{EMPTY_COMPARISON_MESSAGE}\n")));
        assert!(text.ends_with(&format!("2. GHI Time Series Analysis (Daily Mean)\n{EMPTY_TREND_MESSAGE}\n")));
    }
}
