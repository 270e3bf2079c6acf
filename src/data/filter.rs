use std::collections::BTreeSet;

use super::model::{CombinedDataset, Country, Measurement};

// ---------------------------------------------------------------------------
// Country selection
// ---------------------------------------------------------------------------

/// Countries the user wants to see. An empty set means nothing is shown.
pub type CountrySelection = BTreeSet<Country>;

/// A selection with every country in it (the dashboard default).
pub fn init_selection() -> CountrySelection {
    Country::ALL.into_iter().collect()
}

/// Rows of `dataset` whose country is selected, in dataset order.
pub fn filtered<'a>(dataset: &'a CombinedDataset, selection: &CountrySelection) -> Vec<&'a Measurement> {
    if selection.is_empty() {
        return Vec::new();
    }
    dataset
        .records()
        .iter()
        .filter(|m| selection.contains(&m.country))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::DataOrigin;

    fn dataset() -> CombinedDataset {
        let ts = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let records = Country::ALL
            .into_iter()
            .flat_map(|country| {
                (0..3).map(move |i| Measurement {
                    country,
                    timestamp: ts,
                    ghi: i as f64,
                })
            })
            .collect();
        CombinedDataset::new(records, DataOrigin::Measured)
    }

    #[test]
    fn full_selection_keeps_everything() {
        let ds = dataset();
        assert_eq!(filtered(&ds, &init_selection()).len(), 9);
    }

    #[test]
    fn subset_keeps_only_selected_countries() {
        let ds = dataset();
        let sel: CountrySelection = [Country::Togo].into_iter().collect();
        let rows = filtered(&ds, &sel);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|m| m.country == Country::Togo));
    }

    #[test]
    fn empty_selection_shows_nothing() {
        let ds = dataset();
        assert!(filtered(&ds, &CountrySelection::new()).is_empty());
    }
}
