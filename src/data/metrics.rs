use std::collections::BTreeMap;

use super::error::DataError;
use super::model::{by_population_asc, by_population_desc, NormalizedDataset, PopulationRecord};

// ---------------------------------------------------------------------------
// Derived per-year types
// ---------------------------------------------------------------------------

/// A record of the selected year joined with the same state's previous year.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRecord {
    pub record: PopulationRecord,
    /// `None` when the previous year is outside the range or the state has
    /// no record for it.
    pub population_prev: Option<f64>,
}

impl DeltaRecord {
    /// Year-over-year change, absent when there is no previous value.
    pub fn delta(&self) -> Option<f64> {
        self.population_prev.map(|prev| self.record.population - prev)
    }
}

/// KPI summary for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearMetrics {
    pub year: i32,
    pub top_state: DeltaRecord,
    pub low_state: DeltaRecord,
}

impl YearMetrics {
    pub fn top_state_delta(&self) -> Option<f64> {
        self.top_state.delta()
    }

    pub fn low_state_delta(&self) -> Option<f64> {
        self.low_state.delta()
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Records of `year`, one per state, as an owned vector.
///
/// Fails with [`DataError::Range`] for a year outside the dataset and with
/// [`DataError::EmptySlice`] when an in-range year has no records.
pub fn year_slice(dataset: &NormalizedDataset, year: i32) -> Result<Vec<PopulationRecord>, DataError> {
    dataset.check_year(year)?;
    let slice: Vec<PopulationRecord> = dataset.slice(year).cloned().collect();
    if slice.is_empty() {
        return Err(DataError::EmptySlice { year });
    }
    Ok(slice)
}

/// Left join of the `year` slice against `year - 1` on state.
pub fn delta_view(dataset: &NormalizedDataset, year: i32) -> Result<Vec<DeltaRecord>, DataError> {
    let slice = year_slice(dataset, year)?;

    let previous: BTreeMap<&str, f64> = if dataset.contains_year(year - 1) {
        dataset
            .slice(year - 1)
            .map(|r| (r.state.as_str(), r.population))
            .collect()
    } else {
        BTreeMap::new()
    };

    Ok(slice
        .into_iter()
        .map(|record| {
            let population_prev = previous.get(record.state.as_str()).copied();
            DeltaRecord {
                record,
                population_prev,
            }
        })
        .collect())
}

/// Highest and lowest state of `year` with their year-over-year deltas.
///
/// Ties go to the alphabetically first state.
pub fn compute_year_metrics(dataset: &NormalizedDataset, year: i32) -> Result<YearMetrics, DataError> {
    let view = delta_view(dataset, year)?;

    let top_state = view
        .iter()
        .min_by(|a, b| by_population_desc(&a.record, &b.record))
        .cloned()
        .ok_or(DataError::EmptySlice { year })?;
    let low_state = view
        .iter()
        .min_by(|a, b| by_population_asc(&a.record, &b.record))
        .cloned()
        .ok_or(DataError::EmptySlice { year })?;

    log::debug!(
        "{year}: top {} ({}), low {} ({})",
        top_state.record.state,
        top_state.record.population,
        low_state.record.state,
        low_state.record.population
    );

    Ok(YearMetrics {
        year,
        top_state,
        low_state,
    })
}

/// Up to `n` records of `year`, population descending, state ascending on ties.
pub fn top_n(dataset: &NormalizedDataset, year: i32, n: usize) -> Result<Vec<PopulationRecord>, DataError> {
    let mut slice = year_slice(dataset, year)?;
    slice.sort_by(by_population_desc);
    slice.truncate(n);
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_states() -> NormalizedDataset {
        NormalizedDataset::from_records(vec![
            PopulationRecord::new("A", 1, 2010, 100.0),
            PopulationRecord::new("A", 1, 2011, 150.0),
            PopulationRecord::new("B", 2, 2010, 200.0),
            PopulationRecord::new("B", 2, 2011, 180.0),
        ])
        .unwrap()
    }

    fn decade() -> NormalizedDataset {
        let states = [
            ("Texas", 48, 25_000_000.0),
            ("Ohio", 39, 11_500_000.0),
            ("Utah", 49, 2_700_000.0),
            ("Iowa", 19, 3_000_000.0),
        ];
        let mut records = Vec::new();
        for (name, id, base) in states {
            for (i, year) in (2010..=2019).enumerate() {
                records.push(PopulationRecord::new(name, id, year, base + i as f64 * 1000.0));
            }
        }
        NormalizedDataset::from_records(records).unwrap()
    }

    #[test]
    fn worked_example() {
        let ds = two_states();
        let m = compute_year_metrics(&ds, 2011).unwrap();

        assert_eq!(m.top_state.record.state, "B");
        assert_eq!(m.top_state.record.population, 180.0);
        assert_eq!(m.top_state_delta(), Some(-20.0));
        assert_eq!(m.low_state.record.state, "A");
        assert_eq!(m.low_state.record.population, 150.0);
        assert_eq!(m.low_state_delta(), Some(50.0));

        let top = top_n(&ds, 2011, 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].state, "B");
    }

    #[test]
    fn first_year_has_no_previous_values() {
        let ds = two_states();
        let view = delta_view(&ds, 2010).unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|d| d.population_prev.is_none() && d.delta().is_none()));

        let m = compute_year_metrics(&ds, 2010).unwrap();
        assert_eq!(m.top_state_delta(), None);
        assert_eq!(m.low_state_delta(), None);
    }

    #[test]
    fn previous_values_match_prior_year() {
        let ds = decade();
        for year in 2011..=2019 {
            for d in delta_view(&ds, year).unwrap() {
                assert_eq!(d.population_prev, ds.population(&d.record.state, year - 1));
                assert_eq!(d.delta(), Some(1000.0));
            }
        }
    }

    #[test]
    fn state_missing_from_prior_year_has_absent_delta() {
        let ds = NormalizedDataset::from_records(vec![
            PopulationRecord::new("A", 1, 2010, 10.0),
            PopulationRecord::new("A", 1, 2011, 11.0),
            PopulationRecord::new("B", 2, 2011, 50.0),
        ])
        .unwrap();
        let m = compute_year_metrics(&ds, 2011).unwrap();
        assert_eq!(m.top_state.record.state, "B");
        assert_eq!(m.top_state_delta(), None);
        assert_eq!(m.low_state_delta(), Some(1.0));
    }

    #[test]
    fn top_state_dominates_every_year() {
        let ds = decade();
        for year in ds.min_year()..=ds.max_year() {
            let m = compute_year_metrics(&ds, year).unwrap();
            for r in ds.slice(year) {
                assert!(m.top_state.record.population >= r.population);
                assert!(m.low_state.record.population <= r.population);
            }
            assert_eq!(m.top_state.record.state, "Texas");
            assert_eq!(m.low_state.record.state, "Utah");
        }
    }

    #[test]
    fn ties_break_alphabetically() {
        let ds = NormalizedDataset::from_records(vec![
            PopulationRecord::new("Zeta", 3, 2010, 5.0),
            PopulationRecord::new("Alpha", 1, 2010, 5.0),
            PopulationRecord::new("Mid", 2, 2010, 5.0),
        ])
        .unwrap();
        let m = compute_year_metrics(&ds, 2010).unwrap();
        assert_eq!(m.top_state.record.state, "Alpha");
        assert_eq!(m.low_state.record.state, "Alpha");

        let names: Vec<String> = top_n(&ds, 2010, 10).unwrap().into_iter().map(|r| r.state).collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn top_n_is_sorted_subset() {
        let ds = decade();
        let top = top_n(&ds, 2015, 3).unwrap();
        let names: Vec<&str> = top.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(names, vec!["Texas", "Ohio", "Iowa"]);
        assert!(top.windows(2).all(|w| w[0].population > w[1].population));
        assert!(top.iter().all(|r| r.year == 2015));

        assert_eq!(top_n(&ds, 2015, 10).unwrap().len(), 4);
        assert!(top_n(&ds, 2015, 0).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_year_fails() {
        let ds = decade();
        assert!(matches!(
            compute_year_metrics(&ds, 2025),
            Err(DataError::Range { year: 2025, min_year: 2010, max_year: 2019 })
        ));
        assert!(matches!(top_n(&ds, 2009, 5), Err(DataError::Range { .. })));
    }

    #[test]
    fn gap_year_is_empty_slice() {
        let ds = NormalizedDataset::from_records(vec![
            PopulationRecord::new("A", 1, 2010, 1.0),
            PopulationRecord::new("A", 1, 2012, 3.0),
        ])
        .unwrap();
        assert!(matches!(
            compute_year_metrics(&ds, 2011),
            Err(DataError::EmptySlice { year: 2011 })
        ));
        // 2011 is missing, so 2012 has nothing to compare against.
        assert_eq!(compute_year_metrics(&ds, 2012).unwrap().top_state_delta(), None);
    }
}
