use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use super::error::DataError;

// ---------------------------------------------------------------------------
// PopulationRecord – one (state, year) row of the long table
// ---------------------------------------------------------------------------

/// A single population observation in long form.
///
/// Field order matches the exported CSV: state, id, year, population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationRecord {
    #[serde(rename = "states")]
    pub state: String,
    pub id: u32,
    pub year: i32,
    pub population: f64,
}

impl PopulationRecord {
    pub fn new(state: impl Into<String>, id: u32, year: i32, population: f64) -> Self {
        Self {
            state: state.into(),
            id,
            year,
            population,
        }
    }
}

/// Population descending, state name ascending on ties.
pub fn by_population_desc(a: &PopulationRecord, b: &PopulationRecord) -> Ordering {
    b.population
        .total_cmp(&a.population)
        .then_with(|| a.state.cmp(&b.state))
}

/// Population ascending, state name ascending on ties.
pub fn by_population_asc(a: &PopulationRecord, b: &PopulationRecord) -> Ordering {
    a.population
        .total_cmp(&b.population)
        .then_with(|| a.state.cmp(&b.state))
}

// ---------------------------------------------------------------------------
// NormalizedDataset – the complete loaded long table
// ---------------------------------------------------------------------------

/// The normalized dataset. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct NormalizedDataset {
    records: Vec<PopulationRecord>,
    years: Vec<i32>,
    states: Vec<String>,
    min_year: i32,
    max_year: i32,
}

impl NormalizedDataset {
    /// Build the dataset and its year/state axes.
    ///
    /// Fails when `records` is empty (no year range can be derived) or when a
    /// (state, year) pair occurs twice.
    pub fn from_records(records: Vec<PopulationRecord>) -> Result<Self, DataError> {
        Self::with_states(records, Vec::new())
    }

    /// Like [`from_records`](Self::from_records), but `states` also joins the
    /// state axis even when a state has no record in any year.
    pub fn with_states(
        records: Vec<PopulationRecord>,
        states: Vec<String>,
    ) -> Result<Self, DataError> {
        let mut keys: BTreeSet<(&str, i32)> = BTreeSet::new();
        for rec in &records {
            if !keys.insert((rec.state.as_str(), rec.year)) {
                return Err(DataError::malformed(format!(
                    "duplicate record for state '{}' in {}",
                    rec.state, rec.year
                )));
            }
        }

        let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
        let states: BTreeSet<&str> = records
            .iter()
            .map(|r| r.state.as_str())
            .chain(states.iter().map(String::as_str))
            .collect();

        let (Some(&min_year), Some(&max_year)) = (years.first(), years.last()) else {
            return Err(DataError::malformed("source contains no population records"));
        };
        let states = states.into_iter().map(str::to_string).collect();

        Ok(NormalizedDataset {
            years: years.into_iter().collect(),
            states,
            records,
            min_year,
            max_year,
        })
    }

    /// All records, in source order (row by row, year columns left to right).
    pub fn records(&self) -> &[PopulationRecord] {
        &self.records
    }

    /// Observed years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// State names of every source row, ascending.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn min_year(&self) -> i32 {
        self.min_year
    }

    pub fn max_year(&self) -> i32 {
        self.max_year
    }

    pub fn contains_year(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }

    /// Fail with [`DataError::Range`] unless `year` lies in `[min_year, max_year]`.
    pub fn check_year(&self, year: i32) -> Result<(), DataError> {
        if self.contains_year(year) {
            Ok(())
        } else {
            Err(DataError::Range {
                year,
                min_year: self.min_year,
                max_year: self.max_year,
            })
        }
    }

    /// Records for one year. No range check; an unknown year yields nothing.
    pub fn slice(&self, year: i32) -> impl Iterator<Item = &PopulationRecord> + '_ {
        self.records.iter().filter(move |r| r.year == year)
    }

    /// Population of `state` in `year`, if observed.
    pub fn population(&self, state: &str, year: i32) -> Option<f64> {
        self.records
            .iter()
            .find(|r| r.year == year && r.state == state)
            .map(|r| r.population)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty. Always false for a built dataset.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_are_sorted_and_range_is_derived() {
        let ds = NormalizedDataset::from_records(vec![
            PopulationRecord::new("Wyoming", 56, 2012, 5.0),
            PopulationRecord::new("Alabama", 1, 2010, 10.0),
            PopulationRecord::new("Alabama", 1, 2012, 12.0),
        ])
        .unwrap();

        assert_eq!(ds.years(), &[2010, 2012]);
        assert_eq!(ds.states(), &["Alabama".to_string(), "Wyoming".to_string()]);
        assert_eq!((ds.min_year(), ds.max_year()), (2010, 2012));
        assert!(ds.contains_year(2011));
        assert_eq!(ds.population("Alabama", 2012), Some(12.0));
        assert_eq!(ds.population("Wyoming", 2010), None);
    }

    #[test]
    fn extra_states_join_the_axis() {
        let ds = NormalizedDataset::with_states(
            vec![PopulationRecord::new("Ohio", 39, 2010, 1.0)],
            vec!["Maine".to_string(), "Ohio".to_string()],
        )
        .unwrap();
        assert_eq!(ds.states(), &["Maine".to_string(), "Ohio".to_string()]);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn empty_records_are_rejected() {
        let err = NormalizedDataset::from_records(Vec::new()).unwrap_err();
        assert!(matches!(err, DataError::MalformedSource { .. }));
    }

    #[test]
    fn duplicate_state_year_is_rejected() {
        let err = NormalizedDataset::from_records(vec![
            PopulationRecord::new("Ohio", 39, 2010, 1.0),
            PopulationRecord::new("Ohio", 39, 2010, 2.0),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Ohio"));
    }

    #[test]
    fn check_year_reports_range() {
        let ds = NormalizedDataset::from_records(vec![PopulationRecord::new("Utah", 49, 2015, 3.0)])
            .unwrap();
        match ds.check_year(2016) {
            Err(DataError::Range {
                year,
                min_year,
                max_year,
            }) => assert_eq!((year, min_year, max_year), (2016, 2015, 2015)),
            other => panic!("expected range error, got {other:?}"),
        }
    }
}
