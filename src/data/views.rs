use std::collections::BTreeMap;
use std::io::Write;

use super::error::DataError;
use super::metrics::year_slice;
use super::model::{by_population_desc, NormalizedDataset, PopulationRecord};

// ---------------------------------------------------------------------------
// PivotMatrix – year × state grid for the heatmap
// ---------------------------------------------------------------------------

/// Rectangular population grid. Rows are years, columns are states, both
/// ascending. Combinations missing from the dataset hold `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotMatrix {
    years: Vec<i32>,
    states: Vec<String>,
    /// Row-major: `cells[row * states.len() + col]`.
    cells: Vec<f64>,
}

impl PivotMatrix {
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell by row/column index.
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.years.len() || col >= self.states.len() {
            return None;
        }
        self.cells.get(row * self.states.len() + col).copied()
    }

    /// Cell by year and state; `None` only when either is not an axis label.
    pub fn get(&self, year: i32, state: &str) -> Option<f64> {
        let row = self.years.binary_search(&year).ok()?;
        let col = self.states.binary_search_by(|s| s.as_str().cmp(state)).ok()?;
        self.cell(row, col)
    }

    /// One slice of cells per year.
    pub fn rows(&self) -> impl Iterator<Item = (i32, &[f64])> + '_ {
        self.years
            .iter()
            .copied()
            .zip(self.cells.chunks(self.states.len().max(1)))
    }

    /// (min, max) over all cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().copied().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Pivot every record into a year × state matrix, filling gaps with zero.
pub fn build_pivot(dataset: &NormalizedDataset) -> PivotMatrix {
    let years = dataset.years().to_vec();
    let states = dataset.states().to_vec();

    let row_of: BTreeMap<i32, usize> = years.iter().enumerate().map(|(i, y)| (*y, i)).collect();
    let col_of: BTreeMap<&str, usize> = states
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let mut cells = vec![0.0; years.len() * states.len()];
    for rec in dataset.records() {
        if let (Some(&row), Some(&col)) = (row_of.get(&rec.year), col_of.get(rec.state.as_str())) {
            cells[row * states.len() + col] = rec.population;
        }
    }

    PivotMatrix {
        years,
        states,
        cells,
    }
}

// ---------------------------------------------------------------------------
// ExportTable – the filtered table offered for download
// ---------------------------------------------------------------------------

/// Records of one year, population descending.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub year: i32,
    pub rows: Vec<PopulationRecord>,
}

impl ExportTable {
    /// Suggested download name, e.g. `filtered_population_2019.csv`.
    pub fn file_name(&self) -> String {
        format!("filtered_population_{}.csv", self.year)
    }

    /// Write `states,id,year,population` rows with a header.
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<(), DataError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self, delimiter: u8) -> Result<String, DataError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf, delimiter)?;
        String::from_utf8(buf)
            .map_err(|e| DataError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

/// The `year` slice sorted for display and export.
pub fn build_export_table(dataset: &NormalizedDataset, year: i32) -> Result<ExportTable, DataError> {
    let mut rows = year_slice(dataset, year)?;
    rows.sort_by(by_population_desc);
    Ok(ExportTable { year, rows })
}
