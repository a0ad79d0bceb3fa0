use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::DataError;
use super::model::{NormalizedDataset, PopulationRecord};

/// Accepted names for the state column (after trimming and lower-casing).
const STATE_HEADERS: [&str; 2] = ["states", "state"];
const ID_HEADER: &str = "id";

/// Reader settings for the wide-format source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and normalize a wide-format population file.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<NormalizedDataset, DataError> {
    let file = File::open(path)?;
    let dataset = load_reader(file, options)?;
    log::info!(
        "Loaded {} records ({} states, {}..={}) from {}",
        dataset.len(),
        dataset.states().len(),
        dataset.min_year(),
        dataset.max_year(),
        path.display()
    );
    Ok(dataset)
}

/// Load and normalize a wide-format population table from any reader.
///
/// Layout: a header row `states, id, <year>, <year>, ...` followed by one row
/// per state. Header names are matched after trimming and lower-casing; every
/// column other than the state and id columns must be a year. Population
/// cells may contain thousands separators; an empty cell means that year is
/// absent for the state. Any malformed cell fails the whole load.
pub fn load_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<NormalizedDataset, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DataError::malformed(format!("cannot read header row: {e}")))?
        .iter()
        .map(normalize_header)
        .collect();

    let layout = Layout::from_headers(&headers)?;
    let mut records = Vec::with_capacity(layout.year_columns.len() * 64);
    let mut seen_states: BTreeSet<String> = BTreeSet::new();

    for (row_no, result) in reader.records().enumerate() {
        // Header is line 1, first data row is line 2.
        let line = row_no + 2;
        let row = result.map_err(|e| DataError::malformed(format!("line {line}: {e}")))?;

        let state = row.get(layout.state_idx).unwrap_or("");
        if state.is_empty() {
            return Err(DataError::malformed(format!("line {line}: empty state name")));
        }
        if !seen_states.insert(state.to_string()) {
            return Err(DataError::malformed(format!(
                "line {line}: state '{state}' appears more than once"
            )));
        }

        let id_text = row.get(layout.id_idx).unwrap_or("");
        let id: u32 = id_text.parse().map_err(|_| {
            DataError::malformed(format!("line {line}: id '{id_text}' is not an integer"))
        })?;

        for &(col_idx, year) in &layout.year_columns {
            let cell = row.get(col_idx).unwrap_or("");
            let Some(population) = parse_population(cell).map_err(|reason| {
                DataError::malformed(format!("line {line}, column {year}: {reason}"))
            })?
            else {
                continue;
            };
            records.push(PopulationRecord::new(state, id, year, population));
        }
    }

    NormalizedDataset::with_states(records, seen_states.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Header layout
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Layout {
    state_idx: usize,
    id_idx: usize,
    /// (column index, year) for every remaining column.
    year_columns: Vec<(usize, i32)>,
}

impl Layout {
    fn from_headers(headers: &[String]) -> Result<Self, DataError> {
        let state_idx = headers
            .iter()
            .position(|h| STATE_HEADERS.contains(&h.as_str()))
            .ok_or_else(|| DataError::malformed("missing 'states' column"))?;
        let id_idx = headers
            .iter()
            .position(|h| h == ID_HEADER)
            .ok_or_else(|| DataError::malformed("missing 'id' column"))?;

        let mut year_columns = Vec::new();
        let mut seen = BTreeSet::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == state_idx || idx == id_idx {
                continue;
            }
            let year: i32 = header.parse().map_err(|_| {
                DataError::malformed(format!("column header '{header}' is not a year"))
            })?;
            if !seen.insert(year) {
                return Err(DataError::malformed(format!("year column {year} appears twice")));
            }
            year_columns.push((idx, year));
        }

        if year_columns.is_empty() {
            return Err(DataError::malformed("no year columns"));
        }

        Ok(Layout {
            state_idx,
            id_idx,
            year_columns,
        })
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse a population cell. `Ok(None)` marks an absent value.
fn parse_population(cell: &str) -> Result<Option<f64>, String> {
    let cleaned: String = cell.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("population '{cell}' is not numeric")),
    }
}
