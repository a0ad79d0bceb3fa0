use thiserror::Error;

/// Errors raised by the data layer.
///
/// Every variant names the input that triggered it so the UI can report it
/// verbatim.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("malformed source: {reason}")]
    MalformedSource { reason: String },

    #[error("year {year} is outside the dataset range {min_year}..={max_year}")]
    Range {
        year: i32,
        min_year: i32,
        max_year: i32,
    },

    #[error("no population records for year {year}")]
    EmptySlice { year: i32 },

    #[error("cannot read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl DataError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        DataError::MalformedSource {
            reason: reason.into(),
        }
    }
}
