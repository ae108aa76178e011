use thiserror::Error;

use crate::contract::QuerySource;
use crate::error::{PipelineError, RowScanError};
use crate::rows::{QueryRecord, SqlRow};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementError {
    /// The engine refused the statement or the cursor failed mid-stream.
    #[error("{0}")]
    Rejected(String),

    /// The row callback refused a row; iteration stopped there.
    #[error(transparent)]
    Scan(#[from] RowScanError),
}

impl From<StatementError> for PipelineError {
    fn from(error: StatementError) -> Self {
        match error {
            StatementError::Rejected(message) => Self::Query(message),
            StatementError::Scan(error) => Self::RowScan(error),
        }
    }
}

/// Runs one statement and feeds each row to `on_row` while the cursor is open.
///
/// Implementations must release the cursor before returning, on every path,
/// and stop fetching as soon as `on_row` returns an error.
pub trait StatementRunner {
    fn for_each_row(
        &mut self,
        sql: &str,
        on_row: &mut dyn FnMut(SqlRow) -> Result<(), RowScanError>,
    ) -> Result<usize, StatementError>;
}

/// Executes `source` and maps every row into `R`. The first failing row
/// aborts the whole call; rows mapped before it are dropped.
pub fn execute_and_map<R, S>(
    runner: &mut S,
    source: &QuerySource,
) -> Result<Vec<R>, PipelineError>
where
    R: QueryRecord,
    S: StatementRunner + ?Sized,
{
    let mut records = Vec::new();
    let mut on_row = |row: SqlRow| -> Result<(), RowScanError> {
        records.push(R::from_row(row)?);
        Ok(())
    };

    runner.for_each_row(source.as_str(), &mut on_row)?;
    Ok(records)
}
