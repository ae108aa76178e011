use thiserror::Error;

/// Stage-level failures of one invocation. Detail strings go to the log only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("failed to fetch secret: {0}")]
    SecretFetch(String),

    #[error("failed to decode secret payload: {0}")]
    SecretDecode(String),

    #[error("failed to open database connection: {0}")]
    Connection(String),

    #[error("failed to load query source: {0}")]
    QuerySource(String),

    #[error("query rejected: {0}")]
    Query(String),

    #[error("failed to scan row: {0}")]
    RowScan(#[from] RowScanError),

    #[error("failed to serialize records: {0}")]
    Serialize(String),
}

impl PipelineError {
    pub fn stage(&self) -> FailureStage {
        match self {
            Self::SecretFetch(_) | Self::SecretDecode(_) | Self::Connection(_) => {
                FailureStage::Connect
            }
            Self::QuerySource(_) => FailureStage::GetSql,
            Self::Query(_) => FailureStage::Query,
            Self::RowScan(_) | Self::Serialize(_) => FailureStage::Scan,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::SecretFetch(_) => "secret_fetch",
            Self::SecretDecode(_) => "secret_decode",
            Self::Connection(_) => "connection",
            Self::QuerySource(_) => "query_source",
            Self::Query(_) => "query",
            Self::RowScan(_) => "row_scan",
            Self::Serialize(_) => "serialize",
        }
    }
}

/// Caller-visible failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Connect,
    GetSql,
    Query,
    Scan,
}

impl FailureStage {
    pub fn message(self) -> &'static str {
        match self {
            Self::Connect => "connect Error!",
            Self::GetSql => "Get SQL Error!",
            Self::Query => "Query Error!",
            Self::Scan => "Scan Error!",
        }
    }

    pub fn status_code(self) -> u16 {
        500
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowScanError {
    #[error("expected {expected} columns, row has {actual}")]
    ColumnCount { expected: usize, actual: usize },

    #[error("column {index} ({column}): cannot convert {found} into {target}")]
    Conversion {
        index: usize,
        column: &'static str,
        found: &'static str,
        target: &'static str,
    },

    #[error("column {index} ({column}): value {value} out of range for {target}")]
    OutOfRange {
        index: usize,
        column: &'static str,
        value: String,
        target: &'static str,
    },

    #[error("column {index} ({type_name}): {detail}")]
    Unsupported {
        index: usize,
        type_name: String,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrustConfigError {
    #[error("malformed PEM data: {0}")]
    MalformedPem(String),

    #[error("no certificates found in PEM data")]
    NoCertificates,

    #[error("trust profile name cannot be empty")]
    EmptyProfileName,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_and_connection_failures_share_connect_message() {
        for error in [
            PipelineError::SecretFetch("denied".to_string()),
            PipelineError::SecretDecode("bad json".to_string()),
            PipelineError::Connection("refused".to_string()),
        ] {
            assert_eq!(error.stage(), FailureStage::Connect);
            assert_eq!(error.stage().message(), "connect Error!");
        }
    }

    #[test]
    fn each_later_stage_maps_to_its_own_message() {
        assert_eq!(
            PipelineError::QuerySource("missing".to_string())
                .stage()
                .message(),
            "Get SQL Error!"
        );
        assert_eq!(
            PipelineError::Query("syntax".to_string()).stage().message(),
            "Query Error!"
        );
        assert_eq!(
            PipelineError::from(RowScanError::ColumnCount {
                expected: 3,
                actual: 2
            })
            .stage()
            .message(),
            "Scan Error!"
        );
    }

    #[test]
    fn every_stage_is_a_server_error() {
        for stage in [
            FailureStage::Connect,
            FailureStage::GetSql,
            FailureStage::Query,
            FailureStage::Scan,
        ] {
            assert_eq!(stage.status_code(), 500);
        }
    }
}
