use futures::TryStreamExt;
use rds_query_core::connection::ConnectionSettings;
use rds_query_core::error::RowScanError;
use rds_query_core::executor::{StatementError, StatementRunner};
use rds_query_core::rows::{SqlRow, SqlValue};
use rds_query_core::trust::TrustConfig;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::adapters::database::{DatabaseConnector, DatabaseSession};

/// Opens sessions through the RDS proxy with the sqlx MySQL driver.
///
/// Each session is a single-connection pool created with `connect_lazy_with`;
/// the TLS handshake and authentication happen on the first statement.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlConnector;

impl DatabaseConnector for MySqlConnector {
    fn open(
        &self,
        settings: ConnectionSettings,
        trust: &TrustConfig,
    ) -> Result<Box<dyn DatabaseSession>, String> {
        let options = connect_options(&settings, trust)?;

        let pool = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                MySqlPoolOptions::new()
                    .max_connections(1)
                    .min_connections(0)
                    .connect_lazy_with(options)
            })
        });

        Ok(Box::new(MySqlSession { pool }))
    }
}

fn connect_options(
    settings: &ConnectionSettings,
    trust: &TrustConfig,
) -> Result<MySqlConnectOptions, String> {
    ensure_profile(settings, trust)?;

    Ok(MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.username)
        .password(&settings.password)
        .database(&settings.database)
        .charset(&settings.charset)
        .ssl_mode(proxy_ssl_mode())
        .ssl_ca_from_pem(trust.pem().to_vec()))
}

/// Chain to the bundled root and a certificate naming the proxy host.
fn proxy_ssl_mode() -> MySqlSslMode {
    MySqlSslMode::VerifyIdentity
}

fn ensure_profile(settings: &ConnectionSettings, trust: &TrustConfig) -> Result<(), String> {
    if settings.tls_profile != trust.profile_name() {
        return Err(format!(
            "TLS profile '{}' is not registered (available: '{}')",
            settings.tls_profile,
            trust.profile_name()
        ));
    }
    Ok(())
}

pub struct MySqlSession {
    pool: MySqlPool,
}

impl StatementRunner for MySqlSession {
    fn for_each_row(
        &mut self,
        sql: &str,
        on_row: &mut dyn FnMut(SqlRow) -> Result<(), RowScanError>,
    ) -> Result<usize, StatementError> {
        let pool = &self.pool;

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                // Text protocol, matching how the statement is stored.
                let mut rows = sqlx::raw_sql(sql).fetch(pool);
                let mut row_count = 0usize;
                while let Some(row) = rows
                    .try_next()
                    .await
                    .map_err(|error| StatementError::Rejected(error.to_string()))?
                {
                    on_row(decode_row(&row)?)?;
                    row_count += 1;
                }
                Ok::<usize, StatementError>(row_count)
            })
        })
    }
}

impl DatabaseSession for MySqlSession {
    fn close(self: Box<Self>) {
        let pool = self.pool;
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move { pool.close().await })
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Signed,
    Unsigned,
    Float,
    Text,
    Binary,
    Other,
}

fn column_kind(type_name: &str) -> ColumnKind {
    let upper = type_name.to_ascii_uppercase();
    let base = upper.trim_end_matches(" UNSIGNED");
    let integer = matches!(
        base,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "BOOLEAN"
    );

    if integer && upper.ends_with(" UNSIGNED") {
        ColumnKind::Unsigned
    } else if integer {
        ColumnKind::Signed
    } else if matches!(base, "FLOAT" | "DOUBLE") {
        ColumnKind::Float
    } else if matches!(
        base,
        "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET"
    ) {
        ColumnKind::Text
    } else if matches!(
        base,
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB"
    ) {
        ColumnKind::Binary
    } else {
        ColumnKind::Other
    }
}

fn decode_row(row: &MySqlRow) -> Result<SqlRow, RowScanError> {
    let mut values = Vec::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        let type_name = column.type_info().name();
        let unsupported = |detail: String| RowScanError::Unsupported {
            index,
            type_name: type_name.to_string(),
            detail,
        };

        let is_null = row
            .try_get_raw(index)
            .map(|raw| raw.is_null())
            .map_err(|error| unsupported(error.to_string()))?;
        if is_null {
            values.push(SqlValue::Null);
            continue;
        }

        let value = match column_kind(type_name) {
            ColumnKind::Signed => row.try_get::<i64, _>(index).map(SqlValue::Int),
            ColumnKind::Unsigned => row.try_get::<u64, _>(index).map(SqlValue::UInt),
            ColumnKind::Float => row.try_get::<f64, _>(index).map(SqlValue::Float),
            ColumnKind::Text => row.try_get::<String, _>(index).map(SqlValue::Text),
            ColumnKind::Binary => row.try_get::<Vec<u8>, _>(index).map(SqlValue::Bytes),
            // DECIMAL, temporal and other types arrive as text on the text
            // protocol; the record's scan rules convert them.
            ColumnKind::Other => row
                .try_get_unchecked::<String, _>(index)
                .map(SqlValue::Text)
                .or_else(|_| {
                    row.try_get_unchecked::<Vec<u8>, _>(index)
                        .map(SqlValue::Bytes)
                }),
        }
        .map_err(|error| unsupported(error.to_string()))?;
        values.push(value);
    }
    Ok(SqlRow(values))
}

#[cfg(test)]
mod tests {
    use rds_query_core::contract::TLS_PROFILE_NAME;
    use rds_query_core::credential::Credential;
    use rds_query_core::trust::AMAZON_ROOT_CA1_PEM;

    use super::*;

    #[test]
    fn classifies_mysql_type_names() {
        assert_eq!(column_kind("BIGINT"), ColumnKind::Signed);
        assert_eq!(column_kind("INT UNSIGNED"), ColumnKind::Unsigned);
        assert_eq!(column_kind("DOUBLE"), ColumnKind::Float);
        assert_eq!(column_kind("VARCHAR"), ColumnKind::Text);
        assert_eq!(column_kind("VARBINARY"), ColumnKind::Binary);
        assert_eq!(column_kind("DECIMAL"), ColumnKind::Other);
        assert_eq!(column_kind("DATETIME"), ColumnKind::Other);
        assert_eq!(column_kind("float unsigned"), ColumnKind::Float);
    }

    #[test]
    fn proxy_certificate_must_match_the_endpoint_host() {
        assert!(matches!(proxy_ssl_mode(), MySqlSslMode::VerifyIdentity));
    }

    #[test]
    fn unknown_trust_profile_is_refused_before_connecting() {
        let trust = TrustConfig::from_pem(TLS_PROFILE_NAME, AMAZON_ROOT_CA1_PEM)
            .expect("bundled CA should parse");
        let mut settings = ConnectionSettings::new(
            Credential {
                username: "app".to_string(),
                password: "secret".to_string(),
            },
            "proxy.local",
            TLS_PROFILE_NAME,
        );
        assert!(connect_options(&settings, &trust).is_ok());

        settings.tls_profile = "other".to_string();
        let error = connect_options(&settings, &trust).expect_err("should refuse");
        assert!(error.contains("TLS profile 'other' is not registered"));
    }
}
