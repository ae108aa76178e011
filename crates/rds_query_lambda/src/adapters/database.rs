use rds_query_core::connection::ConnectionSettings;
use rds_query_core::credential::Credential;
use rds_query_core::error::PipelineError;
use rds_query_core::executor::StatementRunner;
use rds_query_core::trust::TrustConfig;
use serde_json::{json, Value};

use crate::logging::log_info;

/// An open database session. `close` consumes it, so a session is released at most once.
pub trait DatabaseSession: StatementRunner {
    fn close(self: Box<Self>);
}

pub trait DatabaseConnector {
    fn open(
        &self,
        settings: ConnectionSettings,
        trust: &TrustConfig,
    ) -> Result<Box<dyn DatabaseSession>, String>;
}

/// Composes credential, trust profile and proxy endpoint into an open session.
///
/// The credential is consumed here; nothing else keeps a copy after setup.
pub fn open_connection(
    connector: &dyn DatabaseConnector,
    credential: Credential,
    trust: &TrustConfig,
    proxy_endpoint: &str,
) -> Result<Box<dyn DatabaseSession>, PipelineError> {
    let settings = ConnectionSettings::new(credential, proxy_endpoint, trust.profile_name());
    log_info("connection_factory", "connecting", connecting_details(&settings));
    connector
        .open(settings, trust)
        .map_err(PipelineError::Connection)
}

fn connecting_details(settings: &ConnectionSettings) -> Value {
    json!({
        "target": settings.redacted_connection_string(),
        "tls_profile": settings.tls_profile,
    })
}
