use serde::Serialize;
use serde_json::{json, Value};

use crate::error::FailureStage;

pub const QUERY_OBJECT_KEY: &str = "test.sql";
pub const DATABASE_PORT: u16 = 3306;
pub const DATABASE_NAME: &str = "rds_proxy_go";
pub const DATABASE_CHARSET: &str = "utf8mb4";
pub const TLS_PROFILE_NAME: &str = "custom";
pub const DEFAULT_SECRET_REGION: &str = "ap-northeast-1";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Raw SQL text fetched from the blob store. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySource {
    text: String,
}

impl QuerySource {
    /// Returns `None` for blank text so an empty object never reaches the database.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

pub fn records_response<R: Serialize>(
    records: &[R],
) -> Result<ApiGatewayResponse, serde_json::Error> {
    Ok(ApiGatewayResponse {
        status_code: 200,
        headers: json!({"Content-Type": "application/json"}),
        body: serde_json::to_string(records)?,
    })
}

pub fn failure_response(stage: FailureStage) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: stage.status_code(),
        headers: json!({"Content-Type": "text/plain"}),
        body: stage.message().to_string(),
    }
}
