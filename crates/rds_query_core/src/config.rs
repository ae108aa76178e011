use crate::contract::DEFAULT_SECRET_REGION;
use crate::error::ConfigError;

pub const SECRET_NAME_VAR: &str = "RDS_SECRET_NAME";
pub const PROXY_ENDPOINT_VAR: &str = "PROXY_ENDPOINT";
pub const BUCKET_NAME_VAR: &str = "BUCKET_NAME";
pub const SECRET_REGION_VAR: &str = "RDS_SECRET_REGION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub secret_name: String,
    pub proxy_endpoint: String,
    pub bucket_name: String,
    pub secret_region: String,
}

impl HandlerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            secret_name: required(SECRET_NAME_VAR)?,
            proxy_endpoint: required(PROXY_ENDPOINT_VAR)?,
            bucket_name: required(BUCKET_NAME_VAR)?,
            secret_region: lookup(SECRET_REGION_VAR)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_SECRET_REGION.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn reads_required_values_and_defaults_region() {
        let config = HandlerConfig::from_lookup(lookup_from(&[
            (SECRET_NAME_VAR, "stack-rds-credentials"),
            (PROXY_ENDPOINT_VAR, "proxy.example.internal"),
            (BUCKET_NAME_VAR, "query-bucket"),
        ]))
        .expect("config should parse");

        assert_eq!(config.secret_name, "stack-rds-credentials");
        assert_eq!(config.proxy_endpoint, "proxy.example.internal");
        assert_eq!(config.bucket_name, "query-bucket");
        assert_eq!(config.secret_region, "ap-northeast-1");
    }

    #[test]
    fn region_override_is_honoured() {
        let config = HandlerConfig::from_lookup(lookup_from(&[
            (SECRET_NAME_VAR, "secret"),
            (PROXY_ENDPOINT_VAR, "proxy"),
            (BUCKET_NAME_VAR, "bucket"),
            (SECRET_REGION_VAR, "eu-west-1"),
        ]))
        .expect("config should parse");

        assert_eq!(config.secret_region, "eu-west-1");
    }

    #[test]
    fn blank_required_value_is_reported_as_missing() {
        let error = HandlerConfig::from_lookup(lookup_from(&[
            (SECRET_NAME_VAR, "secret"),
            (PROXY_ENDPOINT_VAR, "   "),
            (BUCKET_NAME_VAR, "bucket"),
        ]))
        .expect_err("blank endpoint should fail");

        assert_eq!(error, ConfigError::Missing(PROXY_ENDPOINT_VAR));
        assert_eq!(error.to_string(), "PROXY_ENDPOINT must be configured");
    }
}
