use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use rds_query_core::config::HandlerConfig;
use rds_query_core::contract::{ApiGatewayResponse, TLS_PROFILE_NAME};
use rds_query_core::rows::Book;
use rds_query_core::trust::{TrustConfig, AMAZON_ROOT_CA1_PEM};
use rds_query_lambda::adapters::mysql::MySqlConnector;
use rds_query_lambda::adapters::object_store::QueryObjectStore;
use rds_query_lambda::adapters::secret_store::SecretStore;
use rds_query_lambda::handlers::query::{handle_query_event, QueryServices};
use rds_query_lambda::logging::{log_error, log_info};
use serde_json::{json, Value};

const COMPONENT: &str = "query_runtime";

struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretStore for SecretsManagerStore {
    fn secret_string(&self, secret_id: &str) -> Result<Option<String>, String> {
        let client = self.client.clone();
        let secret_id = secret_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .get_secret_value()
                    .secret_id(secret_id)
                    .send()
                    .await
                    .map(|output| output.secret_string().map(str::to_string))
                    .map_err(|error| format!("failed to get secret value: {error}"))
            })
        })
    }
}

struct S3QueryObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl QueryObjectStore for S3QueryObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        let client = self.s3_client.clone();
        let bucket = bucket.to_string();
        let object_key = key.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map_err(|error| format!("failed to get object from s3: {error}"))?;
                output
                    .body
                    .collect()
                    .await
                    .map(|data| data.into_bytes().to_vec())
                    .map_err(|error| format!("failed to read object body from s3: {error}"))
            })
        })
    }
}

struct RuntimeDependencies {
    config: HandlerConfig,
    trust: TrustConfig,
    secrets: SecretsManagerStore,
    objects: S3QueryObjectStore,
    database: MySqlConnector,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ApiGatewayResponse, Error> {
    let services = QueryServices {
        secrets: &deps.secrets,
        objects: &deps.objects,
        database: &deps.database,
    };
    Ok(handle_query_event::<Book>(
        &event.payload,
        &deps.config,
        &deps.trust,
        services,
    ))
}

fn load_trust_config() -> Result<TrustConfig, Error> {
    match TrustConfig::from_pem(TLS_PROFILE_NAME, AMAZON_ROOT_CA1_PEM) {
        Ok(trust) => {
            log_info(
                COMPONENT,
                "trust_config_loaded",
                json!({
                    "profile": trust.profile_name(),
                    "root_certificates": trust.roots().len(),
                }),
            );
            Ok(trust)
        }
        Err(error) => {
            log_error(
                COMPONENT,
                "trust_config_failed",
                json!({
                    "profile": TLS_PROFILE_NAME,
                    "error": error.to_string(),
                }),
            );
            Err(Error::from(format!("failed to build trust config: {error}")))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = HandlerConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    let trust = load_trust_config()?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secrets_config = aws_sdk_secretsmanager::config::Builder::from(&aws_config)
        .region(aws_sdk_secretsmanager::config::Region::new(
            config.secret_region.clone(),
        ))
        .build();

    let deps = Arc::new(RuntimeDependencies {
        secrets: SecretsManagerStore {
            client: aws_sdk_secretsmanager::Client::from_conf(secrets_config),
        },
        objects: S3QueryObjectStore {
            s3_client: aws_sdk_s3::Client::new(&aws_config),
        },
        database: MySqlConnector,
        config,
        trust,
    });

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let deps = Arc::clone(&deps);
        async move { handle_request(event, &deps).await }
    }))
    .await
}
