use std::time::Instant;

use rds_query_core::config::HandlerConfig;
use rds_query_core::contract::{
    failure_response, records_response, ApiGatewayResponse, QUERY_OBJECT_KEY,
};
use rds_query_core::error::{FailureStage, PipelineError};
use rds_query_core::executor::execute_and_map;
use rds_query_core::rows::QueryRecord;
use rds_query_core::trust::TrustConfig;
use serde_json::{json, Value};

use crate::adapters::database::{open_connection, DatabaseConnector, DatabaseSession};
use crate::adapters::object_store::{load_query_source, QueryObjectStore};
use crate::adapters::secret_store::{resolve_credential, SecretStore};
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "query_handler";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Idle,
    ResolvingSecret,
    Connecting,
    LoadingQuery,
    /// Runs the statement and decodes each row into a record while the cursor is open.
    Executing,
    /// Serializes the decoded records into the response body.
    Mapping,
    Responding,
    Aborting,
}

impl InvocationState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ResolvingSecret => "resolving_secret",
            Self::Connecting => "connecting",
            Self::LoadingQuery => "loading_query",
            Self::Executing => "executing",
            Self::Mapping => "mapping",
            Self::Responding => "responding",
            Self::Aborting => "aborting",
        }
    }
}

/// Remote collaborators used by one invocation.
#[derive(Clone, Copy)]
pub struct QueryServices<'a> {
    pub secrets: &'a dyn SecretStore,
    pub objects: &'a dyn QueryObjectStore,
    pub database: &'a dyn DatabaseConnector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvocationReport {
    pub response: ApiGatewayResponse,
    /// Every state visited, starting at `Idle`.
    pub states: Vec<InvocationState>,
}

struct StateTrail {
    states: Vec<InvocationState>,
}

impl StateTrail {
    fn new() -> Self {
        Self {
            states: vec![InvocationState::Idle],
        }
    }

    fn current(&self) -> InvocationState {
        self.states
            .last()
            .copied()
            .unwrap_or(InvocationState::Idle)
    }

    fn enter(&mut self, next: InvocationState) {
        log_info(
            COMPONENT,
            "stage_entered",
            json!({
                "from": self.current().as_str(),
                "to": next.as_str(),
            }),
        );
        self.states.push(next);
    }
}

pub fn handle_query_event<R: QueryRecord>(
    event: &Value,
    config: &HandlerConfig,
    trust: &TrustConfig,
    services: QueryServices<'_>,
) -> ApiGatewayResponse {
    run_invocation::<R>(event, config, trust, services).response
}

/// Runs the pipeline once, strictly in order, and maps the outcome to an envelope.
///
/// Failures never carry detail to the caller; the detail is logged and the
/// envelope holds the fixed message of the failing stage.
pub fn run_invocation<R: QueryRecord>(
    event: &Value,
    config: &HandlerConfig,
    trust: &TrustConfig,
    services: QueryServices<'_>,
) -> InvocationReport {
    let started_at = Instant::now();
    log_info(COMPONENT, "request_received", json!({ "event": event }));

    let mut trail = StateTrail::new();
    let outcome = run_pipeline::<R>(config, trust, services, &mut trail).and_then(|records| {
        trail.enter(InvocationState::Mapping);
        records_response(&records)
            .map(|response| (response, records.len()))
            .map_err(|error| PipelineError::Serialize(error.to_string()))
    });

    let response = match outcome {
        Ok((response, row_count)) => {
            trail.enter(InvocationState::Responding);
            log_info(
                COMPONENT,
                "request_completed",
                json!({
                    "row_count": row_count,
                    "duration_ms": started_at.elapsed().as_millis(),
                }),
            );
            response
        }
        Err(error) => abort(&mut trail, &error, started_at),
    };

    InvocationReport {
        response,
        states: trail.states,
    }
}

fn abort(
    trail: &mut StateTrail,
    error: &PipelineError,
    started_at: Instant,
) -> ApiGatewayResponse {
    let failed_in = trail.current();
    trail.enter(InvocationState::Aborting);
    let stage: FailureStage = error.stage();
    log_error(
        COMPONENT,
        "stage_failed",
        json!({
            "state": failed_in.as_str(),
            "kind": error.kind(),
            "error": error.to_string(),
            "response_message": stage.message(),
            "duration_ms": started_at.elapsed().as_millis(),
        }),
    );
    failure_response(stage)
}

fn run_pipeline<R: QueryRecord>(
    config: &HandlerConfig,
    trust: &TrustConfig,
    services: QueryServices<'_>,
    trail: &mut StateTrail,
) -> Result<Vec<R>, PipelineError> {
    trail.enter(InvocationState::ResolvingSecret);
    let credential = resolve_credential(services.secrets, &config.secret_name)?;

    trail.enter(InvocationState::Connecting);
    let mut session = open_connection(
        services.database,
        credential,
        trust,
        &config.proxy_endpoint,
    )?;

    let result = query_with_session::<R>(session.as_mut(), config, services, trail);
    session.close();
    log_info(
        COMPONENT,
        "connection_closed",
        json!({ "state": trail.current().as_str() }),
    );
    result
}

fn query_with_session<R: QueryRecord>(
    session: &mut dyn DatabaseSession,
    config: &HandlerConfig,
    services: QueryServices<'_>,
    trail: &mut StateTrail,
) -> Result<Vec<R>, PipelineError> {
    trail.enter(InvocationState::LoadingQuery);
    let source = load_query_source(services.objects, &config.bucket_name, QUERY_OBJECT_KEY)?;

    trail.enter(InvocationState::Executing);
    execute_and_map::<R, _>(session, &source)
}
