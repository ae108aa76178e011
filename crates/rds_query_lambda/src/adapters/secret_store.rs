use rds_query_core::credential::{decode_credential, Credential};
use rds_query_core::error::PipelineError;

pub trait SecretStore {
    /// Current string value of the secret; `Ok(None)` when it only has a binary value.
    fn secret_string(&self, secret_id: &str) -> Result<Option<String>, String>;
}

/// Fetches and decodes the credential. One remote call, no retry, no cache.
pub fn resolve_credential(
    store: &dyn SecretStore,
    secret_id: &str,
) -> Result<Credential, PipelineError> {
    let secret = store
        .secret_string(secret_id)
        .map_err(PipelineError::SecretFetch)?;
    decode_credential(secret.as_deref())
}
