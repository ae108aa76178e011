use std::fmt;

use serde::Deserialize;

use crate::error::PipelineError;

/// Database login decoded from the secret store. Lives for one invocation.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decodes the `{"username": ..., "password": ...}` secret payload.
///
/// Extra keys (engine, host, dbInstanceIdentifier, ...) written by managed
/// rotation are ignored. `None` means the secret only has a binary value.
pub fn decode_credential(secret_string: Option<&str>) -> Result<Credential, PipelineError> {
    let Some(secret_string) = secret_string else {
        return Err(PipelineError::SecretDecode(
            "secret has no string value".to_string(),
        ));
    };

    serde_json::from_str::<Credential>(secret_string)
        .map_err(|error| PipelineError::SecretDecode(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_username_and_password() {
        let credential = decode_credential(Some(r#"{"username":"app","password":"secret"}"#))
            .expect("secret should decode");

        assert_eq!(credential.username, "app");
        assert_eq!(credential.password, "secret");
    }

    #[test]
    fn ignores_extra_rotation_fields() {
        let credential = decode_credential(Some(
            r#"{"username":"syscdk","password":"pw","engine":"mysql","port":3306}"#,
        ))
        .expect("secret should decode");

        assert_eq!(credential.username, "syscdk");
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let error = decode_credential(Some("not-json")).expect_err("should fail");
        assert!(matches!(error, PipelineError::SecretDecode(_)));

        let error = decode_credential(Some(r#"{"username":"app"}"#)).expect_err("should fail");
        assert!(matches!(error, PipelineError::SecretDecode(_)));
    }

    #[test]
    fn binary_only_secret_is_a_decode_error() {
        let error = decode_credential(None).expect_err("should fail");
        assert_eq!(
            error,
            PipelineError::SecretDecode("secret has no string value".to_string())
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let credential = Credential {
            username: "app".to_string(),
            password: "hunter2".to_string(),
        };

        let rendered = format!("{credential:?}");
        assert!(rendered.contains("app"));
        assert!(!rendered.contains("hunter2"));
    }
}
