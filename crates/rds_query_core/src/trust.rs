use std::io::BufReader;

use rustls_pki_types::CertificateDer;

use crate::error::TrustConfigError;

/// Root CA bundled with the deployable artifact for the RDS proxy TLS handshake.
pub const AMAZON_ROOT_CA1_PEM: &[u8] = include_bytes!("../cert/AmazonRootCA1.pem");

/// Named certificate trust profile, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustConfig {
    profile_name: String,
    roots: Vec<CertificateDer<'static>>,
    pem: Vec<u8>,
}

impl TrustConfig {
    pub fn from_pem(
        profile_name: impl Into<String>,
        pem: &[u8],
    ) -> Result<Self, TrustConfigError> {
        let profile_name = profile_name.into();
        if profile_name.trim().is_empty() {
            return Err(TrustConfigError::EmptyProfileName);
        }

        let mut reader = BufReader::new(pem);
        let roots = rustls_pemfile::certs(&mut reader)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| TrustConfigError::MalformedPem(error.to_string()))?;
        if roots.is_empty() {
            return Err(TrustConfigError::NoCertificates);
        }

        Ok(Self {
            profile_name,
            roots,
            pem: pem.to_vec(),
        })
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn roots(&self) -> &[CertificateDer<'static>] {
        &self.roots
    }

    /// PEM bytes as bundled; drivers that take a CA file consume this directly.
    pub fn pem(&self) -> &[u8] {
        &self.pem
    }
}
