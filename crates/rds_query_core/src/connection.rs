use std::fmt;

use crate::contract::{DATABASE_CHARSET, DATABASE_NAME, DATABASE_PORT};
use crate::credential::Credential;

/// Everything a driver needs to open one session through the proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub charset: String,
    pub username: String,
    pub password: String,
    pub tls_profile: String,
}

impl ConnectionSettings {
    pub fn new(credential: Credential, proxy_endpoint: &str, tls_profile: &str) -> Self {
        let Credential { username, password } = credential;
        Self {
            host: proxy_endpoint.trim().to_string(),
            port: DATABASE_PORT,
            database: DATABASE_NAME.to_string(),
            charset: DATABASE_CHARSET.to_string(),
            username,
            password,
            tls_profile: tls_profile.to_string(),
        }
    }

    /// DSN form used in logs; the password is masked.
    pub fn redacted_connection_string(&self) -> String {
        format!(
            "{}:***@tcp({}:{})/{}?charset={}&tls={}",
            self.username, self.host, self.port, self.database, self.charset, self.tls_profile
        )
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("charset", &self.charset)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tls_profile", &self.tls_profile)
            .finish()
    }
}
