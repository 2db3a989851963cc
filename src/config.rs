//! Connection configuration.

use std::time::Duration;

use crate::chunk::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_MESSAGE_SIZE, MAX_CHUNK_SIZE};
use crate::packstream::{Dict, Value};

/// Credentials sent in HELLO (before Bolt 5.1) or LOGON.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub scheme: String,
    pub principal: Option<String>,
    pub credentials: Option<String>,
}

impl AuthToken {
    /// The `none` scheme: no credentials.
    pub fn none() -> Self {
        Self {
            scheme: "none".to_string(),
            principal: None,
            credentials: None,
        }
    }

    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            scheme: "basic".to_string(),
            principal: Some(user.into()),
            credentials: Some(password.into()),
        }
    }

    /// The auth entries as they go on the wire.
    pub fn to_dict(&self) -> Dict {
        let mut dict = Dict::from([("scheme".to_string(), Value::from(self.scheme.as_str()))]);
        if let Some(p) = &self.principal {
            dict.insert("principal".to_string(), Value::from(p.as_str()));
        }
        if let Some(c) = &self.credentials {
            dict.insert("credentials".to_string(), Value::from(c.as_str()));
        }
        dict
    }
}

impl Default for AuthToken {
    fn default() -> Self {
        Self::none()
    }
}

// Keeps credentials out of logs.
impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("scheme", &self.scheme)
            .field("principal", &self.principal)
            .field("credentials", &self.credentials.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Settings for a single client connection.
///
/// ```
/// use boltwire::config::ConnectionConfig;
///
/// let config = ConnectionConfig::builder()
///     .user_agent("my-app/1.0")
///     .basic_auth("neo4j", "secret")
///     .max_chunk_size(8192);
/// assert_eq!(config.get_max_chunk_size(), 8192);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    user_agent: String,
    auth: AuthToken,
    database: Option<String>,
    max_chunk_size: usize,
    max_message_size: usize,
    connect_timeout: Option<Duration>,
}

impl ConnectionConfig {
    /// Starts from the defaults.
    pub fn builder() -> Self {
        Self {
            user_agent: concat!("boltwire/", env!("CARGO_PKG_VERSION")).to_string(),
            auth: AuthToken::none(),
            database: None,
            max_chunk_size: DEFAULT_CHUNK_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            connect_timeout: None,
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn auth(mut self, auth: AuthToken) -> Self {
        self.auth = auth;
        self
    }

    pub fn basic_auth(self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth(AuthToken::basic(user, password))
    }

    /// Sets the database RUN and BEGIN target. Unset means the server default.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the largest outgoing chunk payload, clamped to `1..=65535`.
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// Sets the largest incoming message body accepted.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn get_user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn get_auth(&self) -> &AuthToken {
        &self.auth
    }

    pub fn get_database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn get_max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn get_max_message_size(&self) -> usize {
        self.max_message_size
    }

    pub fn get_connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::builder()
    }
}
