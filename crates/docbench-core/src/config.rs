//! Adapter connection configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::adapter::BackendKind;

/// Default host for both backends.
pub const DEFAULT_HOST: &str = "localhost";

/// Default MongoDB port.
pub const DEFAULT_MONGO_PORT: u16 = 27017;

/// Default PostgreSQL port.
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Default database name.
pub const DEFAULT_DATABASE: &str = "docbench";

/// Default maximum pool size.
pub const DEFAULT_MAX_POOL_SIZE: u32 = 10;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default idle timeout for pooled connections.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection parameters for one adapter instance.
///
/// Typed fields cover the options both backends understand; anything
/// backend-specific goes into [`ConnectionConfig::extra`].
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database server host.
    pub host: String,

    /// Database server port.
    pub port: u16,

    /// Optional user name.
    pub user: Option<String>,

    /// Optional password.
    pub password: Option<String>,

    /// Database name.
    pub database: String,

    /// Maximum number of pooled connections.
    pub max_pool_size: u32,

    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,

    /// Idle timeout after which pooled connections are released.
    pub idle_timeout: Duration,

    /// Backend-specific extra options (passed through unvalidated).
    pub extra: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Create a configuration with the defaults for the given backend.
    pub fn for_backend(backend: BackendKind) -> Self {
        let port = match backend {
            BackendKind::Mongo => DEFAULT_MONGO_PORT,
            BackendKind::Postgres => DEFAULT_POSTGRES_PORT,
        };
        Self {
            host: DEFAULT_HOST.to_string(),
            port,
            user: None,
            password: None,
            database: DEFAULT_DATABASE.to_string(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            extra: HashMap::new(),
        }
    }

    /// Load a configuration from the environment.
    ///
    /// Values are looked up under a backend-specific prefix
    /// (`DOCBENCH_MONGO_*` or `DOCBENCH_POSTGRES_*`): `HOST`, `PORT`, `USER`,
    /// `PASSWORD`, `DATABASE`, `POOL_SIZE`. Absent or unparseable values fall
    /// back to the defaults.
    pub fn from_env(backend: BackendKind) -> Self {
        let prefix = match backend {
            BackendKind::Mongo => "DOCBENCH_MONGO",
            BackendKind::Postgres => "DOCBENCH_POSTGRES",
        };
        let var = |key: &str| std::env::var(format!("{}_{}", prefix, key)).ok();

        let mut config = Self::for_backend(backend);
        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        config.user = var("USER");
        config.password = var("PASSWORD");
        if let Some(database) = var("DATABASE") {
            config.database = database;
        }
        if let Some(size) = var("POOL_SIZE").and_then(|s| s.parse().ok()) {
            config.max_pool_size = size;
        }
        config
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the user name.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the maximum pool size.
    pub fn with_max_pool_size(mut self, size: u32) -> Self {
        self.max_pool_size = size;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Add a backend-specific extra option.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Render the credentials part of a connection URI ("user:pass@" or "").
    pub(crate) fn credentials(&self) -> String {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => format!("{}:{}@", user, password),
            (Some(user), None) => format!("{}@", user),
            _ => String::new(),
        }
    }
}
