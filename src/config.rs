use std::net::SocketAddr;
use std::time::Duration;

/// Storage settings used to open the SQLite pool.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the database file
    pub database_path: String,
    /// Create the file if it doesn't exist
    pub create_if_missing: bool,
    pub max_connections: u32,
    /// How long a writer waits for the database lock before giving up
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;
    pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            create_if_missing: false,
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            busy_timeout: Self::DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}
