//! Configuration for a connection.

/// Configuration for a connection to a GridLink database.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server URL.
    pub server_url: String,
    /// Name of the database to attach to.
    pub database: String,
    /// Protocol version.
    pub protocol_version: u16,
    /// Maximum frames processed per [`drain`](crate::Connection::drain) call.
    ///
    /// Bounds the work one drain can do when the server is far ahead, so a
    /// caller's event loop stays responsive.
    pub drain_budget: u32,
}

impl ConnectionConfig {
    /// Creates a new connection configuration.
    pub fn new(server_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            database: database.into(),
            protocol_version: 1,
            drain_budget: 256,
        }
    }

    /// Sets the protocol version.
    pub fn with_protocol_version(mut self, version: u16) -> Self {
        self.protocol_version = version;
        self
    }

    /// Sets the drain budget.
    pub fn with_drain_budget(mut self, budget: u32) -> Self {
        self.drain_budget = budget;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}
