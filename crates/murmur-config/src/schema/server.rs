use serde::{Deserialize, Serialize};

/// Listener settings for the relay front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Valid range: 1-65535.
    pub port: u32,
    /// Seconds a new connection has to identify itself (valid range: 1-120).
    pub hello_timeout_secs: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
            hello_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
