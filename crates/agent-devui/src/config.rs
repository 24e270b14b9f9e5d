//! Dev UI configuration

/// Port used when none is given
pub const DEFAULT_PORT: u16 = 8090;

/// Where and how the dev UI is served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevUiConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Print the URL to open at startup
    pub auto_open: bool,
    /// Include per-executor timing events in run responses
    pub tracing_enabled: bool,
}

impl Default for DevUiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            auto_open: false,
            tracing_enabled: false,
        }
    }
}

impl DevUiConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set whether the URL is announced at startup
    pub fn with_auto_open(mut self, auto_open: bool) -> Self {
        self.auto_open = auto_open;
        self
    }

    /// Set whether timing events are returned
    pub fn with_tracing(mut self, tracing_enabled: bool) -> Self {
        self.tracing_enabled = tracing_enabled;
        self
    }

    /// Browser URL of the server
    pub fn url(&self) -> String {
        let host = match self.host.as_str() {
            "127.0.0.1" | "0.0.0.0" => "localhost",
            other => other,
        };
        format!("http://{host}:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DevUiConfig::default();
        assert_eq!(config.port, 8090);
        assert!(!config.tracing_enabled);
        assert_eq!(config.url(), "http://localhost:8090");
    }

    #[test]
    fn test_builders() {
        let config = DevUiConfig::default()
            .with_port(9000)
            .with_auto_open(true)
            .with_tracing(true);
        assert_eq!(config.port, 9000);
        assert!(config.auto_open);
        assert!(config.tracing_enabled);
    }
}
