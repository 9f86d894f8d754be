use std::env;
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub static_dir: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub predict_path: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl BackendSettings {
    pub fn predict_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.predict_path.trim_start_matches('/')
        )
    }

    /// A zero setting would fail every request instantly, so both timeouts floor at one second.
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Layered load: `default`, `{RUN_MODE}`, `local`, then `SMARTCROP__*` variables.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let layer = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = Config::builder()
            .add_source(File::with_name(&layer("default")))
            .add_source(File::with_name(&layer(&run_mode)).required(false))
            .add_source(File::with_name(&layer("local")).required(false))
            .add_source(
                Environment::with_prefix("SMARTCROP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Load settings from environment variables directly (simpler for production)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::default().with_env_overrides())
    }
}

impl Settings {
    /// Apply environment variable overrides to default settings
    fn with_env_overrides(mut self) -> Self {
        // Server
        if let Ok(host) = env::var("SERVER_HOST") { self.server.host = host; }
        if let Ok(port) = env::var("SERVER_PORT") { self.server.port = port.parse().unwrap_or(8080); }
        if let Ok(dir) = env::var("STATIC_DIR") { self.server.static_dir = dir; }

        // Prediction backend
        if let Ok(url) = env::var("BACKEND_URL") { self.backend.base_url = url; }
        if let Ok(path) = env::var("BACKEND_PREDICT_PATH") { self.backend.predict_path = path; }
        if let Ok(secs) = env::var("BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = secs.parse().unwrap_or(15);
        }
        if let Ok(secs) = env::var("BACKEND_CONNECT_TIMEOUT_SECS") {
            self.backend.connect_timeout_secs = secs.parse().unwrap_or(5);
        }

        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
                static_dir: "./static".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
            },
            backend: BackendSettings {
                base_url: "http://127.0.0.1:5000".to_string(),
                predict_path: "/predict".to_string(),
                timeout_secs: 15,
                connect_timeout_secs: 5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_url_joins_without_double_slash() {
        let mut backend = Settings::default().backend;
        backend.base_url = "http://models.local:5000/".to_string();
        assert_eq!(backend.predict_url(), "http://models.local:5000/predict");

        backend.predict_path = "v2/predict".to_string();
        assert_eq!(backend.predict_url(), "http://models.local:5000/v2/predict");
    }

    #[test]
    fn default_deadline_is_fifteen_seconds() {
        assert_eq!(Settings::default().backend.deadline(), Duration::from_secs(15));
    }

    #[test]
    fn zero_timeouts_are_raised_to_one_second() {
        let mut backend = Settings::default().backend;
        backend.timeout_secs = 0;
        backend.connect_timeout_secs = 0;
        assert_eq!(backend.deadline(), Duration::from_secs(1));
        assert_eq!(backend.connect_timeout(), Duration::from_secs(1));
    }
}
