use config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Separate host for Spotify queries, when the backend splits them out.
    #[serde(default)]
    pub spotify_api_url: Option<String>,

    /// Serve every backend call from the in-memory mock instead of the network.
    #[serde(default)]
    pub enable_mocks: bool,

    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Public origin of the callback listener. Defaults to the listen address.
    #[serde(default)]
    pub app_url: Option<String>,
}

/// `BANGER_API_URL`, `BANGER_ENABLE_MOCKS`, ... Nested keys use `__`.
fn environment() -> Environment {
    Environment::with_prefix("BANGER")
        .prefix_separator("_")
        .separator("__")
}

fn default_api_url() -> String {
    banger_api::DEFAULT_BASE_URL.to_string()
}

fn default_listen_host() -> String {
    "127.0.0.1".to_string()
}

fn default_listen_port() -> u16 {
    5173
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            spotify_api_url: None,
            enable_mocks: false,
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            app_url: None,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("BANGER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        Self::from_sources(File::with_name(&config_path).required(false), environment())
    }

    fn from_sources(
        file: File<FileSourceFile, FileFormat>,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn app_url(&self) -> String {
        self.app_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.listen_host, self.listen_port))
            .trim_end_matches('/')
            .to_string()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.is_empty() {
            return Err("api_url is required".to_string());
        }
        if !self.api_url.starts_with("http") {
            return Err("api_url must be a valid HTTP(S) URL".to_string());
        }
        if let Some(url) = &self.spotify_api_url {
            if !url.starts_with("http") {
                return Err("spotify_api_url must be a valid HTTP(S) URL".to_string());
            }
        }
        if let Some(url) = &self.app_url {
            if !url.starts_with("http") {
                return Err("app_url must be a valid HTTP(S) URL".to_string());
            }
        }
        Ok(())
    }
}
