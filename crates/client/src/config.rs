use std::path::PathBuf;

/// Dashboard-side configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server, without a trailing slash.
    pub api_url: String,
    /// Directory backing local key/value storage.
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var             | Default                 |
    /// |---------------------|-------------------------|
    /// | `ARTTRACK_API_URL`  | `http://localhost:3000` |
    /// | `ARTTRACK_DATA_DIR` | `.arttrack`             |
    pub fn from_env() -> Self {
        let api_url = std::env::var("ARTTRACK_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let data_dir = std::env::var("ARTTRACK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".arttrack"));

        Self { api_url, data_dir }
    }
}
