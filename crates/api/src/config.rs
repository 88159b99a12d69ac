use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Default minimum password length for sign-up.
const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret, which must always be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Whether anonymous visitors may list commissions (default: `true`).
    pub public_read: bool,
    /// Whether new artist accounts may be created (default: `true`).
    pub allow_registration: bool,
    /// Minimum password length enforced at sign-up (default: `8`).
    pub min_password_length: usize,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PUBLIC_READ`          | `true`                     |
    /// | `ALLOW_REGISTRATION`   | `true`                     |
    /// | `MIN_PASSWORD_LENGTH`  | `8`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        let public_read = env_flag("PUBLIC_READ", true);
        let allow_registration = env_flag("ALLOW_REGISTRATION", true);

        let min_password_length: usize =
            env_or("MIN_PASSWORD_LENGTH", DEFAULT_MIN_PASSWORD_LENGTH);

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_read,
            allow_registration,
            min_password_length,
            jwt,
        }
    }
}

/// Read and parse `name`, or `default` when it is unset.
///
/// # Panics
///
/// Panics when the value is set but does not parse.
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Err(_) => default,
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid {}", std::any::type_name::<T>())),
    }
}

/// Read a boolean flag. Accepts `true/false`, `1/0`, `yes/no`.
///
/// # Panics
///
/// Panics on any other value.
fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Err(_) => default,
        Ok(raw) => parse_flag(&raw).unwrap_or_else(|| panic!("{name} must be a boolean")),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
