//! Configuration model loaded from external sources.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Cookie keys need at least 64 bytes of secret material.
pub const MIN_SECRET_LEN: usize = 64;

fn default_assets_dir() -> String {
    "./assets".to_string()
}

fn default_latency_ms() -> u64 {
    300
}

fn default_tick_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    /// Signs session tokens and the session/flash cookies.
    pub secret: String,
    /// Base URL used in password recovery links.
    pub public_url: String,
    /// Pause before each auth backend call, in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub simulated_latency_ms: u64,
    /// Period of the upload clock, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub upload_tick_ms: u64,
    #[serde(default)]
    pub cookie_secure: bool,
    /// Seed the demo firm, its records and one account per role.
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

impl ServerConfig {
    /// Reads `{dir}/default.yaml`, the optional `{dir}/{app_env}.yaml` and
    /// `APP_*` environment variables, later sources winning.
    pub fn load(dir: impl AsRef<Path>, app_env: &str) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let settings = Config::builder()
            .add_source(File::from(dir.join("default.yaml")))
            .add_source(File::from(dir.join(format!("{app_env}.yaml"))).required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?;

        let server_config = settings.try_deserialize::<ServerConfig>()?;
        server_config.validate()?;
        Ok(server_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "secret must be at least {MIN_SECRET_LEN} bytes long"
            )));
        }
        if self.upload_tick_ms == 0 {
            return Err(ConfigError::Message(
                "upload_tick_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute link of the password reset page.
    pub fn reset_password_url(&self) -> String {
        format!("{}/reset-password", self.public_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn write_default(dir: &Path, secret: &str) {
        fs::write(
            dir.join("default.yaml"),
            format!(
                "domain: localhost\naddress: 127.0.0.1\nport: 8080\ntemplates_dir: templates/**/*\nsecret: {secret}\npublic_url: http://localhost:8080/\n"
            ),
        )
        .unwrap();
    }

    #[test]
    fn loads_defaults_and_fills_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_default(dir.path(), SECRET);

        let config = ServerConfig::load(dir.path(), "missing-profile").unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.simulated_latency_ms, 300);
        assert_eq!(config.upload_tick_ms, 100);
        assert!(config.seed_demo_data);
        assert!(!config.cookie_secure);
        assert_eq!(
            config.reset_password_url(),
            "http://localhost:8080/reset-password"
        );
    }

    #[test]
    fn profile_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_default(dir.path(), SECRET);
        fs::write(
            dir.path().join("test.yaml"),
            "port: 9090\nsimulated_latency_ms: 0\nseed_demo_data: false\n",
        )
        .unwrap();

        let config = ServerConfig::load(dir.path(), "test").unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.simulated_latency_ms, 0);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn short_secret_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_default(dir.path(), "too-short");

        let err = ServerConfig::load(dir.path(), "local").unwrap_err();

        assert!(err.to_string().contains("secret"));
    }
}
