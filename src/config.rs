//! Configuration management
//!
//! Defaults for the password file location and hashing parameters, layered
//! as built-in defaults, then an optional TOML file, then environment
//! variables (`MQTT_CREDS__PASSWORD_FILE`, `MQTT_CREDS__CURRENT__ITERATIONS`, ...).

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::digest::scheme::{
    CURRENT_DEFAULT_ITERATIONS, CURRENT_DEFAULT_KEY_LEN, CURRENT_DEFAULT_SALT_LEN,
    LEGACY_DEFAULT_ITERATIONS,
};
use crate::digest::{CurrentParams, LegacyParams, Scheme};

pub const DEFAULT_PASSWORD_FILE: &str = "/etc/mosquitto/passwd";
pub const ENV_PREFIX: &str = "MQTT_CREDS";

/// Which digest encoding new hashes use by default
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    Legacy,
    Current,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredstoreConfig {
    /// Store used when the caller names none
    pub password_file: String,

    /// Encoding `default_scheme` picks
    pub scheme: SchemeKind,

    pub legacy: LegacyParams,
    pub current: CurrentParams,
}

impl CredstoreConfig {
    /// Defaults plus environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(defaults()?)
    }

    /// Defaults, then the TOML file at `path` (which may be missing), then
    /// environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = defaults()?.add_source(File::from(path.as_ref()).required(false));
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        let config: CredstoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.password_file.is_empty() {
            return Err(ConfigError::Message("password_file cannot be empty".into()));
        }
        self.legacy
            .validate()
            .map_err(|e| ConfigError::Message(format!("legacy: {e}")))?;
        self.current
            .validate()
            .map_err(|e| ConfigError::Message(format!("current: {e}")))?;
        Ok(())
    }

    pub fn password_file_path(&self) -> PathBuf {
        PathBuf::from(&self.password_file)
    }

    pub fn default_scheme(&self) -> Scheme {
        match self.scheme {
            SchemeKind::Legacy => Scheme::Legacy(self.legacy),
            SchemeKind::Current => Scheme::Current(self.current),
        }
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("password_file", DEFAULT_PASSWORD_FILE)?
        .set_default("scheme", "legacy")?
        .set_default("legacy.algorithm", "pbkdf2")?
        .set_default("legacy.iterations", i64::from(LEGACY_DEFAULT_ITERATIONS))?
        .set_default("current.hmac", "sha512")?
        .set_default("current.iterations", i64::from(CURRENT_DEFAULT_ITERATIONS))?
        .set_default("current.key_length", CURRENT_DEFAULT_KEY_LEN as i64)?
        .set_default("current.salt_size", CURRENT_DEFAULT_SALT_LEN as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{HmacHash, LegacyAlgorithm};
    use std::fs;

    #[test]
    fn missing_file_yields_broker_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CredstoreConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.password_file, DEFAULT_PASSWORD_FILE);
        assert_eq!(config.legacy, LegacyParams::default());
        assert_eq!(config.current, CurrentParams::default());
        assert_eq!(config.default_scheme(), Scheme::Legacy(LegacyParams::default()));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credstore.toml");
        fs::write(
            &path,
            r#"
password_file = "/var/lib/mosquitto/auth.db"
scheme = "current"

[legacy]
algorithm = "sha512"

[current]
hmac = "sha256"
iterations = 2000
"#,
        )
        .unwrap();

        let config = CredstoreConfig::load_from(&path).unwrap();
        assert_eq!(
            config.password_file_path(),
            PathBuf::from("/var/lib/mosquitto/auth.db")
        );
        assert_eq!(config.legacy.algorithm, LegacyAlgorithm::Sha512);
        assert_eq!(config.legacy.iterations, 101);
        assert_eq!(
            config.default_scheme(),
            Scheme::Current(CurrentParams {
                hmac: HmacHash::Sha256,
                iterations: 2000,
                key_length: 32,
                salt_size: 16,
            })
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credstore.toml");

        fs::write(&path, "[current]\niterations = 0\n").unwrap();
        assert!(CredstoreConfig::load_from(&path).is_err());

        fs::write(&path, "[current]\nhmac = \"md5\"\n").unwrap();
        assert!(CredstoreConfig::load_from(&path).is_err());
    }
}
