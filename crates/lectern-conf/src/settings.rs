//! Application settings and the builder that layers sources into them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::sources::{ConfigSource, DefaultSource, DotEnvSource, EnvSource, SourceError, TomlFileSource};

/// Prefix of environment variables read into [`Settings`].
pub const ENV_PREFIX: &str = "LECTERN_";

/// Names the TOML file to load instead of `lectern.toml`.
pub const CONFIG_PATH_VAR: &str = "LECTERN_CONFIG";

const STORAGE_BACKENDS: &[&str] = &["local", "memory"];
const SESSION_STORES: &[&str] = &["database", "memory"];

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{source_description}: {error}")]
	Source {
		source_description: String,
		#[source]
		error: SourceError,
	},

	#[error("Invalid settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid value for '{key}': {message}")]
	InvalidValue { key: String, message: String },
}

impl ConfigError {
	fn invalid(key: &str, message: impl Into<String>) -> Self {
		ConfigError::InvalidValue {
			key: key.to_string(),
			message: message.into(),
		}
	}
}

impl From<ConfigError> for lectern_core::Error {
	fn from(err: ConfigError) -> Self {
		lectern_core::Error::Internal(err.to_string())
	}
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub bind: String,
	pub database_url: String,
	/// `local` or `memory`
	pub storage_backend: String,
	pub media_root: PathBuf,
	pub articles_per_page: u32,
	/// `database` or `memory`
	pub session_store: String,
	pub session_cookie: String,
	pub session_ttl_secs: u64,
	/// Seconds between sweeps of expired sessions.
	pub session_cleanup_secs: u64,
	pub secure_cookies: bool,
	pub basic_auth_user: String,
	pub basic_auth_password: String,
	pub max_body_bytes: usize,
	pub log_level: String,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			bind: "127.0.0.1:3000".to_string(),
			database_url: "sqlite://lectern.db".to_string(),
			storage_backend: "local".to_string(),
			media_root: PathBuf::from("storage"),
			articles_per_page: 5,
			session_store: "database".to_string(),
			session_cookie: "_lectern_session".to_string(),
			session_ttl_secs: 14 * 24 * 60 * 60,
			session_cleanup_secs: 60 * 60,
			secure_cookies: false,
			basic_auth_user: "dhh".to_string(),
			basic_auth_password: "secret".to_string(),
			max_body_bytes: 10 * 1024 * 1024,
			log_level: "info".to_string(),
		}
	}
}

impl Settings {
	pub fn builder() -> SettingsBuilder {
		SettingsBuilder::new()
	}

	/// Loads settings from the standard layers.
	pub fn load() -> Result<Self, ConfigError> {
		let toml_path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "lectern.toml".to_string());

		Self::builder()
			.add_source(TomlFileSource::new(toml_path))
			.add_source(DotEnvSource::new())
			.add_source(EnvSource::new().with_prefix(ENV_PREFIX))
			.build()
	}

	/// Checks cross-field constraints that deserialisation cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.bind_addr()?;
		if self.database_url.trim().is_empty() {
			return Err(ConfigError::invalid("database_url", "must not be empty"));
		}
		if self.articles_per_page == 0 {
			return Err(ConfigError::invalid("articles_per_page", "must be at least 1"));
		}
		if !STORAGE_BACKENDS.contains(&self.storage_backend.as_str()) {
			return Err(ConfigError::invalid(
				"storage_backend",
				format!("unknown backend '{}' (expected local or memory)", self.storage_backend),
			));
		}
		if !SESSION_STORES.contains(&self.session_store.as_str()) {
			return Err(ConfigError::invalid(
				"session_store",
				format!("unknown store '{}' (expected database or memory)", self.session_store),
			));
		}
		if self.session_cleanup_secs == 0 {
			return Err(ConfigError::invalid("session_cleanup_secs", "must be at least 1"));
		}
		if self.session_cookie.is_empty() || self.session_cookie.contains([';', '=', ' ']) {
			return Err(ConfigError::invalid("session_cookie", "is not a valid cookie name"));
		}
		Ok(())
	}

	pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
		self.bind
			.parse()
			.map_err(|e| ConfigError::invalid("bind", format!("{}", e)))
	}

	pub fn session_ttl(&self) -> Duration {
		Duration::from_secs(self.session_ttl_secs)
	}

	pub fn session_cleanup_interval(&self) -> Duration {
		Duration::from_secs(self.session_cleanup_secs)
	}
}

/// Merges [`ConfigSource`]s on top of the built-in defaults.
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	pub fn add_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merges every source, coerces values to the types of the defaults,
	/// then deserialises and validates.
	///
	/// # Examples
	///
	/// ```
	/// use lectern_conf::{DefaultSource, Settings};
	/// use serde_json::Value;
	///
	/// let settings = Settings::builder()
	/// 	.add_source(DefaultSource::new().with_value("articles_per_page", Value::from("10")))
	/// 	.build()
	/// 	.unwrap();
	/// assert_eq!(settings.articles_per_page, 10);
	/// ```
	pub fn build(self) -> Result<Settings, ConfigError> {
		let defaults = serde_json::to_value(Settings::default())?;
		let template = defaults.as_object().cloned().unwrap_or_default();

		let mut sources = self.sources;
		sources.sort_by_key(|source| source.priority());

		let mut merged: IndexMap<String, Value> = template.clone().into_iter().collect();
		for source in &sources {
			let values = source.load().map_err(|error| ConfigError::Source {
				source_description: source.description(),
				error,
			})?;
			tracing::debug!(source = %source.description(), keys = values.len(), "loaded settings layer");
			for (key, value) in values {
				// Unknown keys (other LECTERN_* variables) are ignored.
				let Some(expected) = template.get(&key) else {
					continue;
				};
				let value = coerce(&key, expected, value)?;
				merged.insert(key, value);
			}
		}

		let settings: Settings = serde_json::from_value(Value::Object(merged.into_iter().collect()))?;
		settings.validate()?;
		Ok(settings)
	}
}

impl Default for SettingsBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Converts string values from env-like sources into the JSON type of the default.
fn coerce(key: &str, expected: &Value, value: Value) -> Result<Value, ConfigError> {
	let Value::String(raw) = &value else {
		return Ok(value);
	};
	let raw = raw.trim();

	match expected {
		Value::Bool(_) => match raw.to_lowercase().as_str() {
			"true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
			"false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
			_ => Err(ConfigError::invalid(key, format!("expected a boolean, got '{}'", raw))),
		},
		Value::Number(_) => raw
			.parse::<u64>()
			.map(Value::from)
			.map_err(|_| ConfigError::invalid(key, format!("expected a number, got '{}'", raw))),
		_ => Ok(value),
	}
}
