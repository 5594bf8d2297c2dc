//! Layered configuration for Lectern.
//!
//! Settings are merged from several [`ConfigSource`]s in priority order:
//!
//! 1. built-in defaults ([`DefaultSource`])
//! 2. a TOML file, `lectern.toml` or the path in `LECTERN_CONFIG` ([`TomlFileSource`])
//! 3. a `.env` file loaded into the process environment ([`DotEnvSource`])
//! 4. `LECTERN_*` environment variables ([`EnvSource`])
//!
//! ```rust,no_run
//! use lectern_conf::Settings;
//!
//! let settings = Settings::load()?;
//! println!("listening on {}", settings.bind);
//! # Ok::<(), lectern_conf::ConfigError>(())
//! ```

pub mod settings;
pub mod sources;

pub use settings::{ConfigError, Settings, SettingsBuilder};
pub use sources::{ConfigSource, DefaultSource, DotEnvSource, EnvSource, SourceError, TomlFileSource};
