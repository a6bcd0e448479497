use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisSettings, ErrorLogSettings, InferenceSettings, OrchestratorSettings, Settings,
};

/// The configuration file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tradelens.toml";

/// Prefix of the environment variables that override file settings,
/// e.g. `TRADELENS__ORCHESTRATOR__TIMEOUT_MS=5000`.
pub const ENV_PREFIX: &str = "TRADELENS";

/// Loads the pipeline settings.
///
/// Layers, lowest precedence first: built-in defaults, the TOML file (an
/// explicit `path` must exist, the default file may be absent), then
/// `TRADELENS__*` environment variables. The result is validated before it
/// is returned.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(?settings.orchestrator, "Settings loaded.");
    Ok(settings)
}
