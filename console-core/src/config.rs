use crate::error::CoreError;
use config::{Config as Cfg, File};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load a typed configuration from a yaml file plus `APP__`-prefixed
/// environment variables. Environment values override file values.
pub fn load<T: DeserializeOwned>(configuration_file: &Path) -> Result<T, CoreError> {
    dotenvy::dotenv().ok();

    let config = Cfg::builder()
        .add_source(File::from(configuration_file).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}
