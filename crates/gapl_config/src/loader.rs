//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::CompilerConfig;
use std::path::Path;

/// File name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "gapl.toml";

/// Loads and validates a `gapl.toml` configuration from a project directory.
///
/// Reads `<project_dir>/gapl.toml`, parses it, and validates the delay model.
pub fn load_config(project_dir: &Path) -> Result<CompilerConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `gapl.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<CompilerConfig, ConfigError> {
    let config: CompilerConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that option combinations and width slices are consistent.
fn validate_config(config: &CompilerConfig) -> Result<(), ConfigError> {
    if let Some(target) = config.compiler.retime_target {
        if !config.compiler.retime {
            return Err(ConfigError::ValidationError(
                "compiler.retime_target requires compiler.retime = true".to_string(),
            ));
        }
        if target < 0 {
            return Err(ConfigError::ValidationError(format!(
                "compiler.retime_target must be non-negative, found {target}"
            )));
        }
    }
    if config.delay.default < 0 {
        return Err(ConfigError::ValidationError(
            "delay.default must be non-negative".to_string(),
        ));
    }
    for (name, function) in &config.delay.functions {
        if function.default.is_some_and(|d| d < 0) {
            return Err(ConfigError::ValidationError(format!(
                "delay.functions.{name}.default must be non-negative"
            )));
        }
        for (i, slice) in function.widths.iter().enumerate() {
            if slice.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "delay.functions.{name}: width slice starting at {} is empty",
                    slice.index
                )));
            }
            if slice.delay < 0 {
                return Err(ConfigError::ValidationError(format!(
                    "delay.functions.{name}: width slice starting at {} has a negative delay",
                    slice.index
                )));
            }
            if let Some(other) = function.widths[..i].iter().find(|o| o.overlaps(slice)) {
                return Err(ConfigError::ValidationError(format!(
                    "delay.functions.{name}: width slices starting at {} and {} overlap",
                    other.index, slice.index
                )));
            }
        }
    }
    Ok(())
}
