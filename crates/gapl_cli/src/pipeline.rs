//! Shared pipeline helpers for CLI commands.
//!
//! Locating and loading `gapl.toml`, reading CST documents and writing JSON
//! results, used by both `gaplc resolve` and `gaplc build`.

use std::fs;
use std::path::{Path, PathBuf};

use gapl_config::{CompilerConfig, CONFIG_FILE_NAME};
use gapl_cst::CstProgram;
use tracing::{debug, warn};

use crate::GlobalArgs;

/// Determines the directory to load `gapl.toml` from.
///
/// `--config` may name the file itself or its directory. Without it, the
/// directory containing the input document is used.
pub fn resolve_config_dir(global: &GlobalArgs, input: &Path) -> PathBuf {
    match global.config {
        Some(ref config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                p.parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."))
            } else {
                p
            }
        }
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Loads the compiler configuration for `input`.
///
/// A missing `gapl.toml` next to the input yields the defaults; a missing
/// file under an explicit `--config` is an error.
pub fn load_compiler_config(
    global: &GlobalArgs,
    input: &Path,
) -> Result<CompilerConfig, Box<dyn std::error::Error>> {
    let dir = resolve_config_dir(global, input);
    if global.config.is_none() && !dir.join(CONFIG_FILE_NAME).is_file() {
        debug!(dir = %dir.display(), "no configuration file, using defaults");
        return Ok(CompilerConfig::default());
    }
    let config = gapl_config::load_config(&dir)?;
    if config.compiler.flatten {
        warn!("`flatten` is not supported and will be ignored");
    }
    if config.compiler.literal_simplification {
        warn!("`literal_simplification` is not supported and will be ignored");
    }
    Ok(config)
}

/// Reads a CST JSON document.
pub fn read_program(path: &Path) -> Result<CstProgram, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let program = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not a valid CST document: {e}", path.display()))?;
    Ok(program)
}

/// Writes pretty-printed JSON to `output`, or to stdout when absent.
pub fn write_json(
    value: &serde_json::Value,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, text + "\n")?,
        None => println!("{text}"),
    }
    Ok(())
}
