//! `gaplc resolve`: name resolution only.

use std::path::Path;

use gapl_common::Interner;
use tracing::info;

use crate::pipeline::{read_program, write_json};
use crate::{GlobalArgs, ResolveArgs};

/// Runs the `gaplc resolve` command.
///
/// Writes `{ "symbols": [...], "program": {...} }`; identifiers in the program
/// are indices into `symbols`.
pub fn run(args: &ResolveArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let cst = read_program(Path::new(&args.input))?;
    let interner = Interner::new();
    let program = gapl_resolve::resolve_program(&cst, &interner)?;
    info!(
        interfaces = program.interfaces.len(),
        functions = program.functions.len(),
        "resolved program"
    );
    let value = serde_json::json!({
        "symbols": interner.symbols(),
        "program": program,
    });
    write_json(&value, args.output.as_deref())?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    #[test]
    fn resolves_to_file() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in.json");
        let output = tmp.path().join("out.json");
        fs::write(&input, r#"{ "function_definitions": [] }"#).unwrap();
        let args = ResolveArgs {
            input: input.to_string_lossy().to_string(),
            output: Some(output.to_string_lossy().to_string()),
        };
        assert_eq!(run(&args, &global()).unwrap(), 0);
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert!(written["program"]["functions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn missing_input_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let args = ResolveArgs {
            input: tmp.path().join("absent.json").to_string_lossy().to_string(),
            output: None,
        };
        let err = run(&args, &global()).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
