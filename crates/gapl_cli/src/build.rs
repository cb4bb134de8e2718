//! `gaplc build`: resolve, build and optionally retime a program.
//!
//! Pipeline:
//! 1. Load `gapl.toml` and validate the delay model
//! 2. Read and resolve the CST document
//! 3. Build every non-generic function into the design
//! 4. Retime modules with registers, when enabled
//! 5. Write the design (and optional DOT dumps)

use std::fs;
use std::path::Path;

use gapl_common::Interner;
use gapl_config::{CompilerConfig, DelayModel};
use gapl_ir::{module_name, Design};
use gapl_retime::{RetimeReport, RetimeTarget};
use tracing::{debug, info};

use crate::pipeline::{load_compiler_config, read_program, write_json};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `gaplc build` command.
///
/// Writes `{ "symbols": [...], "design": {...}, "retiming": [...] }`.
/// Returns exit code 0 on success; compilation errors are returned as `Err`.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let input = Path::new(&args.input);
    let config = load_compiler_config(global, input)?;
    gapl_retime::validate_delay_model(&config.delay)?;

    let cst = read_program(input)?;
    let interner = Interner::new();
    let program = gapl_resolve::resolve_program(&cst, &interner)?;
    let mut design = gapl_build::build_all_modules(&program, &interner)?;
    info!(
        modules = design.len(),
        entries = design.entries().len(),
        "built design"
    );

    let mut reports = Vec::new();
    if let Some(target) = retime_target(args, &config) {
        let retimed = gapl_retime::retime_design(&design, &config.delay, target, &interner)?;
        design = retimed.design;
        reports = retimed.reports;
    }

    if let Some(ref dir) = args.dot_dir {
        let written = write_dot_files(&design, &config.delay, &interner, Path::new(dir))?;
        info!(files = written, dir = %dir, "wrote circuit graphs");
    }

    let value = serde_json::json!({
        "symbols": interner.symbols(),
        "design": design,
        "retiming": reports.iter().map(report_json).collect::<Vec<_>>(),
    });
    write_json(&value, args.output.as_deref())?;
    Ok(0)
}

/// Decides whether and how to retime.
///
/// Command-line flags take priority over `gapl.toml`; a target from either
/// source enables retiming.
pub fn retime_target(args: &BuildArgs, config: &CompilerConfig) -> Option<RetimeTarget> {
    let target = args.target.or(config.compiler.retime_target);
    if !(args.retime || args.target.is_some() || config.compiler.retime) {
        return None;
    }
    Some(match target {
        Some(period) => RetimeTarget::Period(period),
        None => RetimeTarget::Minimize,
    })
}

fn report_json(report: &RetimeReport) -> serde_json::Value {
    serde_json::json!({
        "module": report.name,
        "original_period": report.original_period,
        "period": report.period,
    })
}

/// Writes `<module name>.dot` for every module with registers.
///
/// Returns the number of files written.
pub fn write_dot_files(
    design: &Design,
    delay: &DelayModel,
    interner: &Interner,
    dir: &Path,
) -> Result<usize, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    let mut written = 0;
    for (_, module) in design.modules().filter(|(_, m)| m.has_registers()) {
        let name = module_name(&module.invocation, interner);
        let Some(circuit) = gapl_retime::module_to_circuit(module, delay, &name)? else {
            debug!(module = %name, "no circuit graph to render");
            continue;
        };
        let path = dir.join(format!("{name}.dot"));
        fs::write(&path, gapl_retime::circuit_dot(&name, &circuit, module, interner))?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapl_cst::{
        CstCircuitNodeExpression as N, CstCircuitStatement as S, CstExpression as E,
        CstFunctionDefinition, CstFunctionIo as Io, CstProgram,
    };
    use tempfile::TempDir;

    /// `a => not => not => not => register => register => b`, one wire wide.
    fn pipeline() -> CstProgram {
        let bit = || E::wire_vector(E::int(1));
        let not = || N::lone(E::call("bitwise_not", vec![E::int(1)]));
        let reg = || N::lone(E::call("register", vec![bit()]));
        let function = CstFunctionDefinition::new("pipeline")
            .input(Io::signal("a", bit()))
            .output(Io::signal("b", bit()))
            .statement(S::connect(vec![
                N::lone(E::atom("a")),
                not(),
                not(),
                not(),
                reg(),
                reg(),
                N::lone(E::atom("b")),
            ]));
        CstProgram {
            interface_definitions: vec![],
            function_definitions: vec![function],
        }
    }

    fn args(tmp: &TempDir) -> BuildArgs {
        let input = tmp.path().join("pipeline.json");
        fs::write(&input, serde_json::to_string(&pipeline()).unwrap()).unwrap();
        BuildArgs {
            input: input.to_string_lossy().to_string(),
            output: Some(tmp.path().join("out.json").to_string_lossy().to_string()),
            retime: false,
            target: None,
            dot_dir: None,
        }
    }

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    fn output(tmp: &TempDir) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(tmp.path().join("out.json")).unwrap()).unwrap()
    }

    #[test]
    fn builds_without_retiming() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(run(&args(&tmp), &global()).unwrap(), 0);
        let out = output(&tmp);
        assert!(out["retiming"].as_array().unwrap().is_empty());
        assert!(out["symbols"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s == "pipeline"));
    }

    #[test]
    fn retimes_to_minimum_period() {
        let tmp = TempDir::new().unwrap();
        let mut args = args(&tmp);
        args.retime = true;
        args.dot_dir = Some(tmp.path().join("dot").to_string_lossy().to_string());
        assert_eq!(run(&args, &global()).unwrap(), 0);

        let out = output(&tmp);
        let report = &out["retiming"][0];
        assert_eq!(report["module"], "pipeline");
        assert_eq!(report["original_period"], 3);
        assert_eq!(report["period"], 1);
        assert!(out["symbols"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s == "retimed_register_0"));
        let dot = fs::read_to_string(tmp.path().join("dot").join("pipeline.dot")).unwrap();
        assert!(dot.contains("bitwise_not"));
    }

    #[test]
    fn config_enables_retiming() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("gapl.toml"),
            "[compiler]\nretime = true\nretime_target = 2\n",
        )
        .unwrap();
        assert_eq!(run(&args(&tmp), &global()).unwrap(), 0);
        let period = output(&tmp)["retiming"][0]["period"].as_i64().unwrap();
        assert!(period <= 2);
    }

    #[test]
    fn unreachable_target_fails() {
        let tmp = TempDir::new().unwrap();
        let mut args = args(&tmp);
        args.target = Some(0);
        let err = run(&args, &global()).unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }

    #[test]
    fn unknown_delay_function_fails() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("gapl.toml"),
            "[delay.functions.adder]\ndefault = 2\n",
        )
        .unwrap();
        let err = run(&args(&tmp), &global()).unwrap_err();
        assert!(err.to_string().contains("unknown function `adder`"));
    }

    #[test]
    fn target_precedence() {
        let tmp = TempDir::new().unwrap();
        let mut args = args(&tmp);
        let mut config = CompilerConfig::default();
        assert_eq!(retime_target(&args, &config), None);

        config.compiler.retime = true;
        assert_eq!(retime_target(&args, &config), Some(RetimeTarget::Minimize));

        config.compiler.retime_target = Some(5);
        assert_eq!(retime_target(&args, &config), Some(RetimeTarget::Period(5)));

        args.target = Some(3);
        config.compiler.retime = false;
        assert_eq!(retime_target(&args, &config), Some(RetimeTarget::Period(3)));
    }
}
