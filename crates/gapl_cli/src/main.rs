//! gaplc: the command-line driver for the GAPL compiler core.
//!
//! Provides `gaplc resolve` to check and dump the resolved program of a CST
//! JSON document, and `gaplc build` to build (and optionally retime) its
//! netlist.

#![warn(missing_docs)]

mod build;
mod pipeline;
mod resolve;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// GAPL compiler driver.
#[derive(Parser, Debug)]
#[command(name = "gaplc", version, about = "GAPL hardware compiler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `gapl.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a program and print its abstract syntax tree.
    Resolve(ResolveArgs),
    /// Build a program into a netlist design.
    Build(BuildArgs),
}

/// Arguments for the `gaplc resolve` subcommand.
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// CST JSON document to read.
    pub input: String,

    /// Write the output here instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the `gaplc build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// CST JSON document to read.
    pub input: String,

    /// Write the design here instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Retime every module with registers, overriding `gapl.toml`.
    #[arg(long)]
    pub retime: bool,

    /// Target clock period; implies `--retime`.
    #[arg(long)]
    pub target: Option<i64>,

    /// Write a Graphviz rendering of the circuit graph of every module with
    /// registers into this directory.
    #[arg(long)]
    pub dot_dir: Option<String>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print debug information.
    pub verbose: bool,
    /// Optional path to a custom config file or directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Resolve(ref args) => resolve::run(args, &global),
        Command::Build(ref args) => build::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(global)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(global.verbose)
        .init();
}

fn default_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["gaplc", "build", "design.json"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.input, "design.json");
                assert!(args.output.is_none());
                assert!(!args.retime);
                assert!(args.target.is_none());
                assert!(args.dot_dir.is_none());
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_with_args() {
        let cli = Cli::parse_from([
            "gaplc",
            "build",
            "design.json",
            "-o",
            "out.json",
            "--retime",
            "--target",
            "4",
            "--dot-dir",
            "graphs",
        ]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.output.as_deref(), Some("out.json"));
                assert!(args.retime);
                assert_eq!(args.target, Some(4));
                assert_eq!(args.dot_dir.as_deref(), Some("graphs"));
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_resolve() {
        let cli = Cli::parse_from(["gaplc", "resolve", "design.json", "--output", "ast.json"]);
        match cli.command {
            Command::Resolve(ref args) => {
                assert_eq!(args.input, "design.json");
                assert_eq!(args.output.as_deref(), Some("ast.json"));
            }
            _ => panic!("expected Resolve command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["gaplc", "--quiet", "--config", "/tmp/gapl.toml", "resolve", "a.json"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/tmp/gapl.toml"));
    }

    #[test]
    fn verbose_after_subcommand() {
        let cli = Cli::parse_from(["gaplc", "build", "a.json", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn log_level_follows_flags() {
        let global = |quiet, verbose| GlobalArgs {
            quiet,
            verbose,
            config: None,
        };
        assert_eq!(default_level(&global(false, false)), "info");
        assert_eq!(default_level(&global(false, true)), "debug");
        assert_eq!(default_level(&global(true, true)), "error");
    }
}
