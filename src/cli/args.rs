//! Defines the command-line arguments and subcommands for the macrodex CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "macrodex",
    version,
    about = "Look up, check, and call environment-scoped macros."
)]
pub struct MacrodexArgs {
    /// YAML configuration file. Defaults to $MACRODEX_CONFIG.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Additional module root searched for definition files.
    #[arg(short = 'M', long = "module-path", global = true, value_name = "DIR")]
    pub module_paths: Vec<PathBuf>,

    /// Environment to call macros in.
    #[arg(short, long, global = true, value_name = "NAME")]
    pub environment: Option<String>,

    /// Log debug diagnostics and print full error reports.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Scope variable visible to macro bodies.
    #[arg(long = "var", global = true, value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Call a macro and print its value as JSON.
    Determine {
        /// The macro name, e.g. `apache::conf_dir`.
        #[arg(required = true)]
        name: String,
        /// Macro arguments. Each is parsed as JSON, falling back to a plain string.
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
    },
    /// Call a macro for its side effects.
    Invoke {
        /// The macro name.
        #[arg(required = true)]
        name: String,
        /// Macro arguments. Each is parsed as JSON, falling back to a plain string.
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
    },
    /// Load every definition file and list the macros of each environment.
    List,
    /// Check whether a string is a valid macro name.
    CheckName {
        #[arg(required = true)]
        name: String,
    },
}

/// Splits a `KEY=VALUE` pair.
fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("prefix=/srv=x"),
            Ok(("prefix".to_string(), "/srv=x".to_string()))
        );
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_global_options_around_subcommand() {
        let args = MacrodexArgs::try_parse_from([
            "macrodex",
            "-e",
            "staging",
            "determine",
            "--var",
            "a=b",
            "foo::bar",
            "-1",
        ])
        .unwrap();
        assert_eq!(args.environment.as_deref(), Some("staging"));
        assert_eq!(args.vars, vec![("a".to_string(), "b".to_string())]);
        match args.command {
            Command::Determine { name, args } => {
                assert_eq!(name, "foo::bar");
                assert_eq!(args, vec!["-1".to_string()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
