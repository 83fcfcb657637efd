//! The macrodex Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, MacrodexArgs};
use crate::config::Config;
use crate::functions::{determine, invoke};
use crate::macros::{validate_name, Registry};
use crate::{err_msg, ErrorKind, MacroError, Value, VarScope};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = MacrodexArgs::parse();
    init_logging(args.verbose);

    let result = dispatch(&args);

    if let Err(e) = result {
        output::print_error(e, args.verbose);
        process::exit(1);
    }
}

/// Installs a stderr subscriber. `RUST_LOG` applies unless `-v` asks for debug output.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .without_time()
        .try_init();
}

fn dispatch(args: &MacrodexArgs) -> Result<(), MacroError> {
    match &args.command {
        Command::CheckName { name } => handle_check_name(name),
        Command::Determine { name, args: macro_args } => {
            let registry = load_config(args)?.build_registry();
            let value = determine(&registry, &build_scope(args), &call_args(name, macro_args))?;
            output::print_value(&value).map_err(io_failure)
        }
        Command::Invoke { name, args: macro_args } => {
            let registry = load_config(args)?.build_registry();
            invoke(&registry, &build_scope(args), &call_args(name, macro_args))
        }
        Command::List => handle_list(&load_config(args)?.build_registry()),
    }
}

/// Starts from `--config` (or the process environment) and layers the CLI flags on top.
fn load_config(args: &MacrodexArgs) -> Result<Config, MacroError> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env(),
    };
    config
        .loader
        .module_paths
        .extend(args.module_paths.iter().cloned());
    if let Some(env) = &args.environment {
        config.environment = Some(env.clone());
    }
    Ok(config)
}

fn build_scope(args: &MacrodexArgs) -> VarScope {
    args.vars
        .iter()
        .map(|(key, value)| (key.clone(), parse_arg(value)))
        .collect()
}

/// The host argument list: the macro name followed by the macro arguments.
fn call_args(name: &str, raw: &[String]) -> Vec<Value> {
    std::iter::once(Value::from(name))
        .chain(raw.iter().map(|arg| parse_arg(arg)))
        .collect()
}

/// Parses an argument as JSON, falling back to the raw string.
fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw))
}

fn handle_check_name(name: &str) -> Result<(), MacroError> {
    validate_name(&Value::from(name), ErrorKind::Argument)?;
    output::print_line(&format!("{} is a valid macro name", name)).map_err(io_failure)
}

fn handle_list(registry: &Registry) -> Result<(), MacroError> {
    registry.loadall();
    let entries: Vec<_> = registry
        .environments()
        .into_iter()
        .map(|env| {
            let table = registry.macros(&env);
            let mut listed: Vec<(String, Option<String>)> = table
                .read()
                .iter()
                .map(|(name, m)| (name.clone(), m.doc().map(str::to_string)))
                .collect();
            listed.sort();
            (env, listed)
        })
        .filter(|(_, listed)| !listed.is_empty())
        .collect();
    output::print_listing(&entries).map_err(io_failure)
}

fn io_failure(e: std::io::Error) -> MacroError {
    err_msg!(General, "Failed to write output").with_source(e)
}
