//! Handles all user-facing output for the CLI.
//!
//! Results go to stdout, errors to stderr. Color is used only when the stream is a terminal.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::{Environment, MacroError, Value};

// ============================================================================
// STREAMS
// ============================================================================

fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn stdout() -> StandardStream {
    StandardStream::stdout(color_choice(atty::Stream::Stdout))
}

fn stderr() -> StandardStream {
    StandardStream::stderr(color_choice(atty::Stream::Stderr))
}

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints a macro result as a single line of JSON.
pub fn print_value(value: &Value) -> io::Result<()> {
    let json = serde_json::to_string(value).map_err(io::Error::other)?;
    writeln!(stdout(), "{}", json)
}

/// Prints one `env: name` line per macro, grouping by environment. A documented macro
/// gets its description after a `#`.
pub fn print_listing(entries: &[(Environment, Vec<(String, Option<String>)>)]) -> io::Result<()> {
    let mut out = stdout();
    for (env, listed) in entries {
        for (name, doc) in listed {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            write!(out, "{}:", env)?;
            out.reset()?;
            write!(out, " {}", name)?;
            if let Some(doc) = doc {
                out.set_color(ColorSpec::new().set_dimmed(true))?;
                write!(out, "  # {}", doc)?;
                out.reset()?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Prints a plain status line.
pub fn print_line(line: &str) -> io::Result<()> {
    writeln!(stdout(), "{}", line)
}

/// Prints `Error: <message>` to stderr, followed by the full diagnostic report when verbose.
pub fn print_error(err: MacroError, verbose: bool) {
    let mut err_out = stderr();
    let _ = err_out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(err_out, "Error:");
    let _ = err_out.reset();
    let _ = writeln!(err_out, " {}", err);
    if verbose {
        let _ = writeln!(err_out, "{:?}", miette::Report::new(err));
    }
}
