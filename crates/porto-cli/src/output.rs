use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Env var holding the default log filter.
pub const LOG_ENV: &str = "PORTO_LOG";
/// Set to `1` for JSON-formatted log lines.
pub const LOG_JSON_ENV: &str = "PORTO_LOG_JSON";

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

/// Logs go to stderr so stdout stays a clean report (or JSON document).
pub fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::try_new(l).unwrap_or_else(|_| EnvFilter::new("warn")),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let json = std::env::var(LOG_JSON_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .try_init()
    };
}

/// What a command produced: the human report, its JSON form and the exit code.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub text: String,
    pub json: Value,
    pub exit_code: i32,
}

impl Outcome {
    pub fn new(text: impl Into<String>, json: Value, exit_code: i32) -> Self {
        Self {
            text: text.into(),
            json,
            exit_code,
        }
    }
}

pub fn emit(outcome: &Outcome) -> anyhow::Result<()> {
    if is_json() {
        let s = serde_json::to_string_pretty(&outcome.json)?;
        println!("{s}");
        return Ok(());
    }
    print_report(&outcome.text)?;
    Ok(())
}

fn print_report(text: &str) -> io::Result<()> {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut out = StandardStream::stdout(choice);
    for line in text.lines() {
        match line_color(line) {
            Some(color) => {
                out.set_color(ColorSpec::new().set_fg(Some(color)))?;
                write!(out, "{line}")?;
                out.reset()?;
                writeln!(out)?;
            }
            None => writeln!(out, "{line}")?,
        }
    }
    out.flush()
}

/// Status lines are colored by their leading marker.
fn line_color(line: &str) -> Option<Color> {
    let line = line.trim_start();
    if line.starts_with('❌') || line.starts_with('✗') {
        Some(Color::Red)
    } else if line.starts_with('✅') || line.starts_with('✓') {
        Some(Color::Green)
    } else if line.starts_with('⚠') || line.starts_with('🔧') {
        Some(Color::Yellow)
    } else {
        None
    }
}
