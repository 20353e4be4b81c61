//! Logger initialization.
//!
//! Engine and bulk-job messages open with a bracketed tag (`[THROTTLE]`,
//! `[TIMING]`, `[BULK]`). Both formats lift that tag out of the message: plain
//! output highlights it, JSON output carries it as its own `tag` field so log
//! shippers can filter throttle feedback or timings without parsing text.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter};
use serde_json::{json, Value};

/// Initializes the logger with the specified level and format.
///
/// The logger reads `RUST_LOG` first; `level` then overrides it for this
/// crate and as the global default. HTTP stack modules are capped at info.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Show every throttle snapshot
/// RUST_LOG=debug bulk_mutator
///
/// # Override with CLI args (takes precedence)
/// RUST_LOG=debug bulk_mutator --log-level info
///
/// # Only the engine at debug
/// RUST_LOG=bulk_mutator::engine=debug bulk_mutator
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for noisy in ["reqwest", "hyper", "hyper_util"] {
        builder.filter_module(noisy, LevelFilter::Info);
    }
    builder.filter_module("bulk_mutator", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                let line = json_line(
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    &record.args().to_string(),
                );
                writeln!(buf, "{}", line)
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    Level::Error => level.to_string().red(),
                    Level::Warn => level.to_string().yellow(),
                    Level::Info => level.to_string().green(),
                    Level::Debug => level.to_string().blue(),
                    Level::Trace => level.to_string().purple(),
                };

                let emoji = match level {
                    Level::Error => "❌",
                    Level::Warn => "⚠️",
                    Level::Info => "✔️",
                    Level::Debug => "🔍",
                    Level::Trace => "🔬",
                };

                let message = record.args().to_string();
                match split_tag(&message) {
                    (Some(tag), rest) => writeln!(
                        buf,
                        "{} {} [{}] {} {}",
                        emoji,
                        record.target().cyan(),
                        colored_level,
                        format!("[{}]", tag).magenta().bold(),
                        rest
                    ),
                    (None, _) => writeln!(
                        buf,
                        "{} {} [{}] {}",
                        emoji,
                        record.target().cyan(),
                        colored_level,
                        message
                    ),
                }
            });
        }
    }

    // try_init: tests may initialize more than once per process
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// Splits a leading `[TAG]` off `message`.
fn split_tag(message: &str) -> (Option<&str>, &str) {
    let Some(rest) = message.strip_prefix('[') else {
        return (None, message);
    };
    match rest.split_once(']') {
        Some((tag, tail))
            if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_uppercase() || c == '_') =>
        {
            (Some(tag), tail.trim_start())
        }
        _ => (None, message),
    }
}

fn json_line(ts: i64, level: Level, target: &str, message: &str) -> Value {
    let (tag, msg) = split_tag(message);
    let mut line = json!({
        "ts": ts,
        "level": level.as_str(),
        "target": target,
        "msg": msg,
    });
    if let Some(tag) = tag {
        line["tag"] = Value::String(tag.to_string());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tag() {
        assert_eq!(
            split_tag("[TIMING] SET_QUANTITY: 1.20s"),
            (Some("TIMING"), "SET_QUANTITY: 1.20s")
        );
        assert_eq!(split_tag("Round 3: 4 batches"), (None, "Round 3: 4 batches"));
        // Bracketed text that is not an uppercase tag stays in the message
        assert_eq!(split_tag("[3 of 4] done"), (None, "[3 of 4] done"));
        assert_eq!(split_tag("[] empty"), (None, "[] empty"));
    }

    #[test]
    fn test_json_line_carries_tag() {
        let line = json_line(
            1_700_000_000_000,
            Level::Debug,
            "bulk_mutator::throttle::tracker",
            "[THROTTLE] max: 2000, current: 1950, restoreRate: 100",
        );
        assert_eq!(line["tag"], "THROTTLE");
        assert_eq!(line["level"], "DEBUG");
        assert_eq!(line["msg"], "max: 2000, current: 1950, restoreRate: 100");

        let untagged = json_line(0, Level::Info, "bulk_mutator", "say \"hi\"");
        assert!(untagged.get("tag").is_none());
        assert_eq!(untagged["msg"], "say \"hi\"");
    }

    #[test]
    fn test_second_init_reports_logger_error() {
        let _ = env_logger::try_init();
        match init_logger_with(LevelFilter::Debug, LogFormat::Json) {
            Ok(()) => {}
            Err(e) => assert!(e.to_string().contains("Logger initialization error")),
        }
    }
}
