use std::io::Write;
use std::str::FromStr;
use chrono::Utc;
use env_logger::Builder;
use log::{Level, LevelFilter, Record};
use yansi::Paint;
use crate::error::{Result, ScribeError};

const CRATE_PREFIX: &str = "reposcribe::";

/// Installs the global logger at `level`; `RUST_LOG` directives refine it
///
/// A second call leaves the first logger in place.
pub fn init(level: LevelFilter) {
    let _ = Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format(|buf, record| writeln!(buf, "{}", format_log(record)))
        .try_init();
}

/// Renders a record as `HH:MM:SS.mmm LEVEL module: message`
///
/// Targets inside this crate lose their crate prefix.
pub fn format_log(record: &Record) -> String {
    let level = match record.level() {
        Level::Error => Paint::red("ERROR").bold(),
        Level::Warn => Paint::yellow("WARN ").bold(),
        Level::Info => Paint::green("INFO "),
        Level::Debug => Paint::blue("DEBUG"),
        Level::Trace => Paint::new("TRACE").dimmed(),
    };
    let target = record.target();
    let module = target.strip_prefix(CRATE_PREFIX).unwrap_or(target);

    format!(
        "{} {} {}: {}",
        Utc::now().format("%H:%M:%S%.3f"),
        level,
        module,
        record.args()
    )
}

/// Parses a `--log-level` value, rejecting unknown names
pub fn parse_log_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| ScribeError::Config(format!("Unknown log level '{}'", level)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("warn", LevelFilter::Warn)]
    #[test_case("DEBUG", LevelFilter::Debug)]
    #[test_case(" trace ", LevelFilter::Trace)]
    #[test_case("off", LevelFilter::Off)]
    fn test_parse_log_level(raw: &str, expected: LevelFilter) {
        assert_eq!(parse_log_level(raw).unwrap(), expected);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let err = parse_log_level("verbose").unwrap_err();
        assert!(matches!(err, ScribeError::Config(_)));
    }

    #[test]
    fn test_format_log_strips_crate_prefix() {
        Paint::disable();
        let line = format_log(
            &Record::builder()
                .args(format_args!("walking root"))
                .level(Level::Info)
                .target("reposcribe::processors::github")
                .build(),
        );
        assert!(line.ends_with("INFO  processors::github: walking root"), "{}", line);
    }
}
