//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start `flexi_logger` once, writing to stderr or to rotating files.
//! - Turn panics into one sanitized `event=panic` line.
//!
//! # Invariants
//! - A second `init_logging` with the same configuration is a no-op; a
//!   different configuration is an error, never a silent switch.
//! - Nothing in here panics.

use flexi_logger::{
    detailed_format, Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger,
    LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const FILE_BASENAME: &str = "taskcomplete";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_MESSAGE_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Rotating files in this directory; warnings are mirrored to stderr.
    Files(PathBuf),
}

impl LogTarget {
    fn directory(&self) -> Option<&Path> {
        match self {
            Self::Stderr => None,
            Self::Files(dir) => Some(dir),
        }
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Files(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Validated logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub target: LogTarget,
}

impl LogConfig {
    /// Parses a level name and an optional absolute log directory.
    pub fn parse(level: &str, log_dir: Option<&str>) -> Result<Self, String> {
        let level = LevelFilter::from_str(level.trim())
            .map_err(|_| format!("unknown log level `{}`", level.trim()))?;
        let target = match log_dir.map(str::trim) {
            None => LogTarget::Stderr,
            Some("") => return Err("log directory is empty".to_string()),
            Some(dir) if !Path::new(dir).is_absolute() => {
                return Err(format!("log directory `{dir}` is not absolute"))
            }
            Some(dir) => LogTarget::Files(PathBuf::from(dir)),
        };
        Ok(Self { level, target })
    }
}

struct ActiveLogger {
    config: LogConfig,
    _handle: LoggerHandle,
}

/// Starts logging for the process.
///
/// `log_dir = None` logs to stderr only.
///
/// # Errors
/// - Unknown level or a relative/empty `log_dir`.
/// - The log directory cannot be created or the backend fails to start.
/// - Logging is already running with another configuration.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), String> {
    let wanted = LogConfig::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(wanted.clone()))?;
    if active.config != wanted {
        return Err(format!(
            "logging already runs at {} to {}; refusing to switch to {} to {}",
            active.config.level, active.config.target, wanted.level, wanted.target
        ));
    }
    Ok(())
}

/// Active configuration, once [`init_logging`] has succeeded.
pub fn logging_status() -> Option<LogConfig> {
    ACTIVE.get().map(|active| active.config.clone())
}

/// `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(config: LogConfig) -> Result<ActiveLogger, String> {
    let spec = LogSpecification::builder().default(config.level).build();
    let logger = match config.target.directory() {
        None => Logger::with(spec).log_to_stderr(),
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|err| format!("cannot create log directory {}: {err}", dir.display()))?;
            Logger::with(spec)
                .log_to_file(FileSpec::default().directory(dir).basename(FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_FILES),
                )
                .append()
                .write_mode(WriteMode::BufferAndFlush)
                .format_for_files(detailed_format)
                .duplicate_to_stderr(Duplicate::Warn)
        }
    };
    let handle = logger
        .start()
        .map_err(|err| format!("logger failed to start: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_init module=core status=ok level={} target={} version={} os={}",
        config.level,
        config.target,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );
    Ok(ActiveLogger {
        config,
        _handle: handle,
    })
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        error!(
            "event=panic module=core status=error location={location} message={:?}",
            panic_message(info)
        );
        previous(info);
    }));
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let raw = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string payload>");
    single_line(raw, PANIC_MESSAGE_LIMIT)
}

/// Flattens to one line and caps the length in chars.
fn single_line(text: &str, limit: usize) -> String {
    let mut flat = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(limit)
        .collect::<String>();
    if text.chars().count() > limit {
        flat.push('…');
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, single_line, LogConfig, LogTarget};
    use log::LevelFilter;
    use std::path::PathBuf;

    #[test]
    fn parses_levels_case_insensitively() {
        let config = LogConfig::parse(" WARN ", None).unwrap();
        assert_eq!(config.level, LevelFilter::Warn);
        assert_eq!(config.target, LogTarget::Stderr);
        assert!(LogConfig::parse("loud", None).is_err());
    }

    #[test]
    fn log_directory_must_be_absolute() {
        assert!(LogConfig::parse("info", Some("logs")).is_err());
        assert!(LogConfig::parse("info", Some("  ")).is_err());
    }

    #[test]
    fn single_line_strips_breaks_and_caps() {
        assert_eq!(single_line("a\nb\rc", 10), "a b c");
        assert_eq!(single_line("abcdef", 3), "abc…");
    }

    // Only test in this crate that starts the global logger.
    #[test]
    fn second_init_must_match_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap().to_string();

        init_logging("info", Some(&dir_str)).unwrap();
        init_logging("INFO", Some(&dir_str)).unwrap();

        let err = init_logging("debug", Some(&dir_str)).unwrap_err();
        assert!(err.contains("refusing to switch"));
        assert!(init_logging("info", None).is_err());

        let active = logging_status().unwrap();
        assert_eq!(active.level, LevelFilter::Info);
        assert_eq!(active.target, LogTarget::Files(PathBuf::from(&dir_str)));
    }
}
