use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::{pattern::PatternEncoder, Encode},
    filter::threshold::ThresholdFilter,
};
use std::{backtrace, env};

/// Reports a broken internal invariant: logged in every build, fatal in
/// debug builds. Release builds continue with the caller's fallback.
macro_rules! invariant_failed {
    ($($arg:tt)+) => {{
        log::error!($($arg)+);
        debug_assert!(false, $($arg)+);
    }};
}

#[macro_use]
pub mod byte_operations;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod fixup;
pub mod map;
pub mod migration;
pub mod passability;
pub mod sprites;
pub mod stream;
pub mod tile;
pub mod types;

pub use config::EngineConfig;
pub use constants::{Colors, Direction, PlayerColor};
pub use error::TileStreamError;
pub use map::TileMap;
pub use tile::{FragmentList, Tile};
pub use types::fragment::{ObjectLayer, TileFragment};
pub use types::icn::ObjectIcnType;
pub use types::object_type::{MapObjectType, ObjectKind};

#[derive(Debug)]
struct BacktracePatternEncoder {
    pattern_encoder: PatternEncoder,
    is_backtrace_enabled: bool,
}

impl BacktracePatternEncoder {
    fn new(pattern: &str) -> Self {
        BacktracePatternEncoder {
            pattern_encoder: PatternEncoder::new(pattern),
            is_backtrace_enabled: env::var("RUST_BACKTRACE").is_ok()
                || env::var("RUST_LIB_BACKTRACE").is_ok(),
        }
    }
}

impl Encode for BacktracePatternEncoder {
    fn encode(
        &self,
        w: &mut dyn log4rs::encode::Write,
        record: &log::Record<'_>,
    ) -> anyhow::Result<()> {
        if record.level() == log::Level::Error && self.is_backtrace_enabled {
            let args = format_args!(
                "{}\nBacktrace:\n{}",
                record.args(),
                backtrace::Backtrace::capture()
            );
            let new_record = log::Record::builder()
                .args(args)
                .level(record.level())
                .target(record.target())
                .module_path(record.module_path())
                .file(record.file())
                .line(record.line())
                .build();
            self.pattern_encoder.encode(w, &new_record)?;
        } else {
            self.pattern_encoder.encode(w, record)?;
        }
        Ok(())
    }
}

/// Installs the global logger: stderr filtered at `log_level`, plus an
/// optional file appender that receives everything at `log_level`.
pub fn initialize_logger(log_level: LevelFilter, file_path: Option<&str>) -> anyhow::Result<()> {
    const LOGGING_PATTERN: &str = "{d} {l} {f}:{L} - {m}\n";

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(BacktracePatternEncoder::new(LOGGING_PATTERN)))
        .build();

    let mut config_builder = Config::builder();
    let mut root_builder = Root::builder();

    if let Some(path) = file_path {
        let logfile = FileAppender::builder()
            // Pattern: https://docs.rs/log4rs/*/log4rs/encode/pattern/index.html
            .encoder(Box::new(BacktracePatternEncoder::new(LOGGING_PATTERN)))
            .build(path)?;

        config_builder =
            config_builder.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root_builder = root_builder.appender("logfile");
    }

    let config = config_builder
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("stderr", Box::new(stderr)),
        )
        .build(root_builder.appender("stderr").build(log_level))?;

    let _handle = log4rs::init_config(config)?;

    Ok(())
}
