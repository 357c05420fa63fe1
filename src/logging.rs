use crate::error::{LoadError, LoadResult};
use log::LevelFilter;
use simplelog::{Config, SimpleLogger};
use std::str::FromStr;

/// Parse a level name such as `info` or `DEBUG`
pub fn parse_level(level: &str) -> LoadResult<LevelFilter> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| LoadError::Config(format!("unknown log level '{}'", level)))
}

/// Install the process-wide logger. Fails if a logger is already set.
pub fn init_logging(level: &str) -> LoadResult<()> {
    let filter = parse_level(level)?;
    SimpleLogger::init(filter, Config::default())?;
    Ok(())
}
