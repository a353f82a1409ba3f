use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Routes the `log` facade into `path`. The TUI owns stdout/stderr, so
/// records never go to the terminal. `verbose` sets the default level to
/// debug; `RUST_LOG` still wins when set.
pub fn init(path: &Path, verbose: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("logger already initialised")?;

    log::info!("typequote {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}
