use std::io::{self, IsTerminal};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used without `--debug`.
const DEFAULT_DIRECTIVES: &str = "info";

/// Filter used with `--debug`; HTTP internals stay at info.
const DEBUG_DIRECTIVES: &str = "debug,hyper=info,hyper_util=info,reqwest=info,rustls=info";

/// Initialize a tracing subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over the level chosen by `debug`. Targets are
/// only shown in debug mode, timestamps never.
pub fn init(debug: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(debug)
        .with_level(true)
        .without_time();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(debug)))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn directives(debug: bool) -> &'static str {
    if debug {
        DEBUG_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, info, warn};

    #[test]
    fn test_directives_parse() {
        assert!(EnvFilter::try_new(directives(false)).is_ok());
        assert!(EnvFilter::try_new(directives(true)).is_ok());
    }

    #[test]
    fn test_logging_init() {
        // We can only init once per process
        let _ = init(true);

        debug!("This is a debug message");
        info!("This is an info message");
        warn!("This is a warning message");
    }
}
