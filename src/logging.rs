//! Logging setup.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the verbosity flags.
pub const LOG_ENV: &str = "TOPICPRESS_LOG";

/// Maps the number of `-v` flags to a tracing directive.
///
/// - 0 → `"info"`
/// - 1 → `"debug"`
/// - 2+ → `"trace"` (saturates)
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber writing to stderr.
///
/// `TOPICPRESS_LOG` takes precedence over `verbosity` when set. Calling
/// this more than once is harmless.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none())
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(verbosity_to_directive(0), "info");
        assert_eq!(verbosity_to_directive(1), "debug");
        assert_eq!(verbosity_to_directive(2), "trace");
        assert_eq!(verbosity_to_directive(9), "trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(0);
        init_logging(2);
    }
}
