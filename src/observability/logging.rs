//! Structured logging.
//!
//! # Responsibilities
//! - Install the process-wide `tracing` subscriber for the binary
//! - Pick the level from `RUST_LOG`, falling back to the configured one
//!
//! # Design Decisions
//! - Human-readable `fmt` output on stderr so stdout stays clean for dumps
//! - The library never calls `init`; embedding programs bring their own

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(level: &str) -> String {
    format!("options_loader={level},warn")
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(level).into())
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive("debug"), "options_loader=debug,warn");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init("info");
        init("debug");
    }
}
