//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! tokenizer, builder, resolver, watcher produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (load and ignored-key counters)
//!
//! Consumers:
//!     → stderr through the `fmt` layer installed by the binary
//!     → whatever `metrics` recorder the embedding program installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing a subscriber or recorder is left to
//!   the binary or the embedding engine
//! - Without a recorder, counter updates are no-ops

pub mod logging;
pub mod metrics;
