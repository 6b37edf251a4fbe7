//! Front-end settings.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → LoadContext for every options load the binary runs
//! ```
//!
//! # Design Decisions
//! - Every field has a default so an empty file, or no file, is valid
//! - Validation separates syntactic (serde) from semantic checks
//! - Command-line flags override file values after loading

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, SettingsError};
pub use schema::{BlockCacheSettings, Settings};
