//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (cache capacity, shard bits)
//! - Reject log levels `tracing` does not know
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::settings::schema::Settings;

/// Largest shard count exponent an LRU cache accepts.
pub const MAX_NUM_SHARD_BITS: i32 = 19;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// One semantic problem in a settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&settings.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError {
            field: "log_level",
            message: format!(
                "unknown level {:?}, expected one of {}",
                settings.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(cache) = &settings.block_cache {
        if cache.capacity == 0 {
            errors.push(ValidationError {
                field: "block_cache.capacity",
                message: "must be positive".to_string(),
            });
        }
        if cache.num_shard_bits < -1 || cache.num_shard_bits > MAX_NUM_SHARD_BITS {
            errors.push(ValidationError {
                field: "block_cache.num_shard_bits",
                message: format!(
                    "must be -1 or within 0..={MAX_NUM_SHARD_BITS}, got {}",
                    cache.num_shard_bits
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::schema::BlockCacheSettings;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let settings = Settings {
            log_level: "loud".to_string(),
            block_cache: Some(BlockCacheSettings {
                capacity: 0,
                num_shard_bits: 40,
                strict_capacity_limit: false,
            }),
            ..Default::default()
        };
        let errors = validate_settings(&settings).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["log_level", "block_cache.capacity", "block_cache.num_shard_bits"]
        );
    }
}
