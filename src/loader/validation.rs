//! Cross-field validation of a built configuration.
//!
//! # Responsibilities
//! - Check relations between options that are each valid on their own
//! - Name the column family a violation belongs to
//!
//! # Design Decisions
//! - Runs after every section is applied, before the result is returned
//! - Stops at the first violation; loads report a single error

use crate::loader::LoadError;
use crate::options::schema::{BlockBasedTableOptions, ColumnFamilyDescriptor, ColumnFamilyOptions};

/// Highest block-based table format version the engine writes.
pub const MAX_FORMAT_VERSION: u32 = 5;

fn violation(name: &str, reason: String) -> LoadError {
    LoadError::Validation {
        scope: format!("column family {name:?}"),
        reason,
    }
}

/// Validate every family in order.
pub fn validate(families: &[ColumnFamilyDescriptor]) -> Result<(), LoadError> {
    for family in families {
        validate_column_family(&family.name, &family.options)?;
    }
    Ok(())
}

pub fn validate_column_family(name: &str, cf: &ColumnFamilyOptions) -> Result<(), LoadError> {
    if cf.max_write_buffer_number < 1 {
        return Err(violation(
            name,
            format!(
                "max_write_buffer_number must be at least 1, got {}",
                cf.max_write_buffer_number
            ),
        ));
    }
    if cf.min_write_buffer_number_to_merge > cf.max_write_buffer_number {
        return Err(violation(
            name,
            format!(
                "min_write_buffer_number_to_merge ({}) exceeds max_write_buffer_number ({})",
                cf.min_write_buffer_number_to_merge, cf.max_write_buffer_number
            ),
        ));
    }

    let triggers = [
        ("level0_file_num_compaction_trigger", cf.level0_file_num_compaction_trigger),
        ("level0_slowdown_writes_trigger", cf.level0_slowdown_writes_trigger),
        ("level0_stop_writes_trigger", cf.level0_stop_writes_trigger),
    ];
    // Negative triggers disable the corresponding stall.
    if triggers.iter().all(|(_, v)| *v >= 0) {
        for pair in triggers.windows(2) {
            let ((lower_name, lower), (upper_name, upper)) = (pair[0], pair[1]);
            if lower > upper {
                return Err(violation(
                    name,
                    format!("{lower_name} ({lower}) exceeds {upper_name} ({upper})"),
                ));
            }
        }
    }

    if cf.num_levels < 1 {
        return Err(violation(
            name,
            format!("num_levels must be at least 1, got {}", cf.num_levels),
        ));
    }
    let levels = cf.num_levels as usize;
    if cf.compression_per_level.len() > levels {
        return Err(violation(
            name,
            format!(
                "compression_per_level lists {} levels but num_levels is {}",
                cf.compression_per_level.len(),
                cf.num_levels
            ),
        ));
    }

    validate_table(name, &cf.table_options)
}

fn validate_table(name: &str, table: &BlockBasedTableOptions) -> Result<(), LoadError> {
    if table.block_size == 0 {
        return Err(violation(name, "block_size must be positive".to_string()));
    }
    if table.no_block_cache && table.block_cache.is_some() {
        return Err(violation(
            name,
            "no_block_cache=true conflicts with a configured block_cache".to_string(),
        ));
    }
    if table.format_version > MAX_FORMAT_VERSION {
        return Err(violation(
            name,
            format!(
                "format_version {} is not supported (max {MAX_FORMAT_VERSION})",
                table.format_version
            ),
        ));
    }
    Ok(())
}
