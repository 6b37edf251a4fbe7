//! Enum-typed options. Symbols match the spelling used in options files.

use crate::options::types::option_enum;

option_enum! {
    /// WAL replay behaviour after a crash.
    WalRecoveryMode default PointInTimeRecovery {
        TolerateCorruptedTailRecords => "kTolerateCorruptedTailRecords",
        AbsoluteConsistency => "kAbsoluteConsistency",
        PointInTimeRecovery => "kPointInTimeRecovery",
        SkipAnyCorruptedRecords => "kSkipAnyCorruptedRecords",
    }
}

option_enum! {
    InfoLogLevel default Info {
        Debug => "DEBUG_LEVEL",
        Info => "INFO_LEVEL",
        Warn => "WARN_LEVEL",
        Error => "ERROR_LEVEL",
        Fatal => "FATAL_LEVEL",
        Header => "HEADER_LEVEL",
    }
}

option_enum! {
    /// Access pattern hint given to the OS for compaction inputs.
    AccessHint default Normal {
        None => "NONE",
        Normal => "NORMAL",
        Sequential => "SEQUENTIAL",
        WillNeed => "WILLNEED",
    }
}

option_enum! {
    /// `kDisableCompressionOption` means "inherit `compression`" where allowed.
    CompressionType default Snappy {
        None => "kNoCompression",
        Snappy => "kSnappyCompression",
        Zlib => "kZlibCompression",
        BZip2 => "kBZip2Compression",
        Lz4 => "kLZ4Compression",
        Lz4hc => "kLZ4HCCompression",
        Xpress => "kXpressCompression",
        Zstd => "kZSTD",
        Disabled => "kDisableCompressionOption",
    }
}

option_enum! {
    CompactionStyle default Level {
        Level => "kCompactionStyleLevel",
        Universal => "kCompactionStyleUniversal",
        Fifo => "kCompactionStyleFIFO",
        None => "kCompactionStyleNone",
    }
}

option_enum! {
    /// File picking priority for level compaction.
    CompactionPri default MinOverlappingRatio {
        ByCompensatedSize => "kByCompensatedSize",
        OldestLargestSeqFirst => "kOldestLargestSeqFirst",
        OldestSmallestSeqFirst => "kOldestSmallestSeqFirst",
        MinOverlappingRatio => "kMinOverlappingRatio",
    }
}

option_enum! {
    /// Table format backing a column family. Only the block-based format is
    /// configurable here.
    TableFactory default BlockBasedTable {
        BlockBasedTable => "BlockBasedTable",
    }
}

option_enum! {
    IndexType default BinarySearch {
        BinarySearch => "kBinarySearch",
        HashSearch => "kHashSearch",
        TwoLevelIndexSearch => "kTwoLevelIndexSearch",
        BinarySearchWithFirstKey => "kBinarySearchWithFirstKey",
    }
}

option_enum! {
    DataBlockIndexType default BinarySearch {
        BinarySearch => "kDataBlockBinarySearch",
        BinaryAndHash => "kDataBlockBinaryAndHash",
    }
}

option_enum! {
    ChecksumType default Crc32c {
        NoChecksum => "kNoChecksum",
        Crc32c => "kCRC32c",
        XxHash => "kxxHash",
        XxHash64 => "kxxHash64",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::types::{OptionField, OptionValue};

    #[test]
    fn test_symbol_round_trip() {
        for symbol in CompressionType::SYMBOLS {
            let parsed = CompressionType::from_symbol(symbol).unwrap();
            assert_eq!(parsed.symbol(), *symbol);
        }
        assert_eq!(CompressionType::from_symbol("kBrotli"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(WalRecoveryMode::default(), WalRecoveryMode::PointInTimeRecovery);
        assert_eq!(ChecksumType::default().to_string(), "kCRC32c");
    }

    #[test]
    fn test_option_field_conversion() {
        assert_eq!(
            CompactionStyle::from_value(OptionValue::Symbol("kCompactionStyleFIFO")),
            Some(CompactionStyle::Fifo)
        );
        assert_eq!(CompactionStyle::from_value(OptionValue::Bool(true)), None);
        assert_eq!(IndexType::HashSearch.to_value(), OptionValue::Symbol("kHashSearch"));
    }
}
