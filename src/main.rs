//! `options-loader` command-line front end.
//!
//! Loads storage-engine options files and reports, dumps or watches them.
//!
//! ```text
//! flags + settings.toml ─► Settings ─► LoadContext
//!                                         │
//!     check / dump / watch ◀── load ◀─────┘
//!     describe ◀── static schema tables
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use options_loader::format::{self, SectionKind};
use options_loader::loader::{load_with, LoadResult, OptionsWatcher};
use options_loader::observability::logging;
use options_loader::options::registry::schema_for;
use options_loader::settings::{load_settings, BlockCacheSettings, Settings};
use options_loader::SharedEnv;

#[derive(Parser)]
#[command(name = "options-loader")]
#[command(about = "Inspect and validate storage-engine options files", long_about = None)]
struct Cli {
    /// Settings file (TOML).
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Fail on unknown options instead of skipping them.
    #[arg(long, global = true)]
    strict: bool,

    /// Supply an LRU block cache of this many bytes to every load.
    #[arg(long, global = true)]
    cache_capacity: Option<usize>,

    /// Log level when RUST_LOG is unset.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a file and print a summary
    Check { path: PathBuf },
    /// Load a file and print the resolved options
    Dump {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = DumpFormat::Text)]
        format: DumpFormat,
    },
    /// List the options accepted in each section
    Describe {
        #[arg(value_enum)]
        section: Option<SectionArg>,
    },
    /// Reload a file whenever it changes
    Watch { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum SectionArg {
    Version,
    Global,
    ColumnFamily,
    Table,
}

impl From<SectionArg> for SectionKind {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Version => SectionKind::Version,
            SectionArg::Global => SectionKind::GlobalOptions,
            SectionArg::ColumnFamily => SectionKind::ColumnFamilyOptions,
            SectionArg::Table => SectionKind::NestedComponentOptions,
        }
    }
}

fn resolve_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    if cli.strict {
        settings.strict_unknown_options = true;
    }
    if let Some(capacity) = cli.cache_capacity {
        settings.block_cache = Some(BlockCacheSettings {
            capacity,
            ..settings.block_cache.take().unwrap_or_default()
        });
    }
    if let Some(level) = &cli.log_level {
        settings.log_level = level.clone();
    }
    Ok(settings)
}

fn print_summary(result: &LoadResult) {
    println!("options file version {}", result.revision);
    for family in &result.column_families {
        let table = &family.options.table_options;
        let cache = table
            .block_cache
            .as_ref()
            .map(|c| format!("{} ({} bytes)", c.type_id(), c.capacity()))
            .unwrap_or_else(|| "default".to_string());
        println!(
            "column family {:?}: compression={} num_levels={} block_size={} block_cache={}",
            family.name,
            family.options.compression,
            family.options.num_levels,
            table.block_size,
            cache
        );
    }
    for diag in &result.diagnostics {
        println!(
            "skipped {:?} option `{}` at line {}",
            diag.kind, diag.key, diag.line
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    logging::init(&settings.log_level);

    let ctx = settings.load_context(SharedEnv::default_env());

    match cli.command {
        Commands::Check { path } => {
            let result = load_with(&path, &ctx)?;
            print_summary(&result);
        }
        Commands::Dump { path, format: output } => {
            let result = load_with(&path, &ctx)?;
            match output {
                DumpFormat::Text => print!("{}", format::render(&result)),
                DumpFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }
        Commands::Describe { section } => {
            let kinds = match section {
                Some(arg) => vec![SectionKind::from(arg)],
                None => vec![
                    SectionKind::Version,
                    SectionKind::GlobalOptions,
                    SectionKind::ColumnFamilyOptions,
                    SectionKind::NestedComponentOptions,
                ],
            };
            for kind in kinds {
                println!("[{kind}]");
                for entry in schema_for(kind) {
                    println!("  {:<50} {}", entry.name, entry.ty.describe());
                }
            }
        }
        Commands::Watch { path } => {
            let (watcher, mut updates) = OptionsWatcher::new(&path, ctx);
            let _watcher = watcher.run()?;
            loop {
                tokio::select! {
                    update = updates.recv() => match update {
                        Some(result) => print_summary(&result),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown requested");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
