use super::toml_config::TomlConfig;
use super::{Settings, DEFAULT_CONFIG_FILE};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "metanetx-post")]
#[command(about = "Enrich a MetaNetX-derived database with KEGG and BiGG information")]
#[command(version)]
pub struct CliConfig {
    /// TOML configuration file (defaults to ./metanetx-post.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL, overrides [database] url
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Log CPU and memory usage after every ETL phase
    #[arg(long, global = true)]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create the database schema if it does not exist
    InitDb,
    /// Print version information of a remote database
    Info {
        #[arg(value_enum)]
        source: InfoSource,
    },
    /// Subcommands for processing reactions
    #[command(subcommand)]
    Reactions(ReactionCommand),
    /// Subcommands for processing compounds
    #[command(subcommand)]
    Compounds(CompoundCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InfoSource {
    Kegg,
    Bigg,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ReactionCommand {
    /// Collect a mapping of BiGG reaction identifiers to names into a JSON file
    CollectBiggNames {
        /// The output path for the BiGG reaction identifier to name JSON file
        #[arg(short, long, default_value = "bigg_reaction_names.json")]
        filename: PathBuf,
    },
    /// Add BiGG reaction names to reactions with BiGG annotations
    BiggNames(BatchArgs),
    /// Add KEGG reaction names to reactions with KEGG annotations
    KeggNames(FetchArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum CompoundCommand {
    /// Convert KEGG MOL files to InChI for KEGG compounds without structure
    KeggMol(FetchArgs),
    /// Fill in missing structural information from the InChI
    FillMissing(BatchArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct BatchArgs {
    /// Rows per database batch
    #[arg(long)]
    pub batch_size: Option<usize>,
}

/// Jobs that fetch one remote entry per identifier.
#[derive(Debug, Clone, Default, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Concurrent HTTP requests
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl CliConfig {
    fn config_file(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        }
    }

    fn batch_args(&self) -> Option<&BatchArgs> {
        match &self.command {
            Command::Reactions(ReactionCommand::BiggNames(args))
            | Command::Compounds(CompoundCommand::FillMissing(args)) => Some(args),
            _ => self.fetch_args().map(|args| &args.batch),
        }
    }

    fn fetch_args(&self) -> Option<&FetchArgs> {
        match &self.command {
            Command::Reactions(ReactionCommand::KeggNames(args))
            | Command::Compounds(CompoundCommand::KeggMol(args)) => Some(args),
            _ => None,
        }
    }

    /// Defaults, then the TOML file, then command line flags.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = match self.config_file() {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                let config = TomlConfig::from_file(&path)?;
                config.validate()?;
                Settings::from_toml(&config)
            }
            None => Settings::default(),
        };

        if let Some(url) = &self.database_url {
            settings.database_url = url.clone();
        }
        if let Some(batch_size) = self.batch_args().and_then(|args| args.batch_size) {
            settings.batch_size = batch_size;
        }
        if let Some(concurrency) = self.fetch_args().and_then(|args| args.concurrency) {
            settings.concurrent_requests = concurrency;
        }

        Ok(settings)
    }
}
