use clap::Parser;
use metanetx_post::app::{open_store, Clients};
use metanetx_post::config::cli::{Command, CompoundCommand, InfoSource, ReactionCommand};
use metanetx_post::core::{ConfigProvider, MoleculeToolkit, Pipeline};
use metanetx_post::domain::model::LoadSummary;
use metanetx_post::utils::error::ErrorSeverity;
use metanetx_post::utils::{logger, validation::Validate};
use metanetx_post::{
    BiggReactionNamePipeline, CliConfig, CompoundStructurePipeline, EtlEngine, EtlError,
    KeggCompoundMolPipeline, KeggReactionNamePipeline, LocalStorage, OpenBabelToolkit, Settings,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.log_level.as_filter());
    } else {
        logger::init_cli_logger(cli.log_level.as_filter());
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> Result<(), EtlError> {
    let settings = cli.resolve()?;
    settings.validate()?;

    match &cli.command {
        Command::InitDb => {
            open_store(&settings).await?;
            tracing::info!("✅ Schema ready in {}", settings.database_url());
        }
        Command::Info { source } => {
            let clients = Clients::from_config(&settings)?;
            match source {
                InfoSource::Kegg => {
                    let info = clients.kegg.info().await?;
                    println!("{}", info.text);
                    if let Some(release) = info.release {
                        tracing::info!("KEGG release {}", release);
                    }
                }
                InfoSource::Bigg => {
                    let version = clients.bigg.database_version().await?;
                    println!("{}", serde_json::to_string_pretty(&version)?);
                }
            }
        }
        Command::Reactions(ReactionCommand::CollectBiggNames { filename }) => {
            let clients = Clients::from_config(&settings)?;
            let pipeline = BiggReactionNamePipeline::without_store(clients.bigg);
            let storage = LocalStorage::new(".");
            let path = filename.to_string_lossy();
            let id2name = pipeline.dump(&storage, &path).await?;
            println!("✅ {} BiGG reaction names written to {}", id2name.len(), path);
        }
        Command::Reactions(ReactionCommand::BiggNames(_)) => {
            let clients = Clients::from_config(&settings)?;
            let store = open_store(&settings).await?;
            let pipeline = BiggReactionNamePipeline::new(clients.bigg, store, settings.batch_size());
            run_pipeline(pipeline, cli.monitor).await?;
        }
        Command::Reactions(ReactionCommand::KeggNames(_)) => {
            let clients = Clients::from_config(&settings)?;
            let store = open_store(&settings).await?;
            let pipeline = KeggReactionNamePipeline::new(
                clients.kegg,
                store,
                settings.batch_size(),
                settings.concurrent_requests(),
            );
            run_pipeline(pipeline, cli.monitor).await?;
        }
        Command::Compounds(CompoundCommand::KeggMol(_)) => {
            let clients = Clients::from_config(&settings)?;
            let store = open_store(&settings).await?;
            let pipeline = KeggCompoundMolPipeline::new(
                clients.kegg,
                store,
                toolkit(&settings)?,
                settings.batch_size(),
                settings.concurrent_requests(),
            );
            run_pipeline(pipeline, cli.monitor).await?;
        }
        Command::Compounds(CompoundCommand::FillMissing(_)) => {
            let store = open_store(&settings).await?;
            let pipeline =
                CompoundStructurePipeline::new(store, toolkit(&settings)?, settings.batch_size());
            run_pipeline(pipeline, cli.monitor).await?;
        }
    }

    Ok(())
}

fn toolkit(settings: &Settings) -> Result<Arc<dyn MoleculeToolkit>, EtlError> {
    let toolkit = match &settings.obabel {
        Some(path) => OpenBabelToolkit::new(path),
        None => OpenBabelToolkit::locate()?,
    };
    tracing::debug!("Using Open Babel at {}", toolkit.program().display());
    Ok(Arc::new(toolkit))
}

async fn run_pipeline<P: Pipeline>(pipeline: P, monitor: bool) -> Result<LoadSummary, EtlError> {
    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor);
    let summary = engine.run().await?;
    println!(
        "✅ {}: {} loaded, {} skipped ({} extracted, {} transformed)",
        summary.pipeline, summary.loaded, summary.skipped, summary.extracted, summary.transformed
    );
    Ok(summary)
}
