use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::commands::{Cli, Commands};
use character_checker::Config;
use character_checker::analysis::{AnalysisOutcome, AnalysisService};
use character_checker::media::Upload;
use character_checker::media::preprocess::palette_from_bytes;

fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Run the full pipeline over files on disk and print the report.
async fn run_analyze(config: &Config, files: &[PathBuf]) -> Result<()> {
    let mut uploads = Vec::with_capacity(files.len());
    for path in files {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path.file_name().map(|n| n.to_string_lossy().into_owned());
        uploads.push(Upload::new(filename, data));
    }

    let service = AnalysisService::from_config(config);
    match service.analyze(uploads).await? {
        AnalysisOutcome::Report(report) => {
            info!(
                score = report.consistency_score,
                model = report.model.as_deref().unwrap_or("none"),
                "analysis complete"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        AnalysisOutcome::Rejected { error } => bail!(error),
    }
}

/// Extract one image's palette the same way the pipeline does.
async fn run_palette(config: &Config, file: &Path, colors: Option<usize>) -> Result<()> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let max_dimension = config.palette.max_dimension;
    let mut options = config.palette.options();
    if let Some(n) = colors {
        options.n_colors = n;
    }
    let palette =
        tokio::task::spawn_blocking(move || palette_from_bytes(&data, max_dimension, &options))
            .await??;

    println!("{}", serde_json::to_string_pretty(&palette)?);
    Ok(())
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            character_checker::gateway::run_gateway(&host, port, config).await
        }
        Commands::Analyze { files } => run_analyze(&config, &files).await,
        Commands::Palette { file, colors } => run_palette(&config, &file, colors).await,
    }
}
