//! Score command implementation

use super::open_image;
use crate::OutputFormat;
use anyhow::{Context as _, Result};
use brisque::{BrisqueConfig, BrisqueScorer};
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Args)]
pub struct ScoreCommand {
    /// Input image paths
    #[arg(value_name = "FILES", required = true)]
    inputs: Vec<PathBuf>,

    /// libsvm model file (defaults to $BRISQUE_DATA_DIR/brisque_allmodel.dat)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Range file (defaults to $BRISQUE_DATA_DIR/brisque_allrange.dat, then the built-in table)
    #[arg(long)]
    range: Option<PathBuf>,

    /// YAML configuration file; --model and --range override its paths
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat the inputs as frames of one sequence and print their mean score
    #[arg(long)]
    average: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct ImageScore {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct AverageScore {
    frames: usize,
    score: f64,
}

impl ScoreCommand {
    pub fn execute(self) -> Result<()> {
        let mut config = match &self.config {
            Some(path) => BrisqueConfig::from_yaml(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => BrisqueConfig::default(),
        };
        if self.model.is_some() {
            config.model_path.clone_from(&self.model);
        }
        if self.range.is_some() {
            config.range_path.clone_from(&self.range);
        }

        let scorer = BrisqueScorer::from_config(&config).context("Failed to load BRISQUE model")?;

        let start_time = Instant::now();
        if self.average {
            self.score_average(&scorer)?;
        } else {
            self.score_each(&scorer)?;
        }
        info!(
            "Scored {} file(s) in {:.2}s",
            self.inputs.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }

    fn score_average(&self, scorer: &BrisqueScorer) -> Result<()> {
        let frames = self
            .inputs
            .iter()
            .map(|path| open_image(path))
            .collect::<Result<Vec<_>>>()?;

        let score = scorer
            .score_frames(&frames)
            .context("Failed to score frame sequence")?;

        match self.format {
            OutputFormat::Text => println!("{score:.6}"),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&AverageScore {
                    frames: frames.len(),
                    score,
                })?
            ),
        }
        Ok(())
    }

    fn score_each(&self, scorer: &BrisqueScorer) -> Result<()> {
        let results: Vec<ImageScore> = self
            .inputs
            .par_iter()
            .map(|path| {
                let outcome = open_image(path).and_then(|img| Ok(scorer.score(&img)?));
                match outcome {
                    Ok(score) => ImageScore {
                        path: path.display().to_string(),
                        score: Some(score),
                        error: None,
                    },
                    Err(e) => {
                        warn!("Failed to score {}: {:#}", path.display(), e);
                        ImageScore {
                            path: path.display().to_string(),
                            score: None,
                            error: Some(format!("{e:#}")),
                        }
                    }
                }
            })
            .collect();

        match self.format {
            OutputFormat::Text => {
                for result in &results {
                    match (&result.score, &result.error) {
                        (Some(score), _) => println!("{}\t{score:.6}", result.path),
                        (None, Some(error)) => println!("{}\terror: {error}", result.path),
                        (None, None) => {}
                    }
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        }

        let failed = results.iter().filter(|r| r.error.is_some()).count();
        if failed > 0 {
            anyhow::bail!("{failed} of {} file(s) failed", results.len());
        }
        Ok(())
    }
}
