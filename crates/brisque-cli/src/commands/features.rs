//! Features command implementation

use super::open_image;
use crate::OutputFormat;
use anyhow::{Context as _, Result};
use brisque::{ExtractorConfig, FeatureExtractor};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct FeaturesCommand {
    /// Input image path
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Compute scales and orientations on the calling thread only
    #[arg(long)]
    sequential: bool,
}

#[derive(Debug, Serialize)]
struct LabelledFeature {
    label: String,
    value: f64,
}

impl FeaturesCommand {
    pub fn execute(self) -> Result<()> {
        let extractor = FeatureExtractor::new(ExtractorConfig {
            parallel: !self.sequential,
            ..ExtractorConfig::default()
        });

        let img = open_image(&self.input)?;
        let features = extractor
            .extract(&img)
            .with_context(|| format!("Failed to extract features from {}", self.input.display()))?;

        let nan_count = features.nan_count();
        if nan_count > 0 {
            info!("{} feature(s) are NaN (degenerate coefficient statistics)", nan_count);
        }

        match self.format {
            OutputFormat::Text => {
                for (label, value) in features.labelled() {
                    println!("{label:<24} {value:.6}");
                }
            }
            OutputFormat::Json => {
                let labelled: Vec<LabelledFeature> = features
                    .labelled()
                    .map(|(label, value)| LabelledFeature { label, value })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&labelled)?);
            }
        }
        Ok(())
    }
}
