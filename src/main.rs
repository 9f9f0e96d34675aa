//! # anomaly-rs
//!
//! Command-line interface for the anomaly detection service.

use anomaly_rs::analytics::anomaly::{
    AnomalyDetectionService, BatchDataset, DetectionMethod, DetectionOptions, Sensitivity,
    TimeSeriesPoint,
};
use anomaly_rs::logging::{init_logging, LogConfig};
use anomaly_rs::storage::InMemoryConfigRepository;
use anomaly_rs::ServiceConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "anomaly-rs")]
#[command(about = "Time-series anomaly detection", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level or EnvFilter directive
    #[arg(long, global = true, env = "ANOMALY_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect anomalies across a whole series
    Detect {
        /// Input file: JSON array of { "timestamp", "value" }
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Evaluate a single new point against the series in the input file
    Realtime {
        /// History file: JSON array of { "timestamp", "value" }
        #[arg(short, long)]
        input: PathBuf,

        /// Value of the new point
        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        /// Timestamp of the new point (RFC 3339, defaults to now)
        #[arg(long)]
        timestamp: Option<DateTime<Utc>>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Run detection over several labeled datasets
    Batch {
        /// Input file: JSON array of { "id", "data", "options" }
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print a sample configuration file
    SampleConfig,
}

/// Overrides applied on top of `[detection]` from the configuration
#[derive(Args)]
struct OptionArgs {
    /// Detection method (zscore, iqr, isolation_forest, lstm, ai_detection)
    #[arg(short, long)]
    method: Option<DetectionMethod>,

    /// Detection threshold
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Rolling window size
    #[arg(short, long)]
    window_size: Option<usize>,

    /// Sensitivity (low, medium, high)
    #[arg(short, long)]
    sensitivity: Option<Sensitivity>,

    /// Layer seasonal residual scoring on top of the method
    #[arg(long)]
    seasonal: bool,

    /// Minimum score for reported anomalies
    #[arg(long)]
    min_score: Option<f64>,

    /// Free-text context for AI detection
    #[arg(long)]
    context: Option<String>,
}

impl OptionArgs {
    fn apply(self, mut options: DetectionOptions) -> DetectionOptions {
        if let Some(method) = self.method {
            options.method = method;
        }
        if let Some(threshold) = self.threshold {
            options.threshold = threshold;
        }
        if let Some(window_size) = self.window_size {
            options.window_size = Some(window_size);
        }
        if let Some(sensitivity) = self.sensitivity {
            options.sensitivity = sensitivity;
        }
        if self.seasonal {
            options.seasonal_adjustment = true;
        }
        if let Some(min_score) = self.min_score {
            options.min_anomaly_score = min_score;
        }
        if let Some(context) = self.context {
            options.context = Some(context);
        }
        options
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let config = match path {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::load()?,
    };
    Ok(config)
}

#[cfg(feature = "llm-integration")]
fn attach_text_completion(service: AnomalyDetectionService) -> AnomalyDetectionService {
    use anomaly_rs::llm::{LlmClient, LlmConfig};

    match LlmConfig::openai_from_env().and_then(LlmClient::new) {
        Ok(client) => {
            info!("AI detection enabled via {}", client.provider_name());
            service.with_text_completion(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("AI detection unavailable, Z-score fallback will be used: {}", e);
            service
        }
    }
}

#[cfg(not(feature = "llm-integration"))]
fn attach_text_completion(service: AnomalyDetectionService) -> AnomalyDetectionService {
    service
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::SampleConfig) {
        print!("{}", ServiceConfig::sample_toml()?);
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    let _guard = init_logging(&LogConfig::default().with_level(level))?;

    let defaults = config.detection.clone();
    let service = attach_text_completion(
        AnomalyDetectionService::new(Arc::new(InMemoryConfigRepository::new()))
            .with_config(config),
    );

    match cli.command {
        Commands::Detect { input, options } => {
            let series: Vec<TimeSeriesPoint> = read_json(&input)?;
            let options = options.apply(defaults);
            info!("Running {} detection over {} points", options.method, series.len());

            let result = service.detect_anomalies(&series, &options).await?;
            print_json(&result)?;
        }
        Commands::Realtime {
            input,
            value,
            timestamp,
            options,
        } => {
            let history: Vec<TimeSeriesPoint> = read_json(&input)?;
            let options = options.apply(defaults);
            let point = TimeSeriesPoint::new(timestamp.unwrap_or_else(Utc::now), value);

            let result = service
                .detect_realtime_anomaly(&point, &history, &options)
                .await?;
            print_json(&result)?;
        }
        Commands::Batch { input } => {
            let datasets: Vec<BatchDataset> = read_json(&input)?;
            info!("Running batch detection over {} datasets", datasets.len());

            let results = service.batch_detect_anomalies(datasets).await;
            print_json(&results)?;
        }
        // 設定読込前に出力済み
        Commands::SampleConfig => {}
    }

    Ok(())
}
