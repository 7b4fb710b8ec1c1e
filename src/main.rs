use std::path::PathBuf;
use std::sync::Arc;

use allora_chain_data::client::{AlloradClient, InferenceProvider};
use allora_chain_data::collector::DataCollector;
use allora_chain_data::config::CollectorConfig;
use allora_chain_data::export;
use allora_chain_data::timeframe::Timeframe;
use allora_chain_data::types::{BlockNumber, TopicId};
use clap::Parser;
use eyre::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Topic id to collect inference data for
    #[arg(short, long)]
    topic_id: u64,

    /// Lookback window: 1Hour, 1Day, 1Week or 1Month
    #[arg(short = 'f', long)]
    timeframe: Timeframe,

    /// Output CSV path (defaults to data/allora_chain_data_topic_<id>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    info!("Starting Allora inference data collection");

    let topic_id = TopicId::new(cli.topic_id).context("Invalid topic id")?;
    let config = CollectorConfig::from_env().context("Failed to load collector configuration")?;
    let client = Arc::new(AlloradClient::new(&config)?);

    let latest_block = client
        .latest_inference_block(topic_id)
        .await
        .context("Failed to get latest network inferences")?;
    info!("Current inference block height: {}", latest_block);

    let lookback_blocks = cli.timeframe.blocks_for(config.block_interval_seconds);
    let target_block = BlockNumber::from_trusted((latest_block.value() - lookback_blocks).max(1));
    info!(
        "Collecting {} of data back to block {}",
        cli.timeframe, target_block
    );

    let collector = DataCollector::new(client, &config);
    let outcome = collector.run_collection(topic_id, target_block).await;

    info!(
        "Collection finished ({}) with {} records",
        outcome.terminal_state,
        outcome.records.len()
    );

    if outcome.records.is_empty() {
        warn!("No valid data collected");
        return Ok(());
    }

    let output_path = cli
        .output
        .unwrap_or_else(|| export::default_output_path(topic_id));
    export::write_csv(&outcome.records, &output_path)?;
    info!("Saved dataset to {}", output_path.display());

    Ok(())
}
