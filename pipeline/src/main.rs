use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;

use obs_pipeline::config::{Cli, Mode, PipelineConfig};
use obs_pipeline::{app, logging};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ダッシュボード表示中は stderr への出力を最小限にする
    let level = match cli.mode {
        Some(Mode::Dashboard) => LevelFilter::WARN,
        _ => LevelFilter::INFO,
    };
    logging::init_logging(cli.log_format, level);

    let config = PipelineConfig::try_from(cli)?;
    tracing::info!(
        mode = ?config.mode,
        count = config.count,
        seed = ?config.seed,
        "Starting pipeline"
    );

    app::run(&config)
}
