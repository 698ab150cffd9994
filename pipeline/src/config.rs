//! コマンドライン引数と実行設定
//!
//! 設定ファイルや環境変数は使わない。clap でパースした引数を
//! 検証済みの `PipelineConfig` に変換して各処理へ渡す。

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::PipelineError;
use crate::generator::GeneratorConfig;
use crate::logging::LogFormat;
use crate::types::{DEFAULT_MAX_LATENCY_MS, DEFAULT_MIN_LATENCY_MS, DEFAULT_STATUS_CODES};

pub const DEFAULT_COUNT: i64 = 200;
pub const DEFAULT_DELAY_MS: u64 = 10;
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// 実行モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Print a raw log preview and the aggregated table
    #[default]
    Report,
    /// Open the interactive terminal dashboard
    Dashboard,
}

#[derive(Parser, Debug)]
#[command(name = "obs-pipeline")]
#[command(about = "Generate synthetic microservice logs and aggregate them per service", long_about = None)]
pub struct Cli {
    /// Run mode (defaults to report)
    #[arg(value_enum)]
    pub mode: Option<Mode>,

    /// Number of log records to generate
    #[arg(short = 'n', long, default_value_t = DEFAULT_COUNT, allow_negative_numbers = true)]
    pub count: i64,

    /// Seed for a reproducible batch
    #[arg(long)]
    pub seed: Option<u64>,

    /// Delay between generated records in milliseconds (cosmetic)
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Number of raw records shown in the report preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview: usize,

    /// Candidate status codes, picked uniformly (repeat a code to weight it)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_STATUS_CODES)]
    pub status_codes: Vec<u16>,

    #[arg(long, default_value_t = DEFAULT_MIN_LATENCY_MS)]
    pub min_latency: u32,

    #[arg(long, default_value_t = DEFAULT_MAX_LATENCY_MS)]
    pub max_latency: u32,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// 検証済みの実行設定（作成後は不変）
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub mode: Mode,
    pub count: i64,
    pub seed: Option<u64>,
    pub preview: usize,
    pub generator: GeneratorConfig,
    pub log_format: LogFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Report,
            count: DEFAULT_COUNT,
            seed: None,
            preview: DEFAULT_PREVIEW_ROWS,
            generator: GeneratorConfig::default(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl PipelineConfig {
    /// 件数の符号は生成時にチェックする（InvalidArgument として報告するため）
    pub fn validate(&self) -> Result<(), PipelineError> {
        let errors = self.generator.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::InvalidConfig(errors))
        }
    }
}

impl TryFrom<Cli> for PipelineConfig {
    type Error = PipelineError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let config = Self {
            mode: cli.mode.unwrap_or_default(),
            count: cli.count,
            seed: cli.seed,
            preview: cli.preview,
            generator: GeneratorConfig {
                status_codes: cli.status_codes,
                latency_ms: cli.min_latency..=cli.max_latency,
                delay: Duration::from_millis(cli.delay_ms),
            },
            log_format: cli.log_format,
        };
        config.validate()?;
        Ok(config)
    }
}
