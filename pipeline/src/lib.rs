//! 疑似マイクロサービスログの生成と、サービス単位の集計
//!
//! ```text
//! generator (LogRecord を生成)
//!     → aggregator (サービスごとに ServiceSummary へ集約)
//!     → report (テキスト出力) / tui (ダッシュボード)
//! ```

pub mod aggregator;
pub mod app;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod report;
pub mod state;
pub mod tui;
pub mod types;

pub use aggregator::{BatchTotals, aggregate};
pub use config::{Cli, Mode, PipelineConfig};
pub use error::{PipelineError, ValidationError};
pub use generator::{GeneratorConfig, LogGenerator};
pub use types::{LogRecord, Service, ServiceSummary};
