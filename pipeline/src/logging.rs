use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// ログの出力先は常に stderr（stdout はレポート用）
///
/// `RUST_LOG` が設定されていればそちらを優先し、なければ `default_level` を使う。
/// ダッシュボード表示中は画面が崩れないよう WARN 以上に絞って呼ぶ。
pub fn init_logging(format: LogFormat, default_level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    // 二重初期化はエラーにせず警告だけ出す
    let result = match format {
        LogFormat::Pretty => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    if let Err(e) = result {
        eprintln!("logging already initialised: {e}");
    }
}
