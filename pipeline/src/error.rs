use thiserror::Error;

/// 設定値の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("status code list is empty")]
    EmptyStatusCodes,

    #[error("status code {0} is outside 100..=599")]
    StatusCodeOutOfRange(u16),

    #[error("latency range is inverted: min {min} ms > max {max} ms")]
    InvertedLatencyRange { min: u32, max: u32 },
}

/// パイプライン全体のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
