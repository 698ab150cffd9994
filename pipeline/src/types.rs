use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

// ステータスコードの既定候補（成功 4 : エラー 4）
pub const DEFAULT_STATUS_CODES: [u16; 8] = [200, 200, 200, 200, 500, 502, 503, 404];

// レイテンシの既定範囲（両端を含む）
pub const DEFAULT_MIN_LATENCY_MS: u32 = 50;
pub const DEFAULT_MAX_LATENCY_MS: u32 = 1000;

/// ログを出力するマイクロサービス
///
/// 列挙順はサービス名の辞書順と一致させている。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    AuthService,
    CatalogService,
    PaymentService,
    UserService,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::AuthService,
        Service::CatalogService,
        Service::PaymentService,
        Service::UserService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::AuthService => "auth-service",
            Service::CatalogService => "catalog-service",
            Service::PaymentService => "payment-service",
            Service::UserService => "user-service",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| PipelineError::InvalidArgument(format!("unknown service: {s}")))
    }
}

/// 5xx をエラーとして扱う
pub fn is_server_error(status_code: u16) -> bool {
    status_code >= 500
}

// 生ログ（1リクエスト = 1レコード）
//
// is_error は status_code から導出するため、フィールドは非公開にして
// コンストラクタ経由でしか作れないようにしている。
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LogRecord {
    service: Service,
    timestamp: DateTime<Utc>,
    status_code: u16,
    latency_ms: u32,
    is_error: bool,
}

impl LogRecord {
    pub fn new(
        service: Service,
        timestamp: DateTime<Utc>,
        status_code: u16,
        latency_ms: u32,
    ) -> Self {
        Self {
            service,
            timestamp,
            status_code,
            latency_ms,
            is_error: is_server_error(status_code),
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// ISO-8601 (UTC, `Z` 付き) の文字列表現
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn latency_ms(&self) -> u32 {
        self.latency_ms
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// タイムスタンプ以外が等しいかどうか（シード固定時の再現性確認用）
    pub fn same_payload(&self, other: &LogRecord) -> bool {
        self.service == other.service
            && self.status_code == other.status_code
            && self.latency_ms == other.latency_ms
    }
}

// サービスごとの集計結果
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ServiceSummary {
    pub service: Service,
    pub total_requests: u64,
    pub avg_latency: f64,
    pub error_rate_pct: f64,
}
