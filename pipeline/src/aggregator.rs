//! サービス単位の集計
//!
//! 1パスでサービス名 → 累積値のマップを作り、最後に平均と割合へ変換する。
//! 累積は整数で行うので、同じ入力からは常にビット単位で同じ結果になる。

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{LogRecord, Service, ServiceSummary};

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    count: u64,
    latency_sum: u64,
    error_count: u64,
}

impl Accumulator {
    fn push(&mut self, record: &LogRecord) {
        self.count += 1;
        self.latency_sum += u64::from(record.latency_ms());
        if record.is_error() {
            self.error_count += 1;
        }
    }

    fn finish(self, service: Service) -> ServiceSummary {
        // count == 0 のエントリはマップに入らない
        let count = self.count as f64;
        ServiceSummary {
            service,
            total_requests: self.count,
            avg_latency: self.latency_sum as f64 / count,
            error_rate_pct: self.error_count as f64 / count * 100.0,
        }
    }
}

/// 入力に現れたサービスごとに1行、サービス名順で返す
pub fn aggregate(records: &[LogRecord]) -> Vec<ServiceSummary> {
    let mut groups: BTreeMap<Service, Accumulator> = BTreeMap::new();
    for record in records {
        groups.entry(record.service()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(service, acc)| acc.finish(service))
        .collect()
}

/// バッチ全体の合計値（ダッシュボードとレポートのフッター用）
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct BatchTotals {
    pub total_requests: u64,
    pub error_count: u64,
    pub error_rate_pct: f64,
    pub avg_latency: f64,
}

impl BatchTotals {
    pub fn from_records(records: &[LogRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut acc = Accumulator::default();
        for record in records {
            acc.push(record);
        }
        let count = acc.count as f64;

        Self {
            total_requests: acc.count,
            error_count: acc.error_count,
            error_rate_pct: acc.error_count as f64 / count * 100.0,
            avg_latency: acc.latency_sum as f64 / count,
        }
    }
}
