//! 疑似マイクロサービスログの生成
//!
//! 乱数源は呼び出し側から渡す。シードを固定すれば
//! タイムスタンプ以外は毎回同じバッチが得られる。

use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{PipelineError, ValidationError};
use crate::types::{
    LogRecord, Service, DEFAULT_MAX_LATENCY_MS, DEFAULT_MIN_LATENCY_MS, DEFAULT_STATUS_CODES,
};

/// ログ生成の設定
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// 一様に選ばれる候補。重複させると重み付けになる
    pub status_codes: Vec<u16>,
    pub latency_ms: RangeInclusive<u32>,
    /// 1レコードごとの待ち時間（ストリームっぽく見せるだけ）
    pub delay: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            status_codes: DEFAULT_STATUS_CODES.to_vec(),
            latency_ms: DEFAULT_MIN_LATENCY_MS..=DEFAULT_MAX_LATENCY_MS,
            delay: Duration::ZERO,
        }
    }
}

impl GeneratorConfig {
    /// 問題をすべて集めて返す（最初の1件で止めない）
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.status_codes.is_empty() {
            errors.push(ValidationError::EmptyStatusCodes);
        }
        for &code in &self.status_codes {
            if !(100..=599).contains(&code) {
                errors.push(ValidationError::StatusCodeOutOfRange(code));
            }
        }

        let (min, max) = (*self.latency_ms.start(), *self.latency_ms.end());
        if min > max {
            errors.push(ValidationError::InvertedLatencyRange { min, max });
        }

        errors
    }
}

/// 件数の検証。負数は InvalidArgument
pub fn validate_count(count: i64) -> Result<usize, PipelineError> {
    usize::try_from(count).map_err(|_| {
        PipelineError::InvalidArgument(format!("record count must be non-negative, got {count}"))
    })
}

pub struct LogGenerator<R> {
    rng: R,
    config: GeneratorConfig,
}

impl<R: Rng> LogGenerator<R> {
    pub fn new(rng: R, config: GeneratorConfig) -> Result<Self, PipelineError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(PipelineError::InvalidConfig(errors));
        }
        Ok(Self { rng, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// 1件生成する
    pub fn next_record(&mut self) -> LogRecord {
        let service = Service::ALL[self.rng.gen_range(0..Service::ALL.len())];
        let codes = &self.config.status_codes;
        let status_code = codes[self.rng.gen_range(0..codes.len())];
        let latency_ms = self.rng.gen_range(self.config.latency_ms.clone());

        LogRecord::new(service, Utc::now(), status_code, latency_ms)
    }

    /// `count` 件のバッチを生成する
    pub fn simulate(&mut self, count: i64) -> Result<Vec<LogRecord>, PipelineError> {
        let count = validate_count(count)?;
        info!(count, "Generating sample logs");

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(self.next_record());

            if !self.config.delay.is_zero() {
                thread::sleep(self.config.delay);
            }
        }

        debug!(
            errors = records.iter().filter(|r| r.is_error()).count(),
            "Batch generated"
        );
        Ok(records)
    }
}

impl LogGenerator<StdRng> {
    /// シード指定があれば再現可能な StdRng、なければエントロピーから作る
    pub fn seeded(seed: Option<u64>, config: GeneratorConfig) -> Result<Self, PipelineError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(seed: u64) -> LogGenerator<StdRng> {
        LogGenerator::seeded(Some(seed), GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn produces_exactly_n_records_with_derived_error_flag() {
        for (seed, n) in [(1, 0), (2, 1), (3, 7), (4, 200), (5, 1000)] {
            let records = generator(seed).simulate(n).unwrap();
            assert_eq!(records.len(), n as usize);
            assert!(records
                .iter()
                .all(|r| r.is_error() == (r.status_code() >= 500)));
        }
    }

    #[test]
    fn fields_stay_within_the_configured_sets() {
        let records = generator(42).simulate(2000).unwrap();
        for r in &records {
            assert!(Service::ALL.contains(&r.service()));
            assert!(DEFAULT_STATUS_CODES.contains(&r.status_code()));
            assert!((DEFAULT_MIN_LATENCY_MS..=DEFAULT_MAX_LATENCY_MS).contains(&r.latency_ms()));
        }
    }

    #[test]
    fn every_service_shows_up_in_a_large_batch() {
        let records = generator(7).simulate(500).unwrap();
        for service in Service::ALL {
            assert!(records.iter().any(|r| r.service() == service), "{service}");
        }
    }

    #[test]
    fn negative_count_is_invalid_argument() {
        let err = generator(1).simulate(-1).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn same_seed_reproduces_the_batch() {
        let a = generator(99).simulate(100).unwrap();
        let b = generator(99).simulate(100).unwrap();
        assert!(a.iter().zip(&b).all(|(x, y)| x.same_payload(y)));
    }

    #[test]
    fn custom_profile_is_honoured() {
        let config = GeneratorConfig {
            status_codes: vec![200],
            latency_ms: 10..=10,
            delay: Duration::ZERO,
        };
        let records = LogGenerator::seeded(Some(3), config)
            .unwrap()
            .simulate(50)
            .unwrap();
        assert!(records
            .iter()
            .all(|r| r.status_code() == 200 && r.latency_ms() == 10 && !r.is_error()));
    }

    #[test]
    fn invalid_config_reports_all_problems() {
        let config = GeneratorConfig {
            status_codes: vec![42, 700],
            latency_ms: 100..=10,
            delay: Duration::ZERO,
        };
        let err = LogGenerator::seeded(Some(1), config).err().unwrap();
        assert_eq!(
            err,
            PipelineError::InvalidConfig(vec![
                ValidationError::StatusCodeOutOfRange(42),
                ValidationError::StatusCodeOutOfRange(700),
                ValidationError::InvertedLatencyRange { min: 100, max: 10 },
            ])
        );
    }
}
