use std::collections::BTreeSet;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use obs_pipeline::types::{DEFAULT_MAX_LATENCY_MS, DEFAULT_MIN_LATENCY_MS, DEFAULT_STATUS_CODES};
use obs_pipeline::{
    aggregate, GeneratorConfig, LogGenerator, LogRecord, PipelineError, Service, ServiceSummary,
};

fn batch(seed: u64, n: i64) -> Vec<LogRecord> {
    LogGenerator::new(StdRng::seed_from_u64(seed), GeneratorConfig::default())
        .unwrap()
        .simulate(n)
        .unwrap()
}

#[test]
fn generated_batches_have_exact_size_and_valid_fields() {
    for seed in 0..20 {
        let n = (seed * 37 % 250) as i64;
        let records = batch(seed, n);

        assert_eq!(records.len(), n as usize);
        for r in &records {
            assert_eq!(r.is_error(), r.status_code() >= 500);
            assert!(Service::ALL.contains(&r.service()));
            assert!(DEFAULT_STATUS_CODES.contains(&r.status_code()));
            assert!(r.latency_ms() >= DEFAULT_MIN_LATENCY_MS);
            assert!(r.latency_ms() <= DEFAULT_MAX_LATENCY_MS);
        }
    }
}

#[test]
fn aggregation_partitions_the_batch() {
    for seed in 0..20 {
        let records = batch(seed, 1 + seed as i64 * 13);
        let summaries = aggregate(&records);

        let total: u64 = summaries.iter().map(|s| s.total_requests).sum();
        assert_eq!(total, records.len() as u64);

        let in_input: BTreeSet<Service> = records.iter().map(|r| r.service()).collect();
        let in_summary: BTreeSet<Service> = summaries.iter().map(|s| s.service).collect();
        assert_eq!(in_input, in_summary);
        assert_eq!(summaries.len(), in_summary.len());

        for s in &summaries {
            assert!((0.0..=100.0).contains(&s.error_rate_pct));
        }
    }
}

#[test]
fn aggregation_is_bit_for_bit_deterministic() {
    let records = batch(1234, 500);
    let first = aggregate(&records);
    let second = aggregate(&records);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.service, b.service);
        assert_eq!(a.total_requests, b.total_requests);
        assert_eq!(a.avg_latency.to_bits(), b.avg_latency.to_bits());
        assert_eq!(a.error_rate_pct.to_bits(), b.error_rate_pct.to_bits());
    }
}

#[test]
fn aggregation_does_not_touch_its_input() {
    let records = batch(8, 64);
    let before = records.clone();
    let _ = aggregate(&records);
    assert_eq!(records, before);
}

#[test]
fn empty_batch_aggregates_to_nothing() {
    let records = batch(3, 0);
    assert!(records.is_empty());
    assert!(aggregate(&records).is_empty());
}

#[test]
fn mixed_services_scenario() {
    let now = Utc::now();
    let records = vec![
        LogRecord::new(Service::AuthService, now, 200, 100),
        LogRecord::new(Service::PaymentService, now, 200, 80),
        LogRecord::new(Service::AuthService, now, 500, 300),
    ];

    assert_eq!(
        aggregate(&records),
        vec![
            ServiceSummary {
                service: Service::AuthService,
                total_requests: 2,
                avg_latency: 200.0,
                error_rate_pct: 50.0,
            },
            ServiceSummary {
                service: Service::PaymentService,
                total_requests: 1,
                avg_latency: 80.0,
                error_rate_pct: 0.0,
            },
        ]
    );
}

#[test]
fn negative_count_is_rejected() {
    let mut generator =
        LogGenerator::new(StdRng::seed_from_u64(0), GeneratorConfig::default()).unwrap();
    assert!(matches!(
        generator.simulate(-10),
        Err(PipelineError::InvalidArgument(_))
    ));
}

#[test]
fn fixed_seed_gives_reproducible_payloads() {
    let a = batch(77, 150);
    let b = batch(77, 150);
    let c = batch(78, 150);

    assert!(a.iter().zip(&b).all(|(x, y)| x.same_payload(y)));
    assert!(!a.iter().zip(&c).all(|(x, y)| x.same_payload(y)));
}
