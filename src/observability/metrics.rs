//! # Metrics
//!
//! Prometheus metrics for monitoring replication.
//!
//! ## Metrics Exposed
//!
//! - `secret_replicator_writes_total` - Remote writes by kind and operation
//! - `secret_replicator_skipped_total` - Operations that wrote nothing, by reason
//! - `secret_replicator_errors_total` - Failed operations by kind and error reason
//! - `secret_replicator_requeues_total` - Requeue decisions taken by the error policy

use anyhow::Result;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static WRITES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "secret_replicator_writes_total",
            "Total number of remote writes issued by replication",
        ),
        &["kind", "operation"],
    )
    .expect("Failed to create WRITES_TOTAL metric - this should never happen")
});

static SKIPPED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "secret_replicator_skipped_total",
            "Total number of replication operations that wrote nothing",
        ),
        &["kind", "reason"],
    )
    .expect("Failed to create SKIPPED_TOTAL metric - this should never happen")
});

static ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "secret_replicator_errors_total",
            "Total number of failed replication operations",
        ),
        &["kind", "reason"],
    )
    .expect("Failed to create ERRORS_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "secret_replicator_requeues_total",
            "Total number of requeue decisions by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

/// Register all metrics with the crate registry
///
/// Registering twice is a no-op.
///
/// # Errors
///
/// Fails on any registry error other than a duplicate registration.
pub fn register_metrics() -> Result<()> {
    let collectors: [Box<dyn prometheus::core::Collector>; 4] = [
        Box::new(WRITES_TOTAL.clone()),
        Box::new(SKIPPED_TOTAL.clone()),
        Box::new(ERRORS_TOTAL.clone()),
        Box::new(REQUEUES_TOTAL.clone()),
    ];
    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Render the registry in the Prometheus text exposition format
///
/// # Errors
///
/// Fails if encoding fails or produces invalid UTF-8.
pub fn gather_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn increment_writes(kind: &str, operation: &str) {
    WRITES_TOTAL.with_label_values(&[kind, operation]).inc();
}

pub fn increment_skipped(kind: &str, reason: &str) {
    SKIPPED_TOTAL.with_label_values(&[kind, reason]).inc();
}

pub fn increment_errors(kind: &str, reason: &str) {
    ERRORS_TOTAL.with_label_values(&[kind, reason]).inc();
}

pub fn increment_requeues(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}
