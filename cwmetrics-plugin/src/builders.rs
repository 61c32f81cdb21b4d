use chrono::{DateTime, Utc};
use cwmetrics_common::{LatencySample, MetricBatch, MetricDatum, Report, StandardUnit, BATCH_LIMIT};

pub const SUCCESS_METRIC: &str = "Success";
pub const STATUS_METRIC_PREFIX: &str = "Status_";
pub const LATENCY_METRIC: &str = "ResultLatency";

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// One `Success`/`Status_<code>` datum per status code in the report, all stamped
/// with the report's timestamp. Reports without codes produce an empty batch.
pub fn build_code_batch(namespace: &str, report: &Report) -> MetricBatch {
    let mut batch = MetricBatch::new(namespace);
    if let Some(codes) = report.status_codes() {
        batch.data.extend(codes.iter().map(|(code, count)| MetricDatum {
            name: code_metric_name(code),
            dimensions: Vec::new(),
            timestamp: report.timestamp,
            value: *count as f64,
            unit: StandardUnit::None,
        }));
    }
    batch
}

/// `"200"` maps to `Success`; anything else to `Status_<code>` verbatim.
pub fn code_metric_name(code: &str) -> String {
    if code.trim().parse::<u16>() == Ok(200) {
        SUCCESS_METRIC.to_string()
    } else {
        format!("{STATUS_METRIC_PREFIX}{code}")
    }
}

/// Build the batch for `samples[offset..offset + BATCH_LIMIT]`, clamped to the slice.
///
/// To cover a whole sequence, call again with `offset` advanced by the length of
/// the returned batch until it reaches `samples.len()`. An offset at or past the
/// end yields an empty batch.
pub fn build_latency_batch(namespace: &str, offset: usize, samples: &[LatencySample]) -> MetricBatch {
    let end = offset.saturating_add(BATCH_LIMIT).min(samples.len());
    let mut batch = MetricBatch::new(namespace);
    batch
        .data
        .extend(samples.get(offset..end).unwrap_or(&[]).iter().map(latency_datum));
    batch
}

fn latency_datum(sample: &LatencySample) -> MetricDatum {
    MetricDatum {
        name: LATENCY_METRIC.to_string(),
        dimensions: Vec::new(),
        // Out-of-range millis leave the timestamp to the backend.
        timestamp: DateTime::<Utc>::from_timestamp_millis(sample.timestamp_ms()),
        value: sample.latency_ns() as f64 / NANOS_PER_MILLI,
        unit: StandardUnit::Milliseconds,
    }
}
