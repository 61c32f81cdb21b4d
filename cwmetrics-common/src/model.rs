use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Unit attached to a data point, serialized with the backend's unit names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandardUnit {
    None,
    Milliseconds,
}

/// A name/value pair qualifying a metric. The reporting plugin never attaches any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// One named, timestamped, unit-tagged observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDatum {
    #[serde(rename = "MetricName")]
    pub name: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    /// `None` leaves the timestamp to the backend (time of receipt).
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_millis")]
    pub timestamp: Option<DateTime<Utc>>,
    pub value: f64,
    pub unit: StandardUnit,
}

/// The payload of a single metric submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricBatch {
    pub namespace: String,
    #[serde(rename = "MetricData")]
    pub data: Vec<MetricDatum>,
}

impl MetricBatch {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One request observation: `[timestampMillis, requestId, latencyNanos, statusCode]`.
///
/// Only the timestamp and latency are read when building metrics, so the request
/// id and status code are kept as whatever JSON the producer sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySample(pub i64, pub Value, pub u64, #[serde(default)] pub Value);

impl LatencySample {
    pub fn new(timestamp_ms: i64, request_id: impl Into<String>, latency_ns: u64, status_code: u16) -> Self {
        Self(timestamp_ms, Value::String(request_id.into()), latency_ns, Value::from(status_code))
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.0
    }

    pub fn request_id(&self) -> Option<&str> {
        self.1.as_str()
    }

    pub fn latency_ns(&self) -> u64 {
        self.2
    }

    pub fn status_code(&self) -> Option<u16> {
        self.3.as_u64().and_then(|code| u16::try_from(code).ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "samples_if_array")]
    pub latencies: Option<Vec<LatencySample>>,
}

/// A periodic performance snapshot. Every field is optional because several
/// producer generations emit different shapes; use [`Report::status_codes`]
/// and [`Report::latency_samples`] instead of reading the fields directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<BTreeMap<String, u64>>,

    #[serde(rename = "_codes", default, skip_serializing_if = "Option::is_none")]
    pub legacy_codes: Option<BTreeMap<String, u64>>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "samples_if_array")]
    pub latencies: Option<Vec<LatencySample>>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "aggregate_if_object")]
    pub aggregate: Option<Aggregate>,

    #[serde(
        rename = "_entries",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "samples_if_array"
    )]
    pub legacy_entries: Option<Vec<LatencySample>>,
}

impl Report {
    /// Status-code counts: `codes`, then `_codes`.
    pub fn status_codes(&self) -> Option<&BTreeMap<String, u64>> {
        self.codes.as_ref().or(self.legacy_codes.as_ref())
    }

    /// Latency samples: `aggregate.latencies`, then `latencies`, then `_entries`, else empty.
    pub fn latency_samples(&self) -> &[LatencySample] {
        self.aggregate
            .as_ref()
            .and_then(|aggregate| aggregate.latencies.as_deref())
            .or(self.latencies.as_deref())
            .or(self.legacy_entries.as_deref())
            .unwrap_or(&[])
    }
}

/// A latency field that is not an array is treated as absent, so resolution moves
/// on to the next shape. Elements of an array must still be valid samples.
fn samples_if_array<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<LatencySample>>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
            .map_err(de::Error::custom),
        _ => Ok(None),
    }
}

fn aggregate_if_object<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Aggregate>, D::Error> {
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer)
    }
}
