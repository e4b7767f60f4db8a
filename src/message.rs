//! Telemetry message schema
//!
//! The server pushes JSON objects carrying a `topic` discriminant next to the
//! snapshot fields:
//!
//! ```text
//! {"topic":"server-status","actual_sample_rate":44100.0,"group_count":2,...}
//! {"topic":"server-meters","input_meter_peak_levels":[0.5,0.1],...}
//! ```
//!
//! Every field is optional on the way in. A field that is missing or has the
//! wrong type becomes `None` so the renderers can skip just that region.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const STATUS_TOPIC: &str = "server-status";
pub const METERS_TOPIC: &str = "server-meters";

/// Engine status record (`server-status`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default, deserialize_with = "lenient")]
    pub actual_sample_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub target_sample_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub average_cpu_usage: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub peak_cpu_usage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub group_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub synth_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub synthdef_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub ugen_count: Option<u64>,
}

/// Per-channel linear levels (`server-meters`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MeterSnapshot {
    #[serde(default, deserialize_with = "lenient")]
    pub input_meter_peak_levels: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "lenient")]
    pub input_meter_rms_levels: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "lenient")]
    pub output_meter_peak_levels: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "lenient")]
    pub output_meter_rms_levels: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryMessage {
    Status(StatusSnapshot),
    Meters(MeterSnapshot),
}

/// Result of decoding one inbound text frame
#[derive(Debug)]
pub enum Parsed {
    Message(TelemetryMessage),
    /// Valid JSON with an absent or unrecognised topic
    Ignored(Option<String>),
    Malformed(serde_json::Error),
}

/// Decode a text frame into a telemetry message.
pub fn parse(text: &str) -> Parsed {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => return Parsed::Malformed(e),
    };

    let topic = value.get("topic").and_then(Value::as_str).map(str::to_owned);
    match topic.as_deref() {
        Some(STATUS_TOPIC) => match serde_json::from_value(value) {
            Ok(status) => Parsed::Message(TelemetryMessage::Status(status)),
            Err(e) => Parsed::Malformed(e),
        },
        Some(METERS_TOPIC) => match serde_json::from_value(value) {
            Ok(meters) => Parsed::Message(TelemetryMessage::Meters(meters)),
            Err(e) => Parsed::Malformed(e),
        },
        _ => Parsed::Ignored(topic),
    }
}

/// Deserialize a field, turning a type mismatch into `None` instead of
/// failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like `lenient`, but also takes counts that arrive as integral floats (`3.0`)
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    Ok(count)
}
