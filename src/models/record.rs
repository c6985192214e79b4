use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown in place of any summary field that cannot be derived.
pub const MISSING: &str = "N/A";

/// One element of a capture output array.
///
/// The capture tool's JSON export has no fixed schema (the layer tree
/// varies per packet), so the record stays an opaque value and every
/// accessor probes it defensively. Accessors never panic; a missing or
/// unexpectedly shaped path yields the [`MISSING`] sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureRecord(pub Value);

/// The five scalar columns of the packet list view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    /// Capture timestamp, verbatim from the tool
    pub time: String,

    /// Source IP address
    pub source: String,

    /// Destination IP address
    pub destination: String,

    /// Top-level message type, e.g. "TCP"
    pub message_type: String,

    /// Frame length in bytes, as reported
    pub length: String,
}

impl CaptureRecord {
    /// Derive the list-view summary, field by field.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            time: self.field(&["frame", "frame.time"], &["time", "timestamp"]),
            source: self.field(&["ip", "ip.src"], &["source", "src"]),
            destination: self.field(&["ip", "ip.dst"], &["destination", "dst"]),
            message_type: self.message_type(),
            length: self.field(&["frame", "frame.len"], &["length", "len"]),
        }
    }

    /// The protocol layer tree under `_source.layers`, if this record
    /// has the capture tool's export shape.
    pub fn layers(&self) -> Option<&Value> {
        self.0.get("_source").and_then(|s| s.get("layers"))
    }

    /// Look up a layer field, falling back to flat top-level keys for
    /// records written in a simpler shape.
    fn field(&self, layer_path: &[&str; 2], flat_keys: &[&str]) -> String {
        let nested = self
            .layers()
            .and_then(|layers| layers.get(layer_path[0]))
            .and_then(|layer| layer.get(layer_path[1]))
            .and_then(Self::scalar);
        if let Some(value) = nested {
            return value;
        }
        flat_keys
            .iter()
            .find_map(|key| self.0.get(key).and_then(Self::scalar))
            .unwrap_or_else(|| MISSING.to_string())
    }

    /// The last segment of `frame.protocols` ("eth:ethertype:ip:tcp" ->
    /// "TCP"), with a flat `protocol` fallback.
    fn message_type(&self) -> String {
        let stack = self
            .layers()
            .and_then(|layers| layers.get("frame"))
            .and_then(|frame| frame.get("frame.protocols"))
            .and_then(|v| v.as_str())
            .and_then(|s| s.rsplit(':').next())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_uppercase());
        if let Some(value) = stack {
            return value;
        }
        self.0
            .get("protocol")
            .and_then(Self::scalar)
            .unwrap_or_else(|| MISSING.to_string())
    }

    /// Render a JSON leaf as display text. Strings pass through,
    /// numbers are formatted, anything else counts as missing.
    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summarizes_tool_export_shape() {
        let record = CaptureRecord(json!({
            "_source": {
                "layers": {
                    "frame": {
                        "frame.time": "Jan  1, 2026 12:00:00.000",
                        "frame.len": "60",
                        "frame.protocols": "eth:ethertype:ip:tcp"
                    },
                    "ip": { "ip.src": "10.0.0.1", "ip.dst": "10.0.0.2" }
                }
            }
        }));
        let summary = record.summary();
        assert_eq!(summary.time, "Jan  1, 2026 12:00:00.000");
        assert_eq!(summary.source, "10.0.0.1");
        assert_eq!(summary.destination, "10.0.0.2");
        assert_eq!(summary.message_type, "TCP");
        assert_eq!(summary.length, "60");
    }

    #[test]
    fn summarizes_flat_shape() {
        let record = CaptureRecord(json!({
            "timestamp": "12:00:01",
            "source": "fe80::1",
            "destination": "fe80::2",
            "protocol": "ICMP",
            "length": 98
        }));
        let summary = record.summary();
        assert_eq!(summary.source, "fe80::1");
        assert_eq!(summary.message_type, "ICMP");
        assert_eq!(summary.length, "98");
    }

    #[test]
    fn missing_fields_become_sentinels_without_panicking() {
        for value in [json!({}), json!(null), json!([1, 2]), json!("text")] {
            let summary = CaptureRecord(value).summary();
            assert_eq!(summary.time, MISSING);
            assert_eq!(summary.source, MISSING);
            assert_eq!(summary.destination, MISSING);
            assert_eq!(summary.message_type, MISSING);
            assert_eq!(summary.length, MISSING);
        }
    }

    #[test]
    fn partial_records_degrade_field_by_field() {
        let record = CaptureRecord(json!({
            "_source": { "layers": { "ip": { "ip.src": "192.168.1.9" } } }
        }));
        let summary = record.summary();
        assert_eq!(summary.source, "192.168.1.9");
        assert_eq!(summary.destination, MISSING);
        assert_eq!(summary.time, MISSING);
    }
}
