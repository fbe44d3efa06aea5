//! Flow record → named features, including the derived rate and size fields.

use super::FeatureMap;
use crate::error::FlowError;
use serde::de::Unexpected;
use serde::{Deserialize, Serialize};

/// Flow description as posted by clients. Absent numeric fields read as zero,
/// an absent protocol reads as TCP; present fields of the wrong type are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Opaque caller identifier, echoed back in batch results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<serde_json::Value>,
    #[serde(default)]
    pub packet_count: f64,
    #[serde(default)]
    pub byte_count: f64,
    #[serde(default, alias = "duration")]
    pub duration_seconds: f64,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default, alias = "src_port")]
    pub source_port: f64,
    #[serde(default, alias = "dst_port")]
    pub destination_port: f64,
}

fn default_protocol() -> String {
    "TCP".to_string()
}

impl FlowRecord {
    /// Parse one flow from request JSON. `null`, `{}` and `[]` count as no data;
    /// any other non-object value is malformed.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, FlowError> {
        match value {
            serde_json::Value::Null => Err(FlowError::MissingData),
            serde_json::Value::Object(map) if map.is_empty() => Err(FlowError::MissingData),
            serde_json::Value::Array(items) if items.is_empty() => Err(FlowError::MissingData),
            other => Self::deserialize_item(other),
        }
    }

    /// Parse one element of a batch. An empty object is a valid all-defaults flow;
    /// anything that is not an object is rejected.
    pub fn deserialize_item(value: &serde_json::Value) -> Result<Self, FlowError> {
        match value {
            serde_json::Value::Object(_) => Ok(Self::deserialize(value)?),
            other => Err(FlowError::Malformed(serde::de::Error::invalid_type(
                json_kind(other),
                &"a flow object",
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> Unexpected<'_> {
    match value {
        serde_json::Value::Null => Unexpected::Unit,
        serde_json::Value::Bool(b) => Unexpected::Bool(*b),
        serde_json::Value::Number(_) => Unexpected::Other("number"),
        serde_json::Value::String(s) => Unexpected::Str(s),
        serde_json::Value::Array(_) => Unexpected::Seq,
        serde_json::Value::Object(_) => Unexpected::Map,
    }
}

/// IANA protocol number for the names the models were trained on; 0 otherwise.
pub fn protocol_number(protocol: &str) -> u8 {
    match protocol.trim().to_ascii_uppercase().as_str() {
        "TCP" => 6,
        "UDP" => 17,
        "ICMP" => 1,
        _ => 0,
    }
}

pub fn extract_features(flow: &FlowRecord) -> FeatureMap {
    let duration = flow.duration_seconds;
    let (packets_per_second, bytes_per_second) = if duration > 0.0 {
        (flow.packet_count / duration, flow.byte_count / duration)
    } else {
        (0.0, 0.0)
    };
    let avg_packet_size = if flow.packet_count > 0.0 {
        flow.byte_count / flow.packet_count
    } else {
        0.0
    };

    [
        ("packet_count", flow.packet_count),
        ("byte_count", flow.byte_count),
        ("duration", duration),
        ("packets_per_second", packets_per_second),
        ("bytes_per_second", bytes_per_second),
        ("avg_packet_size", avg_packet_size),
        ("protocol_num", protocol_number(&flow.protocol) as f64),
        ("src_port", flow.source_port),
        ("dst_port", flow.destination_port),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derived_rates_and_sizes() {
        let flow = FlowRecord::from_json(&json!({
            "packet_count": 100,
            "byte_count": 50000,
            "duration_seconds": 10,
            "protocol": "TCP",
            "source_port": 51000,
            "destination_port": 443
        }))
        .unwrap();
        let f = extract_features(&flow);

        assert_eq!(f["packets_per_second"], 10.0);
        assert_eq!(f["bytes_per_second"], 5000.0);
        assert_eq!(f["avg_packet_size"], 500.0);
        assert_eq!(f["protocol_num"], 6.0);
        assert_eq!(f["src_port"], 51000.0);
        assert_eq!(f["dst_port"], 443.0);
        assert_eq!(f.len(), super::super::FEATURE_COUNT);
    }

    #[test]
    fn zero_duration_gives_zero_rates() {
        let flow = FlowRecord::from_json(&json!({
            "packet_count": 12,
            "byte_count": 600,
            "duration_seconds": 0
        }))
        .unwrap();
        let f = extract_features(&flow);
        assert_eq!(f["packets_per_second"], 0.0);
        assert_eq!(f["bytes_per_second"], 0.0);
        assert_eq!(f["avg_packet_size"], 50.0);
    }

    #[test]
    fn zero_packets_gives_zero_average() {
        let flow = FlowRecord::from_json(&json!({"byte_count": 10, "duration": 2})).unwrap();
        let f = extract_features(&flow);
        assert_eq!(f["avg_packet_size"], 0.0);
        assert_eq!(f["bytes_per_second"], 5.0);
    }

    #[test]
    fn protocol_lookup() {
        assert_eq!(protocol_number("UDP"), 17);
        assert_eq!(protocol_number("icmp"), 1);
        assert_eq!(protocol_number("SCTP"), 0);
        assert_eq!(protocol_number(""), 0);
    }

    #[test]
    fn short_field_names_are_accepted() {
        let flow = FlowRecord::from_json(&json!({"src_port": 53, "dst_port": 5353, "protocol": "UDP"}))
            .unwrap();
        assert_eq!(flow.source_port, 53.0);
        assert_eq!(flow.destination_port, 5353.0);
    }

    #[test]
    fn defaults_to_tcp() {
        let flow = FlowRecord::from_json(&json!({"packet_count": 1})).unwrap();
        assert_eq!(extract_features(&flow)["protocol_num"], 6.0);
    }

    #[test]
    fn malformed_types_are_rejected() {
        let err = FlowRecord::from_json(&json!({"packet_count": "lots"})).unwrap_err();
        assert!(matches!(err, FlowError::Malformed(_)));
        let err = FlowRecord::from_json(&json!({"protocol": 6})).unwrap_err();
        assert!(matches!(err, FlowError::Malformed(_)));
    }

    #[test]
    fn batch_items_allow_empty_objects() {
        let flow = FlowRecord::deserialize_item(&json!({})).unwrap();
        assert_eq!(flow.protocol, "TCP");
        assert!(FlowRecord::deserialize_item(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn non_object_values_are_malformed() {
        for v in [json!([1, 5000, 10]), json!("flow"), json!(42), json!(true)] {
            assert!(matches!(FlowRecord::from_json(&v), Err(FlowError::Malformed(_))), "{v}");
            assert!(matches!(FlowRecord::deserialize_item(&v), Err(FlowError::Malformed(_))), "{v}");
        }
        assert!(matches!(FlowRecord::deserialize_item(&json!([])), Err(FlowError::Malformed(_))));
    }

    #[test]
    fn empty_body_is_missing_data() {
        assert!(matches!(
            FlowRecord::from_json(&serde_json::Value::Null),
            Err(FlowError::MissingData)
        ));
        assert!(matches!(FlowRecord::from_json(&json!({})), Err(FlowError::MissingData)));
        assert!(matches!(FlowRecord::from_json(&json!([])), Err(FlowError::MissingData)));
    }
}
