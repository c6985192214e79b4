use serde::{Deserialize, Serialize};

/// Protocols the filter form knows about.
pub const PROTOCOLS: [&str; 4] = ["tcp", "udp", "icmp", "arp"];

/// Filter criteria applied by the external capture service.
///
/// Every field is optional; an empty config is valid and filters nothing.
/// The JSON field names match what the service reads from `config.json`
/// and accepts on `POST /config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    /// Match either endpoint address
    pub ip: Option<String>,

    /// Match the source address only
    pub source_ip: Option<String>,

    /// Match the destination address only
    pub destination_ip: Option<String>,

    /// Match a MAC address at layer 2
    pub mac_address: Option<String>,

    /// Match either endpoint port
    pub port: Option<String>,

    /// Match the source port only
    pub source_port: Option<String>,

    /// Match the destination port only
    pub destination_port: Option<String>,

    /// Comma-joined protocol set drawn from [`PROTOCOLS`]
    pub protocol: Option<String>,

    /// Minimum frame length, passed through to the service unparsed
    pub packet_size_min: Option<String>,

    /// Maximum frame length, passed through to the service unparsed
    pub packet_size_max: Option<String>,

    /// Capture time window, passed through to the service unparsed
    pub time_range: Option<String>,

    /// TCP flag criteria; only editable while "tcp" is selected
    pub tcp_flags: Option<String>,

    /// UDP payload substring; only editable while "udp" is selected
    pub payload_content: Option<String>,
}

impl FilterConfig {
    /// Whether the given protocol is part of the selected set.
    pub fn has_protocol(&self, name: &str) -> bool {
        self.protocol
            .as_deref()
            .map(|joined| joined.split(',').any(|p| p.trim().eq_ignore_ascii_case(name)))
            .unwrap_or(false)
    }

    /// The selected protocols, in form order, restricted to the known vocabulary.
    pub fn selected_protocols(&self) -> Vec<&'static str> {
        PROTOCOLS
            .iter()
            .copied()
            .filter(|p| self.has_protocol(p))
            .collect()
    }

    /// Whether the TCP flags field should be shown on the editing surface.
    ///
    /// A hidden field keeps its stored value; deselecting "tcp" hides
    /// `tcp_flags` without stripping it, so re-selecting restores it.
    pub fn tcp_flags_visible(&self) -> bool {
        self.has_protocol("tcp")
    }

    /// Whether the UDP payload field should be shown on the editing surface.
    pub fn payload_content_visible(&self) -> bool {
        self.has_protocol("udp")
    }

    /// True when no criterion is set at all.
    pub fn is_empty(&self) -> bool {
        *self == FilterConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_membership_is_case_insensitive_and_trimmed() {
        let cfg = FilterConfig {
            protocol: Some("TCP, udp".to_string()),
            ..Default::default()
        };
        assert!(cfg.has_protocol("tcp"));
        assert!(cfg.has_protocol("udp"));
        assert!(!cfg.has_protocol("icmp"));
        assert_eq!(cfg.selected_protocols(), vec!["tcp", "udp"]);
    }

    #[test]
    fn gated_fields_track_protocol_selection() {
        let mut cfg = FilterConfig {
            protocol: Some("tcp".to_string()),
            tcp_flags: Some("SYN".to_string()),
            ..Default::default()
        };
        assert!(cfg.tcp_flags_visible());
        assert!(!cfg.payload_content_visible());

        // Deselecting tcp hides the field but the value survives.
        cfg.protocol = Some("udp".to_string());
        assert!(!cfg.tcp_flags_visible());
        assert!(cfg.payload_content_visible());
        assert_eq!(cfg.tcp_flags.as_deref(), Some("SYN"));
    }

    #[test]
    fn partial_json_merges_over_defaults() {
        let cfg: FilterConfig =
            serde_json::from_str(r#"{"sourceIp": "10.0.0.1", "protocol": "tcp"}"#).unwrap();
        assert_eq!(cfg.source_ip.as_deref(), Some("10.0.0.1"));
        assert!(cfg.ip.is_none());
        assert!(cfg.tcp_flags.is_none());
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let cfg = FilterConfig {
            destination_port: Some("443".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["destinationPort"], "443");
    }
}
