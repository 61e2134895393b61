use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Label excluded from container listings
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FilteredLabel {
    pub name: String,
    pub value: String,
}

/// Global application settings, as persisted by the server
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    #[serde(rename = "LogoURL")]
    pub logo_url: String,
    pub black_listed_labels: Vec<FilteredLabel>,
    pub snapshot_interval: String,
    pub edge_agent_checkin_interval: u32,
    pub allow_bind_mounts_for_regular_users: bool,
    pub allow_privileged_mode_for_regular_users: bool,
    pub allow_volume_browser_for_regular_users: bool,
    pub enable_host_management_features: bool,
    pub enable_edge_compute_features: bool,
    pub allow_host_namespace_for_regular_users: bool,
    pub allow_device_mapping_for_regular_users: bool,
    pub allow_stack_management_for_regular_users: bool,
    pub allow_container_capabilities_for_regular_users: bool,
    pub enable_telemetry: bool,

    /// Fields this client does not edit, written back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Choices offered for `EdgeAgentCheckinInterval`
pub const EDGE_AGENT_CHECKIN_OPTIONS: &[(&str, u32)] =
    &[("5 seconds", 5), ("10 seconds", 10), ("30 seconds", 30)];

impl Settings {
    /// Accepts only intervals from [`EDGE_AGENT_CHECKIN_OPTIONS`]
    pub fn set_edge_agent_checkin_interval(&mut self, seconds: u32) -> Result<()> {
        if !EDGE_AGENT_CHECKIN_OPTIONS
            .iter()
            .any(|(_, option)| *option == seconds)
        {
            return Err(Error::InvalidCheckinInterval(seconds));
        }
        self.edge_agent_checkin_interval = seconds;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_names() {
        let settings: Settings = serde_json::from_value(json!({
            "LogoURL": "https://example.com/logo.png",
            "BlackListedLabels": [{"name": "team", "value": "ops"}],
            "SnapshotInterval": "5m",
            "AllowBindMountsForRegularUsers": true,
            "EnableTelemetry": true,
            "AuthenticationMethod": 1,
        }))
        .unwrap();
        assert_eq!(settings.logo_url, "https://example.com/logo.png");
        assert_eq!(settings.black_listed_labels[0].name, "team");
        assert!(settings.allow_bind_mounts_for_regular_users);
        assert!(!settings.allow_privileged_mode_for_regular_users);

        let back = serde_json::to_value(&settings).unwrap();
        assert_eq!(back["AuthenticationMethod"], 1);
        assert_eq!(back["LogoURL"], "https://example.com/logo.png");
        assert_eq!(back["AllowContainerCapabilitiesForRegularUsers"], false);
    }

    #[test]
    fn checkin_interval_options() {
        let mut settings = Settings::default();
        settings.set_edge_agent_checkin_interval(10).unwrap();
        assert_eq!(settings.edge_agent_checkin_interval, 10);
        assert!(matches!(
            settings.set_edge_agent_checkin_interval(7),
            Err(Error::InvalidCheckinInterval(7))
        ));
        assert_eq!(settings.edge_agent_checkin_interval, 10);
    }
}
