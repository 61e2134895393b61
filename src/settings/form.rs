use super::{FilteredLabel, Settings};

/// Editable view of [`Settings`]
///
/// Several permissions are presented inverted: the server stores
/// `Allow*ForRegularUsers`, the form edits the matching `restrict*`/`disable*`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub custom_logo: bool,
    pub restrict_bind_mounts: bool,
    pub restrict_privileged_mode: bool,
    pub label_name: String,
    pub label_value: String,
    pub enable_host_management_features: bool,
    pub enable_volume_browser: bool,
    pub enable_edge_compute_features: bool,
    pub restrict_host_namespace_for_regular_users: bool,
    pub disable_device_mapping_for_regular_users: bool,
    pub disable_stack_management_for_regular_users: bool,
    pub disable_container_capabilities_for_regular_users: bool,
    pub enable_telemetry: bool,
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            custom_logo: !settings.logo_url.is_empty(),
            restrict_bind_mounts: !settings.allow_bind_mounts_for_regular_users,
            restrict_privileged_mode: !settings.allow_privileged_mode_for_regular_users,
            label_name: String::new(),
            label_value: String::new(),
            enable_host_management_features: settings.enable_host_management_features,
            enable_volume_browser: settings.allow_volume_browser_for_regular_users,
            enable_edge_compute_features: settings.enable_edge_compute_features,
            restrict_host_namespace_for_regular_users: !settings
                .allow_host_namespace_for_regular_users,
            disable_device_mapping_for_regular_users: !settings
                .allow_device_mapping_for_regular_users,
            disable_stack_management_for_regular_users: !settings
                .allow_stack_management_for_regular_users,
            disable_container_capabilities_for_regular_users: !settings
                .allow_container_capabilities_for_regular_users,
            enable_telemetry: settings.enable_telemetry,
        }
    }

    pub fn apply_to(&self, settings: &mut Settings) {
        if !self.custom_logo {
            settings.logo_url.clear();
        }
        settings.allow_bind_mounts_for_regular_users = !self.restrict_bind_mounts;
        settings.allow_privileged_mode_for_regular_users = !self.restrict_privileged_mode;
        settings.allow_volume_browser_for_regular_users = self.enable_volume_browser;
        settings.enable_host_management_features = self.enable_host_management_features;
        settings.enable_edge_compute_features = self.enable_edge_compute_features;
        settings.allow_host_namespace_for_regular_users =
            !self.restrict_host_namespace_for_regular_users;
        settings.allow_device_mapping_for_regular_users =
            !self.disable_device_mapping_for_regular_users;
        settings.allow_stack_management_for_regular_users =
            !self.disable_stack_management_for_regular_users;
        settings.allow_container_capabilities_for_regular_users =
            !self.disable_container_capabilities_for_regular_users;
        settings.enable_telemetry = self.enable_telemetry;
    }

    pub fn is_container_edit_disabled(&self) -> bool {
        self.restrict_bind_mounts
            || self.restrict_host_namespace_for_regular_users
            || self.restrict_privileged_mode
            || self.disable_device_mapping_for_regular_users
            || self.disable_container_capabilities_for_regular_users
    }

    pub fn filtered_label(&self) -> FilteredLabel {
        FilteredLabel {
            name: self.label_name.clone(),
            value: self.label_value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restrict_bind_mounts_disallows() {
        let mut settings = Settings {
            allow_bind_mounts_for_regular_users: true,
            ..Default::default()
        };
        let mut form = SettingsForm::from_settings(&settings);
        assert!(!form.restrict_bind_mounts);

        form.restrict_bind_mounts = true;
        form.apply_to(&mut settings);
        assert!(!settings.allow_bind_mounts_for_regular_users);
    }

    #[test]
    fn roundtrip_is_stable() {
        let mut settings = Settings {
            logo_url: "https://example.com/logo.png".to_owned(),
            allow_privileged_mode_for_regular_users: true,
            allow_stack_management_for_regular_users: true,
            enable_edge_compute_features: true,
            ..Default::default()
        };
        let before = settings.clone();
        let form = SettingsForm::from_settings(&settings);
        assert!(form.custom_logo);
        form.apply_to(&mut settings);
        assert_eq!(settings, before);
    }

    #[test]
    fn logo_cleared_without_custom_logo() {
        let mut settings = Settings {
            logo_url: "https://example.com/logo.png".to_owned(),
            ..Default::default()
        };
        let form = SettingsForm {
            custom_logo: false,
            ..SettingsForm::from_settings(&settings)
        };
        form.apply_to(&mut settings);
        assert_eq!(settings.logo_url, "");
    }

    #[test]
    fn container_edit() {
        let all_allowed = Settings {
            allow_bind_mounts_for_regular_users: true,
            allow_privileged_mode_for_regular_users: true,
            allow_host_namespace_for_regular_users: true,
            allow_device_mapping_for_regular_users: true,
            allow_container_capabilities_for_regular_users: true,
            ..Default::default()
        };
        let mut form = SettingsForm::from_settings(&all_allowed);
        assert!(!form.is_container_edit_disabled());
        // Stack management does not affect container editing
        form.disable_stack_management_for_regular_users = true;
        assert!(!form.is_container_edit_disabled());
        form.disable_device_mapping_for_regular_users = true;
        assert!(form.is_container_edit_disabled());
    }
}
