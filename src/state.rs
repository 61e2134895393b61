//! Process-wide application state, refreshed after settings change.

use crate::{
    error::{Error, Result},
    settings::Settings,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ApplicationState {
    pub logo: String,
    pub snapshot_interval: String,
    pub enable_host_management_features: bool,
    pub enable_volume_browser_for_non_admin_users: bool,
    pub allow_host_namespace_for_regular_users: bool,
    pub enable_edge_compute_features: bool,
    pub allow_device_mapping_for_regular_users: bool,
    pub allow_stack_management_for_regular_users: bool,
    pub allow_container_capabilities_for_regular_users: bool,
    pub allow_privileged_mode_for_regular_users: bool,
    pub allow_bind_mounts_for_regular_users: bool,
    pub enable_telemetry: bool,
}

/// Single-field state transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateUpdate {
    Logo(String),
    SnapshotInterval(String),
    EnableHostManagementFeatures(bool),
    EnableVolumeBrowserForNonAdminUsers(bool),
    AllowHostNamespaceForRegularUsers(bool),
    EnableEdgeComputeFeatures(bool),
    AllowDeviceMappingForRegularUsers(bool),
    AllowStackManagementForRegularUsers(bool),
    AllowContainerCapabilitiesForRegularUsers(bool),
    AllowPrivilegedModeForRegularUsers(bool),
    AllowBindMountsForRegularUsers(bool),
    EnableTelemetry(bool),
}

impl StateUpdate {
    pub fn from_settings(settings: &Settings) -> Vec<StateUpdate> {
        vec![
            Self::Logo(settings.logo_url.clone()),
            Self::SnapshotInterval(settings.snapshot_interval.clone()),
            Self::EnableHostManagementFeatures(settings.enable_host_management_features),
            Self::EnableVolumeBrowserForNonAdminUsers(
                settings.allow_volume_browser_for_regular_users,
            ),
            Self::AllowHostNamespaceForRegularUsers(settings.allow_host_namespace_for_regular_users),
            Self::EnableEdgeComputeFeatures(settings.enable_edge_compute_features),
            Self::AllowDeviceMappingForRegularUsers(settings.allow_device_mapping_for_regular_users),
            Self::AllowStackManagementForRegularUsers(
                settings.allow_stack_management_for_regular_users,
            ),
            Self::AllowContainerCapabilitiesForRegularUsers(
                settings.allow_container_capabilities_for_regular_users,
            ),
            Self::AllowPrivilegedModeForRegularUsers(
                settings.allow_privileged_mode_for_regular_users,
            ),
            Self::AllowBindMountsForRegularUsers(settings.allow_bind_mounts_for_regular_users),
            Self::EnableTelemetry(settings.enable_telemetry),
        ]
    }

    fn apply_to(self, state: &mut ApplicationState) {
        match self {
            Self::Logo(v) => state.logo = v,
            Self::SnapshotInterval(v) => state.snapshot_interval = v,
            Self::EnableHostManagementFeatures(v) => state.enable_host_management_features = v,
            Self::EnableVolumeBrowserForNonAdminUsers(v) => {
                state.enable_volume_browser_for_non_admin_users = v
            }
            Self::AllowHostNamespaceForRegularUsers(v) => {
                state.allow_host_namespace_for_regular_users = v
            }
            Self::EnableEdgeComputeFeatures(v) => state.enable_edge_compute_features = v,
            Self::AllowDeviceMappingForRegularUsers(v) => {
                state.allow_device_mapping_for_regular_users = v
            }
            Self::AllowStackManagementForRegularUsers(v) => {
                state.allow_stack_management_for_regular_users = v
            }
            Self::AllowContainerCapabilitiesForRegularUsers(v) => {
                state.allow_container_capabilities_for_regular_users = v
            }
            Self::AllowPrivilegedModeForRegularUsers(v) => {
                state.allow_privileged_mode_for_regular_users = v
            }
            Self::AllowBindMountsForRegularUsers(v) => {
                state.allow_bind_mounts_for_regular_users = v
            }
            Self::EnableTelemetry(v) => state.enable_telemetry = v,
        }
    }
}

/// Holds [`ApplicationState`], optionally backed by a JSON file
#[derive(Debug, Default)]
pub struct StateStore {
    path: Option<PathBuf>,
    state: RwLock<ApplicationState>,
}

impl StateStore {
    pub fn in_memory(state: ApplicationState) -> Self {
        Self {
            path: None,
            state: RwLock::new(state),
        }
    }

    /// Missing file is treated as default state
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let state = match fs::read(&path) {
            Ok(data) => {
                serde_json::from_slice(&data).map_err(|e| Error::State(path.clone(), e))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => ApplicationState::default(),
            Err(e) => return Err(Error::Io(path, e)),
        };
        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    pub fn apply(&self, update: StateUpdate) {
        log::trace!("State update: {:?}", update);
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        update.apply_to(&mut state);
    }

    pub fn snapshot(&self) -> ApplicationState {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Writes state to backing file, if any
    pub fn flush(&self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };
        let data = serde_json::to_vec_pretty(&self.snapshot())
            .map_err(|e| Error::State(path.clone(), e))?;
        fs::write(path, data).map_err(|e| Error::Io(path.clone(), e))
    }
}
