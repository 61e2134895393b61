mod editor;
mod form;
mod http;
mod model;

pub use editor::{SettingsEditor, SettingsView};
pub use form::SettingsForm;
pub use http::HttpSettingsBackend;
pub use model::{FilteredLabel, Settings, EDGE_AGENT_CHECKIN_OPTIONS};

use crate::error::{BackendError, ServiceError};
use async_trait::async_trait;
use resource_service::Error;

pub(crate) const RETRIEVE_MESSAGE: &str = "Unable to retrieve application settings";
pub(crate) const UPDATE_MESSAGE: &str = "Unable to update settings";

/// Storage of the single global settings object
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn settings(&self) -> Result<Settings, BackendError>;
    /// Writes full object, returning what server persisted
    async fn update(&self, settings: &Settings) -> Result<Settings, BackendError>;
}

pub struct SettingsService<B> {
    backend: B,
}

impl<B: SettingsBackend> SettingsService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn settings(&self) -> Result<Settings, ServiceError> {
        log::debug!("Fetching settings");
        self.backend
            .settings()
            .await
            .map_err(|source| Error::Retrieval {
                message: RETRIEVE_MESSAGE,
                source,
            })
    }

    pub async fn update(&self, settings: &Settings) -> Result<Settings, ServiceError> {
        log::debug!("Updating settings");
        self.backend
            .update(settings)
            .await
            .map_err(|source| Error::Update {
                message: UPDATE_MESSAGE,
                source,
            })
    }
}
