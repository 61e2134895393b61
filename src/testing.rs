//! In-memory backends for tests

use crate::{
    error::BackendError,
    settings::{Settings, SettingsBackend},
};
use async_trait::async_trait;
use kube::{Resource, ResourceExt};
use resource_service::{Backend, ResourceId};
use std::sync::Mutex;

fn status(status: u16) -> BackendError {
    BackendError::Status {
        status,
        message: format!("status {}", status),
    }
}

/// Keeps items in insertion order, assigning uids on create
pub struct MemoryBackend<K> {
    items: Mutex<Vec<K>>,
    fail_with: Option<u16>,
    pub fail_secondary: bool,
}

impl<K> Default for MemoryBackend<K> {
    fn default() -> Self {
        Self {
            items: Mutex::new(vec![]),
            fail_with: None,
            fail_secondary: false,
        }
    }
}

impl<K: Resource + Clone> MemoryBackend<K> {
    pub fn failing(code: u16) -> Self {
        Self {
            fail_with: Some(code),
            ..Default::default()
        }
    }

    pub fn insert(&self, item: K) {
        self.items.lock().unwrap().push(item);
    }

    fn check(&self) -> Result<(), BackendError> {
        match self.fail_with {
            Some(code) => Err(status(code)),
            None => Ok(()),
        }
    }

    fn matches(item: &K, id: &ResourceId) -> bool {
        item.name_any() == id.name && item.namespace().as_deref() == id.namespace()
    }
}

#[async_trait]
impl<K> Backend for MemoryBackend<K>
where
    K: Resource + Clone + Send + Sync,
{
    type Raw = K;
    type Secondary = String;
    type Error = BackendError;

    async fn get(&self, id: &ResourceId) -> Result<K, BackendError> {
        self.check()?;
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| Self::matches(item, id))
            .cloned()
            .ok_or_else(|| status(404))
    }

    async fn get_secondary(&self, id: &ResourceId) -> Result<Option<String>, BackendError> {
        if self.fail_secondary {
            return Err(status(500));
        }
        Ok(Some(format!("# {}\n", id)))
    }

    async fn list(&self, namespace: Option<&str>) -> Result<Vec<K>, BackendError> {
        self.check()?;
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| namespace.is_none() || item.namespace().as_deref() == namespace)
            .cloned()
            .collect())
    }

    async fn create(&self, namespace: Option<&str>, mut payload: K) -> Result<K, BackendError> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let meta = payload.meta_mut();
        if meta.namespace.as_deref() != namespace {
            return Err(status(400));
        }
        meta.uid = Some(format!("uid-{}", items.len()));
        meta.resource_version = Some("1".to_owned());
        items.push(payload.clone());
        Ok(payload)
    }

    async fn update(&self, id: &ResourceId, payload: K) -> Result<K, BackendError> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|item| Self::matches(item, id))
            .ok_or_else(|| status(404))?;
        *slot = payload.clone();
        Ok(payload)
    }

    async fn delete(&self, id: &ResourceId) -> Result<(), BackendError> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|item| !Self::matches(item, id));
        if items.len() == before {
            return Err(status(404));
        }
        Ok(())
    }
}

/// Settings store recording every write
#[derive(Default)]
pub struct MemorySettings {
    pub settings: Mutex<Settings>,
    pub writes: Mutex<Vec<Settings>>,
    pub fail_update: Option<u16>,
}

#[async_trait]
impl SettingsBackend for MemorySettings {
    async fn settings(&self) -> Result<Settings, BackendError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn update(&self, settings: &Settings) -> Result<Settings, BackendError> {
        if let Some(code) = self.fail_update {
            return Err(status(code));
        }
        self.writes.lock().unwrap().push(settings.clone());
        *self.settings.lock().unwrap() = settings.clone();
        Ok(settings.clone())
    }
}
