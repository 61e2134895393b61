use crate::{settle, Draft, Error, ResourceId, Result, StatusError};
use async_trait::async_trait;

/// Static human-readable messages, one per operation
#[derive(Clone, Copy, Debug)]
pub struct Messages {
    pub get: &'static str,
    pub list: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
}

/// Pure mapping between backend representation and display model
pub trait Converter: Send + Sync {
    type Raw;
    /// Alternate serialization, fetched alongside the primary body
    type Secondary;
    type Model;

    const MESSAGES: Messages;

    fn to_model(&self, raw: Self::Raw, secondary: Option<Self::Secondary>) -> Self::Model;
    /// Model returned by `get` when backend reports absence
    fn default_model(&self, id: &ResourceId) -> Self::Model;
    /// Must populate identity fields required by backend
    fn create_payload(&self, model: &Self::Model) -> Self::Raw;
    fn update_payload(&self, model: &Self::Model) -> Self::Raw;

    fn identity(&self, model: &Self::Model) -> ResourceId;
    /// Whether backend has assigned identity to this model
    fn is_persisted(&self, model: &Self::Model) -> bool;
}

/// Transport for one resource type
#[async_trait]
pub trait Backend: Send + Sync {
    type Raw: Send;
    type Secondary: Send;
    type Error: StatusError + Send + Sync + 'static;

    async fn get(&self, id: &ResourceId) -> std::result::Result<Self::Raw, Self::Error>;
    /// `Ok(None)` when backend has no alternate serialization
    async fn get_secondary(
        &self,
        _id: &ResourceId,
    ) -> std::result::Result<Option<Self::Secondary>, Self::Error> {
        Ok(None)
    }
    async fn list(
        &self,
        namespace: Option<&str>,
    ) -> std::result::Result<Vec<Self::Raw>, Self::Error>;
    async fn create(
        &self,
        namespace: Option<&str>,
        payload: Self::Raw,
    ) -> std::result::Result<Self::Raw, Self::Error>;
    async fn update(
        &self,
        id: &ResourceId,
        payload: Self::Raw,
    ) -> std::result::Result<Self::Raw, Self::Error>;
    async fn delete(&self, id: &ResourceId) -> std::result::Result<(), Self::Error>;
}

/// Result of [`ResourceService::fetch`]
#[derive(Debug, PartialEq)]
pub enum Fetched<M> {
    One(M),
    Many(Vec<M>),
}

pub struct ResourceService<C, B> {
    converter: C,
    backend: B,
}

impl<C, B> ResourceService<C, B>
where
    C: Converter,
    B: Backend<Raw = C::Raw, Secondary = C::Secondary>,
{
    pub fn new(converter: C, backend: B) -> Self {
        Self { converter, backend }
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Tag model as new or existing, based on its backend identity
    pub fn draft(&self, model: C::Model) -> Draft<C::Model> {
        if self.converter.is_persisted(&model) {
            Draft::Existing(model)
        } else {
            Draft::New(model)
        }
    }

    /// `get` when name is given, `list` otherwise
    pub async fn fetch(
        &self,
        namespace: Option<&str>,
        name: Option<&str>,
    ) -> Result<Fetched<C::Model>, B::Error> {
        match name {
            Some(name) => {
                let id = ResourceId {
                    namespace: namespace.map(ToOwned::to_owned),
                    name: name.to_owned(),
                };
                self.get(&id).await.map(Fetched::One)
            }
            None => self.list(namespace).await.map(Fetched::Many),
        }
    }

    pub async fn get(&self, id: &ResourceId) -> Result<C::Model, B::Error> {
        log::debug!("Fetching {}", id);
        let (raw, secondary) =
            settle::pair(self.backend.get(id), self.backend.get_secondary(id)).await;

        let raw = match raw {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => {
                log::debug!("{} not found, using default", id);
                return Ok(self.converter.default_model(id));
            }
            Err(e) => {
                return Err(Error::Retrieval {
                    message: C::MESSAGES.get,
                    source: e,
                })
            }
        };
        let secondary = match secondary {
            Ok(secondary) => secondary,
            Err(e) => {
                log::warn!("Alternate representation of {} unavailable: {}", id, e);
                None
            }
        };
        Ok(self.converter.to_model(raw, secondary))
    }

    pub async fn list(&self, namespace: Option<&str>) -> Result<Vec<C::Model>, B::Error> {
        log::debug!("Listing in {}", namespace.unwrap_or("all namespaces"));
        let items = self
            .backend
            .list(namespace)
            .await
            .map_err(|e| Error::Retrieval {
                message: C::MESSAGES.list,
                source: e,
            })?;
        Ok(items
            .into_iter()
            .map(|raw| self.converter.to_model(raw, None))
            .collect())
    }

    pub async fn create(&self, model: &C::Model) -> Result<C::Model, B::Error> {
        let id = self.converter.identity(model);
        log::debug!("Creating {}", id);
        let payload = self.converter.create_payload(model);
        let created = self
            .backend
            .create(id.namespace(), payload)
            .await
            .map_err(|e| Error::Creation {
                message: C::MESSAGES.create,
                source: e,
            })?;
        Ok(self.converter.to_model(created, None))
    }

    pub async fn update(&self, draft: &Draft<C::Model>) -> Result<C::Model, B::Error> {
        let model = match draft {
            Draft::New(model) => return self.create(model).await,
            Draft::Existing(model) => model,
        };
        let id = self.converter.identity(model);
        log::debug!("Updating {}", id);
        let payload = self.converter.update_payload(model);
        let updated = self
            .backend
            .update(&id, payload)
            .await
            .map_err(|e| Error::Update {
                message: C::MESSAGES.update,
                source: e,
            })?;
        Ok(self.converter.to_model(updated, None))
    }

    pub async fn delete(&self, model: &C::Model) -> Result<(), B::Error> {
        let id = self.converter.identity(model);
        log::debug!("Deleting {}", id);
        self.backend
            .delete(&id)
            .await
            .map_err(|e| Error::Deletion {
                message: C::MESSAGES.delete,
                source: e,
            })
    }
}
