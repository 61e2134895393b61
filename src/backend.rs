use crate::error::BackendError;
use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE};
use kube::{api::DeleteParams, core::ObjectList, Client, Resource};
use resource_service::{Backend, ResourceId};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{fmt::Debug, marker::PhantomData};

/// REST backend for any typed kubernetes resource
pub struct KubeBackend<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeBackend<K>
where
    K: Resource<DynamicType = ()>,
{
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    fn collection_url(namespace: Option<&str>) -> String {
        K::url_path(&(), namespace)
    }

    fn item_url(id: &ResourceId) -> String {
        format!("{}/{}", Self::collection_url(id.namespace()), id.name)
    }
}

fn json_request(
    builder: http::request::Builder,
    body: Vec<u8>,
) -> Result<http::Request<Vec<u8>>, BackendError> {
    Ok(builder
        .header(ACCEPT, "application/json")
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .map_err(kube::Error::HttpError)?)
}

#[async_trait]
impl<K> Backend for KubeBackend<K>
where
    K: Resource<DynamicType = ()> + Clone + Debug + DeserializeOwned + Serialize + Send + Sync,
{
    type Raw = K;
    type Secondary = String;
    type Error = BackendError;

    async fn get(&self, id: &ResourceId) -> Result<K, BackendError> {
        let req = json_request(http::Request::get(Self::item_url(id)), vec![])?;
        Ok(self.client.request(req).await?)
    }

    async fn get_secondary(&self, id: &ResourceId) -> Result<Option<String>, BackendError> {
        let req = http::Request::get(Self::item_url(id))
            .header(ACCEPT, "application/yaml")
            .body(vec![])
            .map_err(kube::Error::HttpError)?;
        Ok(Some(self.client.request_text(req).await?))
    }

    async fn list(&self, namespace: Option<&str>) -> Result<Vec<K>, BackendError> {
        let req = json_request(http::Request::get(Self::collection_url(namespace)), vec![])?;
        let list: ObjectList<K> = self.client.request(req).await?;
        log::trace!("Listed {} items", list.items.len());
        Ok(list.items)
    }

    async fn create(&self, namespace: Option<&str>, payload: K) -> Result<K, BackendError> {
        let req = json_request(
            http::Request::post(Self::collection_url(namespace)),
            serde_json::to_vec(&payload)?,
        )?;
        Ok(self.client.request(req).await?)
    }

    async fn update(&self, id: &ResourceId, payload: K) -> Result<K, BackendError> {
        let req = json_request(
            http::Request::put(Self::item_url(id)),
            serde_json::to_vec(&payload)?,
        )?;
        Ok(self.client.request(req).await?)
    }

    async fn delete(&self, id: &ResourceId) -> Result<(), BackendError> {
        let req = json_request(
            http::Request::delete(Self::item_url(id)),
            serde_json::to_vec(&DeleteParams::default())?,
        )?;
        let _result: Value = self.client.request(req).await?;
        Ok(())
    }
}
