use crate::backend::KubeBackend;
use chrono::{DateTime, Utc};
use k8s_openapi::{
    api::core::v1,
    apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference},
    ByteString,
};
use resource_service::{Converter, Messages, ResourceId, ResourceService};
use std::collections::BTreeMap;

/// Label naming the application which owns the config map
pub const CONFIGURATION_OWNER_LABEL: &str = "kubedeck.io/configuration-owner";

pub type ConfigMapService = ResourceService<ConfigMapConverter, KubeBackend<v1::ConfigMap>>;

/// Config map, as presented for editing
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigMap {
    /// Backend uid, `None` until created
    pub id: Option<String>,
    pub name: String,
    pub namespace: String,
    pub yaml: String,
    pub configuration_owner: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub resource_version: Option<String>,
    /// Labels other than the owner label, kept untouched on save
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub owner_references: Vec<OwnerReference>,
    pub finalizers: Vec<String>,
    pub immutable: Option<bool>,
    pub data: BTreeMap<String, String>,
    pub binary_data: BTreeMap<String, Vec<u8>>,
}

impl ConfigMap {
    pub fn id(&self) -> ResourceId {
        ResourceId::namespaced(&self.namespace, &self.name)
    }

    /// Returns previous value, if entry existed
    pub fn set_entry(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        self.binary_data.remove(&key);
        self.data.insert(key, value.into())
    }

    /// Returns whether entry existed
    pub fn remove_entry(&mut self, key: &str) -> bool {
        let text = self.data.remove(key).is_some();
        let binary = self.binary_data.remove(key).is_some();
        text || binary
    }

    pub fn entry_count(&self) -> usize {
        self.data.len() + self.binary_data.len()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigMapConverter;

impl ConfigMapConverter {
    fn payload_meta(model: &ConfigMap) -> ObjectMeta {
        let mut labels = model.labels.clone();
        if let Some(owner) = &model.configuration_owner {
            labels.insert(CONFIGURATION_OWNER_LABEL.to_owned(), owner.clone());
        }
        ObjectMeta {
            name: Some(model.name.clone()),
            namespace: Some(model.namespace.clone()),
            labels: (!labels.is_empty()).then_some(labels),
            annotations: (!model.annotations.is_empty()).then(|| model.annotations.clone()),
            owner_references: (!model.owner_references.is_empty())
                .then(|| model.owner_references.clone()),
            finalizers: (!model.finalizers.is_empty()).then(|| model.finalizers.clone()),
            ..Default::default()
        }
    }

    fn payload(model: &ConfigMap, metadata: ObjectMeta) -> v1::ConfigMap {
        v1::ConfigMap {
            metadata,
            immutable: model.immutable,
            data: Some(model.data.clone()),
            binary_data: if model.binary_data.is_empty() {
                None
            } else {
                Some(
                    model
                        .binary_data
                        .iter()
                        .map(|(k, v)| (k.clone(), ByteString(v.clone())))
                        .collect(),
                )
            },
        }
    }
}

/// Local rendering, used when the backend did not supply YAML
pub(crate) fn render_yaml<T: serde::Serialize>(raw: &T) -> String {
    match serde_yaml_with_quirks::to_string(raw) {
        Ok(yaml) => yaml,
        Err(e) => {
            log::warn!("Failed to render yaml: {}", e);
            String::new()
        }
    }
}

impl Converter for ConfigMapConverter {
    type Raw = v1::ConfigMap;
    type Secondary = String;
    type Model = ConfigMap;

    const MESSAGES: Messages = Messages {
        get: "Unable to retrieve config map",
        list: "Unable to retrieve config maps",
        create: "Unable to create config map",
        update: "Unable to update config map",
        delete: "Unable to delete config map",
    };

    fn to_model(&self, raw: v1::ConfigMap, yaml: Option<String>) -> ConfigMap {
        let yaml = yaml.unwrap_or_else(|| render_yaml(&raw));
        let v1::ConfigMap {
            metadata,
            data,
            binary_data,
            immutable,
        } = raw;
        let mut labels = metadata.labels.unwrap_or_default();
        ConfigMap {
            id: metadata.uid,
            name: metadata.name.unwrap_or_default(),
            namespace: metadata.namespace.unwrap_or_default(),
            yaml,
            configuration_owner: labels.remove(CONFIGURATION_OWNER_LABEL),
            creation_date: metadata.creation_timestamp.map(|t| t.0),
            resource_version: metadata.resource_version,
            labels,
            annotations: metadata.annotations.unwrap_or_default(),
            owner_references: metadata.owner_references.unwrap_or_default(),
            finalizers: metadata.finalizers.unwrap_or_default(),
            immutable,
            data: data.unwrap_or_default(),
            binary_data: binary_data
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, v.0))
                .collect(),
        }
    }

    fn default_model(&self, id: &ResourceId) -> ConfigMap {
        ConfigMap {
            name: id.name.clone(),
            namespace: id.namespace.clone().unwrap_or_default(),
            ..Default::default()
        }
    }

    fn create_payload(&self, model: &ConfigMap) -> v1::ConfigMap {
        Self::payload(model, Self::payload_meta(model))
    }

    fn update_payload(&self, model: &ConfigMap) -> v1::ConfigMap {
        let metadata = ObjectMeta {
            uid: model.id.clone(),
            resource_version: model.resource_version.clone(),
            ..Self::payload_meta(model)
        };
        Self::payload(model, metadata)
    }

    fn identity(&self, model: &ConfigMap) -> ResourceId {
        model.id()
    }

    fn is_persisted(&self, model: &ConfigMap) -> bool {
        model.id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::BackendError, testing::MemoryBackend};
    use resource_service::{Draft, Operation};

    fn new_config_map() -> ConfigMap {
        let mut model = ConfigMapConverter.default_model(&ResourceId::namespaced("prod", "app"));
        model.set_entry("LOG_LEVEL", "info");
        model.configuration_owner = Some("web".to_owned());
        model
    }

    fn service() -> ResourceService<ConfigMapConverter, MemoryBackend<v1::ConfigMap>> {
        ResourceService::new(ConfigMapConverter, MemoryBackend::default())
    }

    #[test]
    fn payload_roundtrip_keeps_identity() {
        let model = new_config_map();
        let back = ConfigMapConverter.to_model(ConfigMapConverter.create_payload(&model), None);
        assert_eq!(back.name, model.name);
        assert_eq!(back.namespace, model.namespace);
        assert_eq!(back.id, None);
        assert_eq!(back.configuration_owner, model.configuration_owner);
        assert_eq!(back.data, model.data);
    }

    #[test]
    fn update_payload_carries_version() {
        let model = ConfigMap {
            id: Some("1234".to_owned()),
            resource_version: Some("42".to_owned()),
            ..new_config_map()
        };
        let payload = ConfigMapConverter.update_payload(&model);
        assert_eq!(payload.metadata.uid.as_deref(), Some("1234"));
        assert_eq!(payload.metadata.resource_version.as_deref(), Some("42"));
        assert_eq!(payload.metadata.namespace.as_deref(), Some("prod"));
        assert_eq!(
            payload.metadata.labels.unwrap()[CONFIGURATION_OWNER_LABEL],
            "web"
        );
        // Text-only maps leave binaryData unset
        assert!(payload.binary_data.is_none());
    }

    #[test]
    fn update_keeps_foreign_metadata() {
        let owner = OwnerReference {
            api_version: "apps/v1".to_owned(),
            kind: "Deployment".to_owned(),
            name: "web".to_owned(),
            uid: "deploy-1".to_owned(),
            ..Default::default()
        };
        let mut raw = ConfigMapConverter.create_payload(&new_config_map());
        raw.metadata.uid = Some("1234".to_owned());
        raw.metadata.labels = Some(BTreeMap::from([("team".to_owned(), "ops".to_owned())]));
        raw.metadata.annotations =
            Some(BTreeMap::from([("note".to_owned(), "keep".to_owned())]));
        raw.metadata.owner_references = Some(vec![owner.clone()]);
        raw.metadata.finalizers = Some(vec!["example.com/cleanup".to_owned()]);
        raw.immutable = Some(false);
        let mut model = ConfigMapConverter.to_model(raw, None);
        assert_eq!(model.configuration_owner, None);
        model.set_entry("LOG_LEVEL", "debug");

        let payload = ConfigMapConverter.update_payload(&model);
        assert_eq!(
            payload.metadata.labels,
            Some(BTreeMap::from([("team".to_owned(), "ops".to_owned())]))
        );
        assert_eq!(payload.metadata.annotations.unwrap()["note"], "keep");
        assert_eq!(payload.metadata.owner_references, Some(vec![owner]));
        assert_eq!(
            payload.metadata.finalizers,
            Some(vec!["example.com/cleanup".to_owned()])
        );
        assert_eq!(payload.immutable, Some(false));
        assert_eq!(payload.data.unwrap()["LOG_LEVEL"], "debug");
    }

    #[test]
    fn yaml_prefers_backend_text() {
        let raw = ConfigMapConverter.create_payload(&new_config_map());
        let model = ConfigMapConverter.to_model(raw.clone(), Some("kind: ConfigMap\n".to_owned()));
        assert_eq!(model.yaml, "kind: ConfigMap\n");

        let model = ConfigMapConverter.to_model(raw, None);
        assert!(model.yaml.contains("LOG_LEVEL: info"));
    }

    #[test]
    fn entries() {
        let mut model = new_config_map();
        model.binary_data.insert("cert".to_owned(), vec![1, 2, 3]);
        assert_eq!(model.entry_count(), 2);
        assert_eq!(model.set_entry("LOG_LEVEL", "debug").as_deref(), Some("info"));
        assert!(model.remove_entry("cert"));
        assert!(!model.remove_entry("cert"));
        assert_eq!(model.entry_count(), 1);
    }

    #[tokio::test]
    async fn missing_config_map_is_default() {
        let service = service();
        let id = ResourceId::namespaced("prod", "missing-cm");
        let model = service.get(&id).await.unwrap();
        assert_eq!(model, ConfigMapConverter.default_model(&id));
        assert!(!ConfigMapConverter.is_persisted(&model));
    }

    #[tokio::test]
    async fn failed_yaml_fetch_renders_locally() {
        let mut backend = MemoryBackend::<v1::ConfigMap>::default();
        backend.fail_secondary = true;
        let mut raw = ConfigMapConverter.create_payload(&new_config_map());
        raw.metadata.uid = Some("uid-0".to_owned());
        backend.insert(raw);
        let service = ResourceService::new(ConfigMapConverter, backend);

        let model = service
            .get(&ResourceId::namespaced("prod", "app"))
            .await
            .unwrap();
        assert_eq!(model.id.as_deref(), Some("uid-0"));
        assert!(model.yaml.contains("LOG_LEVEL: info"));
    }

    #[tokio::test]
    async fn list_server_error_is_retrieval() {
        let service = ResourceService::new(
            ConfigMapConverter,
            MemoryBackend::<v1::ConfigMap>::failing(500),
        );
        let err = service.list(Some("prod")).await.unwrap_err();
        assert_eq!(err.operation(), Operation::Retrieve);
        assert_eq!(err.to_string(), "Unable to retrieve config maps");
        assert!(matches!(
            err.cause(),
            BackendError::Status { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn save_creates_then_updates() {
        let service = service();
        let draft = service.draft(new_config_map());
        assert!(matches!(draft, Draft::New(_)));
        let created = service.update(&draft).await.unwrap();
        assert!(created.id.is_some());

        let mut fetched = service.get(&created.id()).await.unwrap();
        assert_eq!(fetched.data["LOG_LEVEL"], "info");
        fetched.set_entry("LOG_LEVEL", "debug");
        let updated = service.update(&service.draft(fetched)).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.data["LOG_LEVEL"], "debug");
        assert_eq!(service.list(Some("prod")).await.unwrap().len(), 1);
    }
}
