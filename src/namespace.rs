use crate::{backend::KubeBackend, configmap::render_yaml};
use chrono::{DateTime, Utc};
use k8s_openapi::{
    api::core::v1,
    apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference},
};
use resource_service::{Converter, Messages, ResourceId, ResourceService};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display},
};

pub const DEFAULT_SYSTEM_NAMESPACES: &[&str] = &["kube-system", "kube-public", "kube-node-lease"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamespaceClass {
    System,
    User,
}

impl Display for NamespaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Classifies namespaces against configured set of reserved names
#[derive(Clone, Debug)]
pub struct NamespaceHelper {
    system: BTreeSet<String>,
}

impl Default for NamespaceHelper {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_NAMESPACES.iter().copied())
    }
}

impl NamespaceHelper {
    pub fn new<I, S>(system: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            system: system.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_system_namespace(&self, namespace: &str) -> bool {
        self.system.contains(namespace)
    }

    pub fn classify(&self, namespace: &str) -> NamespaceClass {
        if self.is_system_namespace(namespace) {
            NamespaceClass::System
        } else {
            NamespaceClass::User
        }
    }
}

pub type NamespaceService = ResourceService<NamespaceConverter, KubeBackend<v1::Namespace>>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Namespace {
    pub id: Option<String>,
    pub name: String,
    /// Phase, as reported by cluster
    pub status: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub resource_version: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub owner_references: Vec<OwnerReference>,
    pub finalizers: Vec<String>,
    /// `spec.finalizers`, which must drain before namespace is removed
    pub spec_finalizers: Option<Vec<String>>,
    pub yaml: String,
    pub is_system: bool,
}

pub struct NamespaceConverter {
    helper: NamespaceHelper,
}

impl NamespaceConverter {
    pub fn new(helper: NamespaceHelper) -> Self {
        Self { helper }
    }
}

fn payload_meta(model: &Namespace) -> ObjectMeta {
    ObjectMeta {
        name: Some(model.name.clone()),
        labels: (!model.labels.is_empty()).then(|| model.labels.clone()),
        annotations: (!model.annotations.is_empty()).then(|| model.annotations.clone()),
        owner_references: (!model.owner_references.is_empty())
            .then(|| model.owner_references.clone()),
        finalizers: (!model.finalizers.is_empty()).then(|| model.finalizers.clone()),
        ..Default::default()
    }
}

fn payload_spec(model: &Namespace) -> Option<v1::NamespaceSpec> {
    model.spec_finalizers.as_ref().map(|finalizers| v1::NamespaceSpec {
        finalizers: Some(finalizers.clone()),
    })
}

impl Converter for NamespaceConverter {
    type Raw = v1::Namespace;
    type Secondary = String;
    type Model = Namespace;

    const MESSAGES: Messages = Messages {
        get: "Unable to retrieve namespace",
        list: "Unable to retrieve namespaces",
        create: "Unable to create namespace",
        update: "Unable to update namespace",
        delete: "Unable to delete namespace",
    };

    fn to_model(&self, raw: v1::Namespace, yaml: Option<String>) -> Namespace {
        let yaml = yaml.unwrap_or_else(|| render_yaml(&raw));
        let name = raw.metadata.name.unwrap_or_default();
        Namespace {
            id: raw.metadata.uid,
            is_system: self.helper.is_system_namespace(&name),
            name,
            status: raw.status.and_then(|s| s.phase),
            creation_date: raw.metadata.creation_timestamp.map(|t| t.0),
            resource_version: raw.metadata.resource_version,
            labels: raw.metadata.labels.unwrap_or_default(),
            annotations: raw.metadata.annotations.unwrap_or_default(),
            owner_references: raw.metadata.owner_references.unwrap_or_default(),
            finalizers: raw.metadata.finalizers.unwrap_or_default(),
            spec_finalizers: raw.spec.and_then(|spec| spec.finalizers),
            yaml,
        }
    }

    fn default_model(&self, id: &ResourceId) -> Namespace {
        Namespace {
            name: id.name.clone(),
            is_system: self.helper.is_system_namespace(&id.name),
            ..Default::default()
        }
    }

    fn create_payload(&self, model: &Namespace) -> v1::Namespace {
        v1::Namespace {
            metadata: payload_meta(model),
            spec: payload_spec(model),
            ..Default::default()
        }
    }

    fn update_payload(&self, model: &Namespace) -> v1::Namespace {
        v1::Namespace {
            metadata: ObjectMeta {
                uid: model.id.clone(),
                resource_version: model.resource_version.clone(),
                ..payload_meta(model)
            },
            spec: payload_spec(model),
            ..Default::default()
        }
    }

    fn identity(&self, model: &Namespace) -> ResourceId {
        ResourceId::cluster(&model.name)
    }

    fn is_persisted(&self, model: &Namespace) -> bool {
        model.id.is_some()
    }
}
