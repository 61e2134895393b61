use crate::{
    error::{Error, Result},
    namespace::{NamespaceHelper, DEFAULT_SYSTEM_NAMESPACES},
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use url::Url;

/// Contents of optional YAML config file
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// Reserved in addition to built-in system namespaces
    pub system_namespaces: Vec<String>,
    pub settings_url: Option<String>,
    pub state_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        serde_yaml_with_quirks::from_str(contents).map_err(|e| Error::Config(path.to_owned(), e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).map_err(|e| Error::Io(path.to_owned(), e))?;
        Self::parse(path, &contents)
    }
}

/// Values given on command line or environment, taking precedence over file
#[derive(Debug, Default)]
pub struct Overrides {
    pub system_namespaces: Vec<String>,
    pub settings_url: Option<String>,
    pub token: Option<String>,
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
pub struct Config {
    pub system_namespaces: Vec<String>,
    pub settings_url: Option<Url>,
    pub token: Option<String>,
    pub state_file: Option<PathBuf>,
}

impl Config {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let mut system_namespaces: Vec<String> = DEFAULT_SYSTEM_NAMESPACES
            .iter()
            .map(|ns| ns.to_string())
            .collect();
        for ns in file
            .system_namespaces
            .into_iter()
            .chain(overrides.system_namespaces)
        {
            if !system_namespaces.contains(&ns) {
                system_namespaces.push(ns);
            }
        }

        let settings_url = overrides
            .settings_url
            .or(file.settings_url)
            .map(|url| Url::parse(&url))
            .transpose()?;

        Ok(Self {
            system_namespaces,
            settings_url,
            token: overrides.token,
            state_file: overrides.state_file.or(file.state_file),
        })
    }

    pub fn namespace_helper(&self) -> NamespaceHelper {
        NamespaceHelper::new(self.system_namespaces.iter().cloned())
    }
}
