use anyhow::{anyhow, bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use kube::Client;
use kubedeck::{
    backend::KubeBackend,
    config::{Config, FileConfig, Overrides},
    configmap::{ConfigMap, ConfigMapConverter, ConfigMapService},
    namespace::{Namespace, NamespaceConverter, NamespaceService},
    notify::{LogNotifications, Notifications},
    settings::{HttpSettingsBackend, SettingsEditor, SettingsService, SettingsView},
    state::StateStore,
    Error, ServiceError,
};
use resource_service::{Converter, Draft, ResourceId};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(version, author = "Lach", about = "Manage config maps, namespaces and application settings")]
struct Opts {
    /// YAML config file
    #[clap(long, env = "KUBEDECK_CONFIG")]
    config: Option<PathBuf>,
    /// Additional namespace to treat as system namespace
    #[clap(long = "system-namespace")]
    system_namespaces: Vec<String>,
    /// Base url of settings API
    #[clap(long, env = "KUBEDECK_SETTINGS_URL")]
    settings_url: Option<String>,
    #[clap(long, env = "KUBEDECK_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Where application state is kept between runs
    #[clap(long)]
    state_file: Option<PathBuf>,
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[clap(subcommand)]
    sub: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    #[clap(subcommand)]
    Configmap(ConfigMapCmd),
    #[clap(subcommand)]
    Namespace(NamespaceCmd),
    #[clap(subcommand)]
    Settings(SettingsCmd),
}

#[derive(Subcommand)]
enum ConfigMapCmd {
    List {
        /// All namespaces, if not set
        #[clap(short, long)]
        namespace: Option<String>,
    },
    Get {
        #[clap(short, long)]
        namespace: String,
        name: String,
        /// Print YAML form instead of entries
        #[clap(long)]
        yaml: bool,
    },
    /// Set entries, creating config map if it does not exist
    Set {
        #[clap(short, long)]
        namespace: String,
        name: String,
        /// KEY=VALUE
        entries: Vec<String>,
        #[clap(long)]
        owner: Option<String>,
    },
    Unset {
        #[clap(short, long)]
        namespace: String,
        name: String,
        keys: Vec<String>,
    },
    Delete {
        #[clap(short, long)]
        namespace: String,
        name: String,
    },
}

#[derive(Subcommand)]
enum NamespaceCmd {
    List,
    Get {
        name: String,
        #[clap(long)]
        yaml: bool,
    },
    Create {
        name: String,
    },
    Delete {
        name: String,
    },
    /// Tell system namespaces from user ones, without contacting cluster
    Classify {
        names: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SettingsCmd {
    Show,
    Set(SettingsToggles),
    LabelAdd {
        name: String,
        value: String,
    },
    LabelRemove {
        index: usize,
    },
}

#[derive(Args)]
struct SettingsToggles {
    /// Empty value removes custom logo
    #[clap(long)]
    logo: Option<String>,
    #[clap(long)]
    restrict_bind_mounts: Option<bool>,
    #[clap(long)]
    restrict_privileged_mode: Option<bool>,
    #[clap(long)]
    restrict_host_namespace: Option<bool>,
    #[clap(long)]
    disable_device_mapping: Option<bool>,
    #[clap(long)]
    disable_stack_management: Option<bool>,
    #[clap(long)]
    disable_container_capabilities: Option<bool>,
    #[clap(long)]
    enable_host_management_features: Option<bool>,
    #[clap(long)]
    enable_volume_browser: Option<bool>,
    #[clap(long)]
    enable_edge_compute_features: Option<bool>,
    #[clap(long)]
    enable_telemetry: Option<bool>,
    /// Seconds, one of 5, 10 or 30
    #[clap(long)]
    edge_agent_checkin_interval: Option<u32>,
}

impl SettingsToggles {
    fn apply(&self, view: &mut SettingsView) -> Result<(), Error> {
        if let Some(seconds) = self.edge_agent_checkin_interval {
            view.settings.set_edge_agent_checkin_interval(seconds)?;
        }
        if let Some(logo) = &self.logo {
            view.form.custom_logo = !logo.is_empty();
            view.settings.logo_url = logo.clone();
        }
        let form = &mut view.form;
        for (value, target) in [
            (self.restrict_bind_mounts, &mut form.restrict_bind_mounts),
            (self.restrict_privileged_mode, &mut form.restrict_privileged_mode),
            (
                self.restrict_host_namespace,
                &mut form.restrict_host_namespace_for_regular_users,
            ),
            (
                self.disable_device_mapping,
                &mut form.disable_device_mapping_for_regular_users,
            ),
            (
                self.disable_stack_management,
                &mut form.disable_stack_management_for_regular_users,
            ),
            (
                self.disable_container_capabilities,
                &mut form.disable_container_capabilities_for_regular_users,
            ),
            (
                self.enable_host_management_features,
                &mut form.enable_host_management_features,
            ),
            (self.enable_volume_browser, &mut form.enable_volume_browser),
            (
                self.enable_edge_compute_features,
                &mut form.enable_edge_compute_features,
            ),
            (self.enable_telemetry, &mut form.enable_telemetry),
        ] {
            if let Some(value) = value {
                *target = value;
            }
        }
        Ok(())
    }
}

/// Notify about failed operation, then hand the error up
fn report<T>(result: Result<T, ServiceError>) -> anyhow::Result<T> {
    result.map_err(|e| {
        LogNotifications.error("Failure", &e, e.message());
        anyhow::Error::new(e)
    })
}

fn parse_entry(entry: &str) -> Result<(&str, &str), Error> {
    entry
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| Error::InvalidEntry(entry.to_owned()))
}

fn print_config_map(config_map: &ConfigMap, yaml: bool) {
    if yaml {
        print!("{}", config_map.yaml);
        return;
    }
    println!("Name:      {}", config_map.name);
    println!("Namespace: {}", config_map.namespace);
    if let Some(owner) = &config_map.configuration_owner {
        println!("Owner:     {}", owner);
    }
    if let Some(created) = &config_map.creation_date {
        println!("Created:   {}", created.to_rfc3339());
    }
    for (key, value) in &config_map.data {
        println!("  {}={}", key, value);
    }
    for (key, value) in &config_map.binary_data {
        println!("  {}=<{} bytes>", key, value.len());
    }
}

fn print_namespace(namespace: &Namespace) {
    println!(
        "{:<40} {:<12} {}",
        namespace.name,
        namespace.status.as_deref().unwrap_or("-"),
        if namespace.is_system { "system" } else { "user" }
    );
}

async fn run_config_map(client: Client, cmd: ConfigMapCmd) -> anyhow::Result<()> {
    let service = ConfigMapService::new(ConfigMapConverter, KubeBackend::new(client));
    match cmd {
        ConfigMapCmd::List { namespace } => {
            for config_map in report(service.list(namespace.as_deref()).await)? {
                println!(
                    "{:<20} {:<40} {}",
                    config_map.namespace,
                    config_map.name,
                    config_map.entry_count()
                );
            }
        }
        ConfigMapCmd::Get {
            namespace,
            name,
            yaml,
        } => {
            let config_map =
                report(service.get(&ResourceId::namespaced(namespace, name)).await)?;
            print_config_map(&config_map, yaml);
        }
        ConfigMapCmd::Set {
            namespace,
            name,
            entries,
            owner,
        } => {
            let mut config_map =
                report(service.get(&ResourceId::namespaced(namespace, name)).await)?;
            for entry in &entries {
                let (key, value) = parse_entry(entry)?;
                config_map.set_entry(key, value);
            }
            if owner.is_some() {
                config_map.configuration_owner = owner;
            }
            let draft = service.draft(config_map);
            let created = draft.is_new();
            let saved = report(service.update(&draft).await)?;
            LogNotifications.success(&format!(
                "Config map {} {}",
                saved.id(),
                if created { "created" } else { "updated" }
            ));
        }
        ConfigMapCmd::Unset {
            namespace,
            name,
            keys,
        } => {
            let config_map =
                report(service.get(&ResourceId::namespaced(namespace, name)).await)?;
            let draft = service.draft(config_map);
            if draft.is_new() {
                bail!("config map {} does not exist", draft.model().id());
            }
            let mut config_map = draft.into_model();
            for key in &keys {
                if !config_map.remove_entry(key) {
                    log::warn!("No entry {} in {}", key, config_map.id());
                }
            }
            let draft = Draft::Existing(config_map);
            let saved = report(service.update(&draft).await)?;
            LogNotifications.success(&format!("Config map {} updated", saved.id()));
        }
        ConfigMapCmd::Delete { namespace, name } => {
            let config_map =
                report(service.get(&ResourceId::namespaced(namespace, name)).await)?;
            report(service.delete(&config_map).await)?;
            LogNotifications.success(&format!("Config map {} deleted", config_map.id()));
        }
    }
    Ok(())
}

async fn connect() -> anyhow::Result<Client> {
    Client::try_default()
        .await
        .context("failed to connect to cluster")
}

async fn run_namespace(config: &Config, cmd: NamespaceCmd) -> anyhow::Result<()> {
    let helper = config.namespace_helper();
    if let NamespaceCmd::Classify { names } = &cmd {
        for name in names {
            println!("{:<40} {}", name, helper.classify(name));
        }
        return Ok(());
    }
    let service = NamespaceService::new(NamespaceConverter::new(helper), KubeBackend::new(connect().await?));
    match cmd {
        NamespaceCmd::List => {
            for namespace in report(service.list(None).await)? {
                print_namespace(&namespace);
            }
        }
        NamespaceCmd::Get { name, yaml } => {
            let namespace = report(service.get(&ResourceId::cluster(name)).await)?;
            if yaml {
                print!("{}", namespace.yaml);
            } else {
                print_namespace(&namespace);
            }
        }
        NamespaceCmd::Create { name } => {
            let namespace = service
                .converter()
                .default_model(&ResourceId::cluster(name));
            let created = report(service.create(&namespace).await)?;
            LogNotifications.success(&format!("Namespace {} created", created.name));
        }
        NamespaceCmd::Delete { name } => {
            let namespace = report(service.get(&ResourceId::cluster(name)).await)?;
            if namespace.is_system {
                bail!("refusing to delete system namespace {}", namespace.name);
            }
            report(service.delete(&namespace).await)?;
            LogNotifications.success(&format!("Namespace {} deleted", namespace.name));
        }
        NamespaceCmd::Classify { .. } => {}
    }
    Ok(())
}

async fn run_settings(config: &Config, cmd: SettingsCmd) -> anyhow::Result<()> {
    let url = config
        .settings_url
        .as_ref()
        .ok_or_else(|| anyhow!("settings url is not configured, use --settings-url"))?;
    let state = match &config.state_file {
        Some(path) => StateStore::open(path)?,
        None => StateStore::default(),
    };
    let backend = HttpSettingsBackend::new(url, config.token.clone()).map_err(Error::Url)?;
    let editor = SettingsEditor::new(SettingsService::new(backend), &state, LogNotifications);

    let mut view = editor.load().await?;
    match cmd {
        SettingsCmd::Show => {
            println!("{}", serde_json::to_string_pretty(&view.settings)?);
            if view.form.is_container_edit_disabled() {
                println!("Container editing is restricted for regular users");
            }
        }
        SettingsCmd::Set(toggles) => {
            toggles.apply(&mut view)?;
            editor.save(&mut view).await?;
        }
        SettingsCmd::LabelAdd { name, value } => {
            view.form.label_name = name;
            view.form.label_value = value;
            editor.add_filtered_label(&mut view).await?;
        }
        SettingsCmd::LabelRemove { index } => {
            editor.remove_filtered_label(&mut view, index).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts: Opts = Opts::parse();

    let level = match opts.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let file = match &opts.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = Config::resolve(
        file,
        Overrides {
            system_namespaces: opts.system_namespaces,
            settings_url: opts.settings_url,
            token: opts.token,
            state_file: opts.state_file,
        },
    )?;
    log::debug!("System namespaces: {:?}", config.system_namespaces);

    match opts.sub {
        SubCommand::Configmap(cmd) => run_config_map(connect().await?, cmd).await?,
        SubCommand::Namespace(cmd) => run_namespace(&config, cmd).await?,
        SubCommand::Settings(cmd) => run_settings(&config, cmd).await?,
    }
    Ok(())
}
