use super::{Settings, SettingsBackend, SettingsForm, SettingsService, UPDATE_MESSAGE};
use crate::{
    error::{Error, Result},
    notify::Notifications,
    state::{StateStore, StateUpdate},
};
use std::sync::atomic::{AtomicBool, Ordering};

/// Settings as loaded, plus form derived from them
#[derive(Clone, Debug, PartialEq)]
pub struct SettingsView {
    pub settings: Settings,
    pub form: SettingsForm,
}

/// Reads and writes back settings on behalf of the user
pub struct SettingsEditor<'s, B, N> {
    service: SettingsService<B>,
    state: &'s StateStore,
    notifications: N,
    action_in_progress: AtomicBool,
}

impl<'s, B, N> SettingsEditor<'s, B, N>
where
    B: SettingsBackend,
    N: Notifications,
{
    pub fn new(service: SettingsService<B>, state: &'s StateStore, notifications: N) -> Self {
        Self {
            service,
            state,
            notifications,
            action_in_progress: AtomicBool::new(false),
        }
    }

    pub fn service(&self) -> &SettingsService<B> {
        &self.service
    }

    pub fn notifications(&self) -> &N {
        &self.notifications
    }

    pub fn is_action_in_progress(&self) -> bool {
        self.action_in_progress.load(Ordering::SeqCst)
    }

    pub async fn load(&self) -> Result<SettingsView> {
        match self.service.settings().await {
            Ok(settings) => Ok(SettingsView {
                form: SettingsForm::from_settings(&settings),
                settings,
            }),
            Err(e) => {
                self.notifications.error("Failure", &e, e.message());
                Err(e.into())
            }
        }
    }

    /// Applies form values and writes full settings object back
    pub async fn save(&self, view: &mut SettingsView) -> Result<()> {
        view.form.apply_to(&mut view.settings);
        self.action_in_progress.store(true, Ordering::SeqCst);
        let result = self.update_settings(view).await;
        self.action_in_progress.store(false, Ordering::SeqCst);
        result
    }

    /// Adds label from form's label fields
    pub async fn add_filtered_label(&self, view: &mut SettingsView) -> Result<()> {
        let label = view.form.filtered_label();
        view.settings.black_listed_labels.push(label);
        self.update_settings(view).await
    }

    pub async fn remove_filtered_label(&self, view: &mut SettingsView, index: usize) -> Result<()> {
        if index >= view.settings.black_listed_labels.len() {
            return Err(Error::NoSuchLabel(index));
        }
        view.settings.black_listed_labels.remove(index);
        self.update_settings(view).await
    }

    async fn update_settings(&self, view: &mut SettingsView) -> Result<()> {
        let stored = match self.service.update(&view.settings).await {
            Ok(stored) => stored,
            Err(e) => {
                self.notifications.error("Failure", &e, UPDATE_MESSAGE);
                return Err(e.into());
            }
        };
        self.notifications.success("Settings updated");
        for update in StateUpdate::from_settings(&stored) {
            self.state.apply(update);
        }
        self.state.flush()?;
        *view = self.load().await?;
        Ok(())
    }
}
