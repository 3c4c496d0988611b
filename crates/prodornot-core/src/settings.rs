//! Management page logic: environment CRUD, domain mark removal and indicator
//! preferences, backed by a working copy of the stored configuration.

use std::cell::RefCell;

use tracing::{info, warn};

use crate::config::{
    EffectiveConfig, find_environment, load_domains, load_effective_config, load_environments,
};
use crate::model::{DomainMarks, Environment, IndicatorSettings, derive_environment_id};
use crate::store::{
    StoreError, SyncStore, write_domains, write_environments, write_indicator_settings,
};
use crate::tabs::{BroadcastReport, TabsApi, broadcast_indicator_update};

pub const CONFIRM_DELETE_ENVIRONMENT: &str = "Are you sure you want to delete this environment? This will also remove all domain markings using this environment.";
pub const CONFIRM_DELETE_DOMAIN: &str = "Are you sure you want to remove this domain marking?";
pub const ALERT_DELETE_DOMAIN_FAILED: &str = "Failed to delete domain. Please try again.";

pub const SAVE_INDICATOR_LABEL: &str = "Save Indicator Settings";
pub const SAVE_INDICATOR_SAVED_LABEL: &str = "Saved!";
pub const SAVE_INDICATOR_FAILED_LABEL: &str = "Error Saving!";
pub const SAVE_FEEDBACK_RESET_MS: u32 = 2_000;

/// Interactive confirmation and alerts.
pub trait UserPrompt {
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("environment label must not be empty")]
    EmptyLabel,
    #[error("environment id `{id}` is already in use")]
    DuplicateEnvironmentId { id: String },
    #[error("environment `{id}` does not exist")]
    UnknownEnvironment { id: String },
}

impl SettingsError {
    /// Text for the page's error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Store(_) => "Could not reach extension storage. Please try again.".to_string(),
            Self::EmptyLabel => "Environment label is required.".to_string(),
            Self::DuplicateEnvironmentId { id } => {
                format!("An environment with id `{id}` already exists.")
            }
            Self::UnknownEnvironment { id } => format!("Environment `{id}` no longer exists."),
        }
    }
}

/// Contents of the environment form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentDraft {
    pub label: String,
    pub color: String,
    pub icon: String,
}

impl From<&Environment> for EnvironmentDraft {
    fn from(environment: &Environment) -> Self {
        Self {
            label: environment.label.clone(),
            color: environment.color.clone(),
            icon: environment.icon.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRow {
    pub domain: String,
    pub environment_id: String,
    pub icon: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    EnvironmentDeleted { removed_domains: Vec<String> },
    DomainDeleted { broadcast: BroadcastReport },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFeedback {
    Saved,
    Failed,
}

impl SaveFeedback {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Saved => SAVE_INDICATOR_SAVED_LABEL,
            Self::Failed => SAVE_INDICATOR_FAILED_LABEL,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SettingsState {
    environments: Vec<Environment>,
    domains: DomainMarks,
    indicator: IndicatorSettings,
    editing: Option<String>,
}

/// The settings page's working copy plus its collaborators.
///
/// Methods take `&self` and never hold the state borrow across an await, so
/// browser event handlers can call into one shared instance while an earlier
/// handler is still waiting on the store.
pub struct SettingsSurface<S, T, P> {
    store: S,
    tabs: T,
    prompt: P,
    state: RefCell<SettingsState>,
}

impl<S, T, P> SettingsSurface<S, T, P>
where
    S: SyncStore,
    T: TabsApi,
    P: UserPrompt,
{
    pub fn new(store: S, tabs: T, prompt: P, config: EffectiveConfig) -> Self {
        Self {
            store,
            tabs,
            prompt,
            state: RefCell::new(SettingsState {
                environments: config.environments,
                domains: config.domains,
                indicator: config.indicator,
                editing: None,
            }),
        }
    }

    pub async fn load(store: S, tabs: T, prompt: P) -> Result<Self, SettingsError> {
        let config = load_effective_config(&store).await?;
        Ok(Self::new(store, tabs, prompt, config))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn environments(&self) -> Vec<Environment> {
        self.state.borrow().environments.clone()
    }

    pub fn domains(&self) -> DomainMarks {
        self.state.borrow().domains.clone()
    }

    pub fn indicator_settings(&self) -> IndicatorSettings {
        self.state.borrow().indicator
    }

    /// Rows for the domain list. Marks whose environment is gone are left
    /// out of the list but stay in the store.
    pub fn domain_rows(&self) -> Vec<DomainRow> {
        let state = self.state.borrow();
        state
            .domains
            .iter()
            .filter_map(|(domain, mark)| {
                let environment = find_environment(&state.environments, &mark.environment_id)?;
                Some(DomainRow {
                    domain: domain.clone(),
                    environment_id: environment.id.clone(),
                    icon: environment.icon.clone(),
                    label: environment.label.clone(),
                })
            })
            .collect()
    }

    pub fn editing(&self) -> Option<String> {
        self.state.borrow().editing.clone()
    }

    pub fn begin_create(&self) -> EnvironmentDraft {
        self.state.borrow_mut().editing = None;
        EnvironmentDraft::default()
    }

    /// Starts editing `id`. Returns the prefilled draft, or `None` when the
    /// environment no longer exists.
    pub fn begin_edit(&self, id: &str) -> Option<EnvironmentDraft> {
        let mut state = self.state.borrow_mut();
        let draft = find_environment(&state.environments, id).map(EnvironmentDraft::from)?;
        state.editing = Some(id.to_string());
        Some(draft)
    }

    pub fn cancel_edit(&self) {
        self.state.borrow_mut().editing = None;
    }

    /// Creates a new environment or updates the one being edited, then
    /// persists the whole list. Edits apply to the stored list, not the
    /// working copy.
    pub async fn save_environment(
        &self,
        draft: EnvironmentDraft,
    ) -> Result<Environment, SettingsError> {
        if draft.label.trim().is_empty() {
            return Err(SettingsError::EmptyLabel);
        }

        let editing = self.editing();
        let mut environments = load_environments(&self.store).await?;
        let saved = match editing.as_deref() {
            Some(id) => {
                let Some(existing) = environments.iter_mut().find(|env| env.id == id) else {
                    return Err(SettingsError::UnknownEnvironment { id: id.to_string() });
                };
                existing.label = draft.label;
                existing.color = draft.color;
                existing.icon = draft.icon;
                existing.clone()
            }
            None => {
                let id = derive_environment_id(&draft.label);
                if find_environment(&environments, &id).is_some() {
                    return Err(SettingsError::DuplicateEnvironmentId { id });
                }
                let created = Environment {
                    id,
                    label: draft.label,
                    color: draft.color,
                    icon: draft.icon,
                };
                environments.push(created.clone());
                created
            }
        };

        write_environments(&self.store, &environments).await?;

        let mut state = self.state.borrow_mut();
        state.environments = environments;
        state.editing = None;
        info!(environment_id = %saved.id, "environment saved");
        Ok(saved)
    }

    /// Deletes an environment and every domain mark that references it.
    pub async fn delete_environment(&self, id: &str) -> Result<DeleteOutcome, SettingsError> {
        if !self.prompt.confirm(CONFIRM_DELETE_ENVIRONMENT) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let mut environments = load_environments(&self.store).await?;
        environments.retain(|environment| environment.id != id);
        write_environments(&self.store, &environments).await?;
        self.state.borrow_mut().environments = environments;

        let mut domains = load_domains(&self.store).await?;
        let removed_domains = domains
            .iter()
            .filter(|(_, mark)| mark.environment_id == id)
            .map(|(domain, _)| domain.clone())
            .collect::<Vec<_>>();
        domains.retain(|_, mark| mark.environment_id != id);
        write_domains(&self.store, &domains).await?;
        self.state.borrow_mut().domains = domains;

        info!(
            environment_id = %id,
            removed = removed_domains.len(),
            "environment deleted"
        );
        Ok(DeleteOutcome::EnvironmentDeleted { removed_domains })
    }

    /// Removes one domain mark, then reloads tabs on that domain and asks all
    /// other tabs to refresh their indicator.
    pub async fn delete_domain(&self, domain: &str) -> Result<DeleteOutcome, SettingsError> {
        if !self.prompt.confirm(CONFIRM_DELETE_DOMAIN) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let domains = match self.remove_domain_mark(domain).await {
            Ok(domains) => domains,
            Err(error) => {
                self.prompt.alert(ALERT_DELETE_DOMAIN_FAILED);
                return Err(error.into());
            }
        };
        self.state.borrow_mut().domains = domains;
        info!(%domain, "domain mark removed");

        let broadcast = match broadcast_indicator_update(&self.tabs, Some(domain)).await {
            Ok(report) => report,
            Err(error) => {
                warn!(%domain, %error, "could not enumerate tabs after removing domain mark");
                BroadcastReport::default()
            }
        };
        Ok(DeleteOutcome::DomainDeleted { broadcast })
    }

    async fn remove_domain_mark(&self, domain: &str) -> Result<DomainMarks, StoreError> {
        let mut domains = load_domains(&self.store).await?;
        domains.remove(domain);
        write_domains(&self.store, &domains).await?;
        Ok(domains)
    }

    /// Persists indicator preferences and asks every tab to redraw.
    pub async fn save_indicator_settings(
        &self,
        settings: IndicatorSettings,
    ) -> Result<BroadcastReport, SettingsError> {
        write_indicator_settings(&self.store, settings).await?;
        self.state.borrow_mut().indicator = settings;
        info!(
            style = settings.style.as_str(),
            position = settings.position.as_str(),
            "indicator settings saved"
        );

        match broadcast_indicator_update(&self.tabs, None).await {
            Ok(report) => Ok(report),
            Err(error) => {
                warn!(%error, "could not enumerate tabs after saving indicator settings");
                Ok(BroadcastReport::default())
            }
        }
    }
}
