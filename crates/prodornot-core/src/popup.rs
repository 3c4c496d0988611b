//! Toolbar popup: mark or unmark the active tab's domain.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::{load_domains, load_environments};
use crate::model::{DomainMark, Environment};
use crate::store::{StoreError, SyncStore, write_domains};
use crate::tabs::{TabInfo, TabsApi, TabsError};

pub const ENVIRONMENT_PLACEHOLDER: &str = "Select Environment";

#[derive(Debug, thiserror::Error)]
pub enum QuickToggleError {
    #[error("no active tab")]
    NoActiveTab,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Tabs(#[from] TabsError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentOption {
    pub value: String,
    pub text: String,
}

/// What the popup shows right after opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickToggleView {
    pub hostname: String,
    /// Placeholder first, then one entry per environment.
    pub options: Vec<EnvironmentOption>,
    pub selected: String,
    pub show_remove: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickToggleOutcome {
    /// Nothing was written; the popup stays open.
    Ignored,
    /// The mark was written and the tab reloaded; the popup should close.
    Applied,
}

pub struct QuickToggle<S, T> {
    store: S,
    tabs: T,
    tab: TabInfo,
    hostname: String,
    environments: Vec<Environment>,
    current: Option<DomainMark>,
}

impl<S, T> QuickToggle<S, T>
where
    S: SyncStore,
    T: TabsApi,
{
    pub async fn open(store: S, tabs: T) -> Result<Self, QuickToggleError> {
        let tab = tabs.active_tab().await?.ok_or(QuickToggleError::NoActiveTab)?;
        let hostname = tab.hostname().unwrap_or_default();
        let environments = load_environments(&store).await?;
        let current = if hostname.is_empty() {
            None
        } else {
            load_domains(&store).await?.remove(&hostname)
        };
        Ok(Self {
            store,
            tabs,
            tab,
            hostname,
            environments,
            current,
        })
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn current_mark(&self) -> Option<&DomainMark> {
        self.current.as_ref()
    }

    pub fn view(&self) -> QuickToggleView {
        let mut options = Vec::with_capacity(self.environments.len() + 1);
        options.push(EnvironmentOption {
            value: String::new(),
            text: ENVIRONMENT_PLACEHOLDER.to_string(),
        });
        options.extend(self.environments.iter().map(|environment| EnvironmentOption {
            value: environment.id.clone(),
            text: format!("{} {}", environment.icon, environment.label),
        }));

        QuickToggleView {
            hostname: self.hostname.clone(),
            options,
            selected: self
                .current
                .as_ref()
                .map(|mark| mark.environment_id.clone())
                .unwrap_or_default(),
            show_remove: self.current.is_some(),
        }
    }

    /// Marks the active domain with `environment_id` and reloads the tab.
    pub async fn save(
        &self,
        environment_id: &str,
        now: DateTime<Utc>,
    ) -> Result<QuickToggleOutcome, QuickToggleError> {
        if environment_id.is_empty() || self.hostname.is_empty() {
            return Ok(QuickToggleOutcome::Ignored);
        }

        let mut domains = load_domains(&self.store).await?;
        domains.insert(self.hostname.clone(), DomainMark::new(environment_id, now));
        write_domains(&self.store, &domains).await?;
        info!(domain = %self.hostname, %environment_id, "domain marked");

        self.tabs.reload(self.tab.id).await?;
        Ok(QuickToggleOutcome::Applied)
    }

    /// Removes the active domain's mark and reloads the tab.
    pub async fn remove(&self) -> Result<QuickToggleOutcome, QuickToggleError> {
        if self.hostname.is_empty() {
            return Ok(QuickToggleOutcome::Ignored);
        }

        let mut domains = load_domains(&self.store).await?;
        domains.remove(&self.hostname);
        write_domains(&self.store, &domains).await?;
        info!(domain = %self.hostname, "domain mark removed");

        self.tabs.reload(self.tab.id).await?;
        Ok(QuickToggleOutcome::Applied)
    }

    pub async fn open_settings(&self) -> Result<(), QuickToggleError> {
        self.tabs.open_options_page().await?;
        Ok(())
    }
}
