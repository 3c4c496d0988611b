use tracing::{debug, error};

use crate::badge::Badge;
use crate::config::{CONFIG_KEYS, EffectiveConfig, load_effective_config};
use crate::store::{StorageArea, StoreChange, SyncStore};
use crate::tabs::RuntimeMessage;

/// Something that may require the page badge to be redrawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorEvent {
    DocumentReady,
    StorageChanged(StoreChange),
    Message(RuntimeMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Rerender,
    Ignore,
}

#[must_use]
pub fn reaction_for(event: &IndicatorEvent) -> Reaction {
    match event {
        IndicatorEvent::DocumentReady => Reaction::Rerender,
        IndicatorEvent::Message(RuntimeMessage::UpdateIndicator) => Reaction::Rerender,
        IndicatorEvent::StorageChanged(change) => {
            if change.area == StorageArea::Sync && CONFIG_KEYS.iter().any(|key| change.touches(key))
            {
                Reaction::Rerender
            } else {
                Reaction::Ignore
            }
        }
    }
}

/// The badge for `hostname`, if its mark resolves to a known environment.
#[must_use]
pub fn resolve_badge(config: &EffectiveConfig, hostname: &str) -> Option<Badge> {
    let environment = config.environment_for_domain(hostname)?;
    Some(Badge::new(environment, config.indicator))
}

/// The page document the badge is drawn into.
pub trait BadgeHost {
    type Error: std::fmt::Display;

    /// Removes the badge element if present.
    fn remove_badge(&mut self) -> Result<(), Self::Error>;
    fn insert_badge(&mut self, badge: &Badge) -> Result<(), Self::Error>;
}

/// Per-page renderer state. One instance lives for the lifetime of the page
/// script; nothing about the page is kept outside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorRenderer {
    hostname: String,
}

impl IndicatorRenderer {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    #[must_use]
    pub fn decide(&self, config: &EffectiveConfig) -> Option<Badge> {
        resolve_badge(config, &self.hostname)
    }

    /// Clears any previous badge, then draws `badge` if there is one.
    pub fn apply<H: BadgeHost + ?Sized>(
        &self,
        host: &mut H,
        badge: Option<&Badge>,
    ) -> Result<bool, H::Error> {
        host.remove_badge()?;
        let Some(badge) = badge else {
            return Ok(false);
        };
        host.insert_badge(badge)?;
        Ok(true)
    }

    /// Loads the effective configuration and redraws. Failures are logged and
    /// leave the page without a badge; they never propagate to the page.
    pub async fn refresh<S, H>(&self, store: &S, host: &mut H) -> Option<Badge>
    where
        S: SyncStore + ?Sized,
        H: BadgeHost + ?Sized,
    {
        let badge = match load_effective_config(store).await {
            Ok(config) => self.decide(&config),
            Err(error) => {
                error!(hostname = %self.hostname, %error, "failed to load indicator configuration");
                None
            }
        };

        match self.apply(host, badge.as_ref()) {
            Ok(true) => {
                debug!(hostname = %self.hostname, "indicator drawn");
                badge
            }
            Ok(false) => {
                debug!(hostname = %self.hostname, "domain not marked");
                None
            }
            Err(error) => {
                error!(hostname = %self.hostname, %error, "failed to draw indicator");
                None
            }
        }
    }

    pub async fn handle<S, H>(&self, event: &IndicatorEvent, store: &S, host: &mut H) -> Reaction
    where
        S: SyncStore + ?Sized,
        H: BadgeHost + ?Sized,
    {
        let reaction = reaction_for(event);
        if reaction == Reaction::Rerender {
            self.refresh(store, host).await;
        }
        reaction
    }
}
