//! Platform-agnostic core of the ProdOrNot extension.
//!
//! Everything here runs natively as well as in the browser: the data model
//! and its stored representation, default resolution, the badge geometry, the
//! page renderer's decisions, and the settings page and popup workflows. The
//! browser enters only through the [`SyncStore`], [`TabsApi`],
//! [`UserPrompt`] and [`BadgeHost`] traits.

#![cfg_attr(test, allow(clippy::expect_used, clippy::panic))]

pub mod badge;
pub mod config;
pub mod indicator;
pub mod model;
pub mod popup;
pub mod settings;
pub mod store;
pub mod tabs;
pub mod testing;

pub use badge::{Badge, BadgeContent, BadgeStyle, INDICATOR_ELEMENT_ID, compute_badge_style};
pub use config::{
    CONFIG_KEYS, EffectiveConfig, LogLevel, STORAGE_DOMAINS_KEY, STORAGE_ENVIRONMENTS_KEY,
    STORAGE_INDICATOR_SETTINGS_KEY, default_environments, load_effective_config,
    resolve_log_level,
};
pub use indicator::{BadgeHost, IndicatorEvent, IndicatorRenderer, Reaction, reaction_for};
pub use model::{
    DomainMark, DomainMarks, Environment, IndicatorPosition, IndicatorSettings, IndicatorStyle,
    derive_environment_id, iso_timestamp,
};
pub use popup::{QuickToggle, QuickToggleError, QuickToggleOutcome, QuickToggleView};
pub use settings::{
    DeleteOutcome, DomainRow, EnvironmentDraft, SaveFeedback, SettingsError, SettingsSurface,
    UserPrompt,
};
pub use store::{StorageArea, StoreChange, StoreError, StoreSnapshot, SyncStore};
pub use tabs::{RuntimeMessage, TabId, TabInfo, TabsApi, TabsError, hostname_from_url};
