//! Storage keys, built-in defaults and the single place where raw store
//! values are resolved into the configuration every surface works with.

use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{
    DomainMark, DomainMarks, Environment, IndicatorPosition, IndicatorSettings, IndicatorStyle,
};
use crate::store::{StoreError, StoreSnapshot, SyncStore};

pub const STORAGE_DOMAINS_KEY: &str = "prodornot_domains";
pub const STORAGE_ENVIRONMENTS_KEY: &str = "prodornot_environments";
pub const STORAGE_INDICATOR_SETTINGS_KEY: &str = "prodornot_indicator_settings";

pub const CONFIG_KEYS: [&str; 3] = [
    STORAGE_DOMAINS_KEY,
    STORAGE_ENVIRONMENTS_KEY,
    STORAGE_INDICATOR_SETTINGS_KEY,
];

pub const ENV_LOG_LEVEL: &str = "PRODORNOT_LOG";

#[must_use]
pub fn default_environments() -> Vec<Environment> {
    vec![
        Environment::new("dev", "Development", "#4caf50", "🛠️"),
        Environment::new("staging", "Staging", "#ffc107", "🧪"),
        Environment::new("prod", "Production", "#f44336", "🚨"),
    ]
}

/// Environments, marks and indicator settings after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub environments: Vec<Environment>,
    pub domains: DomainMarks,
    pub indicator: IndicatorSettings,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            environments: default_environments(),
            domains: DomainMarks::new(),
            indicator: IndicatorSettings::default(),
        }
    }
}

impl EffectiveConfig {
    #[must_use]
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        Self {
            environments: resolve_environments(snapshot.get(STORAGE_ENVIRONMENTS_KEY)),
            domains: resolve_domains(snapshot.get(STORAGE_DOMAINS_KEY)),
            indicator: resolve_indicator_settings(snapshot.get(STORAGE_INDICATOR_SETTINGS_KEY)),
        }
    }

    #[must_use]
    pub fn environment(&self, id: &str) -> Option<&Environment> {
        find_environment(&self.environments, id)
    }

    /// The environment a hostname is marked with. Marks pointing at an
    /// environment that no longer exists resolve to `None`.
    #[must_use]
    pub fn environment_for_domain(&self, hostname: &str) -> Option<&Environment> {
        let mark = self.domains.get(hostname)?;
        self.environment(&mark.environment_id)
    }
}

#[must_use]
pub fn find_environment<'a>(environments: &'a [Environment], id: &str) -> Option<&'a Environment> {
    environments.iter().find(|environment| environment.id == id)
}

/// Reads all three keys in one round trip and resolves them.
pub async fn load_effective_config<S: SyncStore + ?Sized>(
    store: &S,
) -> Result<EffectiveConfig, StoreError> {
    let snapshot = store.get(&CONFIG_KEYS).await?;
    Ok(EffectiveConfig::from_snapshot(&snapshot))
}

pub async fn load_environments<S: SyncStore + ?Sized>(
    store: &S,
) -> Result<Vec<Environment>, StoreError> {
    let snapshot = store.get(&[STORAGE_ENVIRONMENTS_KEY]).await?;
    Ok(resolve_environments(snapshot.get(STORAGE_ENVIRONMENTS_KEY)))
}

pub async fn load_domains<S: SyncStore + ?Sized>(store: &S) -> Result<DomainMarks, StoreError> {
    let snapshot = store.get(&[STORAGE_DOMAINS_KEY]).await?;
    Ok(resolve_domains(snapshot.get(STORAGE_DOMAINS_KEY)))
}

#[must_use]
pub fn resolve_environments(raw: Option<&Value>) -> Vec<Environment> {
    let Some(raw) = raw.filter(|value| !value.is_null()) else {
        return default_environments();
    };
    let Some(entries) = raw.as_array() else {
        warn!(key = STORAGE_ENVIRONMENTS_KEY, "environments are not a list, using defaults");
        return default_environments();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            serde_json::from_value::<Environment>(entry.clone())
                .map_err(|error| debug!(index, %error, "skipping malformed environment"))
                .ok()
        })
        .collect()
}

#[must_use]
pub fn resolve_domains(raw: Option<&Value>) -> DomainMarks {
    let Some(raw) = raw.filter(|value| !value.is_null()) else {
        return DomainMarks::new();
    };
    let Some(entries) = raw.as_object() else {
        warn!(key = STORAGE_DOMAINS_KEY, "domain marks are not an object, ignoring");
        return DomainMarks::new();
    };

    let mut domains = DomainMarks::new();
    for (domain, entry) in entries {
        match serde_json::from_value::<DomainMark>(entry.clone()) {
            Ok(mark) => {
                domains.insert(domain.clone(), mark);
            }
            Err(error) => {
                debug!(%domain, %error, "skipping malformed domain mark");
            }
        }
    }
    domains
}

#[must_use]
pub fn resolve_indicator_settings(raw: Option<&Value>) -> IndicatorSettings {
    let defaults = IndicatorSettings::default();
    let Some(fields) = raw.and_then(Value::as_object) else {
        return defaults;
    };

    let style = fields
        .get("style")
        .and_then(Value::as_str)
        .and_then(IndicatorStyle::parse)
        .unwrap_or(defaults.style);
    let position = fields
        .get("position")
        .and_then(Value::as_str)
        .and_then(IndicatorPosition::parse)
        .unwrap_or(defaults.position);

    IndicatorSettings { style, position }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    #[must_use]
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

#[must_use]
pub fn parse_log_level(raw: &str) -> Option<LogLevel> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warn),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}

/// Resolves the log level from the value of `PRODORNOT_LOG` captured at build
/// time. Returns the level and a description of where it came from.
#[must_use]
pub fn resolve_log_level(raw: Option<&str>) -> (LogLevel, String) {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return (LogLevel::Info, "default".to_string());
    };
    if let Some(level) = parse_log_level(raw) {
        return (level, ENV_LOG_LEVEL.to_string());
    }
    (
        LogLevel::Info,
        format!(
            "{}:invalid({raw})->{}",
            ENV_LOG_LEVEL,
            LogLevel::Info.as_str()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_snapshot_resolves_to_defaults() {
        let config = EffectiveConfig::from_snapshot(&StoreSnapshot::new());
        assert_eq!(config, EffectiveConfig::default());
        assert_eq!(config.environments.len(), 3);
        assert_eq!(config.indicator.style, IndicatorStyle::Ribbon);
        assert_eq!(config.indicator.position, IndicatorPosition::TopRight);
    }

    #[test]
    fn malformed_environments_fall_back_to_defaults() {
        let resolved = resolve_environments(Some(&json!({ "not": "a list" })));
        assert_eq!(resolved, default_environments());

        let resolved = resolve_environments(Some(&Value::Null));
        assert_eq!(resolved, default_environments());
    }

    #[test]
    fn malformed_environment_entries_are_dropped_individually() {
        let resolved = resolve_environments(Some(&json!([
            { "id": "qa", "label": "QA", "color": "#00bcd4", "icon": "🔍" },
            { "id": "broken", "label": "Broken", "color": "#000000" },
            "prod"
        ])));
        assert_eq!(resolved, vec![Environment::new("qa", "QA", "#00bcd4", "🔍")]);
    }

    #[test]
    fn stored_empty_environment_list_is_kept() {
        let resolved = resolve_environments(Some(&json!([])));
        assert!(resolved.is_empty());
    }

    #[test]
    fn malformed_domain_entries_are_dropped_individually() {
        let resolved = resolve_domains(Some(&json!({
            "good.example": { "environmentId": "prod", "updatedAt": "2024-01-01T00:00:00.000Z" },
            "bad.example": "prod",
            "worse.example": { "updatedAt": "2024-01-01T00:00:00.000Z" }
        })));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved["good.example"].environment_id, "prod");
    }

    #[test]
    fn non_object_domains_resolve_to_empty() {
        assert!(resolve_domains(Some(&json!(["example.com"]))).is_empty());
        assert!(resolve_domains(None).is_empty());
    }

    #[test]
    fn indicator_settings_fall_back_per_field() {
        let resolved = resolve_indicator_settings(Some(&json!({
            "style": "triangle",
            "position": "bottom-center"
        })));
        assert_eq!(resolved.style, IndicatorStyle::Triangle);
        assert_eq!(resolved.position, IndicatorPosition::TopRight);

        let resolved = resolve_indicator_settings(Some(&json!("ribbon")));
        assert_eq!(resolved, IndicatorSettings::default());
    }

    #[test]
    fn orphaned_mark_resolves_to_no_environment() {
        let snapshot = json!({
            STORAGE_DOMAINS_KEY: {
                "ghost.example": { "environmentId": "qa", "updatedAt": "" },
                "prod.example": { "environmentId": "prod", "updatedAt": "" }
            }
        });
        let config = EffectiveConfig::from_snapshot(snapshot.as_object().expect("object"));
        assert!(config.environment_for_domain("ghost.example").is_none());
        assert_eq!(
            config
                .environment_for_domain("prod.example")
                .map(|environment| environment.label.as_str()),
            Some("Production")
        );
    }

    #[test]
    fn resolve_log_level_defaults_to_info() {
        assert_eq!(resolve_log_level(None), (LogLevel::Info, "default".to_string()));
        assert_eq!(resolve_log_level(Some("  ")), (LogLevel::Info, "default".to_string()));
    }

    #[test]
    fn resolve_log_level_accepts_known_levels() {
        assert_eq!(
            resolve_log_level(Some(" DEBUG ")),
            (LogLevel::Debug, ENV_LOG_LEVEL.to_string())
        );
    }

    #[test]
    fn resolve_log_level_records_invalid_input() {
        let (level, source) = resolve_log_level(Some("loud"));
        assert_eq!(level, LogLevel::Info);
        assert_eq!(source, "PRODORNOT_LOG:invalid(loud)->info");
    }
}
