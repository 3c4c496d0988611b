use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined category that domains are classified into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub label: String,
    pub color: String,
    pub icon: String,
}

impl Environment {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: color.into(),
            icon: icon.into(),
        }
    }
}

/// The association of one hostname with one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainMark {
    pub environment_id: String,
    #[serde(default)]
    pub updated_at: String,
}

impl DomainMark {
    pub fn new(environment_id: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            environment_id: environment_id.into(),
            updated_at: iso_timestamp(updated_at),
        }
    }
}

/// Hostname to mark. Ordered so rendered lists and persisted payloads are stable.
pub type DomainMarks = BTreeMap<String, DomainMark>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorStyle {
    #[default]
    Ribbon,
    Triangle,
}

impl IndicatorStyle {
    pub const ALL: [Self; 2] = [Self::Ribbon, Self::Triangle];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ribbon => "ribbon",
            Self::Triangle => "triangle",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "ribbon" => Some(Self::Ribbon),
            "triangle" => Some(Self::Triangle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorPosition {
    TopLeft,
    #[default]
    TopRight,
}

impl IndicatorPosition {
    pub const ALL: [Self; 2] = [Self::TopLeft, Self::TopRight];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "top-left" => Some(Self::TopLeft),
            "top-right" => Some(Self::TopRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndicatorSettings {
    pub style: IndicatorStyle,
    pub position: IndicatorPosition,
}

/// Derives an environment id from its label: lowercase, then every character
/// outside `[a-z0-9]` becomes `_`.
///
/// Characters outside the Basic Multilingual Plane count as two UTF-16 code
/// units and therefore produce two underscores, the same as the browser's
/// non-unicode regex replacement that ids have always been derived with.
#[must_use]
pub fn derive_environment_id(label: &str) -> String {
    let mut id = String::with_capacity(label.len());
    for ch in label.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            id.push(ch);
        } else {
            for _ in 0..ch.len_utf16() {
                id.push('_');
            }
        }
    }
    id
}

/// `2024-05-01T12:00:00.000Z`
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
