use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub type TabId = i32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub url: Option<String>,
}

impl TabInfo {
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: Some(url.into()),
        }
    }

    #[must_use]
    pub fn hostname(&self) -> Option<String> {
        self.url.as_deref().and_then(hostname_from_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TabsError {
    #[error("tab query failed: {message}")]
    Query { message: String },
    #[error("reloading tab {tab_id} failed: {message}")]
    Reload { tab_id: TabId, message: String },
    #[error("messaging tab {tab_id} failed: {message}")]
    Message { tab_id: TabId, message: String },
    #[error("opening the options page failed: {message}")]
    OpenOptions { message: String },
}

/// The one message surfaces send to page scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuntimeMessage {
    #[serde(rename = "UPDATE_INDICATOR")]
    UpdateIndicator,
}

/// Browser tab operations the settings page and popup depend on.
#[async_trait(?Send)]
pub trait TabsApi {
    async fn query_all(&self) -> Result<Vec<TabInfo>, TabsError>;
    async fn active_tab(&self) -> Result<Option<TabInfo>, TabsError>;
    async fn reload(&self, tab_id: TabId) -> Result<(), TabsError>;
    async fn send_message(&self, tab_id: TabId, message: RuntimeMessage) -> Result<(), TabsError>;
    async fn open_options_page(&self) -> Result<(), TabsError>;
}

/// Hostname of an absolute URL, or `None` when the URL has no host
/// (`about:blank`, `data:` URLs, unparseable input).
#[must_use]
pub fn hostname_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    Some(host.to_string())
}

/// What happened to each tab during a broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub reloaded: Vec<TabId>,
    pub notified: Vec<TabId>,
    pub failed: Vec<TabId>,
}

/// Reloads tabs showing `reload_domain` and sends `UPDATE_INDICATOR` to every
/// other tab. Per-tab failures are expected (most tabs run no page script)
/// and only recorded.
pub async fn broadcast_indicator_update<T: TabsApi + ?Sized>(
    tabs: &T,
    reload_domain: Option<&str>,
) -> Result<BroadcastReport, TabsError> {
    let mut report = BroadcastReport::default();
    for tab in tabs.query_all().await? {
        let reload = match (reload_domain, tab.hostname()) {
            (Some(domain), Some(hostname)) => hostname == domain,
            _ => false,
        };
        let outcome = if reload {
            tabs.reload(tab.id).await.map(|()| report.reloaded.push(tab.id))
        } else {
            tabs.send_message(tab.id, RuntimeMessage::UpdateIndicator)
                .await
                .map(|()| report.notified.push(tab.id))
        };
        if let Err(error) = outcome {
            debug!(tab_id = tab.id, %error, "ignoring tab update failure");
            report.failed.push(tab.id);
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hostname_from_url_extracts_host() {
        assert_eq!(
            hostname_from_url("https://admin.example.com:8443/path?q=1"),
            Some("admin.example.com".to_string())
        );
        assert_eq!(
            hostname_from_url("http://localhost:3000/"),
            Some("localhost".to_string())
        );
    }

    #[test]
    fn hostname_from_url_rejects_hostless_urls() {
        assert_eq!(hostname_from_url("about:blank"), None);
        assert_eq!(hostname_from_url("not a url"), None);
        assert_eq!(hostname_from_url("file:///tmp/index.html"), None);
    }

    #[test]
    fn runtime_message_uses_type_tag() {
        let value = serde_json::to_value(RuntimeMessage::UpdateIndicator).expect("serialize");
        assert_eq!(value, json!({ "type": "UPDATE_INDICATOR" }));

        let decoded: RuntimeMessage =
            serde_json::from_value(json!({ "type": "UPDATE_INDICATOR" })).expect("decode");
        assert_eq!(decoded, RuntimeMessage::UpdateIndicator);
        assert!(serde_json::from_value::<RuntimeMessage>(json!({ "type": "PING" })).is_err());
    }
}
