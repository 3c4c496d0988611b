//! In-memory doubles for the store, tabs, prompts and page document.
//!
//! Clones share state, so one `MemoryStore` can back several surfaces the
//! way `chrome.storage.sync` backs the page script, popup and settings page.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::badge::Badge;
use crate::config::{STORAGE_DOMAINS_KEY, STORAGE_ENVIRONMENTS_KEY, STORAGE_INDICATOR_SETTINGS_KEY};
use crate::indicator::BadgeHost;
use crate::model::{DomainMarks, Environment, IndicatorSettings};
use crate::settings::UserPrompt;
use crate::store::{StoreChange, StoreError, StoreSnapshot, SyncStore};
use crate::tabs::{RuntimeMessage, TabId, TabInfo, TabsApi, TabsError};

#[derive(Debug, Default)]
struct MemoryStoreState {
    values: RefCell<StoreSnapshot>,
    writes: RefCell<Vec<StoreSnapshot>>,
    changes: RefCell<Vec<StoreChange>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<MemoryStoreState>,
}

impl MemoryStore {
    /// Stores a raw value without recording a write or a change.
    pub fn seed(&self, key: &str, value: Value) {
        self.state.values.borrow_mut().insert(key.to_string(), value);
    }

    pub fn seed_environments(&self, environments: &[Environment]) {
        self.seed(
            STORAGE_ENVIRONMENTS_KEY,
            serde_json::to_value(environments).unwrap_or(Value::Null),
        );
    }

    pub fn seed_domains(&self, domains: &DomainMarks) {
        self.seed(
            STORAGE_DOMAINS_KEY,
            serde_json::to_value(domains).unwrap_or(Value::Null),
        );
    }

    pub fn seed_indicator_settings(&self, settings: IndicatorSettings) {
        self.seed(
            STORAGE_INDICATOR_SETTINGS_KEY,
            serde_json::to_value(settings).unwrap_or(Value::Null),
        );
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.state.values.borrow().get(key).cloned()
    }

    /// Every `set` payload in call order.
    pub fn writes(&self) -> Vec<StoreSnapshot> {
        self.state.writes.borrow().clone()
    }

    /// Change notifications emitted since the last call.
    pub fn take_changes(&self) -> Vec<StoreChange> {
        std::mem::take(&mut *self.state.changes.borrow_mut())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.fail_writes.set(fail);
    }
}

#[async_trait(?Send)]
impl SyncStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreSnapshot, StoreError> {
        if self.state.fail_reads.get() {
            return Err(StoreError::Read {
                message: "memory store configured to fail reads".to_string(),
            });
        }
        let values = self.state.values.borrow();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|value| ((*key).to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, items: StoreSnapshot) -> Result<(), StoreError> {
        if self.state.fail_writes.get() {
            return Err(StoreError::Write {
                message: "memory store configured to fail writes".to_string(),
            });
        }
        let changed_keys = items.keys().cloned().collect::<Vec<_>>();
        {
            let mut values = self.state.values.borrow_mut();
            for (key, value) in &items {
                values.insert(key.clone(), value.clone());
            }
        }
        self.state.writes.borrow_mut().push(items);
        self.state
            .changes
            .borrow_mut()
            .push(StoreChange::sync(changed_keys));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FakeTabsState {
    tabs: Vec<TabInfo>,
    active: Option<TabId>,
    reloads: Vec<TabId>,
    messages: Vec<(TabId, RuntimeMessage)>,
    failing_messages: BTreeSet<TabId>,
    fail_query: bool,
    options_opened: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FakeTabs {
    state: Rc<RefCell<FakeTabsState>>,
}

impl FakeTabs {
    pub fn add_tab(&self, id: TabId, url: &str) {
        self.state.borrow_mut().tabs.push(TabInfo::new(id, url));
    }

    pub fn add_active_tab(&self, id: TabId, url: &str) {
        let mut state = self.state.borrow_mut();
        state.tabs.push(TabInfo::new(id, url));
        state.active = Some(id);
    }

    /// Messages to `id` fail the way they do for tabs with no page script.
    pub fn fail_messages_to(&self, id: TabId) {
        self.state.borrow_mut().failing_messages.insert(id);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.state.borrow_mut().fail_query = fail;
    }

    pub fn reloads(&self) -> Vec<TabId> {
        self.state.borrow().reloads.clone()
    }

    pub fn messages(&self) -> Vec<(TabId, RuntimeMessage)> {
        self.state.borrow().messages.clone()
    }

    pub fn options_opened(&self) -> u32 {
        self.state.borrow().options_opened
    }
}

#[async_trait(?Send)]
impl TabsApi for FakeTabs {
    async fn query_all(&self) -> Result<Vec<TabInfo>, TabsError> {
        let state = self.state.borrow();
        if state.fail_query {
            return Err(TabsError::Query {
                message: "fake tabs configured to fail queries".to_string(),
            });
        }
        Ok(state.tabs.clone())
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>, TabsError> {
        let state = self.state.borrow();
        Ok(state
            .active
            .and_then(|active| state.tabs.iter().find(|tab| tab.id == active).cloned()))
    }

    async fn reload(&self, tab_id: TabId) -> Result<(), TabsError> {
        self.state.borrow_mut().reloads.push(tab_id);
        Ok(())
    }

    async fn send_message(&self, tab_id: TabId, message: RuntimeMessage) -> Result<(), TabsError> {
        let mut state = self.state.borrow_mut();
        if state.failing_messages.contains(&tab_id) {
            return Err(TabsError::Message {
                tab_id,
                message: "Could not establish connection. Receiving end does not exist."
                    .to_string(),
            });
        }
        state.messages.push((tab_id, message));
        Ok(())
    }

    async fn open_options_page(&self) -> Result<(), TabsError> {
        self.state.borrow_mut().options_opened += 1;
        Ok(())
    }
}

/// Answers confirmations from a script, falling back to a fixed answer.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<bool>>,
    fallback: bool,
    confirms: RefCell<Vec<String>>,
    alerts: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    #[must_use]
    pub fn always(answer: bool) -> Self {
        Self {
            fallback: answer,
            ..Self::default()
        }
    }

    pub fn answers(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn confirms(&self) -> Vec<String> {
        self.confirms.borrow().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.confirms.borrow_mut().push(message.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(self.fallback)
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

/// A document body that holds badge elements.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub elements: Vec<Badge>,
    pub fail_inserts: bool,
}

impl FakeHost {
    /// Number of elements carrying the indicator id.
    #[must_use]
    pub fn badge_count(&self) -> usize {
        self.elements.len()
    }
}

impl BadgeHost for FakeHost {
    type Error = String;

    fn remove_badge(&mut self) -> Result<(), Self::Error> {
        // getElementById finds the first match only.
        if !self.elements.is_empty() {
            self.elements.remove(0);
        }
        Ok(())
    }

    fn insert_badge(&mut self, badge: &Badge) -> Result<(), Self::Error> {
        if self.fail_inserts {
            return Err("appendChild failed".to_string());
        }
        self.elements.push(badge.clone());
        Ok(())
    }
}
