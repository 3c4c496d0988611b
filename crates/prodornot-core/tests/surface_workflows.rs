use chrono::{TimeZone, Utc};
use prodornot_core::testing::{FakeTabs, MemoryStore, ScriptedPrompt};
use prodornot_core::{
    DeleteOutcome, DomainMark, DomainMarks, EffectiveConfig, Environment, EnvironmentDraft,
    IndicatorPosition, IndicatorSettings, IndicatorStyle, QuickToggle, QuickToggleOutcome,
    RuntimeMessage, STORAGE_DOMAINS_KEY, STORAGE_ENVIRONMENTS_KEY,
    STORAGE_INDICATOR_SETTINGS_KEY, SettingsSurface, default_environments, load_effective_config,
};
use serde_json::json;

fn marks(entries: &[(&str, &str)]) -> DomainMarks {
    entries
        .iter()
        .map(|(domain, environment_id)| {
            (
                (*domain).to_string(),
                DomainMark {
                    environment_id: (*environment_id).to_string(),
                    updated_at: "2024-01-01T00:00:00.000Z".to_string(),
                },
            )
        })
        .collect()
}

async fn settings_surface(
    store: &MemoryStore,
    tabs: &FakeTabs,
) -> SettingsSurface<MemoryStore, FakeTabs, ScriptedPrompt> {
    SettingsSurface::load(store.clone(), tabs.clone(), ScriptedPrompt::always(true))
        .await
        .expect("load settings surface")
}

#[tokio::test]
async fn deleting_environment_cascades_to_its_marks_only() {
    let store = MemoryStore::default();
    store.seed_environments(&[
        Environment::new("a", "A", "#111111", "A"),
        Environment::new("b", "B", "#222222", "B"),
    ]);
    store.seed_domains(&marks(&[("x", "a"), ("y", "b"), ("z", "a")]));
    let surface = settings_surface(&store, &FakeTabs::default()).await;

    let outcome = surface.delete_environment("a").await.expect("delete environment");

    assert_eq!(
        outcome,
        DeleteOutcome::EnvironmentDeleted {
            removed_domains: vec!["x".to_string(), "z".to_string()],
        }
    );
    assert_eq!(
        store.value(STORAGE_DOMAINS_KEY),
        Some(json!({ "y": { "environmentId": "b", "updatedAt": "2024-01-01T00:00:00.000Z" } }))
    );
    assert_eq!(
        store.value(STORAGE_ENVIRONMENTS_KEY),
        Some(json!([{ "id": "b", "label": "B", "color": "#222222", "icon": "B" }]))
    );
    assert_eq!(surface.domains(), marks(&[("y", "b")]));
    assert_eq!(surface.domain_rows().len(), 1);
}

#[tokio::test]
async fn cascade_sees_marks_written_by_the_popup_after_load() {
    let store = MemoryStore::default();
    let tabs = FakeTabs::default();
    tabs.add_active_tab(4, "https://late.example/");
    let surface = settings_surface(&store, &tabs).await;

    let popup = QuickToggle::open(store.clone(), tabs.clone())
        .await
        .expect("open popup");
    popup.save("staging", Utc::now()).await.expect("mark domain");

    surface
        .delete_environment("staging")
        .await
        .expect("delete environment");

    let config = load_effective_config(&store).await.expect("reload config");
    assert!(config.domains.is_empty());
}

#[tokio::test]
async fn created_environment_reads_back_with_derived_id() {
    let store = MemoryStore::default();
    let surface = settings_surface(&store, &FakeTabs::default()).await;

    surface.begin_create();
    let saved = surface
        .save_environment(EnvironmentDraft {
            label: "QA Env!".to_string(),
            color: "#9c27b0".to_string(),
            icon: "🔬".to_string(),
        })
        .await
        .expect("create environment");

    let config = load_effective_config(&store).await.expect("read back");
    let stored = config.environment("qa_env_").expect("stored environment");
    assert_eq!(stored, &saved);
    assert_eq!(stored.label, "QA Env!");
    assert_eq!(stored.color, "#9c27b0");
    assert_eq!(stored.icon, "🔬");
    // Defaults are materialized once the list is first written.
    assert_eq!(config.environments.len(), 4);
}

#[tokio::test]
async fn quick_toggle_save_writes_mark_and_reloads_tab() {
    let store = MemoryStore::default();
    let tabs = FakeTabs::default();
    tabs.add_active_tab(42, "https://example.com/orders/17");
    let popup = QuickToggle::open(store.clone(), tabs.clone())
        .await
        .expect("open popup");

    let now = Utc
        .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    let outcome = popup.save("prod", now).await.expect("save mark");

    assert_eq!(outcome, QuickToggleOutcome::Applied);
    assert_eq!(
        store.value(STORAGE_DOMAINS_KEY),
        Some(json!({
            "example.com": { "environmentId": "prod", "updatedAt": "2024-05-01T09:30:00.000Z" }
        }))
    );
    assert_eq!(tabs.reloads(), vec![42]);
}

#[tokio::test]
async fn quick_toggle_preselects_and_removes_existing_mark() {
    let store = MemoryStore::default();
    store.seed_domains(&marks(&[("example.com", "dev"), ("other.com", "prod")]));
    let tabs = FakeTabs::default();
    tabs.add_active_tab(5, "https://example.com/");

    let popup = QuickToggle::open(store.clone(), tabs.clone())
        .await
        .expect("open popup");
    let view = popup.view();
    assert_eq!(view.selected, "dev");
    assert!(view.show_remove);

    let outcome = popup.remove().await.expect("remove mark");
    assert_eq!(outcome, QuickToggleOutcome::Applied);
    assert_eq!(
        store.value(STORAGE_DOMAINS_KEY),
        Some(json!({ "other.com": { "environmentId": "prod", "updatedAt": "2024-01-01T00:00:00.000Z" } }))
    );
    assert_eq!(tabs.reloads(), vec![5]);
}

#[tokio::test]
async fn deleting_domain_reloads_matching_tabs_and_notifies_the_rest() {
    let store = MemoryStore::default();
    store.seed_domains(&marks(&[("admin.example.com", "prod"), ("dev.example.com", "dev")]));
    let tabs = FakeTabs::default();
    tabs.add_tab(1, "https://admin.example.com/users");
    tabs.add_tab(2, "https://dev.example.com/");
    tabs.add_tab(3, "chrome://newtab/");
    tabs.fail_messages_to(3);
    let surface = settings_surface(&store, &tabs).await;

    let outcome = surface
        .delete_domain("admin.example.com")
        .await
        .expect("delete domain");

    let broadcast = match outcome {
        DeleteOutcome::DomainDeleted { broadcast } => broadcast,
        other => panic!("expected domain deletion, got {other:?}"),
    };
    assert_eq!(broadcast.reloaded, vec![1]);
    assert_eq!(broadcast.notified, vec![2]);
    assert_eq!(broadcast.failed, vec![3]);
    assert_eq!(tabs.reloads(), vec![1]);
    assert_eq!(tabs.messages(), vec![(2, RuntimeMessage::UpdateIndicator)]);
    assert_eq!(surface.domains(), marks(&[("dev.example.com", "dev")]));
}

#[tokio::test]
async fn deleting_domain_survives_tab_query_failure() {
    let store = MemoryStore::default();
    store.seed_domains(&marks(&[("a.example", "prod")]));
    let tabs = FakeTabs::default();
    tabs.fail_queries(true);
    let prompt = ScriptedPrompt::answers([true]);
    let surface = SettingsSurface::load(store.clone(), tabs, prompt)
        .await
        .expect("load settings");

    let outcome = surface.delete_domain("a.example").await.expect("delete domain");
    assert!(matches!(outcome, DeleteOutcome::DomainDeleted { .. }));
    assert_eq!(store.value(STORAGE_DOMAINS_KEY), Some(json!({})));
}

#[tokio::test]
async fn saving_indicator_settings_persists_singleton() {
    let store = MemoryStore::default();
    let surface = settings_surface(&store, &FakeTabs::default()).await;

    surface
        .save_indicator_settings(IndicatorSettings {
            style: IndicatorStyle::Triangle,
            position: IndicatorPosition::TopLeft,
        })
        .await
        .expect("save indicator settings");

    assert_eq!(
        store.value(STORAGE_INDICATOR_SETTINGS_KEY),
        Some(json!({ "style": "triangle", "position": "top-left" }))
    );
}

#[tokio::test]
async fn every_surface_sees_defaults_with_an_empty_store() {
    let store = MemoryStore::default();
    let tabs = FakeTabs::default();
    tabs.add_active_tab(1, "https://example.com/");

    let config = load_effective_config(&store).await.expect("load config");
    assert_eq!(config, EffectiveConfig::default());

    let surface = settings_surface(&store, &tabs).await;
    assert_eq!(surface.environments(), default_environments());
    assert_eq!(surface.indicator_settings(), IndicatorSettings::default());
    assert!(surface.domain_rows().is_empty());

    let popup = QuickToggle::open(store.clone(), tabs)
        .await
        .expect("open popup");
    let ids = popup
        .view()
        .options
        .into_iter()
        .map(|option| option.value)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["", "dev", "staging", "prod"]);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn failed_store_read_surfaces_as_settings_error() {
    let store = MemoryStore::default();
    store.fail_reads(true);
    let result = SettingsSurface::load(store, FakeTabs::default(), ScriptedPrompt::always(true)).await;
    let Err(error) = result else {
        panic!("expected load failure");
    };
    assert_eq!(error.user_message(), "Could not reach extension storage. Please try again.");
}

#[tokio::test]
async fn malformed_environment_entry_does_not_wipe_the_list_on_save() {
    let store = MemoryStore::default();
    store.seed(
        STORAGE_ENVIRONMENTS_KEY,
        json!([
            { "id": "qa", "label": "QA", "color": "#00bcd4", "icon": "🔍" },
            { "id": "broken", "label": "Broken", "color": "#000000" }
        ]),
    );
    let surface = settings_surface(&store, &FakeTabs::default()).await;
    assert_eq!(
        surface.environments(),
        vec![Environment::new("qa", "QA", "#00bcd4", "🔍")]
    );

    surface
        .save_environment(EnvironmentDraft {
            label: "New".to_string(),
            color: "#9c27b0".to_string(),
            icon: "✨".to_string(),
        })
        .await
        .expect("create environment");
    assert_eq!(
        store.value(STORAGE_ENVIRONMENTS_KEY),
        Some(json!([
            { "id": "qa", "label": "QA", "color": "#00bcd4", "icon": "🔍" },
            { "id": "new", "label": "New", "color": "#9c27b0", "icon": "✨" }
        ]))
    );
}
